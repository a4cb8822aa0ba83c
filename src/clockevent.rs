use alloc::{boxed::Box, sync::Arc};
use core::cell::RefCell;
use critical_section::Mutex;

use crate::{
    config::{ClockEventConfig, Features},
    conversion::ConversionParams,
    irq::{InterruptLine, IrqReturn},
    mode::{AtomicMode, ClockEventMode, Mode},
    regs::TimerRegs,
    Error, Result,
};

/// The event handler registered by the clock event framework.
///
/// It runs in interrupt context, once per serviced update interrupt, and may
/// re-arm the device through the reference it is given.
pub type EventHandler<R> = Box<dyn FnMut(&ClockEvent<R>) + Send>;

/// What the device offers to the clock event framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub name: &'static str,
    pub rating: u32,
    pub features: Features,
    pub irq: usize,
    pub mult: u32,
    pub shift: u32,
    pub min_delta_ns: u64,
    pub max_delta_ns: u64,
}

/// A clock event device driven by the update interrupt of a 32 bit up-counter.
pub struct ClockEvent<R: TimerRegs> {
    regs: R,
    config: ClockEventConfig,
    params: ConversionParams,
    irq: usize,
    mode: AtomicMode,
    handler: Mutex<RefCell<Option<EventHandler<R>>>>,
}

impl<R: TimerRegs> ClockEvent<R> {
    /// Bring up the timer and attach its interrupt.
    ///
    /// The counter is left stopped with a full-range reload value and the
    /// update interrupt enabled. Use [`capabilities`](Self::capabilities) for
    /// the delta range the framework may request.
    pub fn init<I: InterruptLine>(regs: R, irq: I, config: ClockEventConfig) -> Result<Arc<Self>> {
        if config.prescaler > u16::MAX as u32 {
            return Err(Error::PrescalerTooLarge(config.prescaler));
        }
        if config.max_delta_ticks > R::MAX {
            return Err(Error::InvalidDeltaBounds {
                min: config.min_delta_ticks,
                max: config.max_delta_ticks,
            });
        }
        let params = ConversionParams::with_bounds(
            config.counter_frequency(),
            config.min_delta_ticks,
            config.max_delta_ticks,
        )?;

        regs.counter_disable();

        // Enable the timer clock and restore the register block to its reset state.
        regs.clock_enable();
        regs.reset();

        // Up-counter, auto-reload not buffered.
        regs.write_control(0);
        regs.set_auto_reload(R::MAX);
        regs.set_prescaler(config.prescaler as u16);
        regs.set_counter(0);

        // Latch the prescaler now rather than at the first overflow.
        regs.generate_update();
        // UG raised UIF as well, which is not an event.
        regs.clear_update_pending();

        let device = Arc::new(Self {
            regs,
            config,
            params,
            irq: irq.number(),
            mode: AtomicMode::new(Mode::Disabled),
            handler: Mutex::new(RefCell::new(None)),
        });

        let device_weak = Arc::downgrade(&device);
        irq.attach(move || match device_weak.upgrade() {
            Some(device) => {
                device.handle_irq();
                true
            }
            None => false,
        });
        irq.enable();
        device.regs.update_int_enable();

        log_debug!(
            "{}: {} Hz, mult {} shift {}, delta {}..={} ticks",
            config.name,
            params.freq,
            params.mult,
            params.shift,
            params.min_delta_ticks,
            params.max_delta_ticks
        );

        Ok(device)
    }

    /// Register the framework's event handler. Only one registration is accepted.
    pub fn register_handler<F>(&self, handler: F) -> Result<()>
    where
        F: FnMut(&ClockEvent<R>) + Send + 'static,
    {
        critical_section::with(|cs| {
            // A failed borrow means the handler is running right now.
            let mut slot = self
                .handler
                .borrow(cs)
                .try_borrow_mut()
                .map_err(|_| Error::HandlerAlreadyRegistered)?;
            if slot.is_some() {
                return Err(Error::HandlerAlreadyRegistered);
            }
            *slot = Some(Box::new(handler));
            Ok(())
        })
    }

    /// Apply a mode requested by the framework.
    ///
    /// Periodic and resume start the counter, everything else stops it. A
    /// pending update flag is left alone. This is a single read-modify-write
    /// of CR1 and may be called from the event handler.
    pub fn set_mode(&self, requested: ClockEventMode) {
        if requested.enables_counter() {
            self.regs.counter_enable();
        } else {
            self.regs.counter_disable();
        }

        let prev = self.mode.load();
        let next = prev.on_request(requested);
        self.mode.store(next);

        log_debug!("{}: {:?} -> {:?}", self.config.name, prev, next);
    }

    /// Program an update interrupt `delta` ticks from now.
    ///
    /// `delta` must be inside `[min_delta_ticks, max_delta_ticks]`; it is not checked here.
    pub fn set_next_event(&self, delta: u32) -> Result<()> {
        // Reload, counter reset and enable must look like one write to the interrupt.
        critical_section::with(|_| {
            self.regs.set_auto_reload(delta);
            self.regs.set_counter(0);
            self.regs.counter_enable();
            self.mode.store(self.mode.load().on_program());
        });

        Ok(())
    }

    /// Program an update interrupt `ns` nanoseconds from now, clamped to the supported range.
    pub fn set_next_event_ns(&self, ns: u64) -> Result<()> {
        let ticks = self.params.clamp_ticks(self.params.ns_to_ticks(ns));
        self.set_next_event(ticks)
    }

    /// Service the update interrupt.
    ///
    /// The flag is cleared before the handler runs so that an instant reload
    /// does not retrigger. Without a pending update the handler is not called.
    pub fn handle_irq(&self) -> IrqReturn {
        let pending = self.regs.is_update_pending();
        self.regs.clear_update_pending();
        if !pending {
            log_trace!("{}: spurious interrupt", self.config.name);
            return IrqReturn::None;
        }

        self.mode.store(self.mode.load().on_fire());

        critical_section::with(|cs| {
            if let Some(handler) = self.handler.borrow_ref_mut(cs).as_mut() {
                handler(self);
            }
        });

        IrqReturn::Handled
    }

    /// The current device state.
    pub fn mode(&self) -> Mode {
        self.mode.load()
    }

    pub fn params(&self) -> &ConversionParams {
        &self.params
    }

    pub fn config(&self) -> &ClockEventConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            name: self.config.name,
            rating: self.config.rating,
            features: self.config.features,
            irq: self.irq,
            mult: self.params.mult,
            shift: self.params.shift,
            min_delta_ns: self.params.min_delta_ns(),
            max_delta_ns: self.params.max_delta_ns(),
        }
    }

    /// Current counter value, i.e. ticks elapsed since the last programmed event or update.
    pub fn counter(&self) -> u32 {
        self.regs.counter()
    }
}
