//! Simulated timer and interrupt line for host tests.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    vec::Vec,
};

use crate::{InterruptLine, TimerRegs};

/// A register write issued to [`FakeTim`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ClockEnable,
    Reset,
    WriteControl(u32),
    CounterEnable,
    CounterDisable,
    UpdateIntEnable,
    UpdateIntDisable,
    ClearUpdatePending,
    SetCounter(u32),
    SetPrescaler(u16),
    SetAutoReload(u32),
    GenerateUpdate,
}

#[derive(Debug)]
struct TimState {
    clock: bool,
    cen: bool,
    uie: bool,
    uif: bool,
    cnt: u32,
    psc: u16,
    arr: u32,
    accesses: Vec<Access>,
}

impl TimState {
    fn reset_value(top: u32) -> Self {
        Self {
            clock: false,
            cen: false,
            uie: false,
            uif: false,
            cnt: 0,
            psc: 0,
            arr: top,
            accesses: Vec::new(),
        }
    }
}

/// An up-counter that tops out at `TOP`.
///
/// The update event is raised on the increment that makes the counter reach
/// ARR; the counter then restarts from zero. Clones share the same registers.
#[derive(Clone)]
pub struct FakeTimer<const TOP: u32>(Arc<Mutex<TimState>>);

/// TIM2/TIM5 style 32 bit counter.
pub type FakeTim = FakeTimer<{ u32::MAX }>;

/// TIM3/TIM4 style 16 bit counter.
pub type FakeTim16 = FakeTimer<0xFFFF>;

impl<const TOP: u32> Default for FakeTimer<TOP> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(TimState::reset_value(TOP))))
    }
}

impl<const TOP: u32> FakeTimer<TOP> {
    fn write(&self, access: Access, f: impl FnOnce(&mut TimState)) {
        let mut state = self.0.lock().unwrap();
        state.accesses.push(access);
        f(&mut state);
    }

    fn read<T>(&self, f: impl FnOnce(&TimState) -> T) -> T {
        f(&self.0.lock().unwrap())
    }

    pub fn accesses(&self) -> Vec<Access> {
        self.read(|s| s.accesses.clone())
    }

    pub fn clear_accesses(&self) {
        self.0.lock().unwrap().accesses.clear();
    }

    pub fn counter_value(&self) -> u32 {
        self.read(|s| s.cnt)
    }

    pub fn prescaler_value(&self) -> u16 {
        self.read(|s| s.psc)
    }

    pub fn auto_reload_value(&self) -> u32 {
        self.read(|s| s.arr)
    }

    /// Raise UIF as the hardware would, without delivering the interrupt.
    pub fn set_update_pending(&self) {
        self.0.lock().unwrap().uif = true;
    }

    /// Let `ticks` counter clocks elapse, delivering update interrupts through `irq`.
    ///
    /// Returns the number of update events raised.
    pub fn advance(&self, irq: &FakeIrq, mut ticks: u64) -> usize {
        let mut updates = 0;
        while ticks > 0 {
            let deliver = {
                let mut s = self.0.lock().unwrap();
                if !s.cen || !s.clock {
                    break;
                }

                let to_update = if s.arr > s.cnt {
                    (s.arr - s.cnt) as u64
                } else {
                    // Past ARR: count up to the top and wrap silently.
                    (TOP - s.cnt) as u64 + 1
                };

                if ticks < to_update {
                    s.cnt += ticks as u32;
                    ticks = 0;
                    false
                } else {
                    ticks -= to_update;
                    let update = s.arr > s.cnt;
                    s.cnt = 0;
                    if update {
                        s.uif = true;
                        updates += 1;
                    }
                    update && s.uie
                }
            };

            if deliver {
                irq.fire();
            }
        }
        updates
    }
}

impl<const TOP: u32> TimerRegs for FakeTimer<TOP> {
    const MAX: u32 = TOP;

    fn clock_enable(&self) {
        self.write(Access::ClockEnable, |s| s.clock = true);
    }

    fn reset(&self) {
        self.write(Access::Reset, |s| {
            let accesses = core::mem::take(&mut s.accesses);
            let clock = s.clock;
            *s = TimState {
                clock,
                accesses,
                ..TimState::reset_value(TOP)
            };
        });
    }

    fn write_control(&self, cr1: u32) {
        self.write(Access::WriteControl(cr1), |s| s.cen = cr1 & 1 != 0);
    }

    fn counter_enable(&self) {
        self.write(Access::CounterEnable, |s| s.cen = true);
    }

    fn counter_disable(&self) {
        self.write(Access::CounterDisable, |s| s.cen = false);
    }

    fn is_counter_enabled(&self) -> bool {
        self.read(|s| s.cen)
    }

    fn update_int_enable(&self) {
        self.write(Access::UpdateIntEnable, |s| s.uie = true);
    }

    fn update_int_disable(&self) {
        self.write(Access::UpdateIntDisable, |s| s.uie = false);
    }

    fn is_update_pending(&self) -> bool {
        self.read(|s| s.uif)
    }

    fn clear_update_pending(&self) {
        self.write(Access::ClearUpdatePending, |s| s.uif = false);
    }

    fn counter(&self) -> u32 {
        self.read(|s| s.cnt)
    }

    fn set_counter(&self, cnt: u32) {
        self.write(Access::SetCounter(cnt), |s| s.cnt = cnt);
    }

    fn set_prescaler(&self, psc: u16) {
        self.write(Access::SetPrescaler(psc), |s| s.psc = psc);
    }

    fn auto_reload(&self) -> u32 {
        self.read(|s| s.arr)
    }

    fn set_auto_reload(&self, arr: u32) {
        self.write(Access::SetAutoReload(arr), |s| s.arr = arr);
    }

    fn generate_update(&self) {
        self.write(Access::GenerateUpdate, |s| {
            s.cnt = 0;
            s.uif = true;
        });
    }
}

type FakeHandler = Box<dyn FnMut() -> bool + Send>;

/// An interrupt line that is fired by hand or by [`FakeTim::advance`].
#[derive(Clone)]
pub struct FakeIrq {
    number: usize,
    handler: Arc<Mutex<Option<FakeHandler>>>,
    enabled: Arc<AtomicBool>,
}

impl FakeIrq {
    pub fn new(number: usize) -> Self {
        Self {
            number,
            handler: Arc::new(Mutex::new(None)),
            enabled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.handler.lock().unwrap().is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Run the attached handler once. Returns whether it is still attached.
    pub fn fire(&self) -> bool {
        if !self.is_enabled() {
            return self.is_attached();
        }

        // The line cannot nest on itself, so the handler is taken out while it runs.
        let handler = self.handler.lock().unwrap().take();
        match handler {
            Some(mut handler) => {
                let keep = handler();
                if keep {
                    *self.handler.lock().unwrap() = Some(handler);
                }
                keep
            }
            None => false,
        }
    }
}

impl InterruptLine for FakeIrq {
    fn number(&self) -> usize {
        self.number
    }

    fn attach<F>(&self, handler: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        *self.handler.lock().unwrap() = Some(Box::new(handler));
    }

    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_to_reload_and_wraps() {
        let tim = FakeTim::default();
        let irq = FakeIrq::new(0);
        tim.clock_enable();
        tim.set_auto_reload(10);
        tim.counter_enable();
        assert_eq!(10, tim.auto_reload());

        assert_eq!(0, tim.advance(&irq, 9));
        assert_eq!(9, tim.counter());
        assert_eq!(1, tim.advance(&irq, 1));
        assert_eq!(0, tim.counter());
        assert!(tim.is_update_pending());
        assert_eq!(2, tim.advance(&irq, 25));
        assert_eq!(5, tim.counter());
    }

    #[test]
    fn stopped_counter_holds() {
        let tim = FakeTim::default();
        let irq = FakeIrq::new(0);
        tim.clock_enable();
        tim.set_auto_reload(10);

        assert_eq!(0, tim.advance(&irq, 100));
        assert_eq!(0, tim.counter());
    }

    #[test]
    fn narrow_counter_wraps_at_top() {
        let tim = FakeTim16::default();
        let irq = FakeIrq::new(0);
        tim.clock_enable();
        tim.reset();
        tim.counter_enable();
        assert_eq!(0xFFFF, tim.auto_reload());

        tim.set_auto_reload(10);
        tim.set_counter(20);
        // Past ARR the counter runs up to 0xFFFF and wraps without an update.
        assert_eq!(0, tim.advance(&irq, 0xFFFF - 20 + 1));
        assert_eq!(0, tim.counter());
        assert_eq!(1, tim.advance(&irq, 10));
    }
}
