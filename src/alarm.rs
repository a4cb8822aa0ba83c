use alloc::{boxed::Box, sync::Arc};
use atomicbox::AtomicOptionBox;
use async_trait::async_trait;
use core::{
    sync::atomic::{AtomicBool, Ordering},
    task::{Context, Poll, Waker},
};
use futures::future;

use crate::{ClockEvent, ClockEventMode, Result, TimerRegs};

#[async_trait]
pub trait ClockAlarm: Send {
    /// Returns a future that resolves when `ticks` counter ticks have elapsed.
    async fn sleep_ticks(&mut self, ticks: u64) -> Result<()>;

    /// Returns a future that resolves when at least `ns` nanoseconds have elapsed.
    async fn sleep_ns(&mut self, ns: u64) -> Result<()>;
}

/// An alarm backed by a clock event device.
///
/// The alarm owns the event handler of the device. Sleeps longer than the
/// largest programmable delta are split into several events.
pub struct Alarm<R: TimerRegs> {
    device: Arc<ClockEvent<R>>,
    signal: Arc<Signal>,
}

struct Signal {
    fired: AtomicBool,
    waker: AtomicOptionBox<Waker>,
}

impl Signal {
    fn notify(&self) {
        self.fired.store(true, Ordering::Release);
        if let Some(waker) = self.waker.take(Ordering::AcqRel) {
            waker.wake();
        }
    }

    fn reset(&self) {
        self.fired.store(false, Ordering::Release);
        drop(self.waker.take(Ordering::AcqRel));
    }

    /// Ready once the next event was delivered.
    fn poll_fired(&self, cx: &mut Context<'_>) -> Poll<()> {
        if self.fired.swap(false, Ordering::AcqRel) {
            return Poll::Ready(());
        }

        drop(self.waker.swap(Some(Box::new(cx.waker().clone())), Ordering::AcqRel));

        // The event may have fired before the waker was in place.
        if self.fired.swap(false, Ordering::AcqRel) {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Stops the counter when a sleep completes or is dropped.
struct StopGuard<'a, R: TimerRegs>(&'a ClockEvent<R>);

impl<R: TimerRegs> Drop for StopGuard<'_, R> {
    fn drop(&mut self) {
        self.0.set_mode(ClockEventMode::Shutdown);
    }
}

impl<R: TimerRegs> Alarm<R> {
    /// Create an alarm and register it as the event handler of `device`.
    pub fn new(device: Arc<ClockEvent<R>>) -> Result<Self> {
        let signal = Arc::new(Signal {
            fired: AtomicBool::new(false),
            waker: AtomicOptionBox::new(None),
        });

        let handler_signal = signal.clone();
        device.register_handler(move |_| handler_signal.notify())?;
        device.set_mode(ClockEventMode::OneShot);

        Ok(Self { device, signal })
    }

    pub fn device(&self) -> &Arc<ClockEvent<R>> {
        &self.device
    }
}

#[async_trait]
impl<R: TimerRegs> ClockAlarm for Alarm<R> {
    async fn sleep_ticks(&mut self, ticks: u64) -> Result<()> {
        if ticks == 0 {
            return Ok(());
        }

        let _guard = StopGuard(&self.device);
        let params = *self.device.params();
        let signal = &self.signal;
        let mut remaining = ticks;

        while remaining > 0 {
            let delta = params.clamp_ticks(remaining);
            signal.reset();
            self.device.set_next_event(delta)?;
            future::poll_fn(|cx| signal.poll_fired(cx)).await;
            remaining = remaining.saturating_sub(delta as u64);
        }

        Ok(())
    }

    async fn sleep_ns(&mut self, ns: u64) -> Result<()> {
        let ticks = self.device.params().ns_to_ticks(ns);
        self.sleep_ticks(ticks).await
    }
}
