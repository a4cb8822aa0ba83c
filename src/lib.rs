//! Clock event device for Drone OS backed by a 32 bit general purpose timer.
//!
//! The timer counts up from zero to its auto-reload value and raises an
//! update interrupt when it wraps. [`ClockEvent`] programs the reload value to
//! request "notify me in N ticks", converts between ticks and nanoseconds with
//! a multiply-shift pair, and forwards every update interrupt to the handler
//! registered by the scheduler tick framework.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

#[macro_use]
mod log;

mod alarm;
mod clockevent;
mod config;
mod conversion;
pub mod drivers;
mod error;
mod irq;
mod mode;
mod regs;

#[cfg(test)]
mod fakes;

pub use self::{
    alarm::{Alarm, ClockAlarm},
    clockevent::{Capabilities, ClockEvent, EventHandler},
    config::{ClockEventConfig, Features},
    conversion::{derive_params, max_delta_ticks_for, ConversionParams, NSEC_PER_SEC},
    error::{Error, Result},
    irq::{InterruptLine, IrqReturn},
    mode::{ClockEventMode, Mode},
    regs::TimerRegs,
};
