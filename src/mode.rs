use core::sync::atomic::{AtomicU8, Ordering};

/// Mode requested by the clock event framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockEventMode {
    Unused,
    Shutdown,
    Periodic,
    OneShot,
    Resume,
    /// A framework code this device does not know. Treated as a request to stop.
    Unknown(u32),
}

impl From<u32> for ClockEventMode {
    fn from(code: u32) -> Self {
        match code {
            0 => ClockEventMode::Unused,
            1 => ClockEventMode::Shutdown,
            2 => ClockEventMode::Periodic,
            3 => ClockEventMode::OneShot,
            4 => ClockEventMode::Resume,
            other => ClockEventMode::Unknown(other),
        }
    }
}

impl ClockEventMode {
    /// Whether the request leaves the counter running.
    pub fn enables_counter(self) -> bool {
        match self {
            ClockEventMode::Periodic | ClockEventMode::Resume => true,
            ClockEventMode::OneShot
            | ClockEventMode::Unused
            | ClockEventMode::Shutdown
            | ClockEventMode::Unknown(_) => false,
        }
    }
}

/// State of the clock event device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// The counter is stopped.
    Disabled = 0,
    /// The counter runs and every reload match raises an event.
    Periodic = 1,
    /// A single event is programmed and has not fired yet.
    OneShotArmed = 2,
    /// The programmed event has been delivered.
    OneShotFired = 3,
}

impl Mode {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Mode::Periodic,
            2 => Mode::OneShotArmed,
            3 => Mode::OneShotFired,
            _ => Mode::Disabled,
        }
    }

    /// The state after the framework requested `requested`.
    pub fn on_request(self, requested: ClockEventMode) -> Self {
        if requested.enables_counter() {
            Mode::Periodic
        } else {
            Mode::Disabled
        }
    }

    /// The state after an event was programmed.
    pub fn on_program(self) -> Self {
        match self {
            Mode::Periodic => Mode::Periodic,
            Mode::Disabled | Mode::OneShotArmed | Mode::OneShotFired => Mode::OneShotArmed,
        }
    }

    /// The state after the update interrupt was serviced.
    pub fn on_fire(self) -> Self {
        match self {
            Mode::OneShotArmed => Mode::OneShotFired,
            other => other,
        }
    }

    pub fn is_oneshot(self) -> bool {
        matches!(self, Mode::OneShotArmed | Mode::OneShotFired)
    }
}

/// [`Mode`] shared between thread and interrupt context.
pub(crate) struct AtomicMode(AtomicU8);

impl AtomicMode {
    pub(crate) const fn new(mode: Mode) -> Self {
        Self(AtomicU8::new(mode as u8))
    }

    pub(crate) fn load(&self) -> Mode {
        Mode::from_bits(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn store(&self, mode: Mode) {
        self.0.store(mode as u8, Ordering::Release);
    }
}
