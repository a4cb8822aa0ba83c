use bitflags::bitflags;

use crate::conversion::{max_delta_ticks_for, DEFAULT_MAX_DELTA_TICKS, DEFAULT_MIN_DELTA_TICKS};

bitflags! {
    /// Capabilities advertised to the clock event framework.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Features: u32 {
        /// The device can deliver periodic events on its own.
        const PERIODIC = 1 << 0;
        /// The device can be programmed for a single event at a time.
        const ONESHOT = 1 << 1;
    }
}

/// Static description and timebase configuration of a clock event device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEventConfig {
    /// Device name reported to the framework.
    pub name: &'static str,
    /// Framework rating, higher is preferred.
    pub rating: u32,
    /// Advertised features.
    pub features: Features,
    /// The timer kernel clock in Hz, as supplied by the clock tree.
    pub input_frequency: u32,
    /// PSC value. The counter runs at `input_frequency / (prescaler + 1)`.
    pub prescaler: u32,
    /// Smallest delta the framework may request.
    pub min_delta_ticks: u32,
    /// Largest delta the framework may request.
    pub max_delta_ticks: u32,
}

impl ClockEventConfig {
    /// Configuration of the STM32 system tick timer running at `input_frequency`.
    pub const fn new(input_frequency: u32) -> Self {
        Self {
            name: "STM32 System Timer",
            rating: 200,
            features: Features::ONESHOT,
            input_frequency,
            prescaler: 0,
            min_delta_ticks: DEFAULT_MIN_DELTA_TICKS,
            max_delta_ticks: DEFAULT_MAX_DELTA_TICKS,
        }
    }

    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub const fn with_rating(mut self, rating: u32) -> Self {
        self.rating = rating;
        self
    }

    pub const fn with_prescaler(mut self, prescaler: u32) -> Self {
        self.prescaler = prescaler;
        self
    }

    pub const fn with_delta_bounds(mut self, min_delta_ticks: u32, max_delta_ticks: u32) -> Self {
        self.min_delta_ticks = min_delta_ticks;
        self.max_delta_ticks = max_delta_ticks;
        self
    }

    /// Fit the largest delta to a counter that tops out at `counter_max`, e.g. `0xFFFF` for a 16 bit timer.
    pub const fn with_counter_max(mut self, counter_max: u32) -> Self {
        self.max_delta_ticks = max_delta_ticks_for(counter_max);
        self
    }

    /// The frequency the counter actually increments at.
    pub const fn counter_frequency(&self) -> u32 {
        self.input_frequency / self.prescaler.saturating_add(1)
    }
}
