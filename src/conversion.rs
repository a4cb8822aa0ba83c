use crate::{Error, Result};

/// Nanoseconds per second.
pub const NSEC_PER_SEC: u64 = 1_000_000_000;

/// Shortest programmable delta. Leaves room for the interrupt latency so an event is never missed.
pub(crate) const DEFAULT_MIN_DELTA_TICKS: u32 = 0xF;

/// Longest programmable delta. Kept below the full 32 bit range as margin against the next reload write.
pub(crate) const DEFAULT_MAX_DELTA_TICKS: u32 = max_delta_ticks_for(u32::MAX);

/// The longest delta programmed into a counter that tops out at `counter_max`.
pub const fn max_delta_ticks_for(counter_max: u32) -> u32 {
    counter_max.saturating_sub(DEFAULT_MIN_DELTA_TICKS)
}

/// Fixed point timebase of a counter: `ns = (ticks * mult) >> shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConversionParams {
    /// Multiplier. Bounded to 32 bits so that `ticks * mult` fits 64 bits for any 32 bit tick count.
    pub mult: u32,
    /// Right shift applied after the multiplication.
    pub shift: u32,
    /// Smallest delta accepted by [`set_next_event`](crate::ClockEvent::set_next_event).
    pub min_delta_ticks: u32,
    /// Largest delta accepted by [`set_next_event`](crate::ClockEvent::set_next_event).
    pub max_delta_ticks: u32,
    /// The counter frequency the parameters were derived from.
    pub freq: u32,
}

/// Derive the conversion parameters for a counter running at `freq` Hz with the default delta bounds.
pub fn derive_params(freq: u32) -> Result<ConversionParams> {
    ConversionParams::with_bounds(freq, DEFAULT_MIN_DELTA_TICKS, DEFAULT_MAX_DELTA_TICKS)
}

impl ConversionParams {
    /// Derive the conversion parameters for a counter running at `freq` Hz.
    ///
    /// The delta range must satisfy `1 <= min_delta_ticks <= max_delta_ticks`.
    pub fn with_bounds(freq: u32, min_delta_ticks: u32, max_delta_ticks: u32) -> Result<Self> {
        if freq == 0 {
            return Err(Error::ZeroFrequency);
        }
        // A zero reload never raises an update, and an empty range cannot be clamped into.
        if min_delta_ticks == 0 || min_delta_ticks > max_delta_ticks {
            return Err(Error::InvalidDeltaBounds {
                min: min_delta_ticks,
                max: max_delta_ticks,
            });
        }

        // The longest interval a full 32 bit counter period can cover.
        let maxsec = u32::MAX / freq;
        let (mult, shift) = calc_mult_shift(freq, NSEC_PER_SEC as u32, maxsec);

        Ok(Self {
            mult,
            shift,
            min_delta_ticks,
            max_delta_ticks,
            freq,
        })
    }

    /// Convert a tick delta to nanoseconds.
    ///
    /// Exact to within one tick for deltas inside `[min_delta_ticks, max_delta_ticks]`.
    #[inline]
    pub fn ticks_to_ns(&self, ticks: u32) -> u64 {
        (ticks as u64 * self.mult as u64) >> self.shift
    }

    /// Convert nanoseconds to ticks, rounding up so that an event never fires early.
    pub fn ns_to_ticks(&self, ns: u64) -> u64 {
        let scaled = (ns as u128) << self.shift;
        let mult = self.mult as u128;
        let ticks = (scaled + mult - 1) / mult;
        if ticks > u64::MAX as u128 {
            u64::MAX
        } else {
            ticks as u64
        }
    }

    /// Clamp a tick count into the programmable range.
    #[inline]
    pub fn clamp_ticks(&self, ticks: u64) -> u32 {
        ticks.clamp(self.min_delta_ticks as u64, self.max_delta_ticks as u64) as u32
    }

    pub fn max_delta_ns(&self) -> u64 {
        self.ticks_to_ns(self.max_delta_ticks)
    }

    pub fn min_delta_ns(&self) -> u64 {
        self.ticks_to_ns(self.min_delta_ticks)
    }
}

/// Find the multiplier/shift pair converting `from` Hz to `to` Hz.
///
/// The shift is as large as possible while `maxsec * from * mult` still fits 64 bits.
fn calc_mult_shift(from: u32, to: u32, maxsec: u32) -> (u32, u32) {
    let mut tmp = (maxsec as u64 * from as u64) >> 32;
    let mut sftacc = 32;
    while tmp != 0 {
        tmp >>= 1;
        sftacc -= 1;
    }

    let mut sft = 32;
    let mut mult = 0;
    while sft > 0 {
        // Round to nearest.
        mult = ((to as u64) << sft) + from as u64 / 2;
        mult /= from as u64;
        if mult >> sftacc == 0 {
            break;
        }
        sft -= 1;
    }

    (mult as u32, sft)
}
