use core::fmt;

/// Result type for clock event operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned while bringing up or wiring the clock event device.
///
/// Register accesses themselves cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The counted clock frequency is zero.
    ZeroFrequency,
    /// The prescaler does not fit the 16 bit PSC register.
    PrescalerTooLarge(u32),
    /// The delta range is empty, starts at zero or exceeds the counter.
    InvalidDeltaBounds { min: u32, max: u32 },
    /// An event handler is already registered.
    HandlerAlreadyRegistered,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ZeroFrequency => write!(f, "timer input frequency is zero"),
            Error::PrescalerTooLarge(psc) => write!(f, "prescaler {} exceeds 16 bits", psc),
            Error::InvalidDeltaBounds { min, max } => {
                write!(f, "invalid delta bounds {}..={} ticks", min, max)
            }
            Error::HandlerAlreadyRegistered => write!(f, "event handler already registered"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
