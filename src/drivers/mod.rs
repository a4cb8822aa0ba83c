//! Hardware bindings.

#[cfg(feature = "stm32f4")]
mod stm32f4;

#[cfg(all(feature = "stm32f4", not(feature = "std")))]
mod cortexm;

#[cfg(feature = "stm32f4")]
pub use self::stm32f4::*;
