/// Field level access to the registers of exactly one general purpose timer.
///
/// Every method is a single side-effecting register access. Implementations
/// must not reorder accesses relative to each other, must not retry, and must
/// not put any policy in here; that lives in [`ClockEvent`](crate::ClockEvent).
pub trait TimerRegs: Send + Sync + 'static {
    /// The largest value the counter and auto-reload registers can hold.
    const MAX: u32 = u32::MAX;

    /// Enable the peripheral clock of the timer.
    fn clock_enable(&self);

    /// Pulse the peripheral reset line, restoring all registers to their reset values.
    fn reset(&self);

    /// Overwrite CR1. Zero selects an up-counting, non-buffered, stopped counter.
    fn write_control(&self, cr1: u32);

    /// Set CR1.CEN.
    fn counter_enable(&self);

    /// Clear CR1.CEN.
    fn counter_disable(&self);

    /// Read CR1.CEN.
    fn is_counter_enabled(&self) -> bool;

    /// Set DIER.UIE.
    fn update_int_enable(&self);

    /// Clear DIER.UIE.
    fn update_int_disable(&self);

    /// Read SR.UIF.
    fn is_update_pending(&self) -> bool;

    /// Clear SR.UIF. The status register is rc_w0, so other flags are left untouched.
    fn clear_update_pending(&self);

    /// Read CNT.
    fn counter(&self) -> u32;

    /// Write CNT.
    fn set_counter(&self, cnt: u32);

    /// Write PSC.
    fn set_prescaler(&self, psc: u16);

    /// Read ARR.
    fn auto_reload(&self) -> u32;

    /// Write ARR.
    fn set_auto_reload(&self, arr: u32);

    /// Set EGR.UG, reinitializing the counter and latching the prescaler.
    fn generate_update(&self);
}
