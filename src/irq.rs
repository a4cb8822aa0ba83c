/// Outcome of servicing the timer interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IrqReturn {
    /// No update was pending; nothing was done.
    None,
    /// The update flag was cleared and the event delivered.
    Handled,
}

/// An interrupt line of the interrupt controller.
pub trait InterruptLine {
    /// The interrupt number, e.g. 28 for TIM2.
    fn number(&self) -> usize;

    /// Run `handler` on every firing of the line.
    ///
    /// The handler stays attached for as long as it returns `true`.
    fn attach<F>(&self, handler: F)
    where
        F: FnMut() -> bool + Send + 'static;

    /// Unmask the line in the interrupt controller.
    fn enable(&self);
}
