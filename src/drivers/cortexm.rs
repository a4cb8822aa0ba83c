use core::{
    arch::asm,
    sync::atomic::{compiler_fence, Ordering},
};

/// Critical section that masks all interrupts through PRIMASK.
struct PrimaskCriticalSection;

critical_section::set_impl!(PrimaskCriticalSection);

unsafe impl critical_section::Impl for PrimaskCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let primask: u32;
        asm!("mrs {}, PRIMASK", out(reg) primask);

        // Interrupts may already be disabled if this is a nested critical section.
        asm!("cpsid i");
        compiler_fence(Ordering::SeqCst);

        primask & 1 == 0
    }

    unsafe fn release(was_active: critical_section::RawRestoreState) {
        // Only enable interrupts if they were active when entering.
        if was_active {
            compiler_fence(Ordering::SeqCst);
            asm!("cpsie i");
        }
    }
}
