use alloc::sync::Arc;
use drone_core::{fib, thr::prelude::*};
use drone_cortexm::{
    reg::prelude::*,
    thr::{IntToken, ThrNvic},
};
use drone_stm32_map::periph::tim::general::{traits::*, GeneralTimMap, GeneralTimPeriph};

use crate::{ClockEvent, ClockEventConfig, InterruptLine, Result, TimerRegs};

/// Register access for a general purpose timer whose counter tops out at `TOP`.
///
/// The peripheral map does not tell the counter width apart, so it is part of
/// the type: use [`GeneralTim32Regs`] for TIM2/TIM5 and [`GeneralTim16Regs`]
/// for TIM3/TIM4.
pub struct GeneralTimRegs<Tim: GeneralTimMap, const TOP: u32>(GeneralTimPeriph<Tim>);

/// TIM2 or TIM5.
pub type GeneralTim32Regs<Tim> = GeneralTimRegs<Tim, { u32::MAX }>;

/// TIM3 or TIM4.
pub type GeneralTim16Regs<Tim> = GeneralTimRegs<Tim, 0xFFFF>;

// The clock event device is the only owner of the timer registers.
unsafe impl<Tim: GeneralTimMap, const TOP: u32> Sync for GeneralTimRegs<Tim, TOP> {}
unsafe impl<Tim: GeneralTimMap, const TOP: u32> Send for GeneralTimRegs<Tim, TOP> {}

impl<Tim: GeneralTimMap, const TOP: u32> GeneralTimRegs<Tim, TOP> {
    pub fn new(tim: GeneralTimPeriph<Tim>) -> Self {
        Self(tim)
    }
}

impl<Tim: GeneralTimMap, const TOP: u32> TimerRegs for GeneralTimRegs<Tim, TOP> {
    const MAX: u32 = TOP;

    fn clock_enable(&self) {
        self.0.rcc_busenr_timen.set_bit();
    }

    fn reset(&self) {
        self.0.rcc_busrstr_timrst.set_bit();
        self.0.rcc_busrstr_timrst.clear_bit();
    }

    fn write_control(&self, cr1: u32) {
        self.0.tim_cr1.store_bits(cr1);
    }

    fn counter_enable(&self) {
        self.0.tim_cr1.cen().set_bit();
    }

    fn counter_disable(&self) {
        self.0.tim_cr1.cen().clear_bit();
    }

    fn is_counter_enabled(&self) -> bool {
        self.0.tim_cr1.cen().read_bit()
    }

    fn update_int_enable(&self) {
        self.0.tim_dier.modify_reg(|r, v| r.uie().set(v));
    }

    fn update_int_disable(&self) {
        self.0.tim_dier.modify_reg(|r, v| r.uie().clear(v));
    }

    fn is_update_pending(&self) -> bool {
        self.0.tim_sr.uif().read_bit()
    }

    fn clear_update_pending(&self) {
        // rc_w0: Clear flag by writing a 0, 1 has no effect.
        let mut val = unsafe { Tim::STimSr::val_from(u32::MAX) };
        self.0.tim_sr.uif().clear(&mut val);
        self.0.tim_sr.store_val(val);
    }

    fn counter(&self) -> u32 {
        self.0.tim_cnt.load_bits() as u32
    }

    fn set_counter(&self, cnt: u32) {
        self.0.tim_cnt.store_bits(cnt);
    }

    fn set_prescaler(&self, psc: u16) {
        self.0.tim_psc.store_bits(psc as u32);
    }

    fn auto_reload(&self) -> u32 {
        self.0.tim_arr.load_bits() as u32
    }

    fn set_auto_reload(&self, arr: u32) {
        self.0.tim_arr.store_bits(arr);
    }

    fn generate_update(&self) {
        self.0.tim_egr.ug().set_bit();
    }
}

/// A Drone interrupt token as the timer interrupt line.
#[derive(Clone, Copy)]
pub struct IntLine<Int: IntToken>(pub Int);

impl<Int: IntToken> InterruptLine for IntLine<Int> {
    fn number(&self) -> usize {
        Int::INT_NUM
    }

    fn attach<F>(&self, mut handler: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.0.add_fn(move || {
            if handler() {
                fib::Yielded(())
            } else {
                fib::Complete(())
            }
        });
    }

    fn enable(&self) {
        self.0.enable_int();
    }
}

/// Bring up a timer as the system tick clock event device.
///
/// `input_frequency` is the timer kernel clock as configured by the clock
/// tree. The largest delta is fitted to the counter width of `regs`.
pub fn init_tick_timer<Tim: GeneralTimMap, Int: IntToken, const TOP: u32>(
    regs: GeneralTimRegs<Tim, TOP>,
    tim_int: Int,
    input_frequency: u32,
) -> Result<Arc<ClockEvent<GeneralTimRegs<Tim, TOP>>>> {
    ClockEvent::init(
        regs,
        IntLine(tim_int),
        ClockEventConfig::new(input_frequency).with_counter_max(TOP),
    )
}
