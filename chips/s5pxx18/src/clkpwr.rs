// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PLL controller (`CLKPWR`) register block.
//!
//! All four PLLs share one apply register. A new setting written to
//! `PLLSETREG[n]` only reaches the PLL after bit `n` is written to
//! `CLKMODEREG0`, and the controller keeps `WAIT_UPDATE_PLL` set until the
//! update has propagated.
//!
//! The clock core talks to the block through [`ClkPwrAccess`] so the
//! sequencing logic can run against an instrumented model in tests.

use kernel::hil::time::BusyDelay;
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, LocalRegisterCopy, ReadWrite,
};
use kernel::utilities::StaticRef;

use crate::clocks::pll::Pll;

register_structs! {
    pub ClkPwrRegisters {
        /// PLL apply trigger and status
        (0x000 => clkmodereg0: ReadWrite<u32, CLKMODEREG0::Register>),
        (0x004 => clkmodereg1: ReadWrite<u32>),
        /// P/M/S and power control, one per PLL
        (0x008 => pllsetreg: [ReadWrite<u32, PLLSETREG::Register>; 4]),
        (0x018 => _reserved0),
        /// Spread-spectrum control, one per PLL
        (0x048 => pllsetreg_sscg: [ReadWrite<u32, PLLSETREG_SSCG::Register>; 4]),
        (0x058 => @END),
    }
}

register_bitfields![u32,
    pub CLKMODEREG0 [
        /// Write 1 << n to commit PLLSETREG[n]
        UPDATE_PLL OFFSET(0) NUMBITS(4) [],
        /// Set while an update is propagating
        WAIT_UPDATE_PLL OFFSET(31) NUMBITS(1) []
    ],
    pub PLLSETREG [
        SDIV OFFSET(0) NUMBITS(8) [],
        MDIV OFFSET(8) NUMBITS(10) [],
        PDIV OFFSET(18) NUMBITS(6) [],
        /// 0: output follows the oscillator, 1: output follows the PLL
        BYPASS_OFF OFFSET(28) NUMBITS(1) [],
        /// Power down
        PD OFFSET(29) NUMBITS(1) []
    ],
    pub PLLSETREG_SSCG [
        SSCG_EN OFFSET(0) NUMBITS(1) [],
        /// Fractional part of M in 1/65536 steps
        K OFFSET(16) NUMBITS(16) []
    ]
];

pub type PllSetting = LocalRegisterCopy<u32, PLLSETREG::Register>;
pub type PllSscg = LocalRegisterCopy<u32, PLLSETREG_SSCG::Register>;

pub const CLKPWR_BASE: StaticRef<ClkPwrRegisters> =
    unsafe { StaticRef::new(0xC001_0000 as *const ClkPwrRegisters) };

/// Register-level access to the PLL controller.
pub trait ClkPwrAccess: Sync {
    fn pll_setting(&self, pll: Pll) -> PllSetting;
    fn set_pll_setting(&self, pll: Pll, setting: PllSetting);
    fn pll_sscg(&self, pll: Pll) -> PllSscg;
    fn set_pll_sscg(&self, pll: Pll, sscg: PllSscg);

    /// Commit the pending setting of `pll`.
    fn request_pll_update(&self, pll: Pll);

    /// Whether the last commit is still propagating.
    fn pll_update_pending(&self) -> bool;

    /// Busy-wait at least `us` microseconds.
    fn delay_us(&self, us: u32);
}

/// Memory-mapped PLL controller.
pub struct ClkPwr<'a> {
    registers: StaticRef<ClkPwrRegisters>,
    delay: &'a dyn BusyDelay,
}

impl<'a> ClkPwr<'a> {
    pub const fn new(delay: &'a dyn BusyDelay) -> Self {
        Self::with_base(CLKPWR_BASE, delay)
    }

    /// Use a block mapped somewhere other than the physical base, for example
    /// behind an MMU mapping set up by the board.
    pub const fn with_base(registers: StaticRef<ClkPwrRegisters>, delay: &'a dyn BusyDelay) -> Self {
        Self { registers, delay }
    }
}

impl ClkPwrAccess for ClkPwr<'_> {
    fn pll_setting(&self, pll: Pll) -> PllSetting {
        self.registers.pllsetreg[pll as usize].extract()
    }

    fn set_pll_setting(&self, pll: Pll, setting: PllSetting) {
        self.registers.pllsetreg[pll as usize].set(setting.get());
    }

    fn pll_sscg(&self, pll: Pll) -> PllSscg {
        self.registers.pllsetreg_sscg[pll as usize].extract()
    }

    fn set_pll_sscg(&self, pll: Pll, sscg: PllSscg) {
        self.registers.pllsetreg_sscg[pll as usize].set(sscg.get());
    }

    fn request_pll_update(&self, pll: Pll) {
        self.registers
            .clkmodereg0
            .write(CLKMODEREG0::UPDATE_PLL.val(1 << pll as u32));
    }

    fn pll_update_pending(&self) -> bool {
        self.registers.clkmodereg0.is_set(CLKMODEREG0::WAIT_UPDATE_PLL)
    }

    fn delay_us(&self, us: u32) {
        self.delay.delay_us(us);
    }
}
