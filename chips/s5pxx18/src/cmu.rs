// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Bus clock generator (`CMU`) register block.
//!
//! Every bus clock node owns one clock generator block. Control register 0 of
//! a block holds the source select and the first divider stage, control
//! register 1 holds the second stage for nodes that have one. Dividers are
//! stored as `divider - 1`.
//!
//! On top of the per-node enables, each bus domain is gated by one bit in a
//! pair of 32-bit gate clusters shared by all nodes. Gate bit `n` lives in
//! cluster `n / 32` at position `n % 32`.

use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadWrite};
use kernel::utilities::StaticRef;

register_structs! {
    pub ClkGenRegisters {
        (0x00 => clkenb: ReadWrite<u32, CLKENB::Register>),
        (0x04 => clkgen: [ReadWrite<u32, CLKGEN::Register>; 4]),
        (0x14 => @END),
    },
    pub CmuRegisters {
        /// Domain gate clusters
        (0x000 => gate: [ReadWrite<u32>; 2]),
        (0x008 => _reserved0),
        (0x010 => clkgen: [ClkGenRegisters; 19]),
        (0x18C => @END),
    }
}

register_bitfields![u32,
    pub CLKENB [
        BCLKMODE OFFSET(0) NUMBITS(2) [
            Disable = 0,
            Dynamic = 2,
            Always = 3
        ],
        CLKGENENB OFFSET(2) NUMBITS(1) [],
        PCLKMODE OFFSET(3) NUMBITS(1) []
    ],
    pub CLKGEN [
        OUTCLKINV OFFSET(1) NUMBITS(1) [],
        CLKSRCSEL OFFSET(2) NUMBITS(3) [],
        CLKDIV OFFSET(5) NUMBITS(8) []
    ]
];

/// Number of clock generator blocks, one per bus clock node.
pub const NUM_CLKGEN_BLOCKS: usize = 19;

/// Number of bits in the domain gate clusters.
pub const NUM_GATE_BITS: u8 = 64;

pub const CMU_BASE: StaticRef<CmuRegisters> =
    unsafe { StaticRef::new(0xC00B_A000 as *const CmuRegisters) };

/// Which clock outputs of a generator block a node drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gates {
    pub bus: bool,
    pub peripheral: bool,
}

/// Bus clock generator.
///
/// Callers serialize access per block. The gate clusters are shared between
/// blocks and need a lock of their own.
#[derive(Clone, Copy)]
pub struct Cmu {
    registers: StaticRef<CmuRegisters>,
}

impl Cmu {
    pub const fn new() -> Self {
        Self::with_base(CMU_BASE)
    }

    pub const fn with_base(registers: StaticRef<CmuRegisters>) -> Self {
        Self { registers }
    }

    fn control(&self, block: usize, reg: usize) -> &ReadWrite<u32, CLKGEN::Register> {
        &self.registers.clkgen[block].clkgen[reg]
    }

    pub fn select_source(&self, block: usize, reg: usize, source: u8) {
        self.control(block, reg)
            .modify(CLKGEN::CLKSRCSEL.val(source as u32));
    }

    pub fn source(&self, block: usize, reg: usize) -> u8 {
        self.control(block, reg).read(CLKGEN::CLKSRCSEL) as u8
    }

    /// Program a divider in `1..=256`.
    pub fn set_divider(&self, block: usize, reg: usize, divider: u16) {
        let field = divider.clamp(1, 256) - 1;
        self.control(block, reg)
            .modify(CLKGEN::CLKDIV.val(field as u32));
    }

    pub fn divider(&self, block: usize, reg: usize) -> u16 {
        self.control(block, reg).read(CLKGEN::CLKDIV) as u16 + 1
    }

    pub fn set_domain_gate(&self, bit: u8, open: bool) {
        let cluster = &self.registers.gate[(bit / 32) as usize];
        let mask = 1u32 << (bit % 32);
        let value = cluster.get();
        cluster.set(if open { value | mask } else { value & !mask });
    }

    pub fn domain_gate(&self, bit: u8) -> bool {
        let cluster = &self.registers.gate[(bit / 32) as usize];
        cluster.get() & (1u32 << (bit % 32)) != 0
    }

    pub fn enable_generator(&self, block: usize, gates: Gates) {
        let clkenb = &self.registers.clkgen[block].clkenb;
        clkenb.modify(CLKENB::CLKGENENB::SET);
        if gates.bus {
            clkenb.modify(CLKENB::BCLKMODE::Always);
        }
        if gates.peripheral {
            clkenb.modify(CLKENB::PCLKMODE::SET);
        }
    }

    pub fn disable_generator(&self, block: usize, gates: Gates) {
        let clkenb = &self.registers.clkgen[block].clkenb;
        if gates.peripheral {
            clkenb.modify(CLKENB::PCLKMODE::CLEAR);
        }
        if gates.bus {
            clkenb.modify(CLKENB::BCLKMODE::Disable);
        }
        clkenb.modify(CLKENB::CLKGENENB::CLEAR);
    }

    pub fn generator_enabled(&self, block: usize) -> bool {
        self.registers.clkgen[block]
            .clkenb
            .is_set(CLKENB::CLKGENENB)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::boxed::Box;

    use super::*;

    /// A zeroed register block in RAM standing in for the MMIO region.
    pub(crate) fn ram_cmu() -> Cmu {
        let block: &'static CmuRegisters =
            Box::leak(Box::new(unsafe { core::mem::zeroed::<CmuRegisters>() }));
        Cmu::with_base(unsafe { StaticRef::new(block as *const CmuRegisters) })
    }

    #[test]
    fn register_layout_matches_generator() {
        assert_eq!(core::mem::size_of::<ClkGenRegisters>(), 0x14);
        assert_eq!(core::mem::size_of::<CmuRegisters>(), 0x18C);
    }

    #[test]
    fn divider_is_stored_minus_one() {
        let cmu = ram_cmu();
        cmu.set_divider(4, 0, 6);
        cmu.select_source(4, 0, 2);
        assert_eq!(cmu.registers.clkgen[4].clkgen[0].read(CLKGEN::CLKDIV), 5);
        assert_eq!(cmu.divider(4, 0), 6);
        assert_eq!(cmu.source(4, 0), 2);

        cmu.set_divider(4, 1, 0);
        assert_eq!(cmu.divider(4, 1), 1);
        cmu.set_divider(4, 1, 256);
        assert_eq!(cmu.divider(4, 1), 256);
        // Second stage does not disturb the first.
        assert_eq!(cmu.divider(4, 0), 6);
    }

    #[test]
    fn gate_bits_split_across_clusters() {
        let cmu = ram_cmu();
        cmu.set_domain_gate(8, true);
        cmu.set_domain_gate(40, true);
        assert_eq!(cmu.registers.gate[0].get(), 1 << 8);
        assert_eq!(cmu.registers.gate[1].get(), 1 << 8);
        assert!(cmu.domain_gate(40));
        assert!(!cmu.domain_gate(41));

        cmu.set_domain_gate(8, false);
        assert_eq!(cmu.registers.gate[0].get(), 0);
        assert!(cmu.domain_gate(40));
    }

    #[test]
    fn generator_gates_follow_node_kind() {
        let cmu = ram_cmu();
        let both = Gates {
            bus: true,
            peripheral: true,
        };
        cmu.enable_generator(18, both);
        assert!(cmu.generator_enabled(18));
        assert_eq!(
            cmu.registers.clkgen[18].clkenb.read(CLKENB::BCLKMODE),
            3
        );
        assert!(cmu.registers.clkgen[18].clkenb.is_set(CLKENB::PCLKMODE));

        cmu.disable_generator(18, both);
        assert!(!cmu.generator_enabled(18));
        assert_eq!(cmu.registers.clkgen[18].clkenb.get(), 0);
    }
}
