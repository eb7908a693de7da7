// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Static topology of the AXI/AHB/APB bus clocks.
//!
//! Each sub-bus (sys, tbus, lbus, bbus, isp, hdmi, wave, disp) is one small
//! tree. Its root node picks a PLL or the oscillator through a five-input mux
//! and divides it down. Child nodes divide their parent's output. The roots
//! of every sub-bus other than sys hang off `SysAxi` for gating purposes,
//! since nothing on a sub-bus can run with the backbone stopped.
//!
//! Parents always come before their children in [`BUS_CLOCKS`], so walking
//! the table front to back visits the tree top-down.

use kernel::ErrorCode;

use crate::clocks::pll::Pll;
use crate::cmu::Gates;

/// Bus clock identifiers. The discriminant indexes [`BUS_CLOCKS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusClock {
    SysAxi = 0,
    SysAhb = 1,
    SysApb = 2,
    TbusAxi = 3,
    TbusAhb = 4,
    TbusApb = 5,
    LbusAxi = 6,
    LbusAhb = 7,
    LbusApb = 8,
    BbusAxi = 9,
    BbusApb = 10,
    IspAxi = 11,
    IspApb = 12,
    HdmiAhb = 13,
    HdmiApb = 14,
    WaveAxi = 15,
    WaveApb = 16,
    DispAxi = 17,
    DispApb = 18,
}

pub const NUM_BUS_CLOCKS: usize = 19;

impl BusClock {
    pub fn descriptor(self) -> &'static BusClockDescriptor {
        &BUS_CLOCKS[self as usize]
    }
}

impl TryFrom<usize> for BusClock {
    type Error = ErrorCode;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        BUS_CLOCKS
            .get(index)
            .map(|node| node.id)
            .ok_or(ErrorCode::NODEVICE)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubBus {
    Sys,
    Tbus,
    Lbus,
    Bbus,
    Isp,
    Hdmi,
    Wave,
    Disp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusKind {
    AxiRoot,
    AhbRoot,
    ApbRoot,
    AxiChild,
    AhbChild,
    ApbChild,
}

impl BusKind {
    pub fn is_root(self) -> bool {
        matches!(self, BusKind::AxiRoot | BusKind::AhbRoot | BusKind::ApbRoot)
    }
}

/// One input of a root node's source mux.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MuxInput {
    Oscillator,
    Pll(Pll),
}

/// Mux position of the oscillator on every root node.
pub const OSCILLATOR_MUX_INDEX: u8 = 4;

const FULL_MUX: [Option<MuxInput>; 5] = [
    Some(MuxInput::Pll(Pll::Pll0)),
    Some(MuxInput::Pll(Pll::Pll1)),
    Some(MuxInput::Pll(Pll::Pll2)),
    Some(MuxInput::Pll(Pll::Pll3)),
    Some(MuxInput::Oscillator),
];

// PLL3 is reserved for the display on tbus.
const TBUS_MUX: [Option<MuxInput>; 5] = [
    Some(MuxInput::Pll(Pll::Pll0)),
    Some(MuxInput::Pll(Pll::Pll1)),
    Some(MuxInput::Pll(Pll::Pll2)),
    None,
    Some(MuxInput::Oscillator),
];

const HDMI_MUX: [Option<MuxInput>; 5] = [
    Some(MuxInput::Pll(Pll::Pll0)),
    None,
    Some(MuxInput::Pll(Pll::Pll2)),
    None,
    Some(MuxInput::Oscillator),
];

/// Fixed description of one bus clock node.
#[derive(Debug)]
pub struct BusClockDescriptor {
    pub id: BusClock,
    pub name: &'static str,
    pub domain: SubBus,
    pub kind: BusKind,
    pub parent: Option<BusClock>,
    /// Mux inputs by position. Empty for child nodes, `None` marks a reserved
    /// position.
    pub sources: &'static [Option<MuxInput>],
    /// Mux position to use instead of searching the inputs.
    pub fixed_source: Option<u8>,
    /// Number of chained divider stages, 1 or 2.
    pub steps: u8,
    /// Dividers other than 1 must be a multiple of this.
    pub align: u8,
    /// Clock generator block.
    pub block: usize,
    /// Control register in `block` holding the first divider stage. A second
    /// stage sits in the register after it.
    pub divider_reg: usize,
    /// Domain gate bit.
    pub enable_bit: u8,
    pub gates: Gates,
}

const BUS: Gates = Gates {
    bus: true,
    peripheral: false,
};

const PERIPHERAL: Gates = Gates {
    bus: false,
    peripheral: true,
};

const fn root(
    id: BusClock,
    name: &'static str,
    domain: SubBus,
    kind: BusKind,
    parent: Option<BusClock>,
    sources: &'static [Option<MuxInput>],
    enable_bit: u8,
) -> BusClockDescriptor {
    BusClockDescriptor {
        id,
        name,
        domain,
        kind,
        parent,
        sources,
        fixed_source: None,
        steps: 1,
        align: 2,
        block: id as usize,
        divider_reg: 0,
        enable_bit,
        gates: BUS,
    }
}

const fn child(
    id: BusClock,
    name: &'static str,
    domain: SubBus,
    kind: BusKind,
    parent: BusClock,
    enable_bit: u8,
) -> BusClockDescriptor {
    BusClockDescriptor {
        id,
        name,
        domain,
        kind,
        parent: Some(parent),
        sources: &[],
        fixed_source: None,
        steps: 1,
        align: 1,
        block: id as usize,
        divider_reg: 0,
        enable_bit,
        gates: BUS,
    }
}

use self::BusClock as B;
use self::BusKind as K;

pub static BUS_CLOCKS: [BusClockDescriptor; NUM_BUS_CLOCKS] = [
    root(B::SysAxi, "sys-axi", SubBus::Sys, K::AxiRoot, None, &FULL_MUX, 0),
    child(B::SysAhb, "sys-ahb", SubBus::Sys, K::AhbChild, B::SysAxi, 1),
    child(B::SysApb, "sys-apb", SubBus::Sys, K::ApbChild, B::SysAhb, 2),
    root(B::TbusAxi, "tbus-axi", SubBus::Tbus, K::AxiRoot, Some(B::SysAxi), &TBUS_MUX, 8),
    child(B::TbusAhb, "tbus-ahb", SubBus::Tbus, K::AhbChild, B::TbusAxi, 9),
    child(B::TbusApb, "tbus-apb", SubBus::Tbus, K::ApbChild, B::TbusAhb, 10),
    root(B::LbusAxi, "lbus-axi", SubBus::Lbus, K::AxiRoot, Some(B::SysAxi), &FULL_MUX, 16),
    child(B::LbusAhb, "lbus-ahb", SubBus::Lbus, K::AhbChild, B::LbusAxi, 17),
    child(B::LbusApb, "lbus-apb", SubBus::Lbus, K::ApbChild, B::LbusAhb, 18),
    root(B::BbusAxi, "bbus-axi", SubBus::Bbus, K::AxiRoot, Some(B::SysAxi), &FULL_MUX, 24),
    child(B::BbusApb, "bbus-apb", SubBus::Bbus, K::ApbChild, B::BbusAxi, 25),
    BusClockDescriptor {
        // The ISP only runs from PLL1.
        fixed_source: Some(1),
        ..root(B::IspAxi, "isp-axi", SubBus::Isp, K::AxiRoot, Some(B::SysAxi), &FULL_MUX, 32)
    },
    child(B::IspApb, "isp-apb", SubBus::Isp, K::ApbChild, B::IspAxi, 33),
    root(B::HdmiAhb, "hdmi-ahb", SubBus::Hdmi, K::AhbRoot, Some(B::SysAxi), &HDMI_MUX, 40),
    child(B::HdmiApb, "hdmi-apb", SubBus::Hdmi, K::ApbChild, B::HdmiAhb, 41),
    BusClockDescriptor {
        steps: 2,
        ..root(B::WaveAxi, "wave-axi", SubBus::Wave, K::AxiRoot, Some(B::SysAxi), &FULL_MUX, 48)
    },
    child(B::WaveApb, "wave-apb", SubBus::Wave, K::ApbChild, B::WaveAxi, 49),
    root(B::DispAxi, "disp-axi", SubBus::Disp, K::AxiRoot, Some(B::SysAxi), &FULL_MUX, 56),
    BusClockDescriptor {
        fixed_source: Some(OSCILLATOR_MUX_INDEX),
        gates: PERIPHERAL,
        align: 1,
        ..root(B::DispApb, "disp-apb", SubBus::Disp, K::ApbRoot, None, &FULL_MUX, 57)
    },
];
