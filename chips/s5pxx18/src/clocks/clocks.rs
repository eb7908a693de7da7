// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock tree of the S5Pxx18 family.
//!
//! [`Clocks`] owns the four PLLs and the nineteen bus clock nodes and routes
//! every request to one of two paths:
//!
//! + PLL nodes pick the nearest entry of their PMS table and go through the
//!   [`PllSequencer`] handshake.
//! + Bus nodes divide a source rate with [`divide`]. Root nodes search their
//!   mux inputs for the best source, child nodes divide whatever their parent
//!   currently runs at.
//!
//! The chosen source and dividers of a bus node are latched and written again
//! every time the node is enabled.
//!
//! # Usage
//!
//! ```rust,ignore
//! let clocks = static_init!(
//!     Clocks<'static, CortexA53>,
//!     Clocks::new(clkpwr, Cmu::new(), chip, 24_000_000)
//! );
//! clocks.apply_boot_rates(&[
//!     (ClockId::Pll(Pll::Pll0), 800_000_000),
//!     (ClockId::Bus(BusClock::SysAxi), 400_000_000),
//!     (ClockId::Bus(BusClock::SysApb), 100_000_000),
//! ])?;
//!
//! let uart_clock = PeripheralClock::new(clocks, BusClock::DispApb);
//! uart_clock.enable();
//! ```

use kernel::debug;
use kernel::hil::clock::ClockTree;
use kernel::platform::chip::{ClockInterface, InterruptControl};
use kernel::ErrorCode;
use spin::Mutex;

use crate::clkpwr::ClkPwrAccess;
use crate::clocks::divider::divide;
use crate::clocks::pll::{recalc_pll_rate, Pll, PllNode, PllSequencer};
use crate::clocks::tree::{BusClock, BusClockDescriptor, MuxInput, BUS_CLOCKS, NUM_BUS_CLOCKS};
use crate::cmu::Cmu;
use crate::config::CONFIG;

/// Any clock of the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockId {
    Pll(Pll),
    Bus(BusClock),
}

/// Source and divider choice for a bus node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Selection {
    source: u8,
    dividers: [u16; 2],
    rate: u32,
}

struct BusClockState {
    current_rate: u32,
    enabled: bool,
    latched: Option<Selection>,
}

impl BusClockState {
    const fn new() -> Self {
        Self {
            current_rate: 0,
            enabled: false,
            latched: None,
        }
    }
}

pub struct Clocks<'a, I: InterruptControl> {
    clkpwr: &'a dyn ClkPwrAccess,
    cmu: Cmu,
    irq: &'a I,
    oscillator_hz: u32,
    plls: [PllNode; 4],
    bus: [Mutex<BusClockState>; NUM_BUS_CLOCKS],
    /// Guards the domain gate clusters shared by all bus nodes.
    gate_lock: Mutex<()>,
    sequencer: PllSequencer,
}

impl<'a, I: InterruptControl> Clocks<'a, I> {
    pub fn new(clkpwr: &'a dyn ClkPwrAccess, cmu: Cmu, irq: &'a I, oscillator_hz: u32) -> Self {
        Self {
            clkpwr,
            cmu,
            irq,
            oscillator_hz,
            plls: Pll::ALL.map(PllNode::new),
            bus: core::array::from_fn(|_| Mutex::new(BusClockState::new())),
            gate_lock: Mutex::new(()),
            sequencer: PllSequencer::new(),
        }
    }

    /// Program the rates a board wants at boot.
    ///
    /// PLLs are programmed first, then bus nodes from the backbone down, so
    /// every child divides the final rate of its parent no matter how `rates`
    /// is ordered. Stops at the first clock whose hardware did not respond.
    pub fn apply_boot_rates(&self, rates: &[(ClockId, u32)]) -> Result<(), ErrorCode> {
        for &(id, hz) in rates.iter() {
            if let ClockId::Pll(_) = id {
                self.set_rate(id, hz)?;
            }
        }
        for node in BUS_CLOCKS.iter() {
            for &(id, hz) in rates.iter() {
                if id == ClockId::Bus(node.id) {
                    self.set_rate(id, hz)?;
                }
            }
        }
        debug!("s5pxx18: {} boot clock rates applied", rates.len());
        Ok(())
    }

    /// Round a rate for a PLL named by its raw index.
    ///
    /// Frequency-scaling tables name PLLs by number. Indices this SoC does not
    /// have are logged and yield 0.
    pub fn pll_round_rate(&self, index: usize, hz: u32) -> u32 {
        match Pll::try_from(index) {
            Ok(pll) => self.plls[pll as usize].round_rate(hz),
            Err(_) => {
                debug!("s5pxx18: pll{} not present, cannot round {} Hz", index, hz);
                0
            }
        }
    }

    /// Set a rate for a PLL named by its raw index. Indices this SoC does not
    /// have are logged and yield 0.
    pub fn pll_set_rate(&self, index: usize, hz: u32) -> Result<u32, ErrorCode> {
        match Pll::try_from(index) {
            Ok(pll) => self.set_pll_rate(pll, hz),
            Err(_) => {
                debug!("s5pxx18: pll{} not present, cannot set {} Hz", index, hz);
                Ok(0)
            }
        }
    }

    /// The rate last committed to a bus node, 0 before the first `set_rate`.
    pub fn bus_rate(&self, clock: BusClock) -> u32 {
        self.bus[clock as usize].lock().current_rate
    }

    pub fn is_bus_enabled(&self, clock: BusClock) -> bool {
        self.bus[clock as usize].lock().enabled
    }

    fn set_pll_rate(&self, pll: Pll, hz: u32) -> Result<u32, ErrorCode> {
        let entry = self
            .sequencer
            .program(self.clkpwr, self.irq, &self.plls[pll as usize], hz)?;
        let achieved = entry.rate_khz * 1000;
        if CONFIG.trace_rate_changes {
            debug!(
                "s5pxx18: {} -> {} Hz (P {} M {} S {} K {})",
                pll.name(),
                achieved,
                entry.p,
                entry.m,
                entry.s,
                entry.k.unwrap_or(0)
            );
        }
        Ok(achieved)
    }

    fn mux_input_rate(&self, input: MuxInput) -> u32 {
        match input {
            MuxInput::Oscillator => self.oscillator_hz,
            MuxInput::Pll(pll) => recalc_pll_rate(self.clkpwr, pll, self.oscillator_hz),
        }
    }

    fn divide_stages(
        node: &BusClockDescriptor,
        source: u8,
        source_hz: u32,
        request_hz: u32,
    ) -> Selection {
        let (first, mut rate) = divide(source_hz, request_hz, node.align);
        let mut dividers = [first, 1];
        if node.steps == 2 {
            let (second, hz) = divide(rate, request_hz, node.align);
            dividers[1] = second;
            rate = hz;
        }
        Selection {
            source,
            dividers,
            rate,
        }
    }

    /// Work out the best selection for `request_hz` without touching the
    /// hardware. `None` when no input currently produces a clock.
    fn bus_round(&self, clock: BusClock, request_hz: u32) -> Option<Selection> {
        let node = clock.descriptor();

        if !node.kind.is_root() {
            let parent_hz = node.parent.map_or(0, |parent| self.bus_recalc(parent));
            if parent_hz == 0 {
                debug!("s5pxx18: {} parent is not running", node.name);
                return None;
            }
            return Some(Self::divide_stages(node, 0, parent_hz, request_hz));
        }

        let mut best: Option<Selection> = None;
        for (index, input) in node.sources.iter().enumerate() {
            if let Some(fixed) = node.fixed_source {
                if fixed as usize != index {
                    continue;
                }
            }
            let input = match input {
                Some(input) => *input,
                None => continue,
            };
            let source_hz = self.mux_input_rate(input);
            if source_hz == 0 {
                continue;
            }

            let candidate = Self::divide_stages(node, index as u8, source_hz, request_hz);
            let better = match best {
                Some(best) => request_hz.abs_diff(candidate.rate) < request_hz.abs_diff(best.rate),
                None => true,
            };
            if better {
                best = Some(candidate);
            }
        }

        if best.is_none() {
            debug!("s5pxx18: {} has no running source for {} Hz", node.name, request_hz);
        }
        best
    }

    fn bus_recalc(&self, clock: BusClock) -> u32 {
        let node = clock.descriptor();
        let source_hz = if node.kind.is_root() {
            let index = self.cmu.source(node.block, node.divider_reg) as usize;
            match node.sources.get(index).copied().flatten() {
                Some(input) => self.mux_input_rate(input),
                None => 0,
            }
        } else {
            node.parent.map_or(0, |parent| self.bus_recalc(parent))
        };

        let mut hz = source_hz / self.cmu.divider(node.block, node.divider_reg) as u32;
        if node.steps == 2 {
            hz /= self.cmu.divider(node.block, node.divider_reg + 1) as u32;
        }
        hz
    }

    fn program_selection(&self, node: &BusClockDescriptor, selection: &Selection) {
        if node.kind.is_root() {
            self.cmu
                .select_source(node.block, node.divider_reg, selection.source);
        }
        self.cmu
            .set_divider(node.block, node.divider_reg, selection.dividers[0]);
        if node.steps == 2 {
            self.cmu
                .set_divider(node.block, node.divider_reg + 1, selection.dividers[1]);
        }
    }

    fn bus_set_rate(&self, clock: BusClock, hz: u32) -> u32 {
        let node = clock.descriptor();
        let mut state = self.bus[clock as usize].lock();
        let selection = match self.bus_round(clock, hz) {
            Some(selection) => selection,
            None => return 0,
        };

        self.program_selection(node, &selection);
        state.latched = Some(selection);
        state.current_rate = selection.rate;

        if CONFIG.trace_rate_changes {
            debug!(
                "s5pxx18: {} -> {} Hz (source {} div {}/{})",
                node.name,
                selection.rate,
                selection.source,
                selection.dividers[0],
                selection.dividers[1]
            );
        }
        selection.rate
    }

    fn bus_enable(&self, clock: BusClock) {
        let node = clock.descriptor();
        if let Some(parent) = node.parent {
            let parent_enabled = self.is_bus_enabled(parent);
            if !parent_enabled {
                self.bus_enable(parent);
            }
        }

        let mut state = self.bus[clock as usize].lock();
        if let Some(selection) = state.latched {
            self.program_selection(node, &selection);
        }
        {
            let _gates = self.gate_lock.lock();
            self.cmu.set_domain_gate(node.enable_bit, true);
        }
        self.cmu.enable_generator(node.block, node.gates);
        state.enabled = true;
    }

    fn bus_disable(&self, clock: BusClock) {
        let node = clock.descriptor();
        let mut state = self.bus[clock as usize].lock();
        self.cmu.disable_generator(node.block, node.gates);
        {
            let _gates = self.gate_lock.lock();
            self.cmu.set_domain_gate(node.enable_bit, false);
        }
        state.enabled = false;
    }
}

impl<I: InterruptControl> ClockTree for Clocks<'_, I> {
    type ClockId = ClockId;

    fn round_rate(&self, id: ClockId, hz: u32) -> u32 {
        match id {
            ClockId::Pll(pll) => self.plls[pll as usize].round_rate(hz),
            ClockId::Bus(clock) => self.bus_round(clock, hz).map_or(0, |s| s.rate),
        }
    }

    fn set_rate(&self, id: ClockId, hz: u32) -> Result<u32, ErrorCode> {
        match id {
            ClockId::Pll(pll) => self.set_pll_rate(pll, hz),
            ClockId::Bus(clock) => Ok(self.bus_set_rate(clock, hz)),
        }
    }

    fn enable(&self, id: ClockId) -> Result<(), ErrorCode> {
        match id {
            // PLLs run from reset until reprogrammed.
            ClockId::Pll(_) => Ok(()),
            ClockId::Bus(clock) => {
                self.bus_enable(clock);
                Ok(())
            }
        }
    }

    fn disable(&self, id: ClockId) -> Result<(), ErrorCode> {
        match id {
            // A PLL may be feeding the bus the CPU runs from.
            ClockId::Pll(_) => Err(ErrorCode::NOSUPPORT),
            ClockId::Bus(clock) => {
                self.bus_disable(clock);
                Ok(())
            }
        }
    }

    fn recalc_rate(&self, id: ClockId) -> u32 {
        match id {
            ClockId::Pll(pll) => recalc_pll_rate(self.clkpwr, pll, self.oscillator_hz),
            ClockId::Bus(clock) => self.bus_recalc(clock),
        }
    }
}

/// Gate handle for the bus clock of one peripheral.
pub struct PeripheralClock<'a, I: InterruptControl> {
    clocks: &'a Clocks<'a, I>,
    clock: BusClock,
}

impl<'a, I: InterruptControl> PeripheralClock<'a, I> {
    pub const fn new(clocks: &'a Clocks<'a, I>, clock: BusClock) -> Self {
        Self { clocks, clock }
    }

    /// Rate the clock was last set to.
    pub fn frequency(&self) -> u32 {
        self.clocks.bus_rate(self.clock)
    }
}

impl<I: InterruptControl> ClockInterface for PeripheralClock<'_, I> {
    fn is_enabled(&self) -> bool {
        self.clocks.is_bus_enabled(self.clock)
    }

    fn enable(&self) {
        self.clocks.bus_enable(self.clock);
    }

    fn disable(&self) {
        self.clocks.bus_disable(self.clock);
    }
}
