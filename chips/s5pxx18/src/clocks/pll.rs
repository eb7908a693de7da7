// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PLL clock driver for the S5Pxx18 family.
//!
//! The SoC has four PLLs fed by the 24 MHz reference oscillator:
//!
//! + PLL0 and PLL1 are integer PLLs and usually drive the CPU clusters and
//!   the system bus.
//! + PLL2 and PLL3 additionally carry a 16-bit fractional multiplier and a
//!   spread-spectrum modulator. They drive media and audio clocks.
//!
//! # Reprogramming a running PLL
//!
//! A PLL may be feeding the bus the CPU fetches from, so its output must never
//! glitch. [`PllSequencer::program`] therefore walks a fixed handshake:
//!
//! 1. switch the output to the oscillator and wait for the apply,
//! 2. power the PLL down while loading P, M, S (and K), apply,
//! 3. let the power-down settle for 10 µs,
//! 4. power the PLL up, apply,
//! 5. give it [`PLL_LOCKING_TIME_US`] to lock,
//! 6. switch the output back to the PLL, apply.
//!
//! Every apply goes through the shared `CLKMODEREG0`, so only one PLL can be
//! reprogrammed at a time on the whole system. The sequencer holds a global
//! lock with local interrupts masked for the full walk.
//!
//! # Usage
//!
//! ```rust,ignore
//! let achieved = clocks.round_rate(ClockId::Pll(Pll::Pll2), 614_400_000);
//! clocks.set_rate(ClockId::Pll(Pll::Pll2), achieved)?;
//! ```

use kernel::debug;
use kernel::platform::chip::InterruptControl;
use kernel::ErrorCode;
use spin::{Mutex, MutexGuard};

use crate::clkpwr::{ClkPwrAccess, PllSscg, PLLSETREG, PLLSETREG_SSCG};
use crate::clocks::pms::{find_nearest, pll_output_hz, PmsEntry, PmsTable};
use crate::clocks::pms::{DITHERED_PMS, NON_DITHERED_PMS};
use crate::config::CONFIG;

/// Time the PLL needs after power-up before its output is stable.
pub const PLL_LOCKING_TIME_US: u32 = 100;

/// Settling time between loading a new setting and powering up.
pub const PLL_POWER_DOWN_TIME_US: u32 = 10;

/// The PLLs of the SoC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pll {
    Pll0 = 0,
    Pll1 = 1,
    Pll2 = 2,
    Pll3 = 3,
}

impl Pll {
    pub const ALL: [Pll; 4] = [Pll::Pll0, Pll::Pll1, Pll::Pll2, Pll::Pll3];

    pub fn name(self) -> &'static str {
        match self {
            Pll::Pll0 => "pll0",
            Pll::Pll1 => "pll1",
            Pll::Pll2 => "pll2",
            Pll::Pll3 => "pll3",
        }
    }

    /// Whether the PLL has the fractional multiplier and modulator.
    pub fn is_dithered(self) -> bool {
        matches!(self, Pll::Pll2 | Pll::Pll3)
    }

    /// The table of validated settings for this PLL.
    pub fn table(self) -> &'static PmsTable {
        if self.is_dithered() {
            &DITHERED_PMS
        } else {
            &NON_DITHERED_PMS
        }
    }
}

impl TryFrom<usize> for Pll {
    type Error = ErrorCode;

    /// Indices 4 to 7 name PLLs of larger family members that this SoC does
    /// not have.
    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(Pll::Pll0),
            1 => Ok(Pll::Pll1),
            2 => Ok(Pll::Pll2),
            3 => Ok(Pll::Pll3),
            _ => Err(ErrorCode::NOSUPPORT),
        }
    }
}

/// Read the current output of `pll` back from the controller.
///
/// A bypassed PLL passes the oscillator through. A powered-down or
/// unprogrammed one produces nothing.
pub fn recalc_pll_rate(hw: &dyn ClkPwrAccess, pll: Pll, oscillator_hz: u32) -> u32 {
    let setting = hw.pll_setting(pll);
    if !setting.is_set(PLLSETREG::BYPASS_OFF) {
        return oscillator_hz;
    }
    if setting.is_set(PLLSETREG::PD) {
        return 0;
    }

    let k = if pll.is_dithered() {
        let sscg = hw.pll_sscg(pll);
        if sscg.is_set(PLLSETREG_SSCG::SSCG_EN) {
            sscg.read(PLLSETREG_SSCG::K) as u16
        } else {
            0
        }
    } else {
        0
    };

    pll_output_hz(
        oscillator_hz,
        setting.read(PLLSETREG::PDIV) as u8,
        setting.read(PLLSETREG::MDIV) as u16,
        setting.read(PLLSETREG::SDIV) as u8,
        k,
    )
}

/// Per-PLL state kept by the clock core.
pub struct PllNode {
    pll: Pll,
    /// Entry picked by the last `round_rate`, with the request that chose it.
    last_pms: Mutex<Option<(u32, PmsEntry)>>,
}

impl PllNode {
    pub const fn new(pll: Pll) -> Self {
        Self {
            pll,
            last_pms: Mutex::new(None),
        }
    }

    pub fn pll(&self) -> Pll {
        self.pll
    }

    /// Find the nearest table rate to `request_hz` and remember the choice for
    /// the `set_rate` that usually follows.
    ///
    /// The remembered entry is only reused for the same request. A `set_rate`
    /// with a different rate searches the table again.
    pub fn round_rate(&self, request_hz: u32) -> u32 {
        let (entry, khz) = find_nearest(self.pll.table(), request_hz / 1000);
        *self.last_pms.lock() = Some((request_hz, entry));
        khz * 1000
    }

    /// Take the entry for `request_hz`, reusing the cached `round_rate` result
    /// when it was made for the same request.
    fn take_pms(&self, request_hz: u32) -> PmsEntry {
        match self.last_pms.lock().take() {
            Some((cached_hz, entry)) if cached_hz == request_hz => entry,
            _ => find_nearest(self.pll.table(), request_hz / 1000).0,
        }
    }

    #[cfg(test)]
    pub(crate) fn cached(&self) -> Option<(u32, PmsEntry)> {
        *self.last_pms.lock()
    }
}

/// Steps of the reprogramming handshake that end in an apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PllStep {
    BypassToOscillator,
    ProgramAndPowerDown,
    PowerUp,
    BypassOff,
}

/// Serializes PLL reprogramming across all PLLs and cores.
pub struct PllSequencer {
    lock: Mutex<()>,
}

impl PllSequencer {
    pub const fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    /// Reprogram `node` to the setting chosen for `request_hz`.
    ///
    /// Returns the entry that was programmed, or `NOACK` if the controller
    /// never finished an apply. In that case the PLL is left wherever the
    /// handshake stopped, which is on the oscillator for every step but the
    /// last.
    pub fn program<I: InterruptControl>(
        &self,
        hw: &dyn ClkPwrAccess,
        irq: &I,
        node: &PllNode,
        request_hz: u32,
    ) -> Result<PmsEntry, ErrorCode> {
        // SAFETY: the closure only spins on the PLL controller and never waits
        // for an interrupt.
        unsafe {
            irq.atomic(|| -> Result<PmsEntry, ErrorCode> {
                let sequence = PllSequence {
                    _token: self.lock.lock(),
                    hw,
                    pll: node.pll,
                };
                let entry = node.take_pms(request_hz);
                sequence.run(&entry)?;
                Ok(entry)
            })
        }
    }
}

/// One reprogramming walk. Owning the sequencer's guard is what allows the
/// step methods to touch the shared apply register.
struct PllSequence<'a> {
    _token: MutexGuard<'a, ()>,
    hw: &'a dyn ClkPwrAccess,
    pll: Pll,
}

impl PllSequence<'_> {
    fn run(&self, entry: &PmsEntry) -> Result<(), ErrorCode> {
        self.bypass_to_oscillator()?;
        self.program_powered_down(entry)?;
        self.hw.delay_us(PLL_POWER_DOWN_TIME_US);
        self.power_up()?;
        self.hw.delay_us(PLL_LOCKING_TIME_US);
        self.bypass_off()
    }

    fn bypass_to_oscillator(&self) -> Result<(), ErrorCode> {
        let mut setting = self.hw.pll_setting(self.pll);
        setting.modify(PLLSETREG::BYPASS_OFF::CLEAR);
        self.hw.set_pll_setting(self.pll, setting);
        self.apply(PllStep::BypassToOscillator)
    }

    fn program_powered_down(&self, entry: &PmsEntry) -> Result<(), ErrorCode> {
        if self.pll.is_dithered() {
            let mut sscg = PllSscg::new(0);
            match entry.k {
                Some(k) if k != 0 => {
                    sscg.write(PLLSETREG_SSCG::K.val(k as u32) + PLLSETREG_SSCG::SSCG_EN::SET)
                }
                _ => {}
            }
            self.hw.set_pll_sscg(self.pll, sscg);
        }

        let mut setting = self.hw.pll_setting(self.pll);
        setting.modify(
            PLLSETREG::PD::SET
                + PLLSETREG::BYPASS_OFF::CLEAR
                + PLLSETREG::PDIV.val(entry.p as u32)
                + PLLSETREG::MDIV.val(entry.m as u32)
                + PLLSETREG::SDIV.val(entry.s as u32),
        );
        self.hw.set_pll_setting(self.pll, setting);
        self.apply(PllStep::ProgramAndPowerDown)
    }

    fn power_up(&self) -> Result<(), ErrorCode> {
        let mut setting = self.hw.pll_setting(self.pll);
        setting.modify(PLLSETREG::PD::CLEAR);
        self.hw.set_pll_setting(self.pll, setting);
        self.apply(PllStep::PowerUp)
    }

    fn bypass_off(&self) -> Result<(), ErrorCode> {
        let mut setting = self.hw.pll_setting(self.pll);
        setting.modify(PLLSETREG::BYPASS_OFF::SET);
        self.hw.set_pll_setting(self.pll, setting);
        self.apply(PllStep::BypassOff)
    }

    fn apply(&self, step: PllStep) -> Result<(), ErrorCode> {
        self.hw.request_pll_update(self.pll);
        for _ in 0..CONFIG.pll_update_poll_limit {
            if !self.hw.pll_update_pending() {
                return Ok(());
            }
        }
        debug!("{}: apply after {:?} not acknowledged", self.pll.name(), step);
        Err(ErrorCode::NOACK)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex as StdMutex;
    use std::vec::Vec;

    use kernel::platform::chip::NoInterruptControl;

    use super::*;
    use crate::clkpwr::PllSetting;

    /// Register traffic seen by [`FakeClkPwr`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(crate) enum Event {
        Setting(Pll, u32),
        Sscg(Pll, u32),
        Apply(Pll),
        Delay(u32),
    }

    struct FakeState {
        settings: [u32; 4],
        sscg: [u32; 4],
        pending_polls: u32,
        log: Vec<Event>,
    }

    /// PLL controller model that records every write and apply.
    pub(crate) struct FakeClkPwr {
        state: StdMutex<FakeState>,
        stuck: bool,
    }

    impl FakeClkPwr {
        pub(crate) fn new() -> Self {
            Self::with_stuck_apply(false)
        }

        /// The apply status never clears when `stuck` is set.
        pub(crate) fn with_stuck_apply(stuck: bool) -> Self {
            Self {
                state: StdMutex::new(FakeState {
                    settings: [0; 4],
                    sscg: [0; 4],
                    pending_polls: 0,
                    log: Vec::new(),
                }),
                stuck,
            }
        }

        pub(crate) fn log(&self) -> Vec<Event> {
            self.state.lock().unwrap().log.clone()
        }

        pub(crate) fn setting(&self, pll: Pll) -> u32 {
            self.state.lock().unwrap().settings[pll as usize]
        }
    }

    impl ClkPwrAccess for FakeClkPwr {
        fn pll_setting(&self, pll: Pll) -> PllSetting {
            PllSetting::new(self.state.lock().unwrap().settings[pll as usize])
        }

        fn set_pll_setting(&self, pll: Pll, setting: PllSetting) {
            let mut state = self.state.lock().unwrap();
            state.settings[pll as usize] = setting.get();
            state.log.push(Event::Setting(pll, setting.get()));
        }

        fn pll_sscg(&self, pll: Pll) -> PllSscg {
            PllSscg::new(self.state.lock().unwrap().sscg[pll as usize])
        }

        fn set_pll_sscg(&self, pll: Pll, sscg: PllSscg) {
            let mut state = self.state.lock().unwrap();
            state.sscg[pll as usize] = sscg.get();
            state.log.push(Event::Sscg(pll, sscg.get()));
        }

        fn request_pll_update(&self, pll: Pll) {
            let mut state = self.state.lock().unwrap();
            state.pending_polls = 2;
            state.log.push(Event::Apply(pll));
        }

        fn pll_update_pending(&self) -> bool {
            let mut state = self.state.lock().unwrap();
            if self.stuck {
                return true;
            }
            if state.pending_polls > 0 {
                state.pending_polls -= 1;
                true
            } else {
                false
            }
        }

        fn delay_us(&self, us: u32) {
            self.state.lock().unwrap().log.push(Event::Delay(us));
            std::thread::yield_now();
        }
    }

    const REF_HZ: u32 = 24_000_000;

    fn field(value: u32, offset: u32, bits: u32) -> u32 {
        (value >> offset) & ((1 << bits) - 1)
    }

    #[test]
    fn raw_indices_beyond_pll3_are_unsupported() {
        assert_eq!(Pll::try_from(3usize), Ok(Pll::Pll3));
        for index in 4..=7usize {
            assert_eq!(Pll::try_from(index), Err(ErrorCode::NOSUPPORT));
        }
        assert_eq!(Pll::try_from(usize::MAX), Err(ErrorCode::NOSUPPORT));
    }

    #[test]
    fn round_rate_caches_choice_for_request() {
        let node = PllNode::new(Pll::Pll0);
        assert_eq!(node.round_rate(799_000_000), 800_000_000);
        let (request, entry) = node.cached().unwrap();
        assert_eq!(request, 799_000_000);
        assert_eq!((entry.p, entry.m, entry.s), (3, 200, 1));

        // A different request ignores the cache.
        let entry = node.take_pms(1_000_000_000);
        assert_eq!(entry.rate_khz, 1_000_000);
        assert_eq!(node.cached(), None);
    }

    #[test]
    fn handshake_runs_seven_steps_in_order() {
        let hw = FakeClkPwr::new();
        let node = PllNode::new(Pll::Pll1);
        let sequencer = PllSequencer::new();

        node.round_rate(800_000_000);
        let entry = sequencer
            .program(&hw, &NoInterruptControl, &node, 800_000_000)
            .unwrap();
        assert_eq!(entry.rate_khz, 800_000);
        assert_eq!(node.cached(), None);

        let pms = (3 << 18) | (200 << 8) | 1;
        let pd = 1 << 29;
        let bypass_off = 1 << 28;
        assert_eq!(
            hw.log(),
            [
                Event::Setting(Pll::Pll1, 0),
                Event::Apply(Pll::Pll1),
                Event::Setting(Pll::Pll1, pd | pms),
                Event::Apply(Pll::Pll1),
                Event::Delay(PLL_POWER_DOWN_TIME_US),
                Event::Setting(Pll::Pll1, pms),
                Event::Apply(Pll::Pll1),
                Event::Delay(PLL_LOCKING_TIME_US),
                Event::Setting(Pll::Pll1, bypass_off | pms),
                Event::Apply(Pll::Pll1),
            ]
        );
        assert_eq!(recalc_pll_rate(&hw, Pll::Pll1, REF_HZ), 800_000_000);
    }

    #[test]
    fn dithered_pll_loads_fraction() {
        let hw = FakeClkPwr::new();
        let node = PllNode::new(Pll::Pll2);
        let sequencer = PllSequencer::new();

        let entry = sequencer
            .program(&hw, &NoInterruptControl, &node, 614_400_000)
            .unwrap();
        assert_eq!(entry.k, Some(52429));

        let log = hw.log();
        assert_eq!(log[2], Event::Sscg(Pll::Pll2, (52429 << 16) | 1));
        let rate = recalc_pll_rate(&hw, Pll::Pll2, REF_HZ);
        assert!(rate.abs_diff(614_400_000) < 100);

        // Back to an integer rate turns the modulator off.
        sequencer
            .program(&hw, &NoInterruptControl, &node, 600_000_000)
            .unwrap();
        assert!(hw.log().contains(&Event::Sscg(Pll::Pll2, 0)));
        assert_eq!(recalc_pll_rate(&hw, Pll::Pll2, REF_HZ), 600_000_000);
    }

    #[test]
    fn register_fields_decode() {
        let hw = FakeClkPwr::new();
        // Reset state: bypassed, so the oscillator shows through.
        assert_eq!(recalc_pll_rate(&hw, Pll::Pll0, REF_HZ), REF_HZ);

        hw.set_pll_setting(Pll::Pll0, PllSetting::new((1 << 28) | (1 << 29)));
        assert_eq!(recalc_pll_rate(&hw, Pll::Pll0, REF_HZ), 0);

        hw.set_pll_setting(Pll::Pll0, PllSetting::new(1 << 28));
        assert_eq!(recalc_pll_rate(&hw, Pll::Pll0, REF_HZ), 0);

        // K is ignored on integer PLLs even if the modulator bits are set.
        hw.set_pll_setting(Pll::Pll0, PllSetting::new((1 << 28) | (3 << 18) | (200 << 8) | 1));
        hw.set_pll_sscg(Pll::Pll0, PllSscg::new((0x8000 << 16) | 1));
        assert_eq!(recalc_pll_rate(&hw, Pll::Pll0, REF_HZ), 800_000_000);
    }

    #[test]
    fn every_table_entry_survives_programming() {
        let hw = FakeClkPwr::new();
        let sequencer = PllSequencer::new();
        for pll in [Pll::Pll0, Pll::Pll3] {
            let node = PllNode::new(pll);
            for entry in pll.table().iter().filter(|e| e.k.unwrap_or(0) == 0) {
                let hz = entry.rate_khz * 1000;
                sequencer
                    .program(&hw, &NoInterruptControl, &node, hz)
                    .unwrap();
                let setting = hw.setting(pll);
                assert_eq!(field(setting, 18, 6), entry.p as u32);
                assert_eq!(field(setting, 8, 10), entry.m as u32);
                assert_eq!(field(setting, 0, 8), entry.s as u32);
                assert_eq!(recalc_pll_rate(&hw, pll, REF_HZ), hz);
            }
        }
    }

    #[test]
    fn unacknowledged_apply_aborts() {
        let hw = FakeClkPwr::with_stuck_apply(true);
        let node = PllNode::new(Pll::Pll0);
        let result = PllSequencer::new().program(&hw, &NoInterruptControl, &node, 800_000_000);
        assert_eq!(result, Err(ErrorCode::NOACK));
        // Stopped after the first apply, with the output on the oscillator.
        assert_eq!(hw.log(), [Event::Setting(Pll::Pll0, 0), Event::Apply(Pll::Pll0)]);
        assert_eq!(recalc_pll_rate(&hw, Pll::Pll0, REF_HZ), REF_HZ);
    }

    #[test]
    fn concurrent_reprograms_do_not_interleave() {
        const STEPS: usize = 10;
        let hw = FakeClkPwr::new();
        let sequencer = PllSequencer::new();
        let nodes = [PllNode::new(Pll::Pll0), PllNode::new(Pll::Pll1)];
        let rates = [800_000_000, 1_200_000_000, 400_000_000, 1_600_000_000];

        std::thread::scope(|s| {
            for node in nodes.iter() {
                let (hw, sequencer) = (&hw, &sequencer);
                s.spawn(move || {
                    for _ in 0..25 {
                        for &hz in rates.iter() {
                            sequencer
                                .program(hw, &NoInterruptControl, node, hz)
                                .unwrap();
                        }
                    }
                });
            }
        });

        let log = hw.log();
        assert_eq!(log.len(), 2 * 25 * rates.len() * STEPS);
        for sequence in log.chunks(STEPS) {
            let owner = match sequence[0] {
                Event::Setting(pll, _) => pll,
                other => panic!("sequence starts with {:?}", other),
            };
            for event in sequence {
                match *event {
                    Event::Setting(pll, _) | Event::Apply(pll) | Event::Sscg(pll, _) => {
                        assert_eq!(pll, owner)
                    }
                    Event::Delay(_) => {}
                }
            }
            assert_eq!(sequence[STEPS - 1], Event::Apply(owner));
        }
    }
}
