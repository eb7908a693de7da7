// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PLL divider tables and nearest-rate search.
//!
//! A PLL output is `(M * Fref / P) >> S`, with an optional fractional part
//! `K / 65536` added to `M` on the spread-spectrum capable PLLs. Only a
//! validated subset of (P, M, S, K) combinations keeps the VCO inside its
//! operating range, so rates are picked from fixed tables instead of being
//! solved for.
//!
//! Tables assume a 24 MHz reference oscillator and are sorted by descending
//! rate.

/// One validated PLL configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PmsEntry {
    pub rate_khz: u32,
    pub p: u8,
    pub m: u16,
    pub s: u8,
    /// Fractional multiplier, only meaningful on dithered PLLs.
    pub k: Option<u16>,
}

impl PmsEntry {
    const fn new(rate_khz: u32, p: u8, m: u16, s: u8) -> Self {
        Self {
            rate_khz,
            p,
            m,
            s,
            k: None,
        }
    }

    const fn dithered(rate_khz: u32, p: u8, m: u16, s: u8, k: u16) -> Self {
        Self {
            rate_khz,
            p,
            m,
            s,
            k: Some(k),
        }
    }

    /// Output rate in Hz this entry produces from `ref_hz`.
    pub fn output_hz(&self, ref_hz: u32) -> u32 {
        pll_output_hz(ref_hz, self.p, self.m, self.s, self.k.unwrap_or(0))
    }
}

/// `(((M << 16) + K) * ref_hz / P) >> S >> 16`, or 0 when `P` is 0.
pub fn pll_output_hz(ref_hz: u32, p: u8, m: u16, s: u8, k: u16) -> u32 {
    if p == 0 {
        return 0;
    }
    let mk = ((m as u64) << 16) + k as u64;
    let hz = (mk * ref_hz as u64 / p as u64)
        .checked_shr(s as u32 + 16)
        .unwrap_or(0);
    hz.min(u32::MAX as u64) as u32
}

pub type PmsTable = [PmsEntry];

/// PLL0 and PLL1.
pub static NON_DITHERED_PMS: [PmsEntry; 29] = [
    PmsEntry::new(2_000_000, 3, 250, 0),
    PmsEntry::new(1_900_000, 6, 475, 0),
    PmsEntry::new(1_800_000, 3, 225, 0),
    PmsEntry::new(1_700_000, 6, 425, 0),
    PmsEntry::new(1_600_000, 3, 200, 0),
    PmsEntry::new(1_500_000, 6, 375, 0),
    PmsEntry::new(1_400_000, 3, 175, 0),
    PmsEntry::new(1_300_000, 6, 325, 0),
    PmsEntry::new(1_200_000, 3, 150, 0),
    PmsEntry::new(1_100_000, 6, 275, 0),
    PmsEntry::new(1_000_000, 3, 125, 0),
    PmsEntry::new(950_000, 6, 475, 1),
    PmsEntry::new(900_000, 3, 225, 1),
    PmsEntry::new(850_000, 6, 425, 1),
    PmsEntry::new(800_000, 3, 200, 1),
    PmsEntry::new(750_000, 6, 375, 1),
    PmsEntry::new(700_000, 3, 175, 1),
    PmsEntry::new(650_000, 6, 325, 1),
    PmsEntry::new(600_000, 3, 150, 1),
    PmsEntry::new(550_000, 6, 275, 1),
    PmsEntry::new(500_000, 3, 125, 1),
    PmsEntry::new(450_000, 3, 225, 2),
    PmsEntry::new(400_000, 3, 200, 2),
    PmsEntry::new(350_000, 3, 175, 2),
    PmsEntry::new(300_000, 3, 150, 2),
    PmsEntry::new(250_000, 3, 125, 2),
    PmsEntry::new(200_000, 3, 200, 3),
    PmsEntry::new(150_000, 3, 150, 3),
    PmsEntry::new(100_000, 3, 200, 4),
];

/// PLL2 and PLL3. The fractional rows serve audio sample-rate families.
pub static DITHERED_PMS: [PmsEntry; 15] = [
    PmsEntry::dithered(1_000_000, 3, 125, 0, 0),
    PmsEntry::dithered(900_000, 6, 225, 0, 0),
    PmsEntry::dithered(800_000, 3, 100, 0, 0),
    PmsEntry::dithered(786_432, 3, 98, 0, 19923),
    PmsEntry::dithered(700_000, 6, 175, 0, 0),
    PmsEntry::dithered(614_400, 3, 76, 0, 52429),
    PmsEntry::dithered(600_000, 4, 100, 0, 0),
    PmsEntry::dithered(589_824, 3, 73, 0, 47710),
    PmsEntry::dithered(500_000, 3, 125, 1, 0),
    PmsEntry::dithered(451_584, 3, 112, 1, 58720),
    PmsEntry::dithered(400_000, 3, 100, 1, 0),
    PmsEntry::dithered(393_216, 3, 98, 1, 19923),
    PmsEntry::dithered(300_000, 4, 100, 1, 0),
    PmsEntry::dithered(200_000, 3, 100, 2, 0),
    PmsEntry::dithered(100_000, 3, 100, 3, 0),
];

fn error(a: u32, b: u32) -> u32 {
    a.abs_diff(b)
}

/// Find the entry of `table` whose rate is closest to `request_khz`.
///
/// Returns the entry and its rate in kHz. On a tie between two neighbours the
/// higher frequency wins. `table` must be non-empty and sorted by descending
/// rate.
pub fn find_nearest(table: &PmsTable, request_khz: u32) -> (PmsEntry, u32) {
    let mut n = 0;
    let mut len = table.len();

    // Keep table[n] >= request > table[n + len] wherever those exist.
    while len > 1 {
        let half = len / 2;
        let mid = n + half;
        let rate = table[mid].rate_khz;
        if rate == request_khz {
            return (table[mid], rate);
        }
        if request_khz > rate {
            len = half;
        } else {
            n = mid;
            len -= half;
        }
    }

    let candidate = table[n];
    let neighbour = if request_khz > candidate.rate_khz {
        n.checked_sub(1).map(|i| table[i])
    } else if request_khz < candidate.rate_khz {
        table.get(n + 1).copied()
    } else {
        None
    };

    let best = match neighbour {
        Some(other) => {
            let (high, low) = if other.rate_khz > candidate.rate_khz {
                (other, candidate)
            } else {
                (candidate, other)
            };
            if error(request_khz, low.rate_khz) < error(request_khz, high.rate_khz) {
                low
            } else {
                high
            }
        }
        None => candidate,
    };
    (best, best.rate_khz)
}
