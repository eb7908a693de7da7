// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock-tree core for the Samsung/Nexell S5P4418 and S5P6818 SoCs.
//!
//! The crate owns the PLL controller (`CLKPWR`) and the bus clock generator
//! (`CMU`). Drivers reach it through [`kernel::hil::clock::ClockTree`],
//! implemented by [`clocks::Clocks`].

#![no_std]

#[cfg(test)]
extern crate std;

pub mod clkpwr;
pub mod clocks;
pub mod cmu;
mod config;
