// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

pub mod clocks;
pub mod divider;
pub mod pll;
pub mod pms;
pub mod tree;

pub use crate::clocks::clocks::{ClockId, Clocks, PeripheralClock};
pub use crate::clocks::pll::Pll;
pub use crate::clocks::tree::BusClock;
