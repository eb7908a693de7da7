// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interface for SoC clock trees.
//!
//! Peripheral drivers and frequency-scaling glue never touch clock registers
//! directly. They name a clock with the chip's identifier type and ask the
//! tree for a rate through these five operations.
//!
//! A typical rate change first asks what the hardware can achieve and then
//! commits it:
//!
//! ```rust,ignore
//! let achievable = clocks.round_rate(id, 130_000_000);
//! if achievable != 0 {
//!     clocks.set_rate(id, achievable)?;
//!     clocks.enable(id)?;
//! }
//! ```

use crate::ErrorCode;

/// Rate and gate control over every clock of a chip.
pub trait ClockTree {
    /// Chip-specific clock identifier.
    type ClockId: Copy;

    /// Return the rate in Hz the clock would run at if `set_rate(id, hz)` were
    /// called now, or 0 if no configuration can produce a rate.
    ///
    /// Does not touch hardware.
    fn round_rate(&self, id: Self::ClockId, hz: u32) -> u32;

    /// Program the clock to the closest achievable rate and return it.
    ///
    /// Returns `NOACK` if the hardware never acknowledged the change.
    fn set_rate(&self, id: Self::ClockId, hz: u32) -> Result<u32, ErrorCode>;

    /// Ungate the clock.
    fn enable(&self, id: Self::ClockId) -> Result<(), ErrorCode>;

    /// Gate the clock.
    ///
    /// Returns `NOSUPPORT` for clocks that must keep running.
    fn disable(&self, id: Self::ClockId) -> Result<(), ErrorCode>;

    /// Read the current rate in Hz back from the hardware.
    fn recalc_rate(&self, id: Self::ClockId) -> u32;
}
