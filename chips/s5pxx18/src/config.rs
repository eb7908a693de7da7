// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Compile-time configuration of the clock core.
//!
//! Values are plain constants so every code path is type-checked even when a
//! feature is off, and the compiler folds the disabled branches away.

/// Data structure holding compile-time configuration options.
pub(crate) struct Config {
    /// Whether every committed rate change is printed to the debug output.
    ///
    /// Useful when bringing up a board to see which boot rates actually took
    /// effect and which bus source each node settled on.
    pub(crate) trace_rate_changes: bool,

    /// How many times the PLL apply status is polled before the sequence is
    /// abandoned with `ErrorCode::NOACK`.
    // The apply normally completes within a few reads. The limit only exists
    // so a wedged controller surfaces as an error instead of a hang.
    pub(crate) pll_update_poll_limit: usize,
}

/// A unique instance of `Config` where compile-time configuration options are
/// defined.
pub(crate) const CONFIG: Config = Config {
    trace_rate_changes: cfg!(feature = "trace_rate_changes"),
    pll_update_poll_limit: 100_000,
};
