// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Hardware agnostic interfaces for time.

/// Busy-wait delays for register sequences that must settle before the next
/// write.
///
/// Implementations spin on a free-running counter or calibrated loop. They
/// must not sleep or rely on interrupts, since callers may have interrupts
/// masked.
pub trait BusyDelay: Sync {
    /// Spin for at least `us` microseconds.
    fn delay_us(&self, us: u32);
}
