// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces for individual MCUs and SoCs.

/// Local interrupt masking provided by the CPU architecture crate.
pub trait InterruptControl: Sync {
    /// Run a closure with interrupts disabled on the calling core.
    ///
    /// # Safety
    ///
    /// `f` must not block waiting on work that an interrupt handler on this
    /// core would perform.
    unsafe fn atomic<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R;
}

/// Interrupt control for hosts and boards where nothing preempts the clock
/// core, such as unit tests or early boot before interrupts are enabled.
pub struct NoInterruptControl;

impl InterruptControl for NoInterruptControl {
    unsafe fn atomic<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        f()
    }
}

/// Generic operations that clock-like things are expected to support.
pub trait ClockInterface {
    fn is_enabled(&self) -> bool;
    fn enable(&self);
    fn disable(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_interrupt_control_runs_closure() {
        let v = unsafe { NoInterruptControl.atomic(|| 7) };
        assert_eq!(v, 7);
    }
}
