// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Integer divider selection for bus clocks.

/// Largest value the 8-bit divider field can be programmed to.
pub const MAX_DIVIDER: u16 = 255;

/// Pick an integer divider for `parent_hz` that gets closest to `request_hz`.
///
/// Dividers other than 1 are kept a multiple of `align`, which must be a power
/// of two (0 counts as 1). Between the truncated divider and the next aligned
/// one up, the larger divider only wins when it is strictly closer to the
/// request. A request of 0 asks for the slowest clock available.
///
/// Returns the divider and the rate it produces.
pub fn divide(parent_hz: u32, request_hz: u32, align: u8) -> (u16, u32) {
    let align = u32::from(align.max(1));
    let mask = !(align - 1);
    let max = u32::from(MAX_DIVIDER) & mask;

    let mut divider = match parent_hz.checked_div(request_hz) {
        Some(0) => return (1, parent_hz),
        Some(raw) => raw,
        None => max,
    };

    if divider != 1 {
        divider = (divider & mask).max(1);
    }

    let advanced = (divider & mask).saturating_add(align);
    if divider != advanced
        && request_hz.abs_diff(parent_hz / divider) > request_hz.abs_diff(parent_hz / advanced)
    {
        divider = advanced;
    }

    let divider = divider.min(max).max(1);
    (divider as u16, parent_hz / divider)
}
