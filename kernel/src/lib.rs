// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Core kernel services for the S5Pxx18 clock core.
//!
//! The kernel crate holds the shared code every chip crate builds on: the
//! standard error type, the debug output path, the Hardware Interface Layer
//! (HIL) definitions for clocks, and the platform traits a board implements
//! to hand the chip crates interrupt masking and busy delays.
//!
//! Most `unsafe` code is in this kernel crate.

#![warn(unreachable_pub)]
#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
pub mod debug;
pub mod errorcode;
pub mod hil;
pub mod platform;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
