// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Standard error enum for invoking operations

/// Standard errors returned by clock and platform operations.
///
/// There is no success case: fallible operations return
/// `Result<T, ErrorCode>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// Operation or command is unsupported
    NOSUPPORT,
    /// Device does not exist
    NODEVICE,
    /// Hardware did not acknowledge a request
    NOACK,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::format;

    #[test]
    fn codes_are_distinct_and_named() {
        let all = [ErrorCode::NOSUPPORT, ErrorCode::NODEVICE, ErrorCode::NOACK];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(format!("{:?}", ErrorCode::NOACK), "NOACK");
    }
}
