// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for in-kernel debugging.
//!
//! For printing, the board registers a sink once at boot with
//! [`set_debug_writer`]. Any code in the chip crates can then print with the
//! `debug!` macro:
//!
//! ```rust,ignore
//! debug!("Yes the code gets here with value {}", i);
//! debug_verbose!("got here"); // includes the file and line number
//! ```
//!
//! Every message is written as one line terminated with `\r\n`. Until a sink
//! is registered, messages are dropped, which is also what happens in host
//! unit tests.

use core::fmt::{write, Arguments, Result, Write};

use spin::Mutex;

/// Byte sink for debug output, usually a polled UART.
pub trait IoWrite {
    /// Write `buf` and return how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> usize;
}

static DEBUG_WRITER: Mutex<Option<&'static mut (dyn IoWrite + Send)>> = Mutex::new(None);

/// Register the sink that receives `debug!` output.
///
/// Replaces any previously registered sink.
pub fn set_debug_writer(writer: &'static mut (dyn IoWrite + Send)) {
    *DEBUG_WRITER.lock() = Some(writer);
}

/// Detach the current sink, returning it to the caller.
pub fn take_debug_writer() -> Option<&'static mut (dyn IoWrite + Send)> {
    DEBUG_WRITER.lock().take()
}

struct LineWriter<'a> {
    sink: &'a mut (dyn IoWrite + Send),
}

impl Write for LineWriter<'_> {
    fn write_str(&mut self, s: &str) -> Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let written = self.sink.write(bytes);
            if written == 0 {
                // Sink is full, drop the rest of the line.
                break;
            }
            bytes = &bytes[written.min(bytes.len())..];
        }
        Ok(())
    }
}

#[doc(hidden)]
pub fn debug_println(args: Arguments) {
    let mut writer = DEBUG_WRITER.lock();
    if let Some(sink) = writer.as_mut() {
        let mut line = LineWriter { sink: &mut **sink };
        let _ = write(&mut line, args);
        let _ = line.write_str("\r\n");
    }
}

#[doc(hidden)]
pub fn debug_verbose_println(args: Arguments, file_line: &(&'static str, u32)) {
    let (file, line) = *file_line;
    debug_println(format_args!("{}:{}: {}", file, line, args));
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        $crate::debug!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_println(format_args!($msg))
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($fmt, $($arg)+))
    });
}

/// In-kernel `println()` debugging that also prints the call site.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        $crate::debug_verbose!("")
    });
    ($msg:expr $(,)?) => ({
        $crate::debug::debug_verbose_println(format_args!($msg), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
    ($fmt:expr, $($arg:tt)+) => ({
        $crate::debug::debug_verbose_println(format_args!($fmt, $($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}

#[cfg(test)]
mod tests {
    use std::boxed::Box;
    use std::string::String;
    use std::sync::Mutex as StdMutex;
    use std::vec::Vec;

    use super::*;

    static CAPTURED: StdMutex<Vec<u8>> = StdMutex::new(Vec::new());

    // Accepts at most three bytes per call to exercise partial writes.
    struct Capture;

    impl IoWrite for Capture {
        fn write(&mut self, buf: &[u8]) -> usize {
            let n = buf.len().min(3);
            CAPTURED.lock().unwrap().extend_from_slice(&buf[..n]);
            n
        }
    }

    // The sink is global, so everything that touches it lives in one test.
    #[test]
    fn lines_reach_registered_writer() {
        debug!("dropped {}", 1);
        assert!(CAPTURED.lock().unwrap().is_empty());

        set_debug_writer(Box::leak(Box::new(Capture)));
        debug!("pll{} at {} Hz", 2, 614_400_000);
        debug_verbose!("trace");
        assert!(take_debug_writer().is_some());

        debug!("dropped again");

        let text = String::from_utf8(CAPTURED.lock().unwrap().clone()).unwrap();
        let mut lines = text.split("\r\n");
        assert_eq!(lines.next(), Some("pll2 at 614400000 Hz"));
        let verbose = lines.next().unwrap();
        assert!(verbose.contains("debug.rs:"));
        assert!(verbose.ends_with(": trace"));
        assert_eq!(lines.next(), Some(""));
        assert_eq!(lines.next(), None);
    }
}
