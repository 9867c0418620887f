//! Win32 host adapter for the cabinet launcher
//!
//! Provides:
//! - One topmost splash window per monitor, repainting its bitmap on demand
//! - Portrait rotation through display mode changes
//! - Process table and top-level window queries for the game
//! - Launcher invocation through the shell
//!
//! Everything here must run on the thread that owns the message queue.

#![cfg(windows)]

mod display;
mod orientation;
mod process;

pub use display::*;
pub use orientation::*;
pub use process::*;

/// NUL-terminated UTF-16 for Win32 string parameters
pub(crate) fn wide(value: impl AsRef<std::ffi::OsStr>) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    value
        .as_ref()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

/// Decode a fixed-size UTF-16 buffer up to its first NUL
pub(crate) fn from_wide(buffer: &[u16]) -> String {
    let len = buffer.iter().position(|&c| c == 0).unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..len])
}
