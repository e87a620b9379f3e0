//! Display-level infrastructure shared by the verification harness.
//!
//! A crate-level atomic display level plus a `displaylevel!` macro, the same
//! shape jafreck-lz4r's CLI uses, rather than pulling in a logging framework
//! for a single small binary.

use std::sync::atomic::{AtomicU32, Ordering};

/// Binary name used in diagnostic output.
pub const PROGRAM_NAME: &str = "snzcheck";

/// Default chunk size when `chunk=` is not given on the command line.
pub const DEFAULT_CHUNK_SIZE: usize = 65536;

/// Environment variable naming the external raw-Snappy compressor binary.
pub const SNAPPY_COMPRESSOR_ENV: &str = "SNAPPY_COMPRESSOR";

/// Compressor binary used when `SNAPPY_COMPRESSOR` is unset.
pub const DEFAULT_COMPRESSOR: &str = "snzip";

/// 0 = silent, 1 = errors only, 2 = normal, 3 = verbose.
pub static DISPLAY_LEVEL: AtomicU32 = AtomicU32::new(2);

#[inline]
pub fn display_level() -> u32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

#[inline]
pub fn set_display_level(level: u32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

/// Prints to stderr when the current display level is at or above `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_display_level_is_normal() {
        assert_eq!(display_level(), 2);
    }

    #[test]
    fn set_display_level_round_trips() {
        let prev = display_level();
        set_display_level(3);
        assert_eq!(display_level(), 3);
        set_display_level(prev);
    }
}
