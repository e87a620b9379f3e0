//! Command-line surface for `snzcheck`, the pipeline's round-trip
//! verification harness.

pub mod args;
pub mod constants;
pub mod harness;

pub use args::{parse_args, parse_args_from, ParsedArgs};
pub use harness::run;
