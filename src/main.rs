//! `snzcheck`: chunk a file, compress each chunk with an external raw-Snappy
//! encoder, run it back through the pipeline, and verify or report on the
//! round trip.

use std::fs;
use std::process::ExitCode;

use snzpipe::cli::{self, constants::PROGRAM_NAME};

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{PROGRAM_NAME}: {e}");
            return ExitCode::from(2);
        }
    };

    let data = match fs::read(&args.input_filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!(
                "{PROGRAM_NAME}: cannot read `{}`: {e}",
                args.input_filename
            );
            return ExitCode::from(2);
        }
    };

    match cli::run(&args, &data) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("{PROGRAM_NAME}: {e:#}");
            ExitCode::from(1)
        }
    }
}
