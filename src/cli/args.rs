//! Command-line argument parsing for the `snzcheck` verification harness.
//!
//! The entry points are [`parse_args`] (reads `std::env::args()`) and
//! [`parse_args_from`] (takes an explicit slice, suitable for unit-testing).
//!
//! The surface is a single positional input file followed by `key=value`
//! pairs (keys matched case-insensitively), plus a bare `verify` flag. This
//! mirrors the reference test drivers' argument style rather than a getopt
//! long/short option set, since the harness has no flags that need
//! abbreviation or bundling.
//!
//! Bad or unrecognised arguments return an `Err` with a message that begins
//! with `"bad usage: "`.

use anyhow::{anyhow, bail, Result};

use super::constants::DEFAULT_CHUNK_SIZE;

/// Complete set of options produced by the argument parsing loop.
#[derive(Debug)]
pub struct ParsedArgs {
    /// Path to the uncompressed input file.
    pub input_filename: String,
    /// RNG seed driving the chunk-size decisions (`seed=`).
    pub seed: u64,
    /// Default chunk size (`chunk=`); also the fallback for `min_chunk`/`max_chunk`.
    pub chunk: usize,
    /// Smallest chunk size the splitter will choose (`min_chunk=`).
    pub min_chunk: usize,
    /// Largest chunk size the splitter will choose (`max_chunk=`).
    pub max_chunk: usize,
    /// Probability of forcing a full-`max_chunk` chunk instead of a random size (`max_prob=`).
    pub max_prob: f64,
    /// Assert the round trip instead of reporting stream-count statistics.
    pub verify: bool,
    /// When set, write the six `.tv` stream-serialization files under this path prefix (`dump=`).
    pub dump_prefix: Option<String>,
}

/// Parses `std::env::args()`, skipping argv[0].
pub fn parse_args() -> Result<ParsedArgs> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&argv)
}

/// Parses an explicit argument list (argv[1..]). Callable from tests without
/// touching `std::env`.
pub fn parse_args_from(argv: &[String]) -> Result<ParsedArgs> {
    let mut iter = argv.iter();
    let input_filename = iter
        .next()
        .ok_or_else(|| anyhow!("bad usage: missing <test-data-file> argument"))?
        .clone();

    let mut chunk = DEFAULT_CHUNK_SIZE;
    let mut min_chunk: Option<usize> = None;
    let mut max_chunk: Option<usize> = None;
    let mut max_prob = 0.0f64;
    let mut seed = 0u64;
    let mut verify = false;
    let mut dump_prefix = None;

    for argument in iter {
        let (key, value) = match argument.split_once('=') {
            Some((k, v)) => (k.to_lowercase(), Some(v)),
            None => (argument.to_lowercase(), None),
        };

        match key.as_str() {
            "seed" => seed = parse_value(&key, value)?,
            "chunk" => chunk = parse_value(&key, value)?,
            "min_chunk" => min_chunk = Some(parse_value(&key, value)?),
            "max_chunk" => max_chunk = Some(parse_value(&key, value)?),
            "max_prob" => max_prob = parse_value(&key, value)?,
            "verify" => verify = true,
            "dump" => {
                dump_prefix = Some(
                    value
                        .ok_or_else(|| anyhow!("bad usage: dump= requires a path prefix"))?
                        .to_owned(),
                );
            }
            other => bail!("bad usage: unrecognized key `{other}`"),
        }
    }

    Ok(ParsedArgs {
        input_filename,
        seed,
        chunk,
        min_chunk: min_chunk.unwrap_or(chunk),
        max_chunk: max_chunk.unwrap_or(chunk),
        max_prob,
        verify,
        dump_prefix,
    })
}

fn parse_value<T: std::str::FromStr>(key: &str, value: Option<&str>) -> Result<T> {
    let value = value.ok_or_else(|| anyhow!("bad usage: `{key}` requires a value"))?;
    value
        .parse()
        .map_err(|_| anyhow!("bad usage: invalid value for `{key}`: `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_fill_min_and_max_chunk_from_chunk() {
        let parsed = parse_args_from(&args(&["input.bin"])).unwrap();
        assert_eq!(parsed.chunk, DEFAULT_CHUNK_SIZE);
        assert_eq!(parsed.min_chunk, DEFAULT_CHUNK_SIZE);
        assert_eq!(parsed.max_chunk, DEFAULT_CHUNK_SIZE);
        assert!(!parsed.verify);
        assert!(parsed.dump_prefix.is_none());
    }

    #[test]
    fn keys_are_case_insensitive() {
        let parsed = parse_args_from(&args(&["input.bin", "SEED=7"])).unwrap();
        assert_eq!(parsed.seed, 7);
    }

    #[test]
    fn explicit_min_and_max_chunk_override_chunk() {
        let parsed =
            parse_args_from(&args(&["input.bin", "chunk=100", "min_chunk=10", "max_chunk=200"]))
                .unwrap();
        assert_eq!(parsed.min_chunk, 10);
        assert_eq!(parsed.max_chunk, 200);
    }

    #[test]
    fn bare_verify_flag_enables_verification() {
        let parsed = parse_args_from(&args(&["input.bin", "verify"])).unwrap();
        assert!(parsed.verify);
    }

    #[test]
    fn dump_requires_a_prefix_value() {
        let err = parse_args_from(&args(&["input.bin", "dump"])).unwrap_err();
        assert!(err.to_string().starts_with("bad usage"));
    }

    #[test]
    fn dump_with_a_prefix_is_accepted() {
        let parsed = parse_args_from(&args(&["input.bin", "dump=/tmp/trace"])).unwrap();
        assert_eq!(parsed.dump_prefix.as_deref(), Some("/tmp/trace"));
    }

    #[test]
    fn unrecognized_key_is_a_usage_error() {
        let err = parse_args_from(&args(&["input.bin", "bogus=1"])).unwrap_err();
        assert!(err.to_string().starts_with("bad usage"));
    }

    #[test]
    fn missing_input_file_is_a_usage_error() {
        let err = parse_args_from(&[]).unwrap_err();
        assert!(err.to_string().starts_with("bad usage"));
    }
}
