//! CLI surface coverage. The usage-error paths run the compiled `snzcheck`
//! binary directly; they never invoke the external compressor, so they run
//! unconditionally. The full compress-and-verify round trip needs a real
//! raw-Snappy encoder on `PATH` and is skipped (with a printed note) when
//! none is found, per this crate's hermetic-by-default test policy.

use std::process::Command;

use snzpipe::cli::parse_args_from;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn parse_args_from_rejects_a_missing_input_file() {
    let err = parse_args_from(&[]).unwrap_err();
    assert!(err.to_string().starts_with("bad usage"));
}

#[test]
fn parse_args_from_rejects_an_unknown_key() {
    let err = parse_args_from(&args(&["input.bin", "frobnicate=1"])).unwrap_err();
    assert!(err.to_string().starts_with("bad usage"));
}

#[test]
fn binary_exits_with_usage_code_on_missing_arguments() {
    let output = Command::new(env!("CARGO_BIN_EXE_snzcheck"))
        .output()
        .expect("failed to run snzcheck binary");
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn binary_exits_with_usage_code_on_an_unreadable_input_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_snzcheck"))
        .arg("/nonexistent/path/for/snzcheck/tests")
        .output()
        .expect("failed to run snzcheck binary");
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn round_trip_through_the_external_compressor_when_available() {
    let compressor = std::env::var("SNAPPY_COMPRESSOR").unwrap_or_else(|_| "snzip".to_owned());
    if Command::new(&compressor).arg("--version").output().is_err() {
        eprintln!("skipping: external compressor `{compressor}` not found on PATH");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.bin");
    std::fs::write(&input_path, b"the quick brown fox jumps over the lazy dog, repeatedly, repeatedly, repeatedly").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_snzcheck"))
        .arg(&input_path)
        .arg("chunk=16")
        .arg("verify")
        .output()
        .expect("failed to run snzcheck binary");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
