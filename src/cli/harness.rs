//! Orchestrates the round-trip verification workflow: chunk the input, hand
//! each chunk to an external raw-Snappy compressor, run the result back
//! through the pipeline, and either verify the round trip or report
//! stream-transfer statistics.
//!
//! Grounded in `emu/snappy.py::compress` for the chunking and external
//! compressor invocation, and in `tests/self_test.py` for the stream-count
//! invariant (`cs.count == el.pop_count == c1.pop_count == cm.pop_count`)
//! and the summary line it prints.

use std::env;
use std::fs;
use std::io::Write;
use std::process::Command as Process;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cli::args::ParsedArgs;
use crate::cli::constants::{DEFAULT_COMPRESSOR, PROGRAM_NAME, SNAPPY_COMPRESSOR_ENV};
use crate::displaylevel;
use crate::pipeline::{
    self, CmdGen1, CmdGen2, Command, CompressedDouble, CompressedSingle, Datapath, DataSource,
    Decompressed, Element, ElementDecoder, PartialCommand, PreDecoder,
};
use crate::PipelineError;

struct StageRun {
    cs: Vec<CompressedSingle>,
    cd: Vec<CompressedDouble>,
    el: Vec<Element>,
    c1: Vec<PartialCommand>,
    cm: Vec<Command>,
    de: Vec<Decompressed>,
}

/// Runs every compressed chunk through the full pipeline as one continuous
/// stream, the way a hardware implementation sees one continuous run of
/// back-to-back chunks, materializing each stage's output so the harness can
/// report counts and (optionally) dump test vectors afterward.
fn run_pipeline(compressed: &[Vec<u8>]) -> Result<StageRun, PipelineError> {
    let cs: Vec<_> = DataSource::new(compressed.iter().cloned()).collect();
    let cd: Vec<_> = PreDecoder::new(cs.iter().copied()).collect();
    let el: Vec<_> = ElementDecoder::new(cd.iter().copied()).collect::<Result<Vec<_>, _>>()?;
    let c1: Vec<_> =
        CmdGen1::new(el.iter().copied().map(Ok::<_, PipelineError>)).collect::<Result<Vec<_>, _>>()?;
    let cm: Vec<_> =
        CmdGen2::new(c1.iter().copied().map(Ok::<_, PipelineError>)).collect::<Result<Vec<_>, _>>()?;
    let de: Vec<_> =
        Datapath::new(cm.iter().copied().map(Ok::<_, PipelineError>)).collect::<Result<Vec<_>, _>>()?;

    Ok(StageRun { cs, cd, el, c1, cm, de })
}

/// Splits `data` into randomly sized chunks, mirroring `emu/snappy.py::compress`.
fn split_chunks(data: &[u8], args: &ParsedArgs, rng: &mut StdRng) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return vec![Vec::new()];
    }

    let mut chunks = Vec::new();
    let mut offset = 0usize;
    while offset < data.len() {
        let size = if rng.random::<f64>() < args.max_prob {
            args.max_chunk
        } else {
            rng.random_range(args.min_chunk..=args.max_chunk)
        };
        let end = (offset + size).min(data.len());
        chunks.push(data[offset..end].to_vec());
        offset = end;
    }
    chunks
}

/// Invokes the external raw-Snappy compressor on one chunk via a temporary
/// file, reading back its `.raw`-suffixed output. The compressor itself is
/// the out-of-scope collaborator this crate never implements.
fn compress_chunk_external(chunk: &[u8], compressor: &str) -> Result<Vec<u8>> {
    let dir = tempfile::tempdir().context("creating temp directory for external compressor")?;
    let data_path = dir.path().join("data");
    fs::write(&data_path, chunk).context("writing chunk for external compressor")?;

    let status = Process::new(compressor)
        .arg("-traw")
        .arg(&data_path)
        .status()
        .with_context(|| format!("invoking external compressor `{compressor}`"))?;
    if !status.success() {
        bail!("external compressor `{compressor}` exited with {status}");
    }

    let raw_path = dir.path().join("data.raw");
    fs::read(&raw_path).context("reading compressed output from external compressor")
}

fn write_tv(path: &str, lines: impl Iterator<Item = String>) -> Result<()> {
    let mut f =
        std::io::BufWriter::new(fs::File::create(path).with_context(|| format!("creating {path}"))?);
    for line in lines {
        writeln!(f, "{line}").with_context(|| format!("writing {path}"))?;
    }
    Ok(())
}

fn dump_streams(run: &StageRun, prefix: &str) -> Result<()> {
    write_tv(&format!("{prefix}.cs.tv"), run.cs.iter().map(|r| r.serialize()))?;
    write_tv(&format!("{prefix}.cd.tv"), run.cd.iter().map(|r| r.serialize()))?;
    write_tv(&format!("{prefix}.el.tv"), run.el.iter().map(|r| r.serialize()))?;
    write_tv(&format!("{prefix}.c1.tv"), run.c1.iter().map(|r| r.serialize()))?;
    write_tv(&format!("{prefix}.cm.tv"), run.cm.iter().map(|r| r.serialize()))?;
    write_tv(&format!("{prefix}.de.tv"), run.de.iter().map(|r| r.serialize()))?;
    Ok(())
}

/// Runs the harness against already-read input bytes, returning the process
/// exit code. `args.input_filename` is used only for diagnostics here; the
/// caller is responsible for reading the file (so a missing file is reported
/// as a usage error before this function is ever reached).
pub fn run(args: &ParsedArgs, data: &[u8]) -> Result<i32> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let chunks = split_chunks(data, args, &mut rng);

    let compressor =
        env::var(SNAPPY_COMPRESSOR_ENV).unwrap_or_else(|_| DEFAULT_COMPRESSOR.to_owned());
    displaylevel!(3, "using external compressor `{compressor}`");

    let mut compressed = Vec::with_capacity(chunks.len());
    for (idx, chunk) in chunks.iter().enumerate() {
        displaylevel!(3, "compressing chunk {idx} ({} bytes)...", chunk.len());
        compressed.push(
            compress_chunk_external(chunk, &compressor)
                .with_context(|| format!("compressing chunk {idx}"))?,
        );
    }

    let run = match run_pipeline(&compressed) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("{PROGRAM_NAME}: pipeline error: {e}");
            return Ok(1);
        }
    };

    if let Some(prefix) = &args.dump_prefix {
        dump_streams(&run, prefix)?;
    }

    let cs_count = run.cs.len();
    let el_pop = run.el.iter().filter(|e| e.ld_pop).count();
    let c1_pop = run.c1.iter().filter(|c| c.ld_pop).count();
    let cm_pop = run.cm.iter().filter(|c| c.ld_pop).count();

    if args.verify {
        return match pipeline::verify_chunks(&run.de, &chunks) {
            Ok(()) => {
                println!("verify OK: {} chunk(s)", chunks.len());
                Ok(0)
            }
            Err(e) => {
                eprintln!("{PROGRAM_NAME}: verification failed: {e}");
                Ok(1)
            }
        };
    }

    let uncompressed_size: usize = chunks.iter().map(Vec::len).sum();
    let compressed_size: usize = compressed.iter().map(Vec::len).sum();
    println!(
        "uncompressed size={uncompressed_size}, compressed size={compressed_size}, chunk count={}",
        chunks.len()
    );
    println!(
        "stream transfer counts: cs={cs_count}, cd={}, el={}, c1={}, cm={}, de={}",
        run.cd.len(),
        run.el.len(),
        run.c1.len(),
        run.cm.len(),
        run.de.len()
    );
    println!("literal pop counts: el={el_pop}, c1={c1_pop}, cm={cm_pop}");
    if !run.cm.is_empty() {
        println!(
            "approx. bytes/cycle: {:.3}",
            uncompressed_size as f64 / run.cm.len() as f64
        );
    }

    if cs_count == el_pop && cs_count == c1_pop && cs_count == cm_pop {
        Ok(0)
    } else {
        eprintln!(
            "{PROGRAM_NAME}: stream-count invariant violated (cs={cs_count}, el_pop={el_pop}, c1_pop={c1_pop}, cm_pop={cm_pop})"
        );
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(verify: bool, dump_prefix: Option<String>) -> ParsedArgs {
        ParsedArgs {
            input_filename: "unused".to_owned(),
            seed: 0,
            chunk: 65536,
            min_chunk: 65536,
            max_chunk: 65536,
            max_prob: 0.0,
            verify,
            dump_prefix,
        }
    }

    #[test]
    fn split_chunks_of_empty_input_yields_one_empty_chunk() {
        let mut rng = StdRng::seed_from_u64(0);
        let chunks = split_chunks(&[], &args(false, None), &mut rng);
        assert_eq!(chunks, vec![Vec::<u8>::new()]);
    }

    #[test]
    fn split_chunks_covers_the_whole_input() {
        let data = vec![7u8; 200];
        let a = ParsedArgs {
            min_chunk: 10,
            max_chunk: 50,
            ..args(false, None)
        };
        let mut rng = StdRng::seed_from_u64(42);
        let chunks = split_chunks(&data, &a, &mut rng);
        let total: usize = chunks.iter().map(Vec::len).sum();
        assert_eq!(total, data.len());
        assert!(chunks.iter().all(|c| c.len() <= 50));
    }

    #[test]
    fn run_pipeline_reports_matching_stream_counts_for_a_simple_chunk() {
        let compressed = vec![vec![0x04, 0x0C, b'A', b'B', b'C', b'D']];
        let run = run_pipeline(&compressed).unwrap();
        let el_pop = run.el.iter().filter(|e| e.ld_pop).count();
        let c1_pop = run.c1.iter().filter(|c| c.ld_pop).count();
        let cm_pop = run.cm.iter().filter(|c| c.ld_pop).count();
        assert_eq!(run.cs.len(), el_pop);
        assert_eq!(run.cs.len(), c1_pop);
        assert_eq!(run.cs.len(), cm_pop);
    }
}
