//! Wires the five pipeline stages together: data source, pre-decoder,
//! element decoder, and the two datapath command generator stages feeding
//! the datapath itself.
//!
//! Each stage is a plain `Iterator` adapter, mirroring the generator
//! pipeline in the reference emulator (`pre_decoder(decoder(cmd_gen_1(...)))`
//! and so on) stage for stage rather than collecting intermediate buffers.

pub mod cmd_gen1;
pub mod cmd_gen2;
pub mod datapath;
pub mod decoder;
pub mod pre_decoder;
pub mod source;
pub mod types;

pub use cmd_gen1::CmdGen1;
pub use cmd_gen2::CmdGen2;
pub use datapath::Datapath;
pub use decoder::ElementDecoder;
pub use pre_decoder::PreDecoder;
pub use source::DataSource;
pub use types::{
    Command, CompressedDouble, CompressedSingle, Decompressed, Element, PartialCommand, W, WB,
};

use crate::error::PipelineError;

/// The full five-stage pipeline over a sequence of raw compressed chunks,
/// yielding one decompressed line at a time.
pub struct ChunkDecoder<I> {
    inner: Datapath<CmdGen2<CmdGen1<ElementDecoder<PreDecoder<DataSource<I>>>>>>,
}

impl<I> ChunkDecoder<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    pub fn new(chunks: I) -> Self {
        let source = DataSource::new(chunks);
        let pre = PreDecoder::new(source);
        let decoded = ElementDecoder::new(pre);
        let g1 = CmdGen1::new(decoded);
        let g2 = CmdGen2::new(g1);
        Self {
            inner: Datapath::new(g2),
        }
    }
}

impl<I> Iterator for ChunkDecoder<I>
where
    I: Iterator<Item = Vec<u8>>,
{
    type Item = Result<Decompressed, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Reads a chunk's leading uncompressed-length varint, returning its value
/// and consumed byte length. Returns `None` if more than 5 continuation
/// bytes are present (a malformed varint the core itself doesn't reject,
/// per its line-level contract).
fn read_length_varint(data: &[u8]) -> Option<u64> {
    let mut value = 0u64;
    for (i, &byte) in data.iter().take(5).enumerate() {
        value |= ((byte & 0x7f) as u64) << (7 * i);
        if byte & 0x80 == 0 {
            return Some(value);
        }
    }
    None
}

/// Decompresses a single raw Snappy chunk, checking the result against the
/// chunk's declared uncompressed length. This bounds check is not part of
/// the core pipeline; it's the minimal amount of caller bookkeeping needed
/// to turn `BoundsViolation` from a documented possibility into an actual
/// check, the way a verifying harness around the core would.
pub fn decompress_chunk(compressed: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let declared = read_length_varint(compressed);

    let mut out = Vec::new();
    for line in ChunkDecoder::new(std::iter::once(compressed.to_vec())) {
        let line = line?;
        out.extend_from_slice(&line.data[..line.cnt]);
        if line.last {
            break;
        }
    }

    if let Some(declared) = declared {
        if declared != out.len() as u64 {
            return Err(PipelineError::BoundsViolation);
        }
    }

    Ok(out)
}

/// Decompresses a sequence of raw Snappy chunks, returning one output
/// buffer per input chunk, in order. Runs every chunk through a single
/// shared pipeline instance, the same way the hardware processes a
/// continuous stream of back-to-back chunks.
pub fn decompress_chunks<I>(chunks: I) -> Result<Vec<Vec<u8>>, PipelineError>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    let mut results = Vec::new();
    let mut current = Vec::new();
    for line in ChunkDecoder::new(chunks.into_iter()) {
        let line = line?;
        current.extend_from_slice(&line.data[..line.cnt]);
        if line.last {
            results.push(std::mem::take(&mut current));
        }
    }
    Ok(results)
}

/// Checks a materialized `Decompressed` line stream against the sequence of
/// uncompressed chunks it's supposed to reproduce, chunk by chunk. Grounded
/// in the reference emulator's `verifier()` generator.
pub fn verify_chunks(lines: &[Decompressed], expected: &[Vec<u8>]) -> Result<(), PipelineError> {
    let mut lines = lines.iter();
    for chunk in expected {
        let mut idx = 0usize;
        loop {
            let transfer = lines.next().ok_or(PipelineError::PipelineDesync)?;
            let expected_slice = chunk
                .get(idx..idx + transfer.cnt)
                .ok_or(PipelineError::BoundsViolation)?;
            if &transfer.data[..transfer.cnt] != expected_slice {
                return Err(PipelineError::BoundsViolation);
            }
            idx += transfer.cnt;
            if transfer.last {
                break;
            }
        }
        if idx != chunk.len() {
            return Err(PipelineError::BoundsViolation);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chunk_round_trips_to_nothing() {
        let out = decompress_chunk(&[0x00]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn single_literal_chunk_round_trips() {
        // varint(4)=4, literal header len=4 (t=3 -> byte 0x0C), then "ABCD".
        let compressed = vec![0x04, 0x0C, b'A', b'B', b'C', b'D'];
        let out = decompress_chunk(&compressed).unwrap();
        assert_eq!(out, b"ABCD");
    }

    #[test]
    fn declared_length_mismatch_is_a_bounds_violation() {
        // Declares 99 bytes but only 4 are actually present.
        let compressed = vec![0x63, 0x0C, b'A', b'B', b'C', b'D'];
        let err = decompress_chunk(&compressed).unwrap_err();
        assert_eq!(err, PipelineError::BoundsViolation);
    }

    #[test]
    fn multiple_chunks_round_trip_independently() {
        let a = vec![0x04, 0x0C, b'A', b'B', b'C', b'D'];
        let b = vec![0x03, 0x08, b'E', b'F', b'G'];
        let results = decompress_chunks(vec![a, b]).unwrap();
        assert_eq!(results, vec![b"ABCD".to_vec(), b"EFG".to_vec()]);
    }

    #[test]
    fn verify_chunks_accepts_a_matching_stream() {
        let compressed = vec![0x04, 0x0C, b'A', b'B', b'C', b'D'];
        let lines: Vec<_> = ChunkDecoder::new(std::iter::once(compressed))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        verify_chunks(&lines, &[b"ABCD".to_vec()]).unwrap();
    }

    #[test]
    fn verify_chunks_rejects_a_mismatched_stream() {
        let compressed = vec![0x04, 0x0C, b'A', b'B', b'C', b'D'];
        let lines: Vec<_> = ChunkDecoder::new(std::iter::once(compressed))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let err = verify_chunks(&lines, &[b"WXYZ".to_vec()]).unwrap_err();
        assert_eq!(err, PipelineError::BoundsViolation);
    }
}
