//! Error-path coverage: malformed input and declared-length bookkeeping.

use snzpipe::pipeline::{ChunkDecoder, DataSource, ElementDecoder, PreDecoder};
use snzpipe::{decompress_chunk, PipelineError};

#[test]
fn five_byte_copy_tag_is_rejected() {
    // Tag byte 0b11 selects the unsupported 5-byte copy encoding.
    let compressed = vec![0x01, 0b11, 0, 0, 0, 0];
    let err = decompress_chunk(&compressed).unwrap_err();
    assert_eq!(err, PipelineError::MalformedElement);
}

#[test]
fn element_decoder_poisons_itself_after_a_malformed_element() {
    let compressed = vec![0x01, 0b11, 0, 0, 0, 0];
    let pd = PreDecoder::new(DataSource::new(std::iter::once(compressed)));
    let mut dec = ElementDecoder::new(pd);
    assert_eq!(dec.next(), Some(Err(PipelineError::MalformedElement)));
    assert_eq!(dec.next(), None);
}

#[test]
fn declared_length_longer_than_actual_output_is_a_bounds_violation() {
    // Declares 99 bytes, but the literal only supplies 4.
    let compressed = vec![0x63, 0x0C, b'A', b'B', b'C', b'D'];
    let err = decompress_chunk(&compressed).unwrap_err();
    assert_eq!(err, PipelineError::BoundsViolation);
}

#[test]
fn declared_length_shorter_than_actual_output_is_a_bounds_violation() {
    // Declares 2 bytes, but the literal supplies 4.
    let compressed = vec![0x02, 0x0C, b'A', b'B', b'C', b'D'];
    let err = decompress_chunk(&compressed).unwrap_err();
    assert_eq!(err, PipelineError::BoundsViolation);
}

#[test]
fn full_pipeline_run_aborts_on_the_first_malformed_chunk_in_a_sequence() {
    let good = vec![0x04, 0x0C, b'A', b'B', b'C', b'D'];
    let bad = vec![0x01, 0b11, 0, 0, 0, 0];
    let mut decoder = ChunkDecoder::new(vec![good, bad].into_iter());
    // The good chunk's single line comes through fine...
    assert!(decoder.next().unwrap().is_ok());
    // ...and the malformed one surfaces as an error rather than silently
    // truncating the stream.
    assert!(decoder.next().unwrap().is_err());
}
