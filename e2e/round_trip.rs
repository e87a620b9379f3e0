//! End-to-end round-trip coverage for the five-stage decompressor pipeline.
//!
//! Each fixture is a hand-built raw-Snappy chunk (varint length prefix plus
//! literal/copy elements per the format grammar), since compression is a
//! non-goal of this crate and the suite must run without an external
//! encoder installed.

use snzpipe::{decompress_chunk, decompress_chunks};

#[test]
fn empty_chunk_decompresses_to_nothing() {
    let out = decompress_chunk(&[0x00]).unwrap();
    assert!(out.is_empty());
}

#[test]
fn short_literal_round_trips() {
    // varint(4), literal tag for length 4 (t=3 -> 0x0C), payload.
    let compressed = vec![0x04, 0x0C, b'A', b'B', b'C', b'D'];
    assert_eq!(decompress_chunk(&compressed).unwrap(), b"ABCD");
}

#[test]
fn literal_followed_by_a_self_referencing_medium_copy() {
    // 8-byte literal "ABCDEFGH", then a copy of offset=8 length=8 that
    // repeats it, for a 16-byte output.
    let compressed = vec![
        0x10, // varint(16)
        0x1C, b'A', b'B', b'C', b'D', b'E', b'F', b'G', b'H', // literal len 8
        0x1E, 8, 0, // medium copy, diminished len 7 (actual 8), offset 8
    ];
    assert_eq!(decompress_chunk(&compressed).unwrap(), b"ABCDEFGHABCDEFGH");
}

#[test]
fn rle_offset_one_repeats_the_seed_byte() {
    // 1-byte literal 'Z', then a short copy of offset=1 length=10 (RLE).
    let compressed = vec![0x0B, 0x00, b'Z', 0x19, 1];
    let out = decompress_chunk(&compressed).unwrap();
    assert_eq!(out, vec![b'Z'; 11]);
}

#[test]
fn literal_spanning_three_lines_reassembles_in_order() {
    // A 20-byte direct literal (t=19 -> 0x4C) on an 8-byte-wide pipeline
    // spans three W=8 lines; the windowed decoder must still reassemble it
    // byte-for-byte in order.
    let payload = b"ABCDEFGHIJKLMNOPQRST";
    let mut compressed = vec![0x14, 0x4C];
    compressed.extend_from_slice(payload);
    assert_eq!(decompress_chunk(&compressed).unwrap(), payload);
}

#[test]
fn exact_multiple_of_line_width_output() {
    // 16-byte direct literal (t=15 -> 0x3C): output is exactly two full lines.
    let payload = b"ABCDEFGHIJKLMNOP";
    let mut compressed = vec![0x10, 0x3C];
    compressed.extend_from_slice(payload);
    assert_eq!(decompress_chunk(&compressed).unwrap(), payload);
}

#[test]
fn independent_chunks_do_not_share_history() {
    let a = vec![0x04, 0x0C, b'A', b'B', b'C', b'D'];
    let b = vec![0x0B, 0x00, b'Z', 0x19, 1];
    let results = decompress_chunks(vec![a, b]).unwrap();
    assert_eq!(results[0], b"ABCD");
    assert_eq!(results[1], vec![b'Z'; 11]);
}
