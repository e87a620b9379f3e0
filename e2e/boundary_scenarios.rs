//! Boundary and edge-case coverage beyond the straightforward round trips in
//! `round_trip.rs`: line-boundary crossings, RLE saturation, and the
//! offset-doubling acceleration path exercised through the public API
//! instead of by constructing `Element`s directly.

use snzpipe::decompress_chunk;

#[test]
fn copy_header_straddling_a_line_boundary_decodes_correctly() {
    // 6-byte literal, then a short copy (offset=6, length=6) whose tag byte
    // falls on the line-1 boundary (absolute byte index 8) of an 8-byte-wide
    // pipeline.
    let len_field: u8 = 6 - 4;
    let tag = (len_field << 2) | 0b01;
    let compressed = vec![
        0x0C, 0x14, b'A', b'B', b'C', b'D', b'E', b'F', // literal "ABCDEF"
        tag, 6, // short copy, offset=6, actual length 6
    ];
    assert_eq!(decompress_chunk(&compressed).unwrap(), b"ABCDEFABCDEF");
}

#[test]
fn rle_offset_one_at_maximum_medium_copy_length() {
    // 1-byte literal seed, then the longest medium copy (diminished length
    // 63, actual 64) at offset 1: 65 repeated bytes total.
    let compressed = vec![0x41, 0x00, b'Z', 0xFE, 1, 0];
    let out = decompress_chunk(&compressed).unwrap();
    assert_eq!(out.len(), 65);
    assert!(out.iter().all(|&b| b == b'Z'));
}

#[test]
fn small_offset_copy_doubles_across_multiple_cycles() {
    // 7-byte literal seed, then a medium copy (offset=7, diminished length
    // 63, actual 64) whose source window is narrower than the request,
    // forcing `cmd_gen_1`'s offset-doubling acceleration to kick in.
    let mut compressed = vec![0x47, 0x18];
    compressed.extend_from_slice(b"ABCDEFG");
    compressed.extend_from_slice(&[0xFE, 7, 0]);

    let out = decompress_chunk(&compressed).unwrap();
    assert_eq!(out.len(), 71);
    let expected: Vec<u8> = b"ABCDEFG".iter().copied().cycle().take(71).collect();
    assert_eq!(out, expected);
}

#[test]
fn last_line_exactly_fills_a_full_line() {
    // 8-byte literal: output is exactly one full line, no partial tail.
    let compressed = vec![0x08, 0x1C, b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8'];
    assert_eq!(decompress_chunk(&compressed).unwrap(), b"12345678");
}

#[test]
fn last_line_reports_a_partial_tail() {
    // 3-byte literal: output is a single partial line.
    let compressed = vec![0x03, 0x08, b'X', b'Y', b'Z'];
    assert_eq!(decompress_chunk(&compressed).unwrap(), b"XYZ");
}
