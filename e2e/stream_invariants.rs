//! Exercises the five pipeline stages individually and checks the
//! stream-count invariant the hardware relies on: every `CompressedSingle`
//! line pulled from the source must correspond to exactly one `ld_pop` at
//! each of the element, partial-command, and command stages.

use snzpipe::pipeline::{CmdGen1, CmdGen2, Datapath, DataSource, ElementDecoder, PreDecoder};
use snzpipe::PipelineError;

fn pop_counts(compressed: Vec<u8>) -> (usize, usize, usize, usize) {
    let cs: Vec<_> = DataSource::new(std::iter::once(compressed)).collect();
    let cd: Vec<_> = PreDecoder::new(cs.iter().copied()).collect();
    let el: Vec<_> = ElementDecoder::new(cd.iter().copied())
        .collect::<Result<Vec<_>, PipelineError>>()
        .unwrap();
    let c1: Vec<_> = CmdGen1::new(el.iter().copied().map(Ok::<_, PipelineError>))
        .collect::<Result<Vec<_>, PipelineError>>()
        .unwrap();
    let cm: Vec<_> = CmdGen2::new(c1.iter().copied().map(Ok::<_, PipelineError>))
        .collect::<Result<Vec<_>, PipelineError>>()
        .unwrap();
    let de: Vec<_> = Datapath::new(cm.iter().copied().map(Ok::<_, PipelineError>))
        .collect::<Result<Vec<_>, PipelineError>>()
        .unwrap();

    let el_pop = el.iter().filter(|e| e.ld_pop).count();
    let c1_pop = c1.iter().filter(|c| c.ld_pop).count();
    let cm_pop = cm.iter().filter(|c| c.ld_pop).count();
    assert!(de.last().map(|d| d.last).unwrap_or(false));
    (cs.len(), el_pop, c1_pop, cm_pop)
}

#[test]
fn short_literal_has_matching_pop_counts() {
    let (cs, el_pop, c1_pop, cm_pop) = pop_counts(vec![0x04, 0x0C, b'A', b'B', b'C', b'D']);
    assert_eq!(cs, el_pop);
    assert_eq!(cs, c1_pop);
    assert_eq!(cs, cm_pop);
}

#[test]
fn literal_plus_copy_has_matching_pop_counts() {
    let compressed = vec![
        0x10, 0x1C, b'A', b'B', b'C', b'D', b'E', b'F', b'G', b'H', 0x1E, 8, 0,
    ];
    let (cs, el_pop, c1_pop, cm_pop) = pop_counts(compressed);
    assert_eq!(cs, el_pop);
    assert_eq!(cs, c1_pop);
    assert_eq!(cs, cm_pop);
}

#[test]
fn multi_line_literal_has_matching_pop_counts() {
    let payload = b"ABCDEFGHIJKLMNOPQRST";
    let mut compressed = vec![0x14, 0x4C];
    compressed.extend_from_slice(payload);
    let (cs, el_pop, c1_pop, cm_pop) = pop_counts(compressed);
    assert_eq!(cs, el_pop);
    assert_eq!(cs, c1_pop);
    assert_eq!(cs, cm_pop);
}

#[test]
fn wide_self_referencing_copy_has_matching_pop_counts() {
    let mut compressed = vec![0x47, 0x18];
    compressed.extend_from_slice(b"ABCDEFG");
    compressed.extend_from_slice(&[0xFE, 7, 0]);
    let (cs, el_pop, c1_pop, cm_pop) = pop_counts(compressed);
    assert_eq!(cs, el_pop);
    assert_eq!(cs, c1_pop);
    assert_eq!(cs, cm_pop);
}
