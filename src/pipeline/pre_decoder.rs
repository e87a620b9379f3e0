//! The pre-decoder stage: pairs each compressed line with its successor and
//! locates the first element byte past the chunk's length varint.
//!
//! Grounded in `pre_decoder()` from the reference emulator. The Python
//! version builds the (current, next) pairing with a nested generator
//! (`parallelize`); here that is flattened into an explicit one-slot queue
//! since a single input line can produce up to two output pairs (the normal
//! lookahead pair, and a synthetic zero-padded pair for the tail of a
//! chunk).

use super::types::{CompressedDouble, CompressedSingle, W};

pub struct PreDecoder<I> {
    upstream: I,
    prev: Option<CompressedSingle>,
    busy: bool,
    queued_pair: Option<(CompressedSingle, CompressedSingle)>,
}

impl<I> PreDecoder<I> {
    pub fn new(upstream: I) -> Self {
        Self {
            upstream,
            prev: None,
            busy: false,
            queued_pair: None,
        }
    }
}

impl<I> PreDecoder<I>
where
    I: Iterator<Item = CompressedSingle>,
{
    fn next_pair(&mut self) -> Option<(CompressedSingle, CompressedSingle)> {
        if let Some(pair) = self.queued_pair.take() {
            return Some(pair);
        }
        loop {
            let cur = self.upstream.next()?;
            let emitted = self.prev.map(|prev| (prev, cur));

            if cur.last {
                let zero = CompressedSingle {
                    data: [0u8; W],
                    last: false,
                    endi: (W - 1) as u8,
                };
                self.prev = None;
                return match emitted {
                    Some(pair) => {
                        self.queued_pair = Some((cur, zero));
                        Some(pair)
                    }
                    None => Some((cur, zero)),
                };
            }

            self.prev = Some(cur);
            if let Some(pair) = emitted {
                return Some(pair);
            }
            // prev was None (very first line of the stream): keep pulling.
        }
    }
}

impl<I> Iterator for PreDecoder<I>
where
    I: Iterator<Item = CompressedSingle>,
{
    type Item = CompressedDouble;

    fn next(&mut self) -> Option<CompressedDouble> {
        let (cur, nxt) = self.next_pair()?;

        let first = !self.busy;
        self.busy = !cur.last;

        let mut start = (W - 1) as u8;
        if first {
            for (i, &byte) in cur.data.iter().enumerate() {
                if byte & 0x80 == 0 {
                    start = i as u8;
                    break;
                }
            }
            start += 1;
        } else {
            start = 0;
        }

        let py_endi = if cur.last {
            cur.endi as usize
        } else if nxt.last {
            W + nxt.endi as usize
        } else {
            2 * W - 1
        };

        let mut data = [0u8; 2 * W];
        data[..W].copy_from_slice(&cur.data);
        data[W..].copy_from_slice(&nxt.data);

        Some(CompressedDouble {
            data,
            first,
            start,
            last: cur.last,
            endi: cur.endi,
            py_endi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::source::DataSource;

    #[test]
    fn single_line_chunk_marks_first_and_last() {
        let mut pd = PreDecoder::new(std::iter::once(CompressedSingle {
            data: [0x0Cu8, 0, 0, 0, 0, 0, 0, 0],
            last: true,
            endi: 0,
        }));
        let d = pd.next().unwrap();
        assert!(d.first);
        assert!(d.last);
        assert_eq!(d.start, 1);
        assert!(pd.next().is_none());
    }

    #[test]
    fn multi_line_chunk_sets_first_only_once() {
        let data = vec![0u8; W * 3 + 1];
        let mut pd = PreDecoder::new(DataSource::new(std::iter::once(data)));
        let first = pd.next().unwrap();
        assert!(first.first);
        let second = pd.next().unwrap();
        assert!(!second.first);
        let third = pd.next().unwrap();
        assert!(!third.first);
        assert!(third.last);
    }

    #[test]
    fn varint_with_continuation_bits_advances_start() {
        // 0x80 marks a continuation byte; two continuation bytes then a
        // terminator means start = 3.
        let mut pd = PreDecoder::new(std::iter::once(CompressedSingle {
            data: [0x80, 0x80, 0x01, 0, 0, 0, 0, 0],
            last: true,
            endi: (W - 1) as u8,
        }));
        let d = pd.next().unwrap();
        assert_eq!(d.start, 3);
    }

    #[test]
    fn resets_busy_flag_between_chunks() {
        let chunks = vec![vec![0u8; W * 2], vec![0u8; W]];
        let mut pd = PreDecoder::new(DataSource::new(chunks.into_iter()));
        let a = pd.next().unwrap();
        assert!(a.first);
        let b = pd.next().unwrap();
        assert!(!b.first);
        assert!(b.last);
        let c = pd.next().unwrap();
        assert!(c.first, "next chunk's first line must reset `first`");
    }
}
