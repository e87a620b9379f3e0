//! The element decoder stage: turns a doubled compressed-line window into
//! one [`Element`] record per Snappy element (copy and/or literal header).
//!
//! Grounded in `decoder()` from the reference emulator. `off` tracks the
//! current byte offset within the doubled window; `cdh.endi` (not
//! `py_endi`) bounds each line — it equals `W - 1` for every line except
//! the true last line of a chunk, so `off > cdh.endi` is exactly the signal
//! to roll the window forward by one line.

use super::types::{CompressedDouble, Element, W};
use crate::error::PipelineError;

pub struct ElementDecoder<I> {
    upstream: I,
    off: usize,
    cdh: Option<CompressedDouble>,
    poisoned: bool,
}

impl<I> ElementDecoder<I> {
    pub fn new(upstream: I) -> Self {
        Self {
            upstream,
            off: 0,
            cdh: None,
            poisoned: false,
        }
    }
}

impl<I> Iterator for ElementDecoder<I>
where
    I: Iterator<Item = CompressedDouble>,
{
    type Item = Result<Element, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }

        if self.cdh.is_none() {
            let cdh = self.upstream.next()?;
            if cdh.first {
                self.off = cdh.start as usize;
            }
            self.cdh = Some(cdh);
        }
        let cdh = self.cdh.unwrap();
        let data = cdh.data;
        let endi = cdh.endi as usize;

        // Copy element.
        let mut ofi = self.off & (W - 1);
        let (cp_val, cp_off, cp_len) = if self.off > endi || data[ofi] & 3 == 0 {
            (false, 0u16, 0u8)
        } else if data[ofi] & 3 == 1 {
            let off_val = (((data[ofi] >> 5) & 7) as u16) << 8 | data[ofi + 1] as u16;
            let len_val = ((data[ofi] >> 2) & 7) + 3;
            self.off += 2;
            (true, off_val, len_val)
        } else if data[ofi] & 3 == 2 {
            let off_val = data[ofi + 1] as u16 | ((data[ofi + 2] as u16) << 8);
            let len_val = (data[ofi] >> 2) & 63;
            self.off += 3;
            (true, off_val, len_val)
        } else {
            self.poisoned = true;
            return Some(Err(PipelineError::MalformedElement));
        };

        // Literal header.
        ofi = self.off & (W - 1);
        let li_val = self.off <= endi && data[ofi] & 3 == 0;
        let t = data[ofi] >> 2;
        let (li_len, li_hdlen): (u32, usize) = if t == 60 {
            (data[ofi + 1] as u32, 2)
        } else if t == 61 {
            ((data[ofi + 2] as u32) << 8 | data[ofi + 1] as u32, 3)
        } else if t > 61 {
            if li_val {
                self.poisoned = true;
                return Some(Err(PipelineError::MalformedElement));
            }
            (0, 1)
        } else {
            (t as u32, 1)
        };

        let li_off = if li_val { self.off + li_hdlen } else { 0 };
        if li_val {
            self.off += li_hdlen + li_len as usize + 1;
        }

        let mut last = false;
        let mut ld_pop = false;
        if self.off > endi {
            // On the true last line of a chunk `endi` can be below `W - 1`,
            // so this can underflow; the result is discarded immediately
            // since the next pull always has `first` set and overwrites
            // `off` from the new window's `start`.
            self.off = self.off.saturating_sub(W);
            ld_pop = true;
            last = cdh.last;
            self.cdh = None;
        }

        Some(Ok(Element {
            cp_val,
            cp_off,
            cp_len,
            li_val,
            li_off,
            li_len,
            ld_pop,
            last,
            py_data: data,
        }))
    }
}
