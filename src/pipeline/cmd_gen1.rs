//! Datapath command generator, stage 1: splits each element's copy into
//! `W - 1`-byte-or-smaller chunks and applies run-length acceleration.
//!
//! Grounded in `cmd_gen_1()` from the reference emulator. The offset
//! doubling trick (`elh_cp_off <<= 1`) widens the effective copy source as
//! soon as enough of it has been written back, so a self-referencing copy
//! (the common "repeat the last N bytes" pattern) converges in `log2(len)`
//! cycles instead of one byte per cycle.

use super::types::{Element, PartialCommand, W};
use crate::error::PipelineError;

pub struct CmdGen1<I> {
    upstream: I,
    elh_valid: bool,
    elh: Option<Element>,
    cp_rem: i32,
    elh_cp_off: u32,
    poisoned: bool,
}

impl<I> CmdGen1<I> {
    pub fn new(upstream: I) -> Self {
        Self {
            upstream,
            elh_valid: false,
            elh: None,
            cp_rem: -1,
            elh_cp_off: 0,
            poisoned: false,
        }
    }
}

impl<I> Iterator for CmdGen1<I>
where
    I: Iterator<Item = Result<Element, PipelineError>>,
{
    type Item = Result<PartialCommand, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }

        if !self.elh_valid {
            match self.upstream.next()? {
                Ok(elh) => {
                    if elh.cp_val {
                        self.cp_rem = elh.cp_len as i32;
                    }
                    self.elh_cp_off = elh.cp_off as u32;
                    self.elh = Some(elh);
                    self.elh_valid = true;
                }
                Err(e) => {
                    self.poisoned = true;
                    return Some(Err(e));
                }
            }
        }
        let elh = self.elh.unwrap();

        let cp_off = self.elh_cp_off;
        let mut cp_len = self.cp_rem.min((W - 1) as i32);
        let cp_rle;

        if self.elh_cp_off <= 1 {
            cp_rle = true;
        } else {
            if cp_len >= self.elh_cp_off as i32 {
                cp_len = self.elh_cp_off as i32 - 1;
                if self.elh_cp_off >= W as u32 {
                    self.poisoned = true;
                    return Some(Err(PipelineError::PipelineDesync));
                }
                self.elh_cp_off <<= 1;
            }
            cp_rle = false;
        }

        self.cp_rem -= cp_len + 1;
        let advance = self.cp_rem < 0;
        if advance {
            self.elh_valid = false;
        }

        Some(Ok(PartialCommand {
            cp_off: cp_off as u16,
            cp_len: if cp_len >= 0 { Some(cp_len as u8) } else { None },
            cp_rle,
            li_val: elh.li_val && advance,
            li_off: elh.li_off,
            li_len: elh.li_len,
            ld_pop: elh.ld_pop && advance,
            last: elh.last && advance,
            py_data: elh.py_data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(cp_val: bool, cp_off: u16, cp_len: u8, last: bool) -> Element {
        Element {
            cp_val,
            cp_off,
            cp_len,
            li_val: false,
            li_off: 0,
            li_len: 0,
            ld_pop: last,
            last,
            py_data: [0; 2 * W],
        }
    }

    #[test]
    fn offset_one_uses_rle_in_a_single_chunk() {
        // offset=1 (stored diminished-one as cp_off=1... careful: cp_off in
        // Element is the raw field, already the real offset), len=63 (diminished).
        let mut gen = CmdGen1::new(std::iter::once(Ok(element(true, 1, 63, true))));
        let cmd = gen.next().unwrap().unwrap();
        assert!(cmd.cp_rle);
        assert_eq!(cmd.cp_len, Some((W - 1) as u8));
    }

    #[test]
    fn large_offset_doubles_each_cycle_until_it_covers_the_request() {
        // offset=7, requested diminished length 63 (actual 64 bytes) forces
        // several chunks as elh_cp_off doubles: 7 -> 14 -> 28 -> 56 -> ...
        let mut gen = CmdGen1::new(std::iter::once(Ok(element(true, 7, 63, true))));
        let mut chunks = Vec::new();
        loop {
            let cmd = gen.next().unwrap().unwrap();
            let last = cmd.last;
            chunks.push(cmd);
            if last {
                break;
            }
        }
        assert!(chunks.len() > 1, "a wide copy should split across cycles");
        assert!(!chunks[0].cp_rle);
        assert_eq!(chunks[0].cp_len, Some(6)); // min(63, 7-1)
    }

    #[test]
    fn literal_only_element_passes_through_in_one_cycle() {
        let mut e = element(false, 0, 0, true);
        e.li_val = true;
        e.li_off = 3;
        e.li_len = 10;
        let mut gen = CmdGen1::new(std::iter::once(Ok(e)));
        let cmd = gen.next().unwrap().unwrap();
        assert!(cmd.cp_len.is_none());
        assert!(cmd.li_val);
        assert_eq!(cmd.li_len, 10);
        assert!(cmd.last);
    }
}
