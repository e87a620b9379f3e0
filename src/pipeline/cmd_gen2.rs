//! Datapath command generator, stage 2: resolves each partial command into
//! concrete short-term/long-term memory addresses, rotation amounts, and
//! the literal budget left over once the copy has claimed its share of the
//! cycle's output line.
//!
//! Grounded in `cmd_gen_2()` from the reference emulator. `off` is kept
//! signed during the per-cycle arithmetic (copy sources can sit behind the
//! write pointer by more than the current line) and only ever holds
//! `0..W-1` once a cycle finishes.

use super::types::{Command, PartialCommand, W, WB};
use crate::error::PipelineError;

pub struct CmdGen2<I> {
    upstream: I,
    off: i64,
    lt_cnt: i64,
    c1h_valid: bool,
    c1h: Option<PartialCommand>,
    c1_pend: bool,
    cp_len: i64,
    li_len: i64,
    li_off: i64,
    poisoned: bool,
}

impl<I> CmdGen2<I> {
    pub fn new(upstream: I) -> Self {
        Self {
            upstream,
            off: 0,
            lt_cnt: 0,
            c1h_valid: false,
            c1h: None,
            c1_pend: false,
            cp_len: -1,
            li_len: -1,
            li_off: 0,
            poisoned: false,
        }
    }
}

impl<I> Iterator for CmdGen2<I>
where
    I: Iterator<Item = Result<PartialCommand, PipelineError>>,
{
    type Item = Result<Command, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.poisoned {
            return None;
        }

        if !self.c1h_valid {
            match self.upstream.next()? {
                Ok(c1h) => {
                    self.c1_pend = c1h.cp_len.is_some() || c1h.li_val;
                    self.c1h = Some(c1h);
                    self.c1h_valid = true;
                }
                Err(e) => {
                    self.poisoned = true;
                    return Some(Err(e));
                }
            }
        }
        let c1h = self.c1h.unwrap();

        if self.li_len < 0 && self.c1_pend {
            self.cp_len = c1h.cp_len.map(|v| v as i64).unwrap_or(-1);
            if c1h.li_val {
                self.li_len = c1h.li_len as i64;
            }
            self.li_off = c1h.li_off as i64;
            self.c1_pend = false;
        }

        let py_start = self.off as usize;

        let cp_src_rel = self.off - c1h.cp_off as i64;
        let cp_src_rc1_line = cp_src_rel >> WB;
        let cp_src_rc1_offs = cp_src_rel & (W as i64 - 1);

        let st_addr = ((!cp_src_rc1_line) & 31) as u32;

        let lt_val = cp_src_rc1_line < -31 && self.cp_len >= 0;
        let lt_addr = self.lt_cnt + cp_src_rc1_line;

        let lt_swap = (lt_addr & 1) != 0;
        let lt_adev = (((lt_addr + 1) >> 1) & (32767 >> WB)) as u32;
        let lt_adod = ((lt_addr >> 1) & (32767 >> WB)) as u32;

        let cp_rol = if c1h.cp_rle {
            cp_src_rc1_offs
        } else {
            (cp_src_rc1_offs - self.off) & (2 * W as i64 - 1)
        } as usize;

        let budget = (self.cp_len & (2 * W as i64 - 1)) ^ (W as i64 - 1);

        self.off += self.cp_len + 1;
        self.cp_len = -1;
        let cp_end = self.off as usize;

        let li_chunk_len = {
            let mut v = (self.li_len + 1)
                .min(2 * W as i64 - self.li_off)
                .min(budget);
            if self.li_off >= W as i64 {
                v = 0;
            }
            v
        };

        let li_rol = ((self.li_off - self.off) & (2 * W as i64 - 1)) as usize;

        self.off += li_chunk_len;
        self.li_off += li_chunk_len;
        self.li_len -= li_chunk_len;
        let li_end = self.off as usize;

        if self.off >= W as i64 {
            self.lt_cnt += 1;
        }
        self.off &= W as i64 - 1;

        let ld_pend = self.li_len >= 0 && self.li_off < W as i64;
        let finishing = c1h.last && (self.li_len >= 0 || self.cp_len >= 0);

        let mut ld_pop = false;
        let mut last = false;
        if self.c1h_valid && !(self.cp_len >= 0 || self.c1_pend || ld_pend || finishing) {
            self.c1h_valid = false;
            ld_pop = c1h.ld_pop;
            last = c1h.last;
            self.li_off -= W as i64;
            if last {
                self.off = 0;
                self.lt_cnt = 0;
            }
        }

        Some(Ok(Command {
            lt_val,
            lt_adev,
            lt_adod,
            lt_swap,
            st_addr,
            cp_rol,
            cp_rle: c1h.cp_rle,
            cp_end,
            li_rol,
            li_end,
            ld_pop,
            last,
            py_data: c1h.py_data,
            py_start,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pc(cp_off: u16, cp_len: Option<u8>, cp_rle: bool, last: bool) -> PartialCommand {
        PartialCommand {
            cp_off,
            cp_len,
            cp_rle,
            li_val: false,
            li_off: 0,
            li_len: 0,
            ld_pop: last,
            last,
            py_data: [0; 2 * W],
        }
    }

    #[test]
    fn no_copy_pure_literal_advances_by_the_literal_length() {
        let mut p = pc(0, None, false, true);
        p.li_val = true;
        p.li_off = 2;
        p.li_len = 3; // diminished-one: actual length 4
        let mut gen = CmdGen2::new(std::iter::once(Ok(p)));
        let cmd = gen.next().unwrap().unwrap();
        assert_eq!(cmd.py_start, 0);
        assert_eq!(cmd.cp_end, 0); // no copy: off didn't move for the copy leg
        assert!(cmd.li_end > cmd.cp_end);
        assert!(cmd.last);
    }

    #[test]
    fn rle_copy_sets_cp_rle_through() {
        let p = pc(1, Some(3), true, true);
        let mut gen = CmdGen2::new(std::iter::once(Ok(p)));
        let cmd = gen.next().unwrap().unwrap();
        assert!(cmd.cp_rle);
        assert_eq!(cmd.cp_end, 4); // cp_len (diminished 3) + 1
    }
}
