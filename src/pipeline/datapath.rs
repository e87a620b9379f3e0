//! The datapath stage: materializes each resolved command into decompressed
//! output bytes, modeling the short-term (SRL) and long-term (line ring)
//! history memories a hardware implementation would use instead of a flat
//! output buffer.
//!
//! Grounded in `datapath()` and the `SRL` helper class from the reference
//! emulator.

use std::collections::VecDeque;

use super::types::{Command, Decompressed, W};
use crate::error::PipelineError;

/// Emulates a 32-deep shift-register-based lookup, as found in Xilinx FPGA
/// fabric: a fixed-depth ring buffer addressed relative to its write head.
struct Srl {
    data: [u8; 32],
    ptr: i64,
}

impl Srl {
    fn new() -> Self {
        Self {
            data: [0; 32],
            ptr: 0,
        }
    }

    fn push(&mut self, value: u8) {
        self.ptr = (self.ptr - 1).rem_euclid(32);
        self.data[self.ptr as usize] = value;
    }

    fn get(&self, index: i64) -> u8 {
        self.data[(self.ptr + index).rem_euclid(32) as usize]
    }
}

/// Number of long-term memory lines: one per possible absolute line address
/// at 12-bit (`15 - WB`) granularity, doubled for the even/odd bank split.
const LT_LINES: usize = 1 << (16 - super::types::WB as usize);

pub struct Datapath<I> {
    upstream: I,
    st: [Srl; W],
    lt: Vec<[u8; W]>,
    wr_ptr: usize,
    oh_valid: [bool; W],
    oh_data: [u8; W],
    pending: VecDeque<Decompressed>,
    poisoned: bool,
}

impl<I> Datapath<I> {
    pub fn new(upstream: I) -> Self {
        Self {
            upstream,
            st: std::array::from_fn(|_| Srl::new()),
            lt: vec![[0u8; W]; LT_LINES],
            wr_ptr: 0,
            oh_valid: [false; W],
            oh_data: [0; W],
            pending: VecDeque::new(),
            poisoned: false,
        }
    }

    fn step(&mut self, cm: Command) {
        let mut cp_sel = [0u8; W];
        let mut rol_sel = [0usize; W];
        let mut mux_sel = [false; W];
        let mut li_la = [false; W];
        let mut st_la = [false; W];

        let cp_end = cm.cp_end as i64;
        let li_end = cm.li_end as i64;
        let prec = (li_end - W as i64).max(0);

        for byte in 0..W {
            let b = byte as i64;
            let mux = if b < cp_end - W as i64 {
                true
            } else if b < li_end - W as i64 {
                false
            } else {
                b < cp_end
            };

            let cp_rol_byte = if cm.cp_rle {
                (cm.cp_rol as i64 - b).rem_euclid(2 * W as i64) as usize
            } else {
                cm.cp_rol
            };
            let rol = if mux { cp_rol_byte } else { cm.li_rol };

            let mut cpl = (b - cm.cp_rol as i64 - prec).rem_euclid(2 * W as i64) >= W as i64;
            let lil = (b - cm.li_rol as i64 - prec).rem_euclid(2 * W as i64) >= W as i64;
            if cm.cp_rle {
                cpl = false;
            }

            let cps = 2 * (cm.lt_val as u8) + ((cpl ^ cm.lt_swap) as u8);

            cp_sel[byte] = cps;
            rol_sel[byte] = rol;
            mux_sel[byte] = mux;
            li_la[byte] = lil;
            st_la[byte] = cpl;
        }

        let li_data: [u8; W] = std::array::from_fn(|byte| {
            cm.py_data[byte + W * (li_la[byte] as usize)]
        });
        let st_data: [u8; W] = std::array::from_fn(|byte| {
            let idx = cm.st_addr as i64 - (st_la[byte] as i64) + (self.oh_valid[byte] as i64);
            self.st[byte].get(idx)
        });
        let le_data = self.lt[cm.lt_adev as usize * 2];
        let lo_data = self.lt[cm.lt_adod as usize * 2 + 1];

        let mut cp_data = [0u8; W];
        for byte in 0..W {
            cp_data[byte] = match cp_sel[byte] {
                2 => le_data[byte],
                3 => lo_data[byte],
                _ => st_data[byte],
            };
        }

        let mut mux_data = [0u8; W];
        for byte in 0..W {
            let src = if mux_sel[byte] { &cp_data } else { &li_data };
            mux_data[byte] = src[(rol_sel[byte] + byte) & (W - 1)];
        }

        for byte in 0..W {
            if !self.oh_valid[byte] && (byte as i64) < li_end {
                self.oh_data[byte] = mux_data[byte];
                self.oh_valid[byte] = true;
                self.st[byte].push(mux_data[byte]);
            }
        }

        if cm.li_end >= W || cm.last {
            let data = self.oh_data;

            if cm.li_end > 0 {
                self.lt[self.wr_ptr] = data;
                self.wr_ptr += 1;
            }

            if cm.last {
                self.pending.push_back(Decompressed {
                    data,
                    last: cm.li_end <= W,
                    cnt: W.min(cm.li_end),
                });
            } else {
                self.pending.push_back(Decompressed {
                    data,
                    last: false,
                    cnt: W,
                });
            }

            self.oh_valid = [false; W];
            if cm.last {
                self.wr_ptr = 0;
            }
        }

        for byte in 0..(W - 1) {
            if (byte + W) < cm.li_end {
                self.oh_data[byte] = mux_data[byte];
                self.oh_valid[byte] = true;
                self.st[byte].push(mux_data[byte]);
            }
        }

        if cm.last && cm.li_end > W {
            self.pending.push_back(Decompressed {
                data: self.oh_data,
                last: true,
                cnt: cm.li_end - W,
            });
            self.oh_valid = [false; W];
        }
    }
}

impl<I> Iterator for Datapath<I>
where
    I: Iterator<Item = Result<Command, PipelineError>>,
{
    type Item = Result<Decompressed, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(d) = self.pending.pop_front() {
                return Some(Ok(d));
            }
            if self.poisoned {
                return None;
            }
            match self.upstream.next()? {
                Ok(cm) => self.step(cm),
                Err(e) => {
                    self.poisoned = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trivial_command(cp_end: usize, li_end: usize, last: bool, py_data: [u8; 2 * W]) -> Command {
        Command {
            lt_val: false,
            lt_adev: 0,
            lt_adod: 0,
            lt_swap: false,
            st_addr: 0,
            cp_rol: 0,
            cp_rle: false,
            cp_end,
            li_rol: 0,
            li_end,
            ld_pop: last,
            last,
            py_data,
            py_start: 0,
        }
    }

    #[test]
    fn pure_literal_command_emits_the_bytes_verbatim() {
        let mut data = [0u8; 2 * W];
        data[..W].copy_from_slice(b"ABCDEFGH");
        let cmd = trivial_command(0, W, true, data);
        let mut dp = Datapath::new(std::iter::once(Ok(cmd)));
        let out = dp.next().unwrap().unwrap();
        assert_eq!(&out.data, b"ABCDEFGH");
        assert!(out.last);
        assert_eq!(out.cnt, W);
    }

    #[test]
    fn partial_last_line_reports_correct_count() {
        let mut data = [0u8; 2 * W];
        data[..3].copy_from_slice(b"XYZ");
        let cmd = trivial_command(0, 3, true, data);
        let mut dp = Datapath::new(std::iter::once(Ok(cmd)));
        let out = dp.next().unwrap().unwrap();
        assert!(out.last);
        assert_eq!(out.cnt, 3);
        assert_eq!(&out.data[..3], b"XYZ");
    }
}
