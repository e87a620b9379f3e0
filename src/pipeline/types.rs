//! Stream record types shared by every pipeline stage.
//!
//! Field layouts follow the reference model's stream namedtuples
//! (`CompressedStreamSingle`, `CompressedStreamDouble`, `ElementStream`,
//! `PartialCommandStream`, `CommandStream`, `DecompressedStream`). Every
//! record is a plain value type; stages never share mutable state through a
//! record, only through their own private fields.

/// Line width in bytes. Fixed at 8 by the hardware this model reproduces.
pub const W: usize = 8;
/// `log2(W)`.
pub const WB: u32 = 3;

/// One `W`-byte line of raw compressed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedSingle {
    pub data: [u8; W],
    pub last: bool,
    /// Last valid byte index within `data`, 0..W-1. Always `W - 1` unless `last`.
    pub endi: u8,
}

/// A `CompressedSingle` line paired with one line of lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressedDouble {
    pub data: [u8; 2 * W],
    pub first: bool,
    /// First valid byte index, only meaningful when `first`.
    pub start: u8,
    pub last: bool,
    pub endi: u8,
    /// How much of `data` is actually valid, including the lookahead half.
    pub py_endi: usize,
}

/// One decoded Snappy element: an optional copy and/or an optional literal
/// header, plus the literal payload window needed to materialize it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub cp_val: bool,
    pub cp_off: u16,
    /// Diminished-one copy length (actual length is `cp_len + 1`).
    pub cp_len: u8,
    pub li_val: bool,
    /// Offset of literal data within the doubled window, 0..2W.
    pub li_off: usize,
    /// Diminished-one literal length (actual length is `li_len + 1`).
    pub li_len: u32,
    pub ld_pop: bool,
    pub last: bool,
    pub py_data: [u8; 2 * W],
}

/// One per-cycle chunk of a copy element, plus any literal data that can
/// ride along once the copy is fully consumed.
#[derive(Debug, Clone, Copy)]
pub struct PartialCommand {
    pub cp_off: u16,
    /// Diminished-one length capped to `W - 1`; `< 0` encoded as `None` copy.
    pub cp_len: Option<u8>,
    pub cp_rle: bool,
    pub li_val: bool,
    pub li_off: usize,
    pub li_len: u32,
    pub ld_pop: bool,
    pub last: bool,
    pub py_data: [u8; 2 * W],
}

/// Fully resolved per-cycle datapath command.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub lt_val: bool,
    pub lt_adev: u32,
    pub lt_adod: u32,
    pub lt_swap: bool,
    /// Relative short-term memory index, 0 = most recently completed line.
    pub st_addr: u32,
    pub cp_rol: usize,
    pub cp_rle: bool,
    /// Index one past the last byte of the copy portion within the current
    /// cycle's 0..2W window.
    pub cp_end: usize,
    pub li_rol: usize,
    /// Index one past the last byte of the literal portion, 0..2W.
    pub li_end: usize,
    pub ld_pop: bool,
    pub last: bool,
    pub py_data: [u8; 2 * W],
    /// Start index of bytes produced by this command, used by the datapath
    /// to tell which byte lanes this cycle actually drives.
    pub py_start: usize,
}

/// One `W`-byte line of decompressed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decompressed {
    pub data: [u8; W],
    pub last: bool,
    /// Number of valid bytes in `data`, 1..W; always `W` unless `last`.
    pub cnt: usize,
}

// ── Fixed-width binary serialization for stream interchange (dump format for equivalence checking) ──────

fn push_bits(out: &mut String, value: u64, bits: u32, valid: bool) {
    if valid {
        for i in (0..bits).rev() {
            out.push(if (value >> i) & 1 != 0 { '1' } else { '0' });
        }
    } else {
        for _ in 0..bits {
            out.push('-');
        }
    }
}

impl CompressedSingle {
    pub fn serialize(&self) -> String {
        let mut s = String::new();
        for (idx, &byte) in self.data.iter().enumerate() {
            push_bits(&mut s, byte as u64, 8, idx as u8 <= self.endi);
        }
        push_bits(&mut s, self.last as u64, 1, true);
        push_bits(&mut s, self.endi as u64, WB, true);
        s
    }
}

impl CompressedDouble {
    pub fn serialize(&self) -> String {
        let mut s = String::new();
        for (idx, &byte) in self.data.iter().enumerate() {
            let valid = idx <= self.py_endi && (!self.first || idx >= self.start as usize);
            push_bits(&mut s, byte as u64, 8, valid);
        }
        push_bits(&mut s, self.first as u64, 1, true);
        push_bits(&mut s, self.start as u64, 2, self.first);
        push_bits(&mut s, self.last as u64, 1, true);
        push_bits(&mut s, self.endi as u64, WB, true);
        s
    }
}

impl Element {
    pub fn serialize(&self) -> String {
        let mut s = String::new();
        push_bits(&mut s, self.cp_val as u64, 1, true);
        push_bits(&mut s, self.cp_off as u64, 16, self.cp_val);
        push_bits(&mut s, self.cp_len as u64, 6, self.cp_val);
        push_bits(&mut s, self.li_val as u64, 1, true);
        push_bits(&mut s, self.li_off as u64, WB + 1, self.li_val);
        push_bits(&mut s, self.li_len as u64, 16, self.li_val);
        push_bits(&mut s, self.ld_pop as u64, 1, true);
        push_bits(&mut s, self.last as u64, 1, true);
        s
    }
}

impl PartialCommand {
    pub fn serialize(&self) -> String {
        let mut s = String::new();
        let cp_val = self.cp_len.is_some();
        push_bits(&mut s, cp_val as u64, 1, true);
        push_bits(&mut s, self.cp_off as u64, 16, cp_val);
        push_bits(&mut s, self.cp_len.unwrap_or(0) as u64, 3, cp_val);
        push_bits(&mut s, self.cp_rle as u64, 1, cp_val);
        push_bits(&mut s, self.li_val as u64, 1, true);
        push_bits(&mut s, self.li_off as u64, WB + 1, self.li_val);
        push_bits(&mut s, self.li_len as u64, 16, self.li_val);
        push_bits(&mut s, self.ld_pop as u64, 1, true);
        push_bits(&mut s, self.last as u64, 1, true);
        s
    }
}

impl Command {
    pub fn serialize(&self) -> String {
        let mut s = String::new();
        let cp_val = self.cp_end > self.py_start;
        push_bits(&mut s, self.lt_val as u64, 1, cp_val);
        push_bits(&mut s, self.lt_adev as u64, 15 - WB, self.lt_val && cp_val);
        push_bits(&mut s, self.lt_adod as u64, 15 - WB, self.lt_val && cp_val);
        push_bits(&mut s, self.lt_swap as u64, 1, cp_val);
        push_bits(&mut s, self.st_addr as u64, 5, !self.lt_val && cp_val);
        push_bits(&mut s, self.cp_rol as u64, WB + 1, cp_val);
        push_bits(&mut s, self.cp_rle as u64, 1, cp_val);
        push_bits(&mut s, self.cp_end as u64, WB + 1, true);
        let li_val = self.li_end > self.cp_end;
        push_bits(&mut s, self.li_rol as u64, WB + 1, li_val);
        push_bits(&mut s, self.li_end as u64, WB + 1, li_val);
        push_bits(&mut s, self.ld_pop as u64, 1, true);
        push_bits(&mut s, self.last as u64, 1, true);
        s
    }
}

impl Decompressed {
    pub fn serialize(&self) -> String {
        let mut s = String::new();
        for (idx, &byte) in self.data.iter().enumerate() {
            push_bits(&mut s, byte as u64, 8, idx < self.cnt);
        }
        push_bits(&mut s, self.last as u64, 1, true);
        push_bits(&mut s, self.cnt as u64, WB + 1, true);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_single_serialize_marks_invalid_tail() {
        let cs = CompressedSingle {
            data: [b'A', b'B', 0, 0, 0, 0, 0, 0],
            last: true,
            endi: 1,
        };
        let s = cs.serialize();
        // First two bytes fully valid, rest don't-care.
        assert!(s.starts_with("0100000101000010"));
        assert!(s.contains('-'));
    }

    #[test]
    fn decompressed_serialize_full_line() {
        let de = Decompressed {
            data: [1, 2, 3, 4, 5, 6, 7, 8],
            last: false,
            cnt: W,
        };
        let s = de.serialize();
        assert!(!s.contains('-'));
    }
}
