/*  ************************************************************

    QR-Logo: http://qrlogo.kaarposoft.dk

    Copyright (C) 2011-2018 Henrik Kaare Poulsen

    Licensed under the Apache License, Version 2.0 (the "License");
    you may not use this file except in compliance with the License.
    You may obtain a copy of the License at

     http://www.apache.org/licenses/LICENSE-2.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.

    ************************************************************ */


//  ************************************************************
//! Common definitions for QR codes
//!
//! # References
//!
//! * [Wikipedia on QR codes](https://en.wikipedia.org/wiki/QR_code)
//! * [ISO 18004:2015](https://www.iso.org/standard/62021.html)
//! * [ISO 18004:2005](http://www.arscreatio.com/repositorio/images/n_23/SC031-N-1915-18004Text.pdf)
//  ************************************************************

use log::{debug, trace};

use super::error::{Error, Result};
use super::{ErrorCorrectionLevel, Mode};


//  ************************************************************

pub const VERSION_MIN: u8 = 1;
pub const VERSION_MAX: u8 = 40;

pub const QUIET_ZONE: u32 = 4;

pub const MODULES_MIN: usize = 17 + 4 * (VERSION_MIN as usize);
pub const MODULES_MAX: usize = 17 + 4 * (VERSION_MAX as usize);


//  ************************************************************

pub fn n_modules_from_version(version: u8) -> usize {
    17 + 4 * version as usize
}


//  ************************************************************

pub fn version_from_modules(n_modules: usize) -> Option<u8> {
    if (MODULES_MIN..=MODULES_MAX).contains(&n_modules) && (n_modules - 17) % 4 == 0 {
        Some(((n_modules - 17) / 4) as u8)
    } else {
        None
    }
}


//  ************************************************************
/// Smallest `version` which can hold `len` characters in the given `mode`
//  ************************************************************

pub fn version_from_length(len: usize, mode: Mode, ec: ErrorCorrectionLevel) -> Option<u8> {
    let v = (VERSION_MIN..=VERSION_MAX).find(|&version| data_capacity(version, mode, ec) >= len);
    debug!("version_from_length length={} mode={:?} ec={:?} version={:?}", len, mode, ec, v);
    v
}


//  ************************************************************
/// Number of characters which fit in a symbol
//  ************************************************************

pub fn data_capacity(version: u8, mode: Mode, ec: ErrorCorrectionLevel) -> usize {
    let bytes = n_data_codewords(version, ec);
    let bits = 8 * bytes - 4 - n_count_bits(version, mode);
    match mode {
        Mode::EightBit => bits / 8,
        Mode::AlphaNumeric => {
            let cap = (bits / 11) * 2;
            if bits % 11 >= 6 {
                cap + 1
            } else {
                cap
            }
        }
        Mode::Numeric => {
            let cap = (bits / 10) * 3;
            match bits % 10 {
                7..=9 => cap + 2,
                4..=6 => cap + 1,
                _ => cap,
            }
        }
    }
}


//  ************************************************************

pub fn n_count_bits(version: u8, mode: Mode) -> usize {
    match mode {
        Mode::EightBit if version < 10 => 8,
        Mode::EightBit => 16,
        Mode::AlphaNumeric if version < 10 => 9,
        Mode::AlphaNumeric if version < 27 => 11,
        Mode::AlphaNumeric => 13,
        Mode::Numeric if version < 10 => 10,
        Mode::Numeric if version < 27 => 12,
        Mode::Numeric => 14,
    }
}


//  ************************************************************
/// True if mask pattern `m` inverts the module at column `x`, row `y`
//  ************************************************************
///
/// Panics unless `m < 8`.

pub fn mask(m: u8, x: usize, y: usize) -> bool {
    // ISO 18004 uses i for the row and j for the column
    let (i, j) = (y, x);
    match m {
        0 => (i + j) % 2 == 0,
        1 => i % 2 == 0,
        2 => j % 3 == 0,
        3 => (i + j) % 3 == 0,
        4 => (i / 2 + j / 3) % 2 == 0,
        5 => (i * j) % 2 + (i * j) % 3 == 0,
        6 => ((i * j) % 2 + (i * j) % 3) % 2 == 0,
        7 => ((i + j) % 2 + (i * j) % 3) % 2 == 0,
        _ => unreachable!("mask: invalid mask pattern {}", m),
    }
}


//  ************************************************************
/// Number of modules available for codewords and remainder bits
//  ************************************************************

fn n_raw_data_modules(version: u8) -> usize {
    let v = version as usize;
    let mut n = (16 * v + 128) * v + 64;
    if v >= 2 {
        let n_align = v / 7 + 2;
        n -= (25 * n_align - 10) * n_align - 55;
        if v >= 7 {
            n -= 36;
        }
    }
    n
}


//  ************************************************************

pub fn n_codewords(version: u8) -> usize {
    n_raw_data_modules(version) / 8
}


//  ************************************************************

pub fn n_remainder_bits(version: u8) -> usize {
    n_raw_data_modules(version) % 8
}


//  ************************************************************

pub fn n_ec_codewords(version: u8, ec: ErrorCorrectionLevel) -> usize {
    let (per_block, n_blocks) = EC_BLOCKS[version as usize - 1][ec.ordinal()];
    per_block as usize * n_blocks as usize
}


//  ************************************************************

pub fn n_data_codewords(version: u8, ec: ErrorCorrectionLevel) -> usize {
    n_codewords(version) - n_ec_codewords(version, ec)
}


//  ************************************************************
/// Error correction codewords per block and number of blocks
///
/// Indexed by version, then by `ErrorCorrectionLevel::ordinal` (L, M, Q, H).
//  ************************************************************

const EC_BLOCKS: [[(u8, u8); 4]; 40] = [
    [(7, 1), (10, 1), (13, 1), (17, 1)], // 1
    [(10, 1), (16, 1), (22, 1), (28, 1)], // 2
    [(15, 1), (26, 1), (18, 2), (22, 2)], // 3
    [(20, 1), (18, 2), (26, 2), (16, 4)], // 4
    [(26, 1), (24, 2), (18, 4), (22, 4)], // 5
    [(18, 2), (16, 4), (24, 4), (28, 4)], // 6
    [(20, 2), (18, 4), (18, 6), (26, 5)], // 7
    [(24, 2), (22, 4), (22, 6), (26, 6)], // 8
    [(30, 2), (22, 5), (20, 8), (24, 8)], // 9
    [(18, 4), (26, 5), (24, 8), (28, 8)], // 10
    [(20, 4), (30, 5), (28, 8), (24, 11)], // 11
    [(24, 4), (22, 8), (26, 10), (28, 11)], // 12
    [(26, 4), (22, 9), (24, 12), (22, 16)], // 13
    [(30, 4), (24, 9), (20, 16), (24, 16)], // 14
    [(22, 6), (24, 10), (30, 12), (24, 18)], // 15
    [(24, 6), (28, 10), (24, 17), (30, 16)], // 16
    [(28, 6), (28, 11), (28, 16), (28, 19)], // 17
    [(30, 6), (26, 13), (28, 18), (28, 21)], // 18
    [(28, 7), (26, 14), (26, 21), (26, 25)], // 19
    [(28, 8), (26, 16), (30, 20), (28, 25)], // 20
    [(28, 8), (26, 17), (28, 23), (30, 25)], // 21
    [(28, 9), (28, 17), (30, 23), (24, 34)], // 22
    [(30, 9), (28, 18), (30, 25), (30, 30)], // 23
    [(30, 10), (28, 20), (30, 27), (30, 32)], // 24
    [(26, 12), (28, 21), (30, 29), (30, 35)], // 25
    [(28, 12), (28, 23), (28, 34), (30, 37)], // 26
    [(30, 12), (28, 25), (30, 34), (30, 40)], // 27
    [(30, 13), (28, 26), (30, 35), (30, 42)], // 28
    [(30, 14), (28, 28), (30, 38), (30, 45)], // 29
    [(30, 15), (28, 29), (30, 40), (30, 48)], // 30
    [(30, 16), (28, 31), (30, 43), (30, 51)], // 31
    [(30, 17), (28, 33), (30, 45), (30, 54)], // 32
    [(30, 18), (28, 35), (30, 48), (30, 57)], // 33
    [(30, 19), (28, 37), (30, 51), (30, 60)], // 34
    [(30, 19), (28, 38), (30, 53), (30, 63)], // 35
    [(30, 20), (28, 40), (30, 56), (30, 66)], // 36
    [(30, 21), (28, 43), (30, 59), (30, 70)], // 37
    [(30, 22), (28, 45), (30, 62), (30, 74)], // 38
    [(30, 24), (28, 47), (30, 65), (30, 77)], // 39
    [(30, 25), (28, 49), (30, 68), (30, 81)], // 40
];


//  ************************************************************
/// Error correction block group (ISO 18004 notation)
///
/// - `n`: number of blocks in the group
/// - `c`: total codewords per block
/// - `k`: data codewords per block
/// - `r`: number of error codewords the block is rated to correct
//  ************************************************************

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ECB {
    pub n: usize,
    pub c: usize,
    pub k: usize,
    pub r: usize,
}

impl ECB {
    /// Number of error correction codewords per block
    pub fn n_ec(&self) -> usize {
        self.c - self.k
    }
}


//  ************************************************************
/// The two block groups for `version` / `ec`
///
/// Group 2 blocks hold one more data codeword than group 1 blocks.
/// Group 2 has `n == 0` when all blocks have the same size.
//  ************************************************************

pub fn ec_blocks(version: u8, ec: ErrorCorrectionLevel) -> Result<[ECB; 2]> {
    if !(VERSION_MIN..=VERSION_MAX).contains(&version) {
        return Err(Error::UnsupportedVersion { version, ec });
    }
    let (per_block, n_blocks) = EC_BLOCKS[version as usize - 1][ec.ordinal()];
    let (e, nb) = (per_block as usize, n_blocks as usize);
    let total = n_codewords(version);
    let c1 = total / nb;
    let n2 = total % nb;
    let r = (e - misdecode_protection(version, ec)) / 2;
    let ecb1 = ECB { n: nb - n2, c: c1, k: c1 - e, r };
    let ecb2 = ECB { n: n2, c: c1 + 1, k: c1 + 1 - e, r };
    trace!("ec_blocks: version={} ec={:?} ecb1={:?} ecb2={:?}", version, ec, ecb1, ecb2);
    Ok([ecb1, ecb2])
}


//  ************************************************************
/// Codewords reserved against misdecoding for the smallest symbols
//  ************************************************************

fn misdecode_protection(version: u8, ec: ErrorCorrectionLevel) -> usize {
    match (version, ec) {
        (1, ErrorCorrectionLevel::L) => 3,
        (1, ErrorCorrectionLevel::M) => 2,
        (1, _) => 1,
        (2, ErrorCorrectionLevel::L) => 2,
        (3, ErrorCorrectionLevel::L) => 1,
        _ => 0,
    }
}


//  ************************************************************
/// Row / column coordinates of alignment pattern centers
//  ************************************************************

pub fn alignment_patterns(version: u8) -> Vec<usize> {
    if version < 2 {
        return Vec::new();
    }
    let v = version as usize;
    let n = v / 7 + 2;
    let step = if v == 32 { 26 } else { (v * 4 + n * 2 + 1) / (n * 2 - 2) * 2 };
    let last = n_modules_from_version(version) - 7;
    let mut pats: Vec<usize> = (0..n - 1).map(|i| last - i * step).collect();
    pats.push(6);
    pats.reverse();
    pats
}


//  ************************************************************
/// Iterates over the centers of all alignment patterns,
/// skipping those which would overlap the finder patterns
//  ************************************************************

pub struct AlignmentPatternIterator {
    patterns: Vec<usize>,
    i: usize,
    j: usize,
}

impl AlignmentPatternIterator {
    pub fn new(version: u8) -> Self {
        AlignmentPatternIterator { patterns: alignment_patterns(version), i: 0, j: 0 }
    }
}

impl Iterator for AlignmentPatternIterator {
    type Item = (usize, usize);
    fn next(&mut self) -> Option<Self::Item> {
        let n = self.patterns.len();
        while self.i < n {
            let (i, j) = (self.i, self.j);
            self.j += 1;
            if self.j == n {
                self.i += 1;
                self.j = 0;
            }
            let corner = (i == 0 && j == 0) || (i == 0 && j == n - 1) || (i == n - 1 && j == 0);
            if !corner {
                return Some((self.patterns[i], self.patterns[j]));
            }
        }
        None
    }
}


//  ************************************************************

pub const N_VERSION_BITS: usize = 3 * 6;

//  ************************************************************
/// Offset of version information bit `n` within the 3x6 block
/// at the top right (the bottom left block is transposed)
//  ************************************************************

pub fn version_bit_pos(n: usize) -> (usize, usize) {
    (n % 3, n / 3)
}


//  ************************************************************
/// 18 bit version information: 6 bit version, 12 bit BCH code
//  ************************************************************

pub fn version_info(version: u8) -> u32 {
    let data = version as u32;
    let mut rem = data;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
    }
    data << 12 | rem
}


//  ************************************************************

pub const N_FORMAT_BITS: usize = 15;

//  ************************************************************
/// Positions of format information bit `n` (0 = least significant)
//  ************************************************************

pub fn format_bit_positions(n: usize, n_modules: usize) -> [(usize, usize); 2] {
    let first = match n {
        0..=5 => (8, n),
        6 => (8, 7),
        7 => (8, 8),
        8 => (7, 8),
        _ => (14 - n, 8),
    };
    let second = if n < 8 { (n_modules - 1 - n, 8) } else { (8, n_modules - 15 + n) };
    [first, second]
}


//  ************************************************************

pub fn format_bit_black_position(n_modules: usize) -> (usize, usize) {
    (8, n_modules - 8)
}


//  ************************************************************
/// 15 bit format information: 2 bit EC level, 3 bit mask, 10 bit BCH code
//  ************************************************************

pub fn format_info(ec: ErrorCorrectionLevel, mask: u8) -> u16 {
    let data = (ec as u16) << 3 | mask as u16;
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    (data << 10 | rem) ^ 0x5412
}


//  ************************************************************
/// Find the valid format information closest to `bits`
///
/// Returns EC level, mask and Hamming distance.
//  ************************************************************

pub fn format_from_bits(bits: u16) -> (ErrorCorrectionLevel, u8, u32) {
    let mut best = (ErrorCorrectionLevel::M, 0, u32::MAX);
    for ec in ErrorCorrectionLevel::ALL.iter() {
        for mask in 0..8 {
            let distance = (format_info(*ec, mask) ^ bits).count_ones();
            if distance < best.2 {
                best = (*ec, mask, distance);
            }
        }
    }
    best
}


//  ************************************************************

const ALNUM: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

pub fn alnum_to_ascii(alnum: u8) -> Option<u8> {
    ALNUM.get(alnum as usize).copied()
}

pub fn ascii_to_alnum(ascii: u8) -> Option<u8> {
    match ascii {
        b'0'..=b'9' => Some(ascii - b'0'),
        b'A'..=b'Z' => Some(ascii - b'A' + 10),
        b' ' => Some(36),
        b'$' => Some(37),
        b'%' => Some(38),
        b'*' => Some(39),
        b'+' => Some(40),
        b'-' => Some(41),
        b'.' => Some(42),
        b'/' => Some(43),
        b':' => Some(44),
        _ => None,
    }
}


//  ************************************************************
/// Modules occupied by function patterns and format / version information
///
/// Indexed `y * n_modules + x`.
//  ************************************************************

pub fn function_modules(version: u8) -> Vec<bool> {
    let n = n_modules_from_version(version);
    let mut marks = vec![false; n * n];
    let mut mark_rect = |x0: usize, y0: usize, w: usize, h: usize| {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                marks[y * n + x] = true;
            }
        }
    };

    // Finder, separators and format
    let n8 = n - 8;
    mark_rect(0, 0, 9, 9);
    mark_rect(n8, 0, 8, 9);
    mark_rect(0, n8, 9, 8);

    // Timing
    mark_rect(8, 6, n8 - 8, 1);
    mark_rect(6, 8, 1, n8 - 8);

    // Version
    if version >= 7 {
        let n11 = n - 11;
        mark_rect(0, n11, 6, 3);
        mark_rect(n11, 0, 3, 6);
    }

    // Alignment
    for (x, y) in AlignmentPatternIterator::new(version) {
        mark_rect(x - 2, y - 2, 5, 5);
    }
    marks
}


//  ************************************************************
/// Iterates over data module positions `(x, y)` in placement order
///
/// Two-module wide columns are traversed from the right edge,
/// alternating upwards and downwards, skipping the vertical timing pattern.
//  ************************************************************

pub struct SnakeDataIterator {
    n_modules: usize,
    marks: Vec<bool>,
    right: usize,
    vert: usize,
    dx: usize,
    done: bool,
}

impl SnakeDataIterator {
    pub fn new(version: u8) -> Self {
        let n_modules = n_modules_from_version(version);
        SnakeDataIterator { n_modules, marks: function_modules(version), right: n_modules - 1, vert: 0, dx: 0, done: false }
    }

    fn advance(&mut self) {
        self.dx += 1;
        if self.dx < 2 {
            return;
        }
        self.dx = 0;
        self.vert += 1;
        if self.vert < self.n_modules {
            return;
        }
        self.vert = 0;
        if self.right < 3 {
            self.done = true;
        } else {
            self.right -= 2;
            if self.right == 6 {
                self.right = 5;
            }
        }
    }
}

impl Iterator for SnakeDataIterator {
    type Item = (usize, usize);
    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let upward = (self.right + 1) & 2 == 0;
            let x = self.right - self.dx;
            let y = if upward { self.n_modules - 1 - self.vert } else { self.vert };
            self.advance();
            if !self.marks[y * self.n_modules + x] {
                return Some((x, y));
            }
        }
        None
    }
}


//  ************************************************************
/// Sequence of bits stored in a byte vector, most significant bit first
//  ************************************************************

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitSeq {
    data: Vec<u8>,
    len: usize,
}

impl BitSeq {
    pub fn with_capacity(n_bytes: usize) -> Self {
        BitSeq { data: Vec::with_capacity(n_bytes), len: 0 }
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push_bit(&mut self, set: bool) {
        if self.len % 8 == 0 {
            self.data.push(0);
        }
        if set {
            self.data[self.len / 8] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    /// Append the `n_bits` least significant bits of `bits`
    pub fn append_bits(&mut self, bits: u32, n_bits: usize) {
        debug_assert!(n_bits <= 32 && (n_bits == 32 || bits >> n_bits == 0), "append_bits: {} does not fit {} bits", bits, n_bits);
        for i in (0..n_bits).rev() {
            self.push_bit((bits >> i) & 1 != 0);
        }
    }

    pub fn get_bit(&self, idx: usize) -> bool {
        self.data[idx / 8] & (0x80 >> (idx % 8)) != 0
    }

    /// Read `n_bits` starting at bit `idx`; bits beyond the end read as 0
    pub fn get_bits(&self, idx: usize, n_bits: usize) -> u32 {
        (idx..idx + n_bits).fold(0, |acc, i| (acc << 1) | (i < self.len && self.get_bit(i)) as u32)
    }

    /// Index of the first byte not (even partially) used
    pub fn next_byte_idx(&self) -> usize {
        (self.len + 7) / 8
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn iter(&self) -> BitSeqIterator<'_> {
        BitSeqIterator { bits: self, idx: 0 }
    }
}

impl From<Vec<u8>> for BitSeq {
    fn from(data: Vec<u8>) -> Self {
        let len = 8 * data.len();
        BitSeq { data, len }
    }
}

impl<'a> IntoIterator for &'a BitSeq {
    type Item = bool;
    type IntoIter = BitSeqIterator<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct BitSeqIterator<'a> {
    bits: &'a BitSeq,
    idx: usize,
}

impl<'a> Iterator for BitSeqIterator<'a> {
    type Item = bool;
    fn next(&mut self) -> Option<bool> {
        if self.idx >= self.bits.len {
            return None;
        }
        let b = self.bits.get_bit(self.idx);
        self.idx += 1;
        Some(b)
    }
}
