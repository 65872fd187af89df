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
//! Module matrix of a QR code symbol
//  ************************************************************

use log::{debug, warn};

use super::qr::{self, BitSeq, SnakeDataIterator};
use super::ErrorCorrectionLevel;


/* note
 * (x,y) = (column, row)
 * (0,0) is the top left module
*/


//  ************************************************************
/// Square matrix of dark (`true`) and light modules
///
/// Modules belonging to function patterns, format and version information
/// are `reserved`; data and masking only touch the remaining modules.
//  ************************************************************

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    version: u8,
    dim: usize,
    modules: Vec<bool>,
    reserved: Vec<bool>,
}

//  ************************************************************
impl Matrix {
    //  ************************************************************
    /// Matrix for `version` with all function patterns drawn
    ///
    /// Format information is reserved (and light) until `set_format`.
    ///
    /// # Panics
    ///
    /// If `version` is outside `VERSION_MIN..=VERSION_MAX`
    pub fn new(version: u8) -> Self {
        assert!((qr::VERSION_MIN..=qr::VERSION_MAX).contains(&version), "Matrix::new: invalid version {}", version);
        let dim = qr::n_modules_from_version(version);
        let mut matrix = Matrix { version, dim, modules: vec![false; dim * dim], reserved: vec![false; dim * dim] };
        matrix.set_timing_patterns();
        let n7 = dim - 7;
        matrix.set_finder_pattern(3, 3);
        matrix.set_finder_pattern(n7 + 3, 3);
        matrix.set_finder_pattern(3, n7 + 3);
        matrix.set_alignment_patterns();
        matrix.reserve_format();
        if version >= 7 {
            matrix.set_version();
        }
        matrix
    }

    //  ************************************************************
    /// Matrix with the given modules (row by row), e.g. sampled from an image
    ///
    /// Returns `None` if `dim` is not the size of a QR code symbol
    /// or does not match the number of modules.
    pub fn from_modules(dim: usize, modules: Vec<bool>) -> Option<Self> {
        let version = qr::version_from_modules(dim)?;
        if modules.len() != dim * dim {
            return None;
        }
        Some(Matrix { version, dim, modules, reserved: qr::function_modules(version) })
    }

    //  ************************************************************
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn get_dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.dim + x]
    }

    pub fn set(&mut self, x: usize, y: usize, dark: bool) {
        self.modules[y * self.dim + x] = dark;
    }

    pub fn is_reserved(&self, x: usize, y: usize) -> bool {
        self.reserved[y * self.dim + x]
    }

    pub fn n_dark(&self) -> usize {
        self.modules.iter().filter(|m| **m).count()
    }

    //  ************************************************************
    fn set_function(&mut self, x: usize, y: usize, dark: bool) {
        let idx = y * self.dim + x;
        self.modules[idx] = dark;
        self.reserved[idx] = true;
    }

    //  ************************************************************
    /// Finder pattern centered at (`cx`, `cy`) including its separator
    fn set_finder_pattern(&mut self, cx: usize, cy: usize) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let (x, y) = (cx as i32 + dx, cy as i32 + dy);
                if x < 0 || y < 0 || x >= self.dim as i32 || y >= self.dim as i32 {
                    continue;
                }
                let dist = dx.abs().max(dy.abs());
                self.set_function(x as usize, y as usize, dist != 2 && dist != 4);
            }
        }
    }

    //  ************************************************************
    fn set_timing_patterns(&mut self) {
        for i in 0..self.dim {
            self.set_function(6, i, i % 2 == 0);
            self.set_function(i, 6, i % 2 == 0);
        }
    }

    //  ************************************************************
    fn set_alignment_patterns(&mut self) {
        for (cx, cy) in qr::AlignmentPatternIterator::new(self.version) {
            for dy in -2i32..=2 {
                for dx in -2i32..=2 {
                    let dist = dx.abs().max(dy.abs());
                    self.set_function((cx as i32 + dx) as usize, (cy as i32 + dy) as usize, dist != 1);
                }
            }
        }
    }

    //  ************************************************************
    fn set_version(&mut self) {
        let info = qr::version_info(self.version);
        let n11 = self.dim - 11;
        for i in 0..qr::N_VERSION_BITS {
            let dark = (info >> i) & 1 != 0;
            let (dx, dy) = qr::version_bit_pos(i);
            self.set_function(n11 + dx, dy, dark);
            self.set_function(dy, n11 + dx, dark);
        }
    }

    //  ************************************************************
    fn reserve_format(&mut self) {
        for i in 0..qr::N_FORMAT_BITS {
            for &(x, y) in qr::format_bit_positions(i, self.dim).iter() {
                self.set_function(x, y, false);
            }
        }
        let (xb, yb) = qr::format_bit_black_position(self.dim);
        self.set_function(xb, yb, true);
    }

    //  ************************************************************
    /// Write both copies of the format information
    pub fn set_format(&mut self, ec: ErrorCorrectionLevel, mask: u8) {
        let info = qr::format_info(ec, mask);
        for i in 0..qr::N_FORMAT_BITS {
            let dark = (info >> i) & 1 != 0;
            for &(x, y) in qr::format_bit_positions(i, self.dim).iter() {
                self.set_function(x, y, dark);
            }
        }
    }

    //  ************************************************************
    /// Read both copies of the format information
    pub fn get_format(&self) -> [u16; 2] {
        let mut copies = [0u16; 2];
        for i in 0..qr::N_FORMAT_BITS {
            for (copy, &(x, y)) in copies.iter_mut().zip(qr::format_bit_positions(i, self.dim).iter()) {
                if self.get(x, y) {
                    *copy |= 1 << i;
                }
            }
        }
        copies
    }

    //  ************************************************************
    /// Place codewords (most significant bit first) into the data modules
    ///
    /// Remainder modules are left light.
    pub fn place_codewords(&mut self, codewords: &[u8]) {
        let n_codewords = qr::n_codewords(self.version);
        if codewords.len() != n_codewords {
            warn!("place_codewords: INCONSISTENT NUMBER OF CODEWORDS: got={} expected={}", codewords.len(), n_codewords);
        }
        let bits = BitSeq::from(codewords.to_vec());
        let mut bi = bits.iter();
        let mut rem_bits = 0;
        for (x, y) in SnakeDataIterator::new(self.version) {
            let dark = match bi.next() {
                Some(b) => b,
                None => {
                    rem_bits += 1;
                    false
                }
            };
            self.set(x, y, dark);
        }
        debug!("place_codewords: version={} codewords={} rem_bits={}", self.version, codewords.len(), rem_bits);
    }

    //  ************************************************************
    /// Read the codewords from the data modules in placement order
    pub fn get_codewords(&self) -> Vec<u8> {
        let n_codewords = qr::n_codewords(self.version);
        let mut bits = BitSeq::with_capacity(n_codewords);
        for (x, y) in SnakeDataIterator::new(self.version).take(8 * n_codewords) {
            bits.push_bit(self.get(x, y));
        }
        bits.into_bytes()
    }

    //  ************************************************************
    /// XOR mask pattern `mask` into all data modules
    ///
    /// Applying the same mask twice restores the matrix.
    pub fn apply_mask(&mut self, mask: u8) {
        for y in 0..self.dim {
            for x in 0..self.dim {
                let idx = y * self.dim + x;
                if !self.reserved[idx] && qr::mask(mask, x, y) {
                    self.modules[idx] = !self.modules[idx];
                }
            }
        }
    }
}
