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
//! Pseudo random number generator
//  ************************************************************

use super::qr;
use super::Mode;

//  ************************************************************
/// Very simple XORSHIFT pseudo random number generator
///
/// # References
///
/// - <https://en.wikipedia.org/wiki/Xorshift>
/// - <http://www.jstatsoft.org/v08/i14/paper>
///
/// The `Rng` is only used for generating test data and damage patterns,
/// so runs are reproducible from the seed.
//  ************************************************************

#[derive(Clone, Debug)]
pub struct Rng {
    state: u32,
}

impl Rng {
    /// A zero seed would stay zero forever and is replaced
    pub fn new(seed: u32) -> Self {
        Rng { state: if seed == 0 { 0x2545_F491 } else { seed } }
    }
    pub fn get_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }
    pub fn get_u8(&mut self) -> u8 {
        self.get_u32() as u8
    }
    /// Value in `min..max`, or `min` for an empty range
    pub fn get_usize_clamped(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            min
        } else {
            min + (self.get_u32() as usize) % (max - min)
        }
    }
    /// `len` distinct values in `min..max`
    ///
    /// # Panics
    ///
    /// If the range holds fewer than `len` values
    pub fn get_usize_unique_clamped_vec(&mut self, len: usize, min: usize, max: usize) -> Vec<usize> {
        let n = max.saturating_sub(min);
        assert!(n >= len, "get_usize_unique_clamped_vec: unable to generate {} unique values in range only {} long", len, n);
        // partial Fisher-Yates shuffle of the whole range
        let mut v: Vec<usize> = (min..max).collect();
        for i in 0..len {
            let j = self.get_usize_clamped(i, n);
            v.swap(i, j);
        }
        v.truncate(len);
        v
    }
    /// A character valid in `mode`
    pub fn get_u8_with_mode(&mut self, mode: Mode) -> u8 {
        let u = self.get_u8();
        match mode {
            Mode::EightBit => u,
            Mode::AlphaNumeric => qr::alnum_to_ascii(u % 45).unwrap_or(b'0'),
            Mode::Numeric => b'0' + u % 10,
        }
    }
    /// Text of `len` characters valid in `mode`
    pub fn get_text_with_mode(&mut self, mode: Mode, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.get_u8_with_mode(mode)).collect()
    }
}
