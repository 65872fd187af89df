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
//! Encode text to QR code
//  ************************************************************

use log::{debug, info, trace, warn};

use super::error::{Error, Result};
use super::mask;
use super::matrix::Matrix;
use super::qr::{self, BitSeq};
use super::reedsolomon::ReedSolomonEncoder;
use super::{ErrorCorrectionLevel, Mode};


//  ************************************************************
/// A complete QR code symbol
//  ************************************************************

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrCode {
    version: u8,
    ec: ErrorCorrectionLevel,
    mode: Mode,
    mask: u8,
    matrix: Matrix,
}

impl QrCode {
    pub fn version(&self) -> u8 {
        self.version
    }
    pub fn ec(&self) -> ErrorCorrectionLevel {
        self.ec
    }
    pub fn mode(&self) -> Mode {
        self.mode
    }
    pub fn mask(&self) -> u8 {
        self.mask
    }
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }
    pub fn get_dim(&self) -> usize {
        self.matrix.get_dim()
    }
}


//  ************************************************************
impl Mode {
    /// True if every byte of `text` can be represented in this mode
    pub fn accepts(self, text: &[u8]) -> bool {
        match self {
            Mode::Numeric => text.iter().all(|c| c.is_ascii_digit()),
            Mode::AlphaNumeric => text.iter().all(|&c| qr::ascii_to_alnum(c).is_some()),
            Mode::EightBit => true,
        }
    }

    /// The most compact mode able to represent `text`
    pub fn for_text(text: &[u8]) -> Mode {
        [Mode::Numeric, Mode::AlphaNumeric].iter().copied().find(|m| m.accepts(text)).unwrap_or(Mode::EightBit)
    }
}


//  ************************************************************
/// Choose mode and the smallest version holding `text`
//  ************************************************************

pub fn analyze(text: &[u8], ec: ErrorCorrectionLevel) -> Result<(Mode, u8)> {
    let mode = Mode::for_text(text);
    match qr::version_from_length(text.len(), mode, ec) {
        Some(version) => Ok((mode, version)),
        None => {
            let max = qr::data_capacity(qr::VERSION_MAX, mode, ec);
            warn!("analyze: text too long; len={} max={} mode={:?} ec={:?}", text.len(), max, mode, ec);
            Err(Error::CapacityExceeded { len: text.len(), max, mode, ec })
        }
    }
}


//  ************************************************************
/// Encode `text` with `ErrorCorrectionLevel` to a `QrCode`
//  ************************************************************
///
/// Mode and version are chosen automatically,
/// the mask with the lowest penalty is applied.

pub fn encode(text: &[u8], ec: ErrorCorrectionLevel) -> Result<QrCode> {
    info!("encode: begin encoding qr code");
    let (mode, version) = analyze(text, ec)?;
    debug!("encode: text.len={} version={} mode={:?} ec={:?}", text.len(), version, mode, ec);

    let data = data_codewords(text, mode, version, ec);
    let codewords = add_error_correction(&data, version, ec)?;
    debug!("encode: codewords: len={}", codewords.len());
    trace!("encode: codewords={:X?}", codewords);

    let mut matrix = Matrix::new(version);
    matrix.place_codewords(&codewords);
    let (matrix, mask) = mask::select(&matrix, ec);
    info!("encode: done encoding qr code; version={} mask={}", version, mask);
    Ok(QrCode { version, ec, mode, mask, matrix })
}


//  ************************************************************
/// Mode indicator, character count, data, terminator and padding
//  ************************************************************
///
/// `mode` must accept `text` and `text` must fit `version` (see `analyze`).

fn data_codewords(text: &[u8], mode: Mode, version: u8, ec: ErrorCorrectionLevel) -> Vec<u8> {
    debug_assert!(mode.accepts(text), "data_codewords: text not representable in {:?}", mode);
    debug_assert!(text.len() <= qr::data_capacity(version, mode, ec));
    let n_data_codewords = qr::n_data_codewords(version, ec);
    let mut bits = BitSeq::with_capacity(n_data_codewords);
    bits.append_bits(mode as u32, 4);
    bits.append_bits(text.len() as u32, qr::n_count_bits(version, mode));
    match mode {
        Mode::Numeric => encode_numeric(&mut bits, text),
        Mode::AlphaNumeric => encode_alpha_numeric(&mut bits, text),
        Mode::EightBit => encode_eight_bit(&mut bits, text),
    };
    set_padding(&mut bits, n_data_codewords);
    bits.into_bytes()
}

//  ************************************************************
fn encode_numeric(bits: &mut BitSeq, text: &[u8]) {
    for chunk in text.chunks(3) {
        let val = chunk.iter().fold(0, |acc, c| 10 * acc + (c - b'0') as u32);
        bits.append_bits(val, 3 * chunk.len() + 1);
    }
}

//  ************************************************************
fn encode_alpha_numeric(bits: &mut BitSeq, text: &[u8]) {
    let alnum = |c: u8| qr::ascii_to_alnum(c).unwrap_or(0) as u32;
    for chunk in text.chunks(2) {
        match *chunk {
            [a, b] => bits.append_bits(45 * alnum(a) + alnum(b), 11),
            [a] => bits.append_bits(alnum(a), 6),
            _ => {}
        }
    }
}

//  ************************************************************
fn encode_eight_bit(bits: &mut BitSeq, text: &[u8]) {
    for ch in text {
        bits.append_bits(*ch as u32, 8);
    }
}

//  ************************************************************
fn set_padding(bits: &mut BitSeq, n_data_codewords: usize) {
    let capacity = 8 * n_data_codewords;
    let terminator = (capacity - bits.len()).min(4);
    bits.append_bits(0, terminator);
    while bits.len() % 8 != 0 {
        bits.push_bit(false);
    }
    for pad in [0xEC, 0x11].iter().cycle().take(n_data_codewords - bits.next_byte_idx()) {
        bits.append_bits(*pad, 8);
    }
}


//  ************************************************************
/// Block and offset within the block of each codeword in transmission order
//  ************************************************************
///
/// Data codewords are interleaved column wise across all blocks
/// (the longer group 2 blocks contribute a last column on their own),
/// followed by the error correction codewords interleaved the same way.
/// The offset of an error correction codeword counts from the start of its block.

pub fn interleave_map(version: u8, ec: ErrorCorrectionLevel) -> Result<Vec<(usize, usize)>> {
    let [ecb1, ecb2] = qr::ec_blocks(version, ec)?;
    let n_blocks = ecb1.n + ecb2.n;
    let k_of = |block: usize| if block < ecb1.n { ecb1.k } else { ecb2.k };
    let n_ec = ecb1.n_ec();
    let mut map = Vec::with_capacity(qr::n_codewords(version));
    for i in 0..ecb1.k.max(ecb2.k) {
        for block in 0..n_blocks {
            if i < k_of(block) {
                map.push((block, i));
            }
        }
    }
    for i in 0..n_ec {
        for block in 0..n_blocks {
            map.push((block, k_of(block) + i));
        }
    }
    Ok(map)
}


//  ************************************************************
/// Split data codewords into blocks, add Reed Solomon codewords and interleave
//  ************************************************************

pub fn add_error_correction(data: &[u8], version: u8, ec: ErrorCorrectionLevel) -> Result<Vec<u8>> {
    debug!("add_error_correction: data.len={} version={} ec={:?}", data.len(), version, ec);
    let [ecb1, ecb2] = qr::ec_blocks(version, ec)?;
    let n_dcw = ecb1.n * ecb1.k + ecb2.n * ecb2.k;
    if data.len() != n_dcw {
        warn!("add_error_correction: INCONSISTENT INPUT LENGTH: data.len={} n_dcw={}", data.len(), n_dcw);
        return Err(Error::UnsupportedVersion { version, ec });
    }

    let rs = ReedSolomonEncoder::new(ecb1.n_ec());
    let mut blocks = Vec::<Vec<u8>>::with_capacity(ecb1.n + ecb2.n);
    let mut rest = data;
    for ecb in [ecb1, ecb2].iter() {
        for _ in 0..ecb.n {
            let (block_data, tail) = rest.split_at(ecb.k);
            let mut block = block_data.to_vec();
            block.extend(rs.encode(block_data));
            blocks.push(block);
            rest = tail;
        }
    }
    trace!("add_error_correction: blocks={:?}", blocks);

    let out: Vec<u8> = interleave_map(version, ec)?.into_iter().map(|(b, i)| blocks[b][i]).collect();
    debug_assert_eq!(out.len(), qr::n_codewords(version));
    Ok(out)
}
