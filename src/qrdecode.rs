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
//! Decode QR Code to text
//!
//! A reader for symbols as rendered by this crate:
//!
//! - the image is square, axis aligned, with a known number of pixels per module
//!   and a known quiet zone
//! - each module is sampled at the center of its cell
//!
//! Everything after sampling follows ISO 18004: format information,
//! unmasking, de-interleaving, Reed Solomon error correction and segment parsing.
//  ************************************************************

use std::fmt;
use std::str;

use image::RgbaImage;
use log::{debug, info, trace, warn};

use super::error::DecodeError;
use super::matrix::Matrix;
use super::qr::{self, BitSeq};
use super::qrencode;
use super::reedsolomon;
use super::{ErrorCorrectionLevel, Mode};


/// Largest Hamming distance accepted between read and valid format information
pub const MAX_FORMAT_DISTANCE: u32 = 3;

/// Luma below which a module is dark
pub const DARK_THRESHOLD: f64 = 128.0;


//  ************************************************************
/// Result of decoding a QR code
//  ************************************************************

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub data: Vec<u8>,
    /// Mode of the first segment; `None` if the symbol holds no segment
    pub mode: Option<Mode>,
    pub version: u8,
    pub ec: ErrorCorrectionLevel,
    pub mask: u8,
    /// Number of codewords corrected by Reed Solomon decoding
    pub corrected: usize,
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match str::from_utf8(&self.data) {
            Ok(s) if s.find(char::is_control).is_none() => writeln!(f, "data:      {:?}", s)?,
            _ => writeln!(f, "data:      {} bytes; hex={:02X?}", self.data.len(), self.data)?,
        }
        match self.mode {
            Some(m) => writeln!(f, "mode:      {:?}", m)?,
            None => writeln!(f, "mode:      n/a")?,
        }
        writeln!(f, "mask:      {}", self.mask)?;
        writeln!(f, "version:   {}", self.version)?;
        writeln!(f, "ec:        {:?}", self.ec)?;
        writeln!(f, "corrected: {}", self.corrected)
    }
}


//  ************************************************************
/// Decode text from a rendered QR code image
//  ************************************************************

pub fn decode_image(image: &RgbaImage, pixels_per_module: u32, quiet_zone: u32) -> Result<Decoded, DecodeError> {
    info!("decode_image: width={} height={} pixels_per_module={}", image.width(), image.height(), pixels_per_module);
    let matrix = sample_image(image, pixels_per_module, quiet_zone)?;
    decode_matrix(&matrix)
}


//  ************************************************************
/// Read the module matrix from a rendered QR code image
//  ************************************************************
///
/// Each module is read at the center of its cell.

pub fn sample_image(image: &RgbaImage, pixels_per_module: u32, quiet_zone: u32) -> Result<Matrix, DecodeError> {
    let (width, height) = image.dimensions();
    let invalid = DecodeError::InvalidImage { width, height, pixels_per_module };
    if pixels_per_module == 0 || width != height || width % pixels_per_module != 0 {
        return Err(invalid);
    }
    let n_cells = (width / pixels_per_module) as usize;
    let n_modules = match n_cells.checked_sub(2 * quiet_zone as usize) {
        Some(n) => n,
        None => return Err(invalid),
    };
    if qr::version_from_modules(n_modules).is_none() {
        warn!("sample_image: {} modules is not a valid symbol size", n_modules);
        return Err(DecodeError::InvalidDimension(n_modules));
    }

    let half = pixels_per_module / 2;
    let mut modules = Vec::with_capacity(n_modules * n_modules);
    for my in 0..n_modules {
        for mx in 0..n_modules {
            let px = (mx as u32 + quiet_zone) * pixels_per_module + half;
            let py = (my as u32 + quiet_zone) * pixels_per_module + half;
            modules.push(luma(image.get_pixel(px, py).0) < DARK_THRESHOLD);
        }
    }
    debug!("sample_image: n_modules={}", n_modules);
    Matrix::from_modules(n_modules, modules).ok_or(DecodeError::InvalidDimension(n_modules))
}


//  ************************************************************
/// Luma (REC 709) of an RGBA pixel composed over white, in the range [0..255]
//  ************************************************************

fn luma([r, g, b, a]: [u8; 4]) -> f64 {
    let l = 0.2126 * f64::from(r) + 0.7152 * f64::from(g) + 0.0722 * f64::from(b);
    let alpha = f64::from(a) / 255.0;
    alpha * l + (1.0 - alpha) * 255.0
}


//  ************************************************************
/// Decode text from a module matrix
//  ************************************************************

pub fn decode_matrix(matrix: &Matrix) -> Result<Decoded, DecodeError> {
    let version = matrix.version();
    let (ec, mask) = read_format(matrix)?;
    debug!("decode_matrix: version={} ec={:?} mask={}", version, ec, mask);

    let mut unmasked = matrix.clone();
    unmasked.apply_mask(mask);
    let codewords = unmasked.get_codewords();
    trace!("decode_matrix: codewords={:X?}", codewords);

    let (data, corrected) = correct_errors(&codewords, version, ec)?;
    let (mode, data) = decode_data(version, ec, &data)?;
    info!("decode_matrix: done; data.len={} corrected={}", data.len(), corrected);
    Ok(Decoded { data, mode, version, ec, mask, corrected })
}


//  ************************************************************
/// Error correction level and mask from the nearest valid format information
//  ************************************************************

fn read_format(matrix: &Matrix) -> Result<(ErrorCorrectionLevel, u8), DecodeError> {
    let copies = matrix.get_format();
    let (ec, mask, distance) = copies
        .iter()
        .map(|&bits| qr::format_from_bits(bits))
        .min_by_key(|&(_, _, distance)| distance)
        .ok_or(DecodeError::FormatInfo)?;
    trace!("read_format: copies={:04X?} ec={:?} mask={} distance={}", copies, ec, mask, distance);
    if distance > MAX_FORMAT_DISTANCE {
        warn!("read_format: no valid format information; distance={}", distance);
        return Err(DecodeError::FormatInfo);
    }
    Ok((ec, mask))
}


//  ************************************************************
/// De-interleave, correct errors and return the data codewords
//  ************************************************************

fn correct_errors(codewords: &[u8], version: u8, ec: ErrorCorrectionLevel) -> Result<(Vec<u8>, usize), DecodeError> {
    let dim = qr::n_modules_from_version(version);
    let [ecb1, ecb2] = qr::ec_blocks(version, ec).map_err(|_| DecodeError::InvalidDimension(dim))?;
    let map = qrencode::interleave_map(version, ec).map_err(|_| DecodeError::InvalidDimension(dim))?;
    let mut blocks: Vec<Vec<u8>> =
        (0..ecb1.n + ecb2.n).map(|b| vec![0u8; if b < ecb1.n { ecb1.c } else { ecb2.c }]).collect();
    for (&cw, &(b, i)) in codewords.iter().zip(map.iter()) {
        blocks[b][i] = cw;
    }

    let n_ec = ecb1.n_ec();
    let mut corrected = 0;
    let mut data = Vec::with_capacity(qr::n_data_codewords(version, ec));
    for (b, block) in blocks.iter_mut().enumerate() {
        match reedsolomon::correct(block, n_ec) {
            Some(n) => corrected += n,
            None => {
                warn!("correct_errors: block {} uncorrectable", b);
                return Err(DecodeError::Uncorrectable { block: b });
            }
        }
        let k = block.len() - n_ec;
        data.extend_from_slice(&block[..k]);
    }
    debug!("correct_errors: blocks={} corrected={}", blocks.len(), corrected);
    Ok((data, corrected))
}


//  ************************************************************
/// Parse segments from the data codewords
//  ************************************************************
///
/// Parsing stops at the terminator or when the data is exhausted.

fn decode_data(version: u8, ec: ErrorCorrectionLevel, raw: &[u8]) -> Result<(Option<Mode>, Vec<u8>), DecodeError> {
    let bs = BitSeq::from(raw.to_vec());
    let n_bits = bs.len();
    let mut idx = 0;
    let mut first_mode = None;
    let mut res = Vec::new();
    while idx + 4 <= n_bits {
        let m = bs.get_bits(idx, 4) as u8;
        idx += 4;
        let mode = match m {
            0b0000 => break,
            0b0001 => Mode::Numeric,
            0b0010 => Mode::AlphaNumeric,
            0b0100 => Mode::EightBit,
            _ => return Err(DecodeError::UnsupportedMode(m)),
        };
        let nc = qr::n_count_bits(version, mode);
        let len = bs.get_bits(idx, nc) as usize;
        idx += nc;
        let max = qr::data_capacity(version, mode, ec);
        trace!("decode_data: mode={:?} len={} max={} idx={}", mode, len, max, idx);
        if len > max || idx + segment_bits(mode, len) > n_bits {
            return Err(DecodeError::InvalidLength { len, max });
        }
        idx = match mode {
            Mode::EightBit => decode_eight_bit(&bs, idx, len, &mut res),
            Mode::AlphaNumeric => decode_alpha_numeric(&bs, idx, len, &mut res)?,
            Mode::Numeric => decode_numeric(&bs, idx, len, &mut res)?,
        };
        first_mode.get_or_insert(mode);
    }
    Ok((first_mode, res))
}


/// Number of payload bits for `len` characters
fn segment_bits(mode: Mode, len: usize) -> usize {
    match mode {
        Mode::EightBit => 8 * len,
        Mode::AlphaNumeric => 11 * (len / 2) + 6 * (len % 2),
        Mode::Numeric => 10 * (len / 3) + [0, 4, 7][len % 3],
    }
}


//  ************************************************************
/// Decode `len` bytes encoded in 8bit mode, returning the index after them
//  ************************************************************

fn decode_eight_bit(bs: &BitSeq, index0: usize, len: usize, res: &mut Vec<u8>) -> usize {
    for i in 0..len {
        res.push(bs.get_bits(index0 + i * 8, 8) as u8);
    }
    index0 + 8 * len
}


//  ************************************************************
/// Decode `len` characters encoded in alphanumeric mode
//  ************************************************************

fn decode_alpha_numeric(bs: &BitSeq, index0: usize, len: usize, res: &mut Vec<u8>) -> Result<usize, DecodeError> {
    let char_of = |v: u32| {
        qr::alnum_to_ascii(v as u8)
            .filter(|_| v < 45)
            .ok_or(DecodeError::InvalidData { mode: Mode::AlphaNumeric, value: v })
    };
    let mut idx = index0;
    for _ in 0..len / 2 {
        let x = bs.get_bits(idx, 11);
        if x >= 45 * 45 {
            return Err(DecodeError::InvalidData { mode: Mode::AlphaNumeric, value: x });
        }
        res.push(char_of(x / 45)?);
        res.push(char_of(x % 45)?);
        idx += 11;
    }
    if len % 2 > 0 {
        res.push(char_of(bs.get_bits(idx, 6))?);
        idx += 6;
    }
    Ok(idx)
}


//  ************************************************************
/// Decode `len` digits encoded in numeric mode
//  ************************************************************

fn decode_numeric(bs: &BitSeq, index0: usize, len: usize, res: &mut Vec<u8>) -> Result<usize, DecodeError> {
    let mut idx = index0;
    let push_digits = |x: u32, n_digits: u32, res: &mut Vec<u8>| {
        if x >= 10u32.pow(n_digits) {
            return Err(DecodeError::InvalidData { mode: Mode::Numeric, value: x });
        }
        for d in (0..n_digits).rev() {
            res.push(b'0' + (x / 10u32.pow(d) % 10) as u8);
        }
        Ok(())
    };
    for _ in 0..len / 3 {
        push_digits(bs.get_bits(idx, 10), 3, res)?;
        idx += 10;
    }
    match len % 3 {
        1 => {
            push_digits(bs.get_bits(idx, 4), 1, res)?;
            idx += 4;
        }
        2 => {
            push_digits(bs.get_bits(idx, 7), 2, res)?;
            idx += 7;
        }
        _ => {}
    }
    Ok(idx)
}
