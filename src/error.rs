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
//! Errors returned when generating or reading QR codes
//  ************************************************************

use thiserror::Error;

use super::{ErrorCorrectionLevel, Mode};


//  ************************************************************
/// Errors from encoding, rendering and logo compositing
//  ************************************************************

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The text does not fit into a version 40 symbol
    #[error("text too long: {len} characters, at most {max} fit in {mode:?} mode at error correction level {ec:?}")]
    CapacityExceeded { len: usize, max: usize, mode: Mode, ec: ErrorCorrectionLevel },

    /// No block table exists for the version / error correction level,
    /// or the codeword stream does not match the table
    #[error("unsupported version {version} at error correction level {ec:?}")]
    UnsupportedVersion { version: u8, ec: ErrorCorrectionLevel },

    /// Pixels per module must be positive and the bitmap side must fit in `u32`
    #[error("invalid scale: {0} pixels per module")]
    InvalidScale(u32),

    /// The requested logo area exceeds the allowed fraction of the symbol
    #[error("logo too large: requested {fraction} of the symbol area, at most {ceiling} allowed")]
    LogoTooLarge { fraction: f64, ceiling: f64 },

    #[error("invalid logo fraction: {0}")]
    InvalidLogoFraction(f64),
}

pub type Result<T> = std::result::Result<T, Error>;


//  ************************************************************
/// Errors from reading a module matrix back into data
//  ************************************************************

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid dimension: {0} is not the side of a QR code symbol")]
    InvalidDimension(usize),

    #[error("image of {width}x{height} pixels does not hold a symbol at {pixels_per_module} pixels per module")]
    InvalidImage { width: u32, height: u32, pixels_per_module: u32 },

    #[error("no valid format information found")]
    FormatInfo,

    #[error("too many errors in block {block}")]
    Uncorrectable { block: usize },

    #[error("unsupported mode indicator {0:#06b}")]
    UnsupportedMode(u8),

    #[error("invalid character count {len} (at most {max} in this symbol)")]
    InvalidLength { len: usize, max: usize },

    #[error("invalid {mode:?} data value {value}")]
    InvalidData { mode: Mode, value: u32 },
}
