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
//! QR-Logo: QR codes with a logo in the middle
//!
//! Text is encoded into a QR code symbol (ISO 18004 model 2, versions 1 to 40,
//! numeric, alpha numeric and 8 bit modes), rendered to an RGBA bitmap,
//! and optionally a logo is drawn on a cleared patch in the center.
//!
//! ```no_run
//! use qrlogo::{generate, ErrorCorrectionLevel};
//!
//! let logo = image::open("logo.png").unwrap().to_rgba8();
//! let img = generate("https://example.com", ErrorCorrectionLevel::H, 8, Some(&logo), Some(0.15)).unwrap();
//! img.save("qr.png").unwrap();
//! ```
//  ************************************************************

use std::fmt;
use std::str::FromStr;

use log::info;

pub mod error;
pub mod logging;
pub mod logo;
pub mod mask;
pub mod matrix;
pub mod prng;
pub mod qr;
pub mod qrdecode;
pub mod qrencode;
pub mod reedsolomon;
pub mod render;
#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{DecodeError, Error, Result};
pub use image::{Rgba, RgbaImage};
pub use logo::LogoOptions;
pub use qrencode::{encode, QrCode};
pub use render::RenderOptions;


//  ************************************************************
/// Mode (Numeric, Alpha Numeric, 8 bit) as defined by ISO 18004
//  ************************************************************
///
/// Defines how text is encoded into the QR code.
/// The value is the 4 bit mode indicator.
///
/// # Note
///
/// We only implement Numeric, Alpha Numeric, and 8 bit.
/// ISO 18004 defines other modes which are not implemented

#[cfg_attr(feature = "wasm", wasm_bindgen::prelude::wasm_bindgen)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Numeric = 1,
    AlphaNumeric = 2,
    EightBit = 4,
}


//  ************************************************************
/// Error Correction Level (L/M/Q/H) as defined by ISO 18004
//  ************************************************************
///
/// The value is the 2 bit indicator used in the format information.

#[cfg_attr(feature = "wasm", wasm_bindgen::prelude::wasm_bindgen)]
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCorrectionLevel {
    /// ~ 7% error correction capability
    L = 1,
    /// ~ 15% error correction capability
    M = 0,
    /// ~ 25% error correction capability
    Q = 3,
    /// ~ 30% error correction capability
    H = 2,
}

impl ErrorCorrectionLevel {
    /// All levels, from lowest to highest error correction capability
    pub const ALL: [ErrorCorrectionLevel; 4] =
        [ErrorCorrectionLevel::L, ErrorCorrectionLevel::M, ErrorCorrectionLevel::Q, ErrorCorrectionLevel::H];

    /// Index into tables ordered L, M, Q, H
    pub fn ordinal(self) -> usize {
        match self {
            ErrorCorrectionLevel::L => 0,
            ErrorCorrectionLevel::M => 1,
            ErrorCorrectionLevel::Q => 2,
            ErrorCorrectionLevel::H => 3,
        }
    }
}

impl Default for ErrorCorrectionLevel {
    fn default() -> Self {
        ErrorCorrectionLevel::M
    }
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for ErrorCorrectionLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "L" | "l" => Ok(ErrorCorrectionLevel::L),
            "M" | "m" => Ok(ErrorCorrectionLevel::M),
            "Q" | "q" => Ok(ErrorCorrectionLevel::Q),
            "H" | "h" => Ok(ErrorCorrectionLevel::H),
            _ => Err(format!("invalid error correction level '{}' (expected L, M, Q or H)", s)),
        }
    }
}


//  ************************************************************
/// Options for `generate_with`
//  ************************************************************

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Options {
    pub ec: ErrorCorrectionLevel,
    pub render: RenderOptions,
    pub logo: LogoOptions,
}


//  ************************************************************
/// Generate a QR code bitmap for `text`, optionally with a logo
//  ************************************************************
///
/// `logo_fraction` is the share of the symbol area covered by the logo patch;
/// when `None` the default of `LogoOptions` is used.
/// Without a logo, `logo_fraction` is ignored.
///
/// Use `ErrorCorrectionLevel::H` with a logo.

pub fn generate(
    text: &str,
    ec: ErrorCorrectionLevel,
    pixels_per_module: u32,
    logo: Option<&RgbaImage>,
    logo_fraction: Option<f64>,
) -> Result<RgbaImage> {
    let mut options = Options { ec, ..Options::default() };
    options.render.pixels_per_module = pixels_per_module;
    if let Some(fraction) = logo_fraction {
        options.logo.fraction = fraction;
    }
    generate_with(text.as_bytes(), logo, &options)
}


//  ************************************************************
/// Generate a QR code bitmap for `text` with full control of the options
//  ************************************************************

pub fn generate_with(text: &[u8], logo: Option<&RgbaImage>, options: &Options) -> Result<RgbaImage> {
    info!("generate: begin; text.len={} ec={:?} logo={}", text.len(), options.ec, logo.is_some());
    options.render.validate()?;
    if logo.is_some() {
        options.logo.validate()?;
    }
    let code = qrencode::encode(text, options.ec)?;
    let img = render::render(code.matrix(), &options.render)?;
    let img = logo::composite(img, &code, logo, &options.render, &options.logo)?;
    info!("generate: done; version={} mask={} size={}x{}", code.version(), code.mask(), img.width(), img.height());
    Ok(img)
}


//  ************************************************************
#[cfg(test)]
//  ************************************************************

mod tests {
    use super::*;

    #[test]
    fn test_ec_from_str() {
        assert_eq!("h".parse::<ErrorCorrectionLevel>(), Ok(ErrorCorrectionLevel::H));
        assert_eq!("Q".parse::<ErrorCorrectionLevel>(), Ok(ErrorCorrectionLevel::Q));
        assert!("X".parse::<ErrorCorrectionLevel>().is_err());
    }

    #[test]
    fn test_ec_ordinal() {
        for (i, ec) in ErrorCorrectionLevel::ALL.iter().enumerate() {
            assert_eq!(ec.ordinal(), i);
        }
        assert_eq!(ErrorCorrectionLevel::default(), ErrorCorrectionLevel::M);
    }

    #[test]
    fn test_generate_empty() {
        let img = generate("", ErrorCorrectionLevel::M, 4, None, None).unwrap();
        assert_eq!(img.dimensions(), (116, 116));
    }

    #[test]
    fn test_generate_invalid_scale() {
        assert_eq!(generate("abc", ErrorCorrectionLevel::M, 0, None, None), Err(Error::InvalidScale(0)));
        assert_eq!(generate("", ErrorCorrectionLevel::M, 200_000_000, None, None), Err(Error::InvalidScale(200_000_000)));
        assert_eq!(generate("", ErrorCorrectionLevel::M, u32::MAX, None, None), Err(Error::InvalidScale(u32::MAX)));
    }

    #[test]
    fn test_generate_logo_too_large() {
        let logo = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        let res = generate("abc", ErrorCorrectionLevel::L, 4, Some(&logo), Some(0.5));
        assert_eq!(res, Err(Error::LogoTooLarge { fraction: 0.5, ceiling: 0.3 }));
    }

    #[test]
    fn test_generate_fraction_without_logo() {
        let plain = generate("abc", ErrorCorrectionLevel::H, 3, None, None).unwrap();
        let ignored = generate("abc", ErrorCorrectionLevel::H, 3, None, Some(0.9)).unwrap();
        assert_eq!(plain, ignored);
    }
}
