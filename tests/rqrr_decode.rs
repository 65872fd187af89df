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
//! Read generated bitmaps with an independent QR Code reader (rqrr)
//  ************************************************************

use image::imageops;
use qrlogo::logo::LogoOptions;
use qrlogo::{generate, generate_with, qrencode, ErrorCorrectionLevel, Options, RenderOptions, RgbaImage};

mod common;
use common::test_logo;


//  ************************************************************

const EC_LEVELS: [ErrorCorrectionLevel; 4] =
    [ErrorCorrectionLevel::L, ErrorCorrectionLevel::M, ErrorCorrectionLevel::Q, ErrorCorrectionLevel::H];

/// Detect exactly one symbol in `img` and return (version, ec format bits, mask, text)
fn rqrr_decode(img: &RgbaImage) -> (usize, u16, u16, String) {
    let gray = imageops::grayscale(img);
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(gray.width() as usize, gray.height() as usize, |x, y| {
        gray.get_pixel(x as u32, y as u32)[0]
    });
    let grids = prepared.detect_grids();
    assert_eq!(grids.len(), 1, "rqrr found {} symbols", grids.len());
    let (meta, content) = grids[0].decode().unwrap();
    (meta.version.0, meta.ecc_level, meta.mask, content)
}

fn rqrr_round_trip(text: &str, ec: ErrorCorrectionLevel) -> usize {
    let code = qrencode::encode(text.as_bytes(), ec).unwrap();
    let img = generate(text, ec, 4, None, None).unwrap();
    let (version, ecc_level, mask, content) = rqrr_decode(&img);
    println!("rqrr_round_trip: len={} ec={:?} version={} mask={}", text.len(), ec, version, mask);
    assert_eq!(content, text);
    assert_eq!(version, code.version() as usize);
    assert_eq!(ecc_level, ec as u16);
    assert_eq!(mask, code.mask() as u16);
    version
}


//  ************************************************************

#[test]
fn rqrr_version_1() {
    for ec in EC_LEVELS.iter() {
        assert_eq!(rqrr_round_trip("HELLO", *ec), 1);
        assert_eq!(rqrr_round_trip("01234567", *ec), 1);
        assert_eq!(rqrr_round_trip("qr", *ec), 1);
    }
}

#[test]
fn rqrr_with_version_info() {
    // version 7 and up carry the two version information blocks
    let digits: String = (0..400).map(|i| char::from(b'0' + (i % 10) as u8)).collect();
    let alnum: String = (0..300).map(|i| char::from(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 $%*+-./:"[i % 45])).collect();
    let bytes: String = (0..200).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    for ec in EC_LEVELS.iter() {
        for text in [&digits, &alnum, &bytes].iter() {
            assert!(rqrr_round_trip(text, *ec) >= 7);
        }
    }
}

#[test]
fn rqrr_large_versions() {
    let text: String = (0..1200).map(|i| char::from(b'!' + (i * 7 % 94) as u8)).collect();
    assert!(rqrr_round_trip(&text, ErrorCorrectionLevel::L) >= 25);
    assert!(rqrr_round_trip(&text[..600], ErrorCorrectionLevel::H) >= 25);
}

#[test]
fn rqrr_logo() {
    let logo = test_logo(100, 80);
    for text in ["https://qrlogo.kaarposoft.dk", "a logo in the middle of a larger symbol, read by another decoder"].iter() {
        let mut options = Options { ec: ErrorCorrectionLevel::H, ..Options::default() };
        options.render = RenderOptions { pixels_per_module: 4, ..RenderOptions::default() };
        options.logo = LogoOptions { fraction: 0.2, ..LogoOptions::default() };
        let img = generate_with(text.as_bytes(), Some(&logo), &options).unwrap();
        let (_, ecc_level, _, content) = rqrr_decode(&img);
        assert_eq!(content, *text);
        assert_eq!(ecc_level, ErrorCorrectionLevel::H as u16);
    }
}
