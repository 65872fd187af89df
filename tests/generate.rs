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
//! Test generating QR Code bitmaps, with and without logo, and reading them back
//  ************************************************************

use qrlogo::logo::{self, LogoOptions};
use qrlogo::prng::Rng;
use qrlogo::qrdecode::{decode_image, decode_matrix};
use qrlogo::{generate, generate_with, qr, qrencode, Error, ErrorCorrectionLevel, Mode, Options, RenderOptions, RgbaImage};

mod common;
use common::{print_decoding_result, test_logo};


//  ************************************************************

fn round_trip(text: &str, ec: ErrorCorrectionLevel, ppm: u32) {
    let img = generate(text, ec, ppm, None, None).unwrap();
    let res = decode_image(&img, ppm, qr::QUIET_ZONE);
    print_decoding_result(&res);
    assert_eq!(res.unwrap().data, text.as_bytes().to_vec());
}

#[test]
fn generate_round_trip() {
    for text in ["", "0", "HELLO WORLD", "https://qrlogo.kaarposoft.dk", "æøå ÆØÅ", "3141592653589793238462643383279"].iter() {
        for ec in ErrorCorrectionLevel::ALL.iter() {
            round_trip(text, *ec, 2);
        }
    }
}

#[test]
fn generate_round_trip_random() {
    let mut rng = Rng::new(4711);
    for _ in 0..20 {
        let len = rng.get_usize_clamped(0, 300);
        let text: String = (0..len).map(|_| char::from(rng.get_usize_clamped(0x20, 0x7F) as u8)).collect();
        round_trip(&text, ErrorCorrectionLevel::M, 1);
    }
}

#[test]
fn generate_empty_is_version_1() {
    let img = generate("", ErrorCorrectionLevel::M, 4, None, None).unwrap();
    assert_eq!(img.dimensions(), (116, 116));
}

#[test]
fn generate_dimensions() {
    for (len, ppm) in [(10, 1), (100, 3), (1000, 2)].iter() {
        let text = "x".repeat(*len);
        let code = qrencode::encode(text.as_bytes(), ErrorCorrectionLevel::Q).unwrap();
        let img = generate(&text, ErrorCorrectionLevel::Q, *ppm, None, None).unwrap();
        let side = (code.get_dim() as u32 + 8) * ppm;
        assert_eq!(img.dimensions(), (side, side));
    }
}

#[test]
fn generate_invalid_scale() {
    assert_eq!(generate("abc", ErrorCorrectionLevel::M, 0, None, None), Err(Error::InvalidScale(0)));
}

#[test]
fn generate_capacity_exceeded() {
    let text = "a".repeat(2954);
    let res = generate(&text, ErrorCorrectionLevel::L, 1, None, None);
    assert_eq!(
        res,
        Err(Error::CapacityExceeded { len: 2954, max: 2953, mode: Mode::EightBit, ec: ErrorCorrectionLevel::L })
    );
    assert!(generate(&text[1..], ErrorCorrectionLevel::L, 1, None, None).is_ok());
}

#[test]
fn generate_numeric_version_boundary() {
    let code = qrencode::encode("1".repeat(41).as_bytes(), ErrorCorrectionLevel::L).unwrap();
    assert_eq!((code.mode(), code.version()), (Mode::Numeric, 1));
    let code = qrencode::encode("1".repeat(42).as_bytes(), ErrorCorrectionLevel::L).unwrap();
    assert_eq!((code.mode(), code.version()), (Mode::Numeric, 2));
}

#[test]
fn generate_codeword_counts() {
    // total codewords per version (ISO 18004 table 1)
    let expected: [usize; 40] = [
        26, 44, 70, 100, 134, 172, 196, 242, 292, 346, 404, 466, 532, 581, 655, 733, 815, 901, 991, 1085, 1156, 1258,
        1364, 1474, 1588, 1706, 1828, 1921, 2051, 2185, 2323, 2465, 2611, 2761, 2876, 3034, 3196, 3362, 3532, 3706,
    ];
    for version in qr::VERSION_MIN..=qr::VERSION_MAX {
        assert_eq!(qr::n_codewords(version), expected[version as usize - 1]);
        for ec in ErrorCorrectionLevel::ALL.iter() {
            let [ecb1, ecb2] = qr::ec_blocks(version, *ec).unwrap();
            assert_eq!(ecb1.n * ecb1.c + ecb2.n * ecb2.c, expected[version as usize - 1]);
            let data = vec![0xA5; qr::n_data_codewords(version, *ec)];
            let codewords = qrencode::add_error_correction(&data, version, *ec).unwrap();
            assert_eq!(codewords.len(), expected[version as usize - 1]);
        }
    }
}

#[test]
fn generate_format_info() {
    for (i, ec) in ErrorCorrectionLevel::ALL.iter().enumerate() {
        let text = format!("format information {}", i);
        let code = qrencode::encode(text.as_bytes(), *ec).unwrap();
        for bits in code.matrix().get_format().iter() {
            let (read_ec, read_mask, distance) = qr::format_from_bits(*bits);
            assert_eq!((read_ec, read_mask, distance), (*ec, code.mask(), 0));
        }
    }
}

#[test]
fn generate_deterministic() {
    let text = "The quick brown fox jumps over the lazy dog";
    let first = qrencode::encode(text.as_bytes(), ErrorCorrectionLevel::H).unwrap();
    for _ in 0..5 {
        assert_eq!(qrencode::encode(text.as_bytes(), ErrorCorrectionLevel::H).unwrap(), first);
    }
    let a = generate(text, ErrorCorrectionLevel::H, 2, None, None).unwrap();
    let b = generate(text, ErrorCorrectionLevel::H, 2, None, None).unwrap();
    assert_eq!(a, b);
}


//  ************************************************************
//  Logo
//  ************************************************************

#[test]
fn generate_logo_too_large() {
    let logo = test_logo(32, 32);
    let res = generate("abc", ErrorCorrectionLevel::L, 4, Some(&logo), Some(0.5));
    assert_eq!(res, Err(Error::LogoTooLarge { fraction: 0.5, ceiling: 0.3 }));
    let res = generate("abc", ErrorCorrectionLevel::H, 4, Some(&logo), Some(-0.1));
    assert_eq!(res, Err(Error::InvalidLogoFraction(-0.1)));
}

#[test]
fn generate_without_logo_is_unchanged() {
    let plain = generate("no logo", ErrorCorrectionLevel::H, 3, None, None).unwrap();
    let ignored = generate("no logo", ErrorCorrectionLevel::H, 3, None, Some(0.25)).unwrap();
    assert_eq!(plain, ignored);
}

#[test]
fn generate_logo_changes_center_only() {
    let text = "https://qrlogo.kaarposoft.dk/qrlogo.html";
    let logo = test_logo(64, 48);
    let plain = generate(text, ErrorCorrectionLevel::H, 4, None, None).unwrap();
    let with_logo = generate(text, ErrorCorrectionLevel::H, 4, Some(&logo), None).unwrap();
    assert_eq!(plain.dimensions(), with_logo.dimensions());
    assert_ne!(plain, with_logo);
    // finder pattern corners are untouched
    let side = plain.width();
    for &(x, y) in [(20, 20), (side - 21, 20), (20, side - 21)].iter() {
        assert_eq!(plain.get_pixel(x, y), with_logo.get_pixel(x, y));
    }
}

fn logo_round_trip(len: usize, fraction: f64, seed: u32) {
    let mut rng = Rng::new(seed);
    let text: Vec<u8> = (0..len).map(|_| rng.get_usize_clamped(0x21, 0x7F) as u8).collect();
    let logo = test_logo(100, 80);
    let mut options = Options { ec: ErrorCorrectionLevel::H, ..Options::default() };
    options.render = RenderOptions { pixels_per_module: 3, ..RenderOptions::default() };
    options.logo = LogoOptions { fraction, ..LogoOptions::default() };
    let img = generate_with(&text, Some(&logo), &options).unwrap();

    let code = qrencode::encode(&text, ErrorCorrectionLevel::H).unwrap();
    let patch = logo::patch_for(&code, &options.logo).unwrap();
    println!("logo_round_trip: len={} version={} fraction={} patch={:?}", len, code.version(), fraction, patch);

    let res = decode_image(&img, 3, qr::QUIET_ZONE);
    print_decoding_result(&res);
    assert_eq!(res.unwrap().data, text);
}

#[test]
fn generate_logo_decodes() {
    for (i, len) in [1, 20, 60, 120, 250, 400, 700, 1000, 1273].iter().enumerate() {
        logo_round_trip(*len, 0.2, 100 + i as u32);
    }
}

#[test]
fn generate_logo_decodes_small_fraction() {
    logo_round_trip(90, 0.05, 7);
    logo_round_trip(300, 0.1, 8);
}

#[test]
fn generate_logo_every_version() {
    // the patch never exceeds what the error correction recovers
    let options = LogoOptions::default();
    for version in qr::VERSION_MIN..=qr::VERSION_MAX {
        let len = qr::data_capacity(version, Mode::EightBit, ErrorCorrectionLevel::H);
        let text = vec![b'q'; len];
        let code = qrencode::encode(&text, ErrorCorrectionLevel::H).unwrap();
        let patch = logo::patch_for(&code, &options).unwrap();
        let mut matrix = code.matrix().clone();
        for y in patch.y..patch.y + patch.side {
            for x in patch.x..patch.x + patch.side {
                matrix.set(x, y, !matrix.get(x, y));
            }
        }
        let res = decode_matrix(&matrix);
        assert_eq!(res.map(|d| d.data), Ok(text), "version {} patch {:?}", version, patch);
    }
}

#[test]
fn generate_logo_custom_patch() {
    let logo = RgbaImage::from_pixel(10, 10, qrlogo::Rgba([0, 0, 0, 255]));
    let mut options = Options { ec: ErrorCorrectionLevel::H, ..Options::default() };
    options.logo.patch = Some(qrlogo::Rgba([255, 255, 0, 255]));
    options.logo.margin = 0;
    let img = generate_with(b"custom patch color", Some(&logo), &options).unwrap();
    let res = decode_image(&img, options.render.pixels_per_module, options.render.quiet_zone);
    print_decoding_result(&res);
    assert_eq!(res.unwrap().data, b"custom patch color".to_vec());
}
