#![allow(dead_code)]

use qrlogo::qrdecode::Decoded;
use qrlogo::DecodeError;

pub fn print_decoding_result(res: &Result<Decoded, DecodeError>) {
    println!("{}", ">".repeat(60));
    match res {
        Ok(decoded) => print!("{}", decoded),
        Err(err) => println!("ERROR:     {}", err),
    }
    println!("{}", "<".repeat(60));
}

/// Logo with an opaque colored frame and a transparent hole
pub fn test_logo(width: u32, height: u32) -> qrlogo::RgbaImage {
    qrlogo::RgbaImage::from_fn(width, height, |x, y| {
        let frame = x < width / 4 || x >= width - width / 4 || y < height / 4 || y >= height - height / 4;
        if frame {
            qrlogo::Rgba([(7 * x) as u8, 0x20, (5 * y) as u8, 0xFF])
        } else {
            qrlogo::Rgba([0, 0, 0, 0])
        }
    })
}
