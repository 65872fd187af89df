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
//! Draw a logo on a cleared patch in the center of a rendered QR code
//!
//! The patch is a square of whole modules centered on the symbol.
//! Every module under the patch is lost to the reader, so the patch
//! must stay within what the error correction can recover.
//  ************************************************************

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::{debug, info, trace};

use super::error::{Error, Result};
use super::qr::{self, SnakeDataIterator};
use super::qrencode::{self, QrCode};
use super::render::RenderOptions;


pub const DEFAULT_LOGO_FRACTION: f64 = 0.2;
pub const LOGO_FRACTION_CEILING: f64 = 0.3;

/// Finder pattern, separator and format information on both sides
const RESERVED_BORDER: usize = 9;


//  ************************************************************
/// Size and placement of the logo
//  ************************************************************

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogoOptions {
    /// Patch area as a share of the symbol area (quiet zone excluded)
    pub fraction: f64,
    /// Largest accepted `fraction`
    pub ceiling: f64,
    /// Modules of bare patch around the logo image
    pub margin: u32,
    /// Patch color; `None` for the render background
    pub patch: Option<Rgba<u8>>,
    /// Shrink the patch until every block stays correctable
    pub recoverable: bool,
}

impl Default for LogoOptions {
    fn default() -> Self {
        LogoOptions {
            fraction: DEFAULT_LOGO_FRACTION,
            ceiling: LOGO_FRACTION_CEILING,
            margin: 1,
            patch: None,
            recoverable: true,
        }
    }
}

impl LogoOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.fraction.is_finite() || self.fraction <= 0.0 {
            return Err(Error::InvalidLogoFraction(self.fraction));
        }
        if self.fraction > self.ceiling {
            return Err(Error::LogoTooLarge { fraction: self.fraction, ceiling: self.ceiling });
        }
        Ok(())
    }
}


//  ************************************************************
/// Square of modules with top left corner (`x`, `y`)
//  ************************************************************

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Patch {
    pub x: usize,
    pub y: usize,
    pub side: usize,
}

impl Patch {
    /// Patch of `side` modules centered in a symbol of `n_modules`
    pub fn centered(n_modules: usize, side: usize) -> Self {
        let side = side.min(n_modules);
        let offset = (n_modules - side) / 2;
        Patch { x: offset, y: offset, side }
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.side && y >= self.y && y < self.y + self.side
    }

    pub fn is_empty(&self) -> bool {
        self.side == 0
    }
}


//  ************************************************************
/// Largest side allowed by `fraction` for a symbol of `n_modules`
//  ************************************************************
///
/// The side has the parity of `n_modules` so the patch is exactly centered,
/// and never reaches the finder patterns or the format information.

pub fn max_side(n_modules: usize, fraction: f64) -> usize {
    let mut side = (fraction.max(0.0).sqrt() * n_modules as f64).floor() as usize;
    if side % 2 != n_modules % 2 {
        side = side.saturating_sub(1);
    }
    side.min(n_modules.saturating_sub(2 * RESERVED_BORDER))
}


//  ************************************************************
/// Number of codewords per block with at least one module in `patch`
//  ************************************************************

pub fn damaged_per_block(code: &QrCode, patch: &Patch) -> Result<Vec<usize>> {
    let version = code.version();
    let n_codewords = qr::n_codewords(version);
    let mut touched = vec![false; n_codewords];
    for (i, (x, y)) in SnakeDataIterator::new(version).take(8 * n_codewords).enumerate() {
        if patch.contains(x, y) {
            touched[i / 8] = true;
        }
    }
    let [ecb1, ecb2] = qr::ec_blocks(version, code.ec())?;
    let mut counts = vec![0; ecb1.n + ecb2.n];
    for (&(block, _), &hit) in qrencode::interleave_map(version, code.ec())?.iter().zip(touched.iter()) {
        if hit {
            counts[block] += 1;
        }
    }
    Ok(counts)
}


//  ************************************************************
/// True if every block can recover all codewords under `patch`
//  ************************************************************

pub fn is_recoverable(code: &QrCode, patch: &Patch) -> Result<bool> {
    let [ecb1, _] = qr::ec_blocks(code.version(), code.ec())?;
    let counts = damaged_per_block(code, patch)?;
    trace!("is_recoverable: side={} damaged={:?} r={}", patch.side, counts, ecb1.r);
    Ok(counts.iter().all(|&c| c <= ecb1.r))
}


//  ************************************************************
/// The patch for `code` under `options`
//  ************************************************************

pub fn patch_for(code: &QrCode, options: &LogoOptions) -> Result<Patch> {
    options.validate()?;
    let n = code.get_dim();
    let requested = max_side(n, options.fraction);
    let mut patch = Patch::centered(n, requested);
    if options.recoverable {
        while !patch.is_empty() && !is_recoverable(code, &patch)? {
            patch = Patch::centered(n, patch.side.saturating_sub(2));
        }
    }
    debug!(
        "patch_for: version={} ec={:?} fraction={} requested side={} side={}",
        code.version(),
        code.ec(),
        options.fraction,
        requested,
        patch.side
    );
    Ok(patch)
}


//  ************************************************************
/// Clear the patch and draw `logo` scaled into it
//  ************************************************************

pub fn overlay_logo(
    image: &mut RgbaImage,
    code: &QrCode,
    logo: &RgbaImage,
    render: &RenderOptions,
    options: &LogoOptions,
) -> Result<Patch> {
    render.validate()?;
    let side = render.image_size(code.get_dim())?;
    let patch = patch_for(code, options)?;
    if patch.is_empty() {
        info!("overlay_logo: no room for a logo in version {}", code.version());
        return Ok(patch);
    }
    let ppm = render.pixels_per_module;
    let x0 = render.module_offset(patch.x);
    let y0 = render.module_offset(patch.y);
    let size = patch.side as u32 * ppm;
    let color = options.patch.unwrap_or(render.background);
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            image.put_pixel(x, y, color);
        }
    }

    let area = patch.side.saturating_sub(2 * options.margin as usize) as u32 * ppm;
    if area == 0 || logo.width() == 0 || logo.height() == 0 {
        debug!("overlay_logo: patch cleared, no room for logo image inside margin");
        return Ok(patch);
    }
    let scale = f64::min(area as f64 / logo.width() as f64, area as f64 / logo.height() as f64);
    let w = ((logo.width() as f64 * scale).round() as u32).clamp(1, area);
    let h = ((logo.height() as f64 * scale).round() as u32).clamp(1, area);
    let scaled = imageops::resize(logo, w, h, FilterType::Triangle);
    let lx = x0 + (size - w) / 2;
    let ly = y0 + (size - h) / 2;
    debug_assert!(x0 + size <= side && y0 + size <= side);
    debug!("overlay_logo: logo {}x{} scaled to {}x{} at ({},{})", logo.width(), logo.height(), w, h, lx, ly);
    imageops::overlay(image, &scaled, lx as i64, ly as i64);
    Ok(patch)
}


//  ************************************************************
/// Composite `logo` onto a rendered `image`; without a logo the image is returned as is
//  ************************************************************

pub fn composite(
    mut image: RgbaImage,
    code: &QrCode,
    logo: Option<&RgbaImage>,
    render: &RenderOptions,
    options: &LogoOptions,
) -> Result<RgbaImage> {
    if let Some(logo) = logo {
        info!("composite: begin drawing logo");
        let patch = overlay_logo(&mut image, code, logo, render, options)?;
        info!("composite: done drawing logo; patch={:?}", patch);
    }
    Ok(image)
}


//  ************************************************************
#[cfg(test)]
//  ************************************************************

mod tests {
    use super::*;
    use crate::render;
    use crate::ErrorCorrectionLevel;

    fn red_logo() -> RgbaImage {
        RgbaImage::from_pixel(40, 20, Rgba([255, 0, 0, 255]))
    }

    fn code_for_version(version: u8, ec: ErrorCorrectionLevel) -> QrCode {
        let len = qr::data_capacity(version, crate::Mode::EightBit, ec);
        let text: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
        let code = qrencode::encode(&text, ec).unwrap();
        assert_eq!(code.version(), version);
        code
    }

    #[test]
    fn test_validate() {
        assert_eq!(LogoOptions::default().validate(), Ok(()));
        let o = LogoOptions { fraction: 0.5, ..LogoOptions::default() };
        assert_eq!(o.validate(), Err(Error::LogoTooLarge { fraction: 0.5, ceiling: 0.3 }));
        let o = LogoOptions { fraction: 0.0, ..LogoOptions::default() };
        assert_eq!(o.validate(), Err(Error::InvalidLogoFraction(0.0)));
        let o = LogoOptions { fraction: f64::NAN, ..LogoOptions::default() };
        assert!(matches!(o.validate(), Err(Error::InvalidLogoFraction(_))));
        let o = LogoOptions { fraction: 0.3, ..LogoOptions::default() };
        assert_eq!(o.validate(), Ok(()));
    }

    #[test]
    fn test_max_side() {
        // sqrt(0.2) * 57 = 25.49
        assert_eq!(max_side(57, 0.2), 25);
        // sqrt(0.2) * 45 = 20.12, rounded down to odd
        assert_eq!(max_side(45, 0.2), 19);
        // clamped away from the finder patterns
        assert_eq!(max_side(21, 0.2), 3);
        assert_eq!(max_side(21, 0.0001), 0);
    }

    #[test]
    fn test_patch_centered() {
        let p = Patch::centered(25, 5);
        assert_eq!(p, Patch { x: 10, y: 10, side: 5 });
        assert!(p.contains(10, 14));
        assert!(!p.contains(15, 12));
        assert!(!p.contains(9, 12));
        assert!(Patch::centered(21, 0).is_empty());
    }

    #[test]
    fn test_patch_is_recoverable() {
        let options = LogoOptions::default();
        for version in [2, 5, 10, 13, 20, 27, 40].iter() {
            let code = code_for_version(*version, ErrorCorrectionLevel::H);
            let patch = patch_for(&code, &options).unwrap();
            assert!(patch.side <= max_side(code.get_dim(), options.fraction));
            assert_eq!(patch.side % 2, code.get_dim() % 2);
            let [ecb, _] = qr::ec_blocks(*version, ErrorCorrectionLevel::H).unwrap();
            let counts = damaged_per_block(&code, &patch).unwrap();
            assert!(counts.iter().all(|&c| c <= ecb.r), "version {} counts {:?}", version, counts);
        }
    }

    #[test]
    fn test_patch_unguarded() {
        let options = LogoOptions { recoverable: false, ..LogoOptions::default() };
        let code = code_for_version(10, ErrorCorrectionLevel::L);
        let patch = patch_for(&code, &options).unwrap();
        assert_eq!(patch.side, max_side(57, 0.2));
        // a low error correction level cannot carry a patch of that size
        let guarded = patch_for(&code, &LogoOptions::default()).unwrap();
        assert!(guarded.side < patch.side);
    }

    #[test]
    fn test_composite_without_logo() {
        let code = qrencode::encode(b"abc", ErrorCorrectionLevel::H).unwrap();
        let ro = RenderOptions::default();
        let img = render::render(code.matrix(), &ro).unwrap();
        let out = composite(img.clone(), &code, None, &ro, &LogoOptions::default()).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_composite_with_logo() {
        let code = code_for_version(5, ErrorCorrectionLevel::H);
        let ro = RenderOptions::default();
        let options = LogoOptions::default();
        let img = render::render(code.matrix(), &ro).unwrap();
        let out = composite(img.clone(), &code, Some(&red_logo()), &ro, &options).unwrap();
        assert_eq!(out.dimensions(), img.dimensions());
        let patch = patch_for(&code, &options).unwrap();
        assert!(!patch.is_empty());
        // patch corner is background, center is the logo
        let corner = (ro.module_offset(patch.x), ro.module_offset(patch.y));
        assert_eq!(*out.get_pixel(corner.0, corner.1), ro.background);
        let center = out.width() / 2;
        assert_eq!(*out.get_pixel(center, center), Rgba([255, 0, 0, 255]));
        // quiet zone and finder pattern untouched
        assert_eq!(out.get_pixel(0, 0), img.get_pixel(0, 0));
        let finder = ro.module_offset(3);
        assert_eq!(*out.get_pixel(finder, finder), ro.foreground);
    }

    #[test]
    fn test_composite_patch_color() {
        let code = code_for_version(7, ErrorCorrectionLevel::H);
        let ro = RenderOptions::default();
        let blue = Rgba([0, 0, 255, 255]);
        let options = LogoOptions { patch: Some(blue), margin: 2, ..LogoOptions::default() };
        let img = render::render(code.matrix(), &ro).unwrap();
        let out = composite(img, &code, Some(&red_logo()), &ro, &options).unwrap();
        let patch = patch_for(&code, &options).unwrap();
        assert_eq!(*out.get_pixel(ro.module_offset(patch.x), ro.module_offset(patch.y)), blue);
    }

    #[test]
    fn test_composite_too_large() {
        let code = qrencode::encode(b"abc", ErrorCorrectionLevel::H).unwrap();
        let ro = RenderOptions::default();
        let img = render::render(code.matrix(), &ro).unwrap();
        let options = LogoOptions { fraction: 0.31, ..LogoOptions::default() };
        let res = composite(img, &code, Some(&red_logo()), &ro, &options);
        assert_eq!(res, Err(Error::LogoTooLarge { fraction: 0.31, ceiling: 0.3 }));
    }

    #[test]
    fn test_overlay_scale_overflow() {
        let code = code_for_version(40, ErrorCorrectionLevel::H);
        let ro = RenderOptions { pixels_per_module: 20_000_000, ..RenderOptions::default() };
        let mut img = RgbaImage::new(1, 1);
        let res = overlay_logo(&mut img, &code, &red_logo(), &ro, &LogoOptions::default());
        assert_eq!(res, Err(Error::InvalidScale(20_000_000)));
        assert_eq!(img, RgbaImage::new(1, 1));
    }
}
