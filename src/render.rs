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
//! Render a QR code matrix to an RGBA bitmap
//  ************************************************************

use image::{Rgba, RgbaImage};
use log::{debug, info};

use super::error::{Error, Result};
use super::matrix::Matrix;
use super::qr;


//  ************************************************************
/// How modules are turned into pixels
//  ************************************************************

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Side of one module in pixels
    pub pixels_per_module: u32,
    /// Light border around the symbol, in modules
    pub quiet_zone: u32,
    pub foreground: Rgba<u8>,
    pub background: Rgba<u8>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            pixels_per_module: 4,
            quiet_zone: qr::QUIET_ZONE,
            foreground: Rgba([0, 0, 0, 255]),
            background: Rgba([255, 255, 255, 255]),
        }
    }
}

impl RenderOptions {
    /// Fails for a zero scale, or a scale too large for even the smallest symbol
    pub fn validate(&self) -> Result<()> {
        if self.pixels_per_module == 0 {
            return Err(Error::InvalidScale(self.pixels_per_module));
        }
        self.image_size(qr::MODULES_MIN).map(|_| ())
    }

    /// Side of the rendered bitmap in pixels
    ///
    /// Fails with `InvalidScale` if the side does not fit in `u32`.
    pub fn image_size(&self, n_modules: usize) -> Result<u32> {
        u32::try_from(n_modules)
            .ok()
            .and_then(|n| self.quiet_zone.checked_mul(2)?.checked_add(n))
            .and_then(|cells| cells.checked_mul(self.pixels_per_module))
            .filter(|_| self.pixels_per_module > 0)
            .ok_or(Error::InvalidScale(self.pixels_per_module))
    }

    /// Pixel coordinate of the top (or left) edge of module row (or column) `i`
    ///
    /// Only valid for modules of a symbol whose `image_size` succeeded.
    pub fn module_offset(&self, i: usize) -> u32 {
        (i as u32 + self.quiet_zone) * self.pixels_per_module
    }
}


//  ************************************************************
/// Render `matrix` with a quiet zone
//  ************************************************************

pub fn render(matrix: &Matrix, options: &RenderOptions) -> Result<RgbaImage> {
    options.validate()?;
    info!("render: begin transfer qr matrix onto bitmap");
    let n = matrix.get_dim();
    let size = options.image_size(n)?;
    let ppm = options.pixels_per_module;
    let quiet = options.quiet_zone as i64;
    debug!("render: n_modules={} pixels_per_module={} quiet_zone={} size={}", n, ppm, quiet, size);

    let mut img = RgbaImage::from_pixel(size, size, options.background);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let mx = (x / ppm) as i64 - quiet;
        let my = (y / ppm) as i64 - quiet;
        let inside = mx >= 0 && my >= 0 && (mx as usize) < n && (my as usize) < n;
        if inside && matrix.get(mx as usize, my as usize) {
            *pixel = options.foreground;
        }
    }
    info!("render: done transfer qr matrix onto bitmap");
    Ok(img)
}


//  ************************************************************
/// Render `matrix` as text, two characters per module
//  ************************************************************
///
/// With `ansi`, dark and light modules are drawn with terminal colors,
/// otherwise dark modules are `##` and light modules are blanks.

pub fn to_text(matrix: &Matrix, quiet_zone: usize, ansi: bool) -> String {
    let n = matrix.get_dim();
    let (dark, light, eol) = if ansi { ("\x1b[40m  ", "\x1b[47m  ", "\x1b[0m\n") } else { ("##", "  ", "\n") };
    let mut s = String::with_capacity((n + 2 * quiet_zone) * (n + 2 * quiet_zone) * (light.len() + 1));
    for y in 0..n + 2 * quiet_zone {
        for x in 0..n + 2 * quiet_zone {
            let inside = (quiet_zone..quiet_zone + n).contains(&x) && (quiet_zone..quiet_zone + n).contains(&y);
            if inside && matrix.get(x - quiet_zone, y - quiet_zone) {
                s.push_str(dark);
            } else {
                s.push_str(light);
            }
        }
        s.push_str(eol);
    }
    s
}
