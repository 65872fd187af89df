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
//! Web Assembly interface
//!
//! Bitmaps are handed to JavaScript as objects
//! `{ width, height, version, mask, data }` where `data` is a
//! `Uint8ClampedArray` ready for `new ImageData(data, width, height)`.
//  ************************************************************

use js_sys::{Object, Reflect, Uint8ClampedArray};
use wasm_bindgen::prelude::*;

use super::error::Error;
use super::logo::LogoOptions;
use super::render::{self, RenderOptions};
use super::{logging, qr, qrencode, ErrorCorrectionLevel, Mode, RgbaImage};


//  ************************************************************
/// Browser console
//  ************************************************************

pub mod console {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = console)]
        pub fn log(s: &str);
        #[wasm_bindgen(js_namespace = console)]
        pub fn warn(s: &str);
        #[wasm_bindgen(js_namespace = console)]
        pub fn error(s: &str);
    }
}


//  ************************************************************
/// Set logging level
//  ************************************************************

#[wasm_bindgen]
pub fn set_loglevel(lvl: usize) {
    logging::set_loglevel(lvl);
}


//  ************************************************************
/// Get QR code `version` from text length
//  ************************************************************

#[wasm_bindgen]
pub fn version_from_length(len: usize, mode: Mode, ec: ErrorCorrectionLevel) -> Option<u8> {
    qr::version_from_length(len, mode, ec)
}


//  ************************************************************
/// Encode text to an RGBA bitmap
//  ************************************************************

#[wasm_bindgen]
pub fn encode_to_rgba(txt: &str, ec: ErrorCorrectionLevel, pixels_per_module: u32) -> Result<Object, JsValue> {
    bitmap(txt, ec, pixels_per_module, None, None)
}


//  ************************************************************
/// Encode text to an RGBA bitmap with a logo given as raw RGBA bytes
//  ************************************************************

#[wasm_bindgen]
pub fn encode_with_logo(
    txt: &str,
    ec: ErrorCorrectionLevel,
    pixels_per_module: u32,
    logo: &[u8],
    logo_width: u32,
    logo_height: u32,
    fraction: Option<f64>,
) -> Result<Object, JsValue> {
    let logo = RgbaImage::from_raw(logo_width, logo_height, logo.to_vec()).ok_or_else(|| {
        JsValue::from_str(&format!("logo: {} bytes do not hold {}x{} RGBA pixels", logo.len(), logo_width, logo_height))
    })?;
    bitmap(txt, ec, pixels_per_module, Some(&logo), fraction)
}


fn bitmap(
    txt: &str,
    ec: ErrorCorrectionLevel,
    pixels_per_module: u32,
    logo: Option<&RgbaImage>,
    fraction: Option<f64>,
) -> Result<Object, JsValue> {
    let render_options = RenderOptions { pixels_per_module, ..RenderOptions::default() };
    let mut logo_options = LogoOptions::default();
    if let Some(f) = fraction {
        logo_options.fraction = f;
    }
    let code = qrencode::encode(txt.as_bytes(), ec).map_err(js_error)?;
    let img = render::render(code.matrix(), &render_options).map_err(js_error)?;
    let img = super::logo::composite(img, &code, logo, &render_options, &logo_options).map_err(js_error)?;

    let result = Object::new();
    set_value(&result, "width", img.width())?;
    set_value(&result, "height", img.height())?;
    set_value(&result, "version", code.version())?;
    set_value(&result, "mask", code.mask())?;
    set_value(&result, "data", Uint8ClampedArray::from(img.as_raw().as_slice()))?;
    Ok(result)
}


//  ************************************************************
/// Helper function to assign a value to a field in a JavaScript object
//  ************************************************************

fn set_value<F: Into<JsValue>>(object: &Object, field: &str, value: F) -> Result<(), JsValue> {
    Reflect::set(object, &JsValue::from(field), &value.into())?;
    Ok(())
}

fn js_error(err: Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}
