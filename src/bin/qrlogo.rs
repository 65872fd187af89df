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
//! Command line QR code generator
//  ************************************************************

use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, Command};

use qrlogo::{logging, qrencode, render, ErrorCorrectionLevel, LogoOptions, Options, RenderOptions};


//  ************************************************************

const ABOUT: &str = "Encode data into a QR Code, optionally with a logo

The <DATA> provided is encoded into a QR Code.

By default the QR Code is output as text to stdout.
By specifying --ansi the output to stdout uses ANSI escape codes on stdout.
By specifying --file <FILE> the output will be written to the <FILE> specified.
The file type (eg .png, or .jpg) determines the format of the <FILE>.
A --logo <LOGO> image is drawn in the center of the QR Code written to <FILE>.
";


//  ************************************************************

const ARG_DEBUG: &str = "DEBUG";
const ARG_EC: &str = "EC";
const ARG_ANSI: &str = "ANSI";
const ARG_PPM: &str = "PPM";
const ARG_QUIET: &str = "QUIET";
const ARG_FILE: &str = "FILE";
const ARG_LOGO: &str = "LOGO";
const ARG_FRACTION: &str = "FRACTION";
const ARG_DATA: &str = "DATA";


//  ************************************************************

fn cli() -> Command {
    Command::new("qrlogo")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Henrik <henrik@kaarposoft.dk>")
        .about(ABOUT)
        .arg(
            Arg::new(ARG_DEBUG)
                .short('d')
                .long("debug")
                .help("Specify -d/--debug one or more times to increase debug level")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new(ARG_EC)
                .short('e')
                .long("error-correction-level")
                .help("Error correction level [default: M, or H with a logo]")
                .value_name(ARG_EC)
                .value_parser(["L", "l", "M", "m", "Q", "q", "H", "h"]),
        )
        .arg(
            Arg::new(ARG_ANSI)
                .short('a')
                .long("ansi")
                .help("Output ansi control codes (when encoding to stdout)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(ARG_PPM)
                .short('p')
                .long("pixels-per-module")
                .help("Image pixels per QR Code module (when encoding to file) [possible values: 1-64]")
                .value_name(ARG_PPM)
                .value_parser(value_parser!(u32).range(1..=64))
                .default_value("4"),
        )
        .arg(
            Arg::new(ARG_QUIET)
                .short('q')
                .long("quiet-zone")
                .help("Light border around the QR Code, in modules [possible values: 0-64]")
                .value_name(ARG_QUIET)
                .value_parser(value_parser!(u32).range(..=64))
                .default_value("4"),
        )
        .arg(
            Arg::new(ARG_FILE)
                .short('f')
                .long("file")
                .help("File (path) to write QR Code image to")
                .value_name(ARG_FILE)
                .conflicts_with(ARG_ANSI),
        )
        .arg(
            Arg::new(ARG_LOGO)
                .short('l')
                .long("logo")
                .help("Image file with a logo to draw in the center")
                .value_name(ARG_LOGO)
                .requires(ARG_FILE),
        )
        .arg(
            Arg::new(ARG_FRACTION)
                .short('F')
                .long("logo-fraction")
                .help("Share of the QR Code area covered by the logo [default: 0.2, at most 0.3]")
                .value_name(ARG_FRACTION)
                .value_parser(value_parser!(f64))
                .requires(ARG_LOGO),
        )
        .arg(Arg::new(ARG_DATA).value_name("DATA").help("Data to be encoded").required(true))
}


//  ************************************************************

fn main() {
    let matches = cli().get_matches();

    logging::set_loglevel(matches.get_count(ARG_DEBUG) as usize);

    let data = match matches.get_one::<String>(ARG_DATA) {
        Some(d) => d.clone(),
        None => invalid_exit(ErrorKind::MissingRequiredArgument, &"no DATA given"),
    };
    let logo_path = matches.get_one::<String>(ARG_LOGO);

    let ec = match matches.get_one::<String>(ARG_EC) {
        Some(e) => e.parse::<ErrorCorrectionLevel>().unwrap_or_else(|e| invalid_exit(ErrorKind::InvalidValue, &e)),
        None if logo_path.is_some() => ErrorCorrectionLevel::H,
        None => ErrorCorrectionLevel::M,
    };

    let ppm = matches.get_one::<u32>(ARG_PPM).copied().unwrap_or(4);
    let quiet_zone = matches.get_one::<u32>(ARG_QUIET).copied().unwrap_or(4);
    let ansi = matches.get_flag(ARG_ANSI);

    match matches.get_one::<String>(ARG_FILE) {
        None => {
            let code = qrencode::encode(data.as_bytes(), ec).unwrap_or_else(|e| invalid_exit(ErrorKind::InvalidValue, &e));
            print!("{}", render::to_text(code.matrix(), quiet_zone as usize, ansi));
        }
        Some(file) => {
            let logo = logo_path.map(|path| match image::open(path) {
                Ok(img) => img.to_rgba8(),
                Err(e) => invalid_exit(ErrorKind::Io, &format!("unable to read logo {}: {}", path, e)),
            });
            let mut options = Options {
                ec,
                render: RenderOptions { pixels_per_module: ppm, quiet_zone, ..RenderOptions::default() },
                logo: LogoOptions::default(),
            };
            if let Some(f) = matches.get_one::<f64>(ARG_FRACTION) {
                options.logo.fraction = *f;
            }
            let img = qrlogo::generate_with(data.as_bytes(), logo.as_ref(), &options)
                .unwrap_or_else(|e| invalid_exit(ErrorKind::InvalidValue, &e));
            if let Err(e) = img.save(file) {
                invalid_exit(ErrorKind::Io, &format!("unable to write {}: {}", file, e));
            }
        }
    }
}


//  ************************************************************

fn invalid_exit(kind: ErrorKind, msg: &dyn std::fmt::Display) -> ! {
    cli().error(kind, msg).exit()
}
