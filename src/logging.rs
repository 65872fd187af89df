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
//! Logging backend (logging to stdout or browser console)
//  ************************************************************

//!
//! The crate logs through the `log` facade.
//! This module provides a small backend, so that binaries, tests and
//! the browser get output without pulling in a logging framework.
//!
//! The following `LOG_LEVEL`s are defined:
//!
//! | LOG_LEVEL | Meaning |
//! | --------- | ------- |
//! | 0         | Log only errors and warnings |
//! | 1         | Log level *info* |
//! | 2         | Log level *debug* |
//! | 3         | Log level *trace* |
//!
//! Release builds are compiled with `release_max_level_debug`,
//! so *trace* messages only exist in debug builds.

use log::{LevelFilter, Log, Metadata, Record};


//  ************************************************************
/// Logger writing to stdout (or the browser console)
//  ************************************************************

struct Logger;

static LOGGER: Logger = Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        emit(record.level(), &format!("{}: {}", record.target(), record.args()));
    }

    fn flush(&self) {}
}

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
fn emit(_level: log::Level, line: &str) {
    println!("{}", line);
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn emit(level: log::Level, line: &str) {
    use super::wasm::console;
    match level {
        log::Level::Error => console::error(line),
        log::Level::Warn => console::warn(line),
        _ => console::log(line),
    }
}


//  ************************************************************
/// Map a numeric `LOG_LEVEL` to a `log` level filter
//  ************************************************************

pub fn level_filter(lvl: usize) -> LevelFilter {
    match lvl {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}


//  ************************************************************
/// Install the logger (once) and set the global logging level
//  ************************************************************
///
/// May be called any number of times; if another logger has already
/// been installed, only the level is changed.

pub fn set_loglevel(lvl: usize) {
    // Err only means a logger is already installed
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level_filter(lvl));
}
