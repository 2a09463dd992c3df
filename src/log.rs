// Copyright 2025-2026 Dillution <hskimse1@gmail.com>.
//
// This file is part of SNISift.
//
// SNISift is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the
// Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// SNISift is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License
// for more details.
//
// You should have received a copy of the GNU General Public License
// along with SNISift. If not, see <https://www.gnu.org/licenses/>.

use std::fmt;

use chrono::{Datelike, Local, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error, // Unrecoverable
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = match self {
            LogLevel::Debug   => "[DEBUG]",
            LogLevel::Info    => "[INFO]",
            LogLevel::Warning => "[WARNING]",
            LogLevel::Error   => "[ERROR]",
        };
        write!(f, "{p}")
    }
}

#[derive(Debug)]
pub struct ParseLogLevelError;

impl fmt::Display for ParseLogLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid log level (use: debug|info|warn|warning|err|error)")
    }
}
impl std::error::Error for ParseLogLevelError {}

impl std::str::FromStr for LogLevel {
    type Err = ParseLogLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug"   => Ok(LogLevel::Debug),
            "info"    => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "err"  | "error"   => Ok(LogLevel::Error),
            _ => Err(ParseLogLevelError),
        }
    }
}

pub fn local_time() -> (i32, u8, u8, u8, u8, u8) {
    let t = Local::now();
    (t.year(), t.month() as u8, t.day() as u8,
     t.hour() as u8, t.minute() as u8, t.second() as u8)
}

/// Longest prefix of a packet [`crate::log_hexdump!`] prints.
pub const HEXDUMP_MAX: usize = 256;

/// `offset  hex` rows of 16 bytes, at most [`HEXDUMP_MAX`] bytes.
pub fn hex_lines(bytes: &[u8]) -> impl Iterator<Item = String> + '_ {
    let shown = &bytes[..bytes.len().min(HEXDUMP_MAX)];
    let more = bytes.len() - shown.len();

    shown
        .chunks(16)
        .enumerate()
        .map(|(i, row)| format!("{:04x}  {}", i * 16, hex::encode(row)))
        .chain((more > 0).then(|| format!("...  {more} more bytes")))
}

/// Logs go to stderr; stdout carries results.
#[macro_export]
macro_rules! log_println {
    ($level:expr, $($arg:tt)*) => {{
        if $level >= $crate::opt::log_level() {
            let (y, mo, d, h, mi, s) = $crate::log::local_time();
            eprintln!("{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02} {} {}",
                $level, format_args!($($arg)*));
        }
    }};
}

#[macro_export] macro_rules! debug { ($($arg:tt)*) => { $crate::log_println!($crate::log::LogLevel::Debug,   $($arg)*) } }
#[macro_export] macro_rules! info  { ($($arg:tt)*) => { $crate::log_println!($crate::log::LogLevel::Info,    $($arg)*) } }
#[macro_export] macro_rules! warn  { ($($arg:tt)*) => { $crate::log_println!($crate::log::LogLevel::Warning, $($arg)*) } }
#[macro_export] macro_rules! error { ($($arg:tt)*) => { $crate::log_println!($crate::log::LogLevel::Error,   $($arg)*) } }

/// A message followed by a hex dump of `$bytes`, both at `$level`.
#[macro_export]
macro_rules! log_hexdump {
    ($level:expr, $bytes:expr, $($arg:tt)*) => {{
        if $level >= $crate::opt::log_level() {
            $crate::log_println!($level, $($arg)*);
            for line in $crate::log::hex_lines($bytes) {
                $crate::log_println!($level, "  {line}");
            }
        }
    }};
}

#[macro_export]
macro_rules! splash {
    ($($arg:tt)*) => {{
        if !$crate::opt::no_splash() {
            eprintln!($($arg)*);
        }
    }};
}
