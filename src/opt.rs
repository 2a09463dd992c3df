// SPDX-FileCopyrightText: 2026 Dilluti0n <hskimse1@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Result, anyhow, Context};
use std::sync::OnceLock;

use crate::log_println;
use crate::log::{self, LogLevel};
use crate::pkt::AddressFamily;

static OPT_NO_SPLASH: OnceLock<bool> = OnceLock::new();
static OPT_LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();

static OPT_JSON: OnceLock<bool> = OnceLock::new();
static OPT_PAYLOAD: OnceLock<bool> = OnceLock::new();
static OPT_ADDR_LEN: OnceLock<usize> = OnceLock::new();
static OPT_INPUTS: OnceLock<Vec<String>> = OnceLock::new();

pub fn no_splash() -> bool {
    *OPT_NO_SPLASH.get().unwrap_or(&false)
}

#[cfg(debug_assertions)]      const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Debug;
#[cfg(not(debug_assertions))] const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Warning;

pub fn log_level() -> LogLevel {
    *OPT_LOG_LEVEL.get().unwrap_or(&DEFAULT_LOG_LEVEL)
}

pub fn json() -> bool {
    *OPT_JSON.get().unwrap_or(&false)
}

pub fn payload_only() -> bool {
    *OPT_PAYLOAD.get().unwrap_or(&false)
}

/// Family forced with `--addr-len`, if any.
pub fn addr_family() -> Option<AddressFamily> {
    OPT_ADDR_LEN.get().copied().and_then(AddressFamily::from_addr_len)
}

/// Hex packets given on the command line. Empty means read stdin.
pub fn inputs() -> &'static [String] {
    OPT_INPUTS.get().map(Vec::as_slice).unwrap_or(&[])
}

fn take_value<T, I>(args: &mut I, arg_name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    I: Iterator<Item = String>,
{
    let raw = args
        .next()
        .ok_or_else(|| anyhow!("argument: missing value after {}", arg_name))?;
    raw.parse::<T>()
        .with_context(|| format!("argument {}: invalid value '{}'", arg_name, raw))
}

fn usage() {
    println!(
        r#"Usage: snisift [OPTIONS] [HEX_PACKET...]

Reads hex-encoded IP packets from the arguments, or one per line from
stdin when none are given, and prints the TLS server name each carries.

Options:
  --loglevel    <debug|info|warning|error>  (default: warning)
  --no-splash                             Do not print splash messages
  --json                                  Print one JSON object per input
  --payload                               Inputs are TCP payloads, not IP packets
  --addr-len    <4|16>                    Address width of the connection (default: from packet)

  -h, --help                              Show this help"#
    );
}

fn set_opt<T: std::fmt::Display>(
    name: &str,
    cell: &OnceLock<T>,
    value: T,
) -> Result<()> {
    cell.set(value).map_err(|_| anyhow!("{name} already initialized"))?;

    let v = cell.get().expect("just set; qed");
    log_println!(LogLevel::Info, "{name}: {v}");

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Opts {
    log_level: LogLevel,
    no_splash: bool,
    json: bool,
    payload: bool,
    addr_len: Option<usize>,
    inputs: Vec<String>,
    help: bool,
}

fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Opts> {
    let mut opts = Opts {
        log_level: DEFAULT_LOG_LEVEL,
        no_splash: false,
        json: false,
        payload: false,
        addr_len: None,
        inputs: Vec::new(),
        help: false,
    };

    while let Some(arg) = args.next() {
        let argv = arg.as_str();

        match argv {
            "-h" | "--help" => { opts.help = true; }
            "--loglevel" => { opts.log_level = take_value::<log::LogLevel, _>(&mut args, argv)?; }
            "--no-splash" => { opts.no_splash = true; }
            "--json" => { opts.json = true; }
            "--payload" => { opts.payload = true; }

            "--addr-len" => {
                let len: usize = take_value(&mut args, argv)?;
                if AddressFamily::from_addr_len(len).is_none() {
                    return Err(anyhow!("argument {}: must be 4 or 16, got {}", argv, len));
                }
                opts.addr_len = Some(len);
            }

            _ if argv.starts_with('-') => { return Err(anyhow!("argument: unknown: {}", arg)); }
            _ => { opts.inputs.push(arg); }
        }
    }

    Ok(opts)
}

fn parse_args_1() -> Result<()> {
    let opts = parse(std::env::args().skip(1))?; // program name

    if opts.help {
        usage();
        std::process::exit(0);
    }

    set_opt("OPT_LOG_LEVEL", &OPT_LOG_LEVEL, opts.log_level)?;
    set_opt("OPT_NO_SPLASH", &OPT_NO_SPLASH, opts.no_splash)?;

    set_opt("OPT_JSON", &OPT_JSON, opts.json)?;
    set_opt("OPT_PAYLOAD", &OPT_PAYLOAD, opts.payload)?;
    if let Some(len) = opts.addr_len {
        set_opt("OPT_ADDR_LEN", &OPT_ADDR_LEN, len)?;
    }

    let n = opts.inputs.len();
    OPT_INPUTS.set(opts.inputs).map_err(|_| anyhow!("OPT_INPUTS already initialized"))?;
    log_println!(LogLevel::Info, "OPT_INPUTS: {n} packet(s)");

    Ok(())
}

pub fn parse_args() {
    if let Err(e) = parse_args_1() {
        log_println!(LogLevel::Error, "{e}");
        usage();
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> impl Iterator<Item = String> {
        v.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn flags_and_positionals() {
        let o = parse(args(&["--json", "--loglevel", "error", "4500", "--addr-len", "16", "6000"]))
            .unwrap();

        assert!(o.json);
        assert!(!o.payload);
        assert_eq!(o.log_level, LogLevel::Error);
        assert_eq!(o.addr_len, Some(16));
        assert_eq!(o.inputs, vec!["4500".to_string(), "6000".to_string()]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(args(&["--addr-len", "6"])).is_err());
        assert!(parse(args(&["--addr-len"])).is_err());
        assert!(parse(args(&["--loglevel", "loud"])).is_err());
        assert!(parse(args(&["--frobnicate"])).is_err());
    }

    #[test]
    fn help_is_reported() {
        assert!(parse(args(&["-h"])).unwrap().help);
    }

    #[test]
    fn unset_options_have_defaults() {
        assert!(!no_splash());
        assert!(inputs().is_empty());
        assert_eq!(addr_family(), None);
    }
}
