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

use anyhow::{Result, Context};
use std::io::BufRead;
use std::net::IpAddr;
use std::sync::{
    atomic::{Ordering, AtomicBool},
};

use snisift::{
    ParseOutcome, ParseError, AddressFamily,
    debug, log_hexdump, log_println, splash,
    log::LogLevel,
    opt,
    pkt::{self, PktView},
};

const PROJECT_NAME: &str = "SNISift";
const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
const PKG_HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
const MESSAGE_AT_RUN: &str = r#"Reading hex packets from stdin, one per line.
Press Ctrl+C twice or send EOF to stop.
"#;
static RUNNING: AtomicBool = AtomicBool::new(true);

fn trap_exit() -> Result<()> {
    ctrlc::set_handler(|| {
        // A blocked stdin read only notices on the next line; a second
        // ^C leaves at once.
        if !RUNNING.swap(false, Ordering::SeqCst) {
            std::process::exit(130);
        }
    }).context("handler: ")?;

    Ok(())
}

fn splash_banner() {
    splash!("{PROJECT_NAME} v{PKG_VERSION} - {PKG_DESCRIPTION}");
    splash!("{PKG_HOMEPAGE}");
    splash!("");
}

/// Destination address to hand the core, as a connection tracker
/// would: taken from the packet when it decodes, zeroes of the right
/// width otherwise.
fn caller_daddr(raw: &[u8]) -> Vec<u8> {
    let forced = opt::addr_family();

    match PktView::from_raw(raw) {
        Ok(view) if forced.is_none_or(|f| f == view.family()) => view.daddr_bytes(),
        Ok(view) => {
            debug!("--addr-len overrides {:?} packet", view.family());
            vec![0; forced.map_or(4, AddressFamily::addr_len)]
        }
        Err(e) => {
            debug!("packet does not decode: {e}");
            let family = forced.unwrap_or(match raw.first().map(|b| b >> 4) {
                Some(6) => AddressFamily::V6,
                _ => AddressFamily::V4,
            });
            vec![0; family.addr_len()]
        }
    }
}

struct Report {
    outcome: ParseOutcome<Option<String>>,
    daddr: Option<IpAddr>,
}

fn log_report(raw: &[u8], r: &Report) {
    let dest = r.daddr.map_or_else(|| "payload".to_string(), |a| a.to_string());

    match (&r.outcome, r.outcome.err()) {
        (ParseOutcome::Ok(Some(sn)), _) => debug!("found server name {sn} ({dest})"),
        (_, Some(ParseError::Malformed)) => {
            log_hexdump!(LogLevel::Debug, raw, "dropping malformed packet ({dest})");
        }
        (_, Some(e)) => debug!("TLS server name not found ({dest}): {e}"),
        _ => debug!("no SNI header found ({dest})"),
    }
}

fn inspect(raw: &[u8]) -> Report {
    let report = if opt::payload_only() {
        Report { outcome: snisift::payload_server_name(raw), daddr: None }
    } else {
        let daddr = caller_daddr(raw);
        Report {
            outcome: snisift::server_name(raw, &daddr),
            daddr: pkt::addr_from_bytes(&daddr),
        }
    };

    log_report(raw, &report);
    report
}

fn print_report(r: &Report) {
    if opt::json() {
        let (outcome, sni) = match (&r.outcome, r.outcome.err()) {
            (ParseOutcome::Ok(sni), _) => ("ok".to_string(), sni.clone()),
            (_, e) => (e.map(|e| e.to_string()).unwrap_or_default(), None),
        };
        let v = serde_json::json!({
            "outcome": outcome,
            "sni": sni,
            "daddr": r.daddr.map(|a| a.to_string()),
        });
        println!("{v}");
        return;
    }

    match &r.outcome {
        ParseOutcome::Ok(Some(sn)) => println!("sni={sn}"),
        ParseOutcome::Ok(None) => println!("no-sni"),
        other => println!("{}", other.err().map(|e| e.to_string()).unwrap_or_default()),
    }
}

fn handle_line(n: usize, line: &str) -> Result<()> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }

    let raw = hex::decode(line).with_context(|| format!("input {n}: not a hex string"))?;
    log_println!(LogLevel::Debug, "input {n}: {} bytes", raw.len());

    print_report(&inspect(&raw));
    Ok(())
}

fn run() -> Result<()> {
    let inputs = opt::inputs();

    if !inputs.is_empty() {
        for (n, line) in inputs.iter().enumerate() {
            handle_line(n, line)?;
        }
        return Ok(());
    }

    splash!("{MESSAGE_AT_RUN}");

    let stdin = std::io::stdin();
    for (n, line) in stdin.lock().lines().enumerate() {
        if !RUNNING.load(Ordering::SeqCst) {
            break;
        }
        let line = line.context("stdin")?;
        handle_line(n, &line)?;
    }

    Ok(())
}

fn main_0() -> Result<()> {
    trap_exit()?;
    opt::parse_args();
    splash_banner();

    run()
}

fn main() {
    let code = match main_0() {
        Ok(()) => 0,
        Err(e) => {
            log_println!(LogLevel::Error, "{e}");

            for (i, cause) in e.chain().skip(1).enumerate() {
                log_println!(LogLevel::Error, "caused by[{i}]: {cause}");
            }
            1
        }
    };

    std::process::exit(code);
}
