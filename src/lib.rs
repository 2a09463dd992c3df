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

//! Packet-inspection primitives for SNI based filtering.
//!
//! Given an intercepted IP packet, [`locate_tcp_payload`] finds the TCP
//! payload, [`extract_sni`] reads the server name out of a TLS
//! ClientHello in it, and [`is_valid_utf8`] decides whether that name
//! can be handled as text. [`server_name`] chains the three.
//!
//! Every function here is total over its input: any byte sequence
//! yields a [`ParseOutcome`], never a panic or an out-of-bounds read.
//! None of them reads or writes process-wide state; [`log`] and [`opt`]
//! only configure the `snisift` binary.

pub mod log;
pub mod opt;
pub mod outcome;
pub mod pkt;
pub mod span;
pub mod tls;
pub mod utf8;

pub use outcome::{ParseError, ParseOutcome};
pub use pkt::{AddressFamily, locate_tcp_payload};
pub use span::ByteSpan;
pub use tls::{ServerName, extract_sni};
pub use utf8::is_valid_utf8;

/// Server name of the TLS ClientHello carried by `packet`.
///
/// `daddr` is the destination address the caller tracks for this
/// connection (4 or 16 bytes); its width selects the IP family. A
/// host_name that is not valid UTF-8 is reported as
/// [`ParseOutcome::Malformed`].
pub fn server_name(packet: &[u8], daddr: &[u8]) -> ParseOutcome<Option<String>> {
    let Some(family) = AddressFamily::from_addr_len(daddr.len()) else {
        return ParseOutcome::Malformed;
    };

    locate_tcp_payload(packet, family)
        .and_then(|payload| payload_server_name(payload.as_slice()))
}

/// [`extract_sni`] followed by the UTF-8 check, for callers that
/// already hold the TCP payload.
pub fn payload_server_name(payload: &[u8]) -> ParseOutcome<Option<String>> {
    extract_sni(payload).and_then(|name| match name {
        None => ParseOutcome::Ok(None),
        Some(name) => match name.to_str() {
            Some(s) => ParseOutcome::Ok(Some(s.to_owned())),
            None => ParseOutcome::Malformed,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(payload: &[u8]) -> Vec<u8> {
        let total = 40 + payload.len();
        let mut p = vec![0u8; 40];
        p[0] = 0x45;
        p[2..4].copy_from_slice(&(total as u16).to_be_bytes());
        p[9] = 6;
        p[32] = 5 << 4;
        p.extend_from_slice(payload);
        p
    }

    fn hello(name: &[u8]) -> Vec<u8> {
        let mut sni = vec![0x00, 0x00];
        sni.extend(((name.len() + 5) as u16).to_be_bytes());
        sni.extend(((name.len() + 3) as u16).to_be_bytes());
        sni.push(0);
        sni.extend((name.len() as u16).to_be_bytes());
        sni.extend(name);

        let mut body = vec![0x03, 0x03];
        body.extend([0u8; 32]);
        body.extend([0x00, 0x00, 0x02, 0x13, 0x01, 0x01, 0x00]);
        body.extend((sni.len() as u16).to_be_bytes());
        body.extend(sni);

        let mut rec = vec![0x16, 0x03, 0x01];
        rec.extend(((body.len() + 4) as u16).to_be_bytes());
        rec.push(0x01);
        rec.extend(&(body.len() as u32).to_be_bytes()[1..]);
        rec.extend(body);
        rec
    }

    #[test]
    fn pipeline_returns_text() {
        let p = packet(&hello(b"example.org"));
        assert_eq!(server_name(&p, &[93, 184, 216, 34]),
                   ParseOutcome::Ok(Some("example.org".to_string())));
    }

    #[test]
    fn pipeline_rejects_non_text_names() {
        let p = packet(&hello(&[0x41, 0x42, 0xFC, 0x00]));
        assert_eq!(server_name(&p, &[1, 2, 3, 4]), ParseOutcome::Malformed);
    }

    #[test]
    fn pipeline_rejects_odd_address_width() {
        let p = packet(&hello(b"example.org"));
        assert_eq!(server_name(&p, &[1, 2, 3]), ParseOutcome::Malformed);
        assert_eq!(server_name(&p, &[]), ParseOutcome::Malformed);
    }

    #[test]
    fn pipeline_family_follows_address_width() {
        let p = packet(&hello(b"example.org"));
        assert_eq!(server_name(&p, &[0u8; 16]), ParseOutcome::Malformed);
    }

    #[test]
    fn pipeline_passes_through_routing_signals() {
        let p = packet(b"\x17\x03\x03\x00\x05hello");
        assert_eq!(server_name(&p, &[1, 2, 3, 4]), ParseOutcome::NotApplicable);

        let h = hello(b"example.org");
        let p = packet(&h[..20]);
        assert_eq!(server_name(&p, &[1, 2, 3, 4]), ParseOutcome::Incomplete);
    }

    #[test]
    fn pipeline_is_the_composition_of_its_stages() {
        let h = hello(b"example.org");
        for n in [0, 20, 39, 40, 41, 60, h.len() / 2 + 40, h.len() + 40] {
            let p = packet(&h);
            let p = &p[..n.min(p.len())];
            let staged = locate_tcp_payload(p, AddressFamily::V4)
                .and_then(|s| extract_sni(s.as_slice()))
                .and_then(|n| match n {
                    None => ParseOutcome::Ok(None),
                    Some(n) => n.to_str().map(|s| Some(s.to_string()))
                        .map_or(ParseOutcome::Malformed, ParseOutcome::Ok),
                });
            assert_eq!(server_name(p, &[9, 9, 9, 9]), staged, "prefix {n}");
        }
    }

    #[test]
    fn payload_only() {
        assert_eq!(payload_server_name(&hello(b"a.example")),
                   ParseOutcome::Ok(Some("a.example".to_string())));
        assert_eq!(payload_server_name(&hello(&[0xC0, 0x80])), ParseOutcome::Malformed);
        assert_eq!(payload_server_name(&[]), ParseOutcome::Incomplete);
    }
}
