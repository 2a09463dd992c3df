// SPDX-FileCopyrightText: 2025-2026 Dilluti0n <hskimse1@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Server Name Indication from a single TCP segment.
//!
//! ```text
//! record     type(1)=22 version(2) length(2)
//! handshake  msg_type(1)=1 length(3)
//! hello      version(2) random(32) session_id<1> cipher_suites<2>
//!            compression_methods<1> extensions<2>
//! extension  type(2) data<2>
//! sni data   server_name_list<2> { name_type(1) host_name<2> }
//! ```
//!
//! `<n>` is an `n`-byte big-endian length prefix. A record or handshake
//! longer than the segment is [`ParseOutcome::Incomplete`]; nothing is
//! reassembled. Past that point the whole ClientHello is present, so any
//! length that overruns its container is [`ParseOutcome::Malformed`].

use std::fmt;

use crate::outcome::{ParseError, ParseOutcome, ParseResult};
use crate::span::Cursor;
use crate::utf8::is_valid_utf8;

const TLS_HEADER_LEN: usize = 5;
const HANDSHAKE_HEADER_LEN: usize = 4;
const RANDOM_LEN: usize = 32;

const CONTENT_TYPE_HANDSHAKE: usize = 22;
const HANDSHAKE_CLIENT_HELLO: usize = 1;
const EXTENSION_SERVER_NAME: usize = 0;
const NAME_TYPE_HOST_NAME: usize = 0;

/// Longest host_name accepted.
pub const FQDN_LENGTH: usize = 255;

/// host_name bytes as they appear on the wire. Not guaranteed to be
/// text; see [`ServerName::to_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerName<'a>(&'a [u8]);

impl<'a> ServerName<'a> {
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` unless the bytes are valid UTF-8.
    pub fn to_str(&self) -> Option<&'a str> {
        if !is_valid_utf8(self.0) {
            return None;
        }

        std::str::from_utf8(self.0).ok()
    }
}

impl fmt::Display for ServerName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.0))
    }
}

/// `Ok(None)`: a well-formed ClientHello that carries no host_name.
pub fn extract_sni(payload: &[u8]) -> ParseOutcome<Option<ServerName<'_>>> {
    parse(payload).into()
}

fn parse(payload: &[u8]) -> ParseResult<Option<ServerName<'_>>> {
    let fragment = record(payload)?;
    let hello = handshake(fragment)?;

    match extensions(hello)? {
        Some(exts) => server_name(exts),
        None => Ok(None),
    }
}

/// Record layer; returns the record body.
fn record(payload: &[u8]) -> ParseResult<&[u8]> {
    if payload.len() < TLS_HEADER_LEN {
        return Err(ParseError::Incomplete);
    }

    // SSL 2.0 compatible ClientHello (RFC 5246 E.2): high bit of the
    // length, msg_type 1 in the third byte. Cannot carry extensions.
    if payload[0] & 0x80 != 0 && payload[2] == 1 {
        return Err(ParseError::NotApplicable);
    }

    let mut rec = Cursor::new(payload);
    let short = || ParseError::Incomplete;

    if rec.get_uint(1).ok_or_else(short)? != CONTENT_TYPE_HANDSHAKE {
        return Err(ParseError::NotApplicable);
    }

    let major = rec.get_uint(1).ok_or_else(short)?;
    rec.pass(1).ok_or_else(short)?;                      // minor
    if major < 3 {
        return Err(ParseError::NotApplicable);           // pre-TLS, no SNI
    }

    rec.get_prefixed(2).ok_or_else(short)
}

/// Handshake layer; returns the ClientHello body.
fn handshake(fragment: &[u8]) -> ParseResult<&[u8]> {
    if fragment.len() < HANDSHAKE_HEADER_LEN {
        return Err(ParseError::Malformed);
    }

    let mut hs = Cursor::new(fragment);
    let short = || ParseError::Incomplete;

    if hs.get_uint(1).ok_or_else(short)? != HANDSHAKE_CLIENT_HELLO {
        return Err(ParseError::NotApplicable);
    }

    // A handshake longer than its record continues in the next one.
    hs.get_prefixed(3).ok_or_else(short)
}

/// Skips the fixed fields. `None` if the hello ends before the
/// extensions block (SSL 3.0, or TLS without extensions).
fn extensions(hello: &[u8]) -> ParseResult<Option<&[u8]>> {
    let mut ch = Cursor::new(hello);
    let bad = || ParseError::Malformed;

    ch.pass(2 + RANDOM_LEN).ok_or_else(bad)?;           // client_version, random
    ch.get_prefixed(1).ok_or_else(bad)?;                 // session_id
    ch.get_prefixed(2).ok_or_else(bad)?;                 // cipher_suites
    ch.get_prefixed(1).ok_or_else(bad)?;                 // compression_methods

    if ch.is_empty() {
        return Ok(None);
    }

    ch.get_prefixed(2).map(Some).ok_or_else(bad)
}

fn server_name(exts: &[u8]) -> ParseResult<Option<ServerName<'_>>> {
    let mut ext = Cursor::new(exts);
    let bad = || ParseError::Malformed;

    while !ext.is_empty() {
        let ty = ext.get_uint(2).ok_or_else(bad)?;
        let data = ext.get_prefixed(2).ok_or_else(bad)?;

        if ty == EXTENSION_SERVER_NAME {
            return host_name(data); // first one wins
        }
    }

    Ok(None)
}

fn host_name(data: &[u8]) -> ParseResult<Option<ServerName<'_>>> {
    if data.is_empty() {
        return Ok(None);
    }

    let bad = || ParseError::Malformed;
    let list = Cursor::new(data).get_prefixed(2).ok_or_else(bad)?;
    let mut names = Cursor::new(list);

    while !names.is_empty() {
        let name_type = names.get_uint(1).ok_or_else(bad)?;
        let name = names.get_prefixed(2).ok_or_else(bad)?;

        if name_type != NAME_TYPE_HOST_NAME {
            continue;
        }

        if name.is_empty() || name.len() > FQDN_LENGTH {
            return Err(ParseError::Malformed);
        }

        return Ok(Some(ServerName(name)));
    }

    Ok(None)
}
