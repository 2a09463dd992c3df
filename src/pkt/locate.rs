// SPDX-FileCopyrightText: 2026 Dilluti0n <hskimse1@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Find the TCP payload inside a raw IP packet.
//!
//! The family comes from the caller (see [`AddressFamily`]); a packet
//! whose version nibble disagrees with it is rejected. The payload is
//! bounded by the length the IP header declares, never by the size of
//! the buffer it was captured into. When the buffer is shorter than the
//! declared length, the bytes that are present are returned and the
//! consumer decides whether that is enough.
//!
//! Headers are decoded with etherparse's header slices. A decoder that
//! runs out of bytes means `Incomplete` when the declared length still
//! had room for the header and `Malformed` when it did not. IPv6
//! extension headers are walked up to [`MAX_EXT_HOPS`] deep.

use etherparse::{
    IpAuthHeaderSlice, IpNumber, Ipv4HeaderSlice, Ipv6FragmentHeaderSlice,
    Ipv6HeaderSlice, Ipv6RawExtHeaderSlice, TcpHeaderSlice, err,
};

use crate::outcome::{ParseError, ParseOutcome, ParseResult};
use crate::span::ByteSpan;

use super::AddressFamily;

const IPV4_HDR_MIN: usize = 20;

pub const MAX_EXT_HOPS: usize = 8;

/// Where the IP layer ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IpLayer {
    /// Offset of the TCP header.
    hdr_end: usize,
    /// Declared end of the packet.
    end: usize,
}

impl IpLayer {
    /// Bytes of the packet that are both declared and captured.
    fn avail(&self, packet: &[u8]) -> usize {
        self.end.min(packet.len())
    }
}

/// A header decoder ran out of bytes at `off`. The packet was cut short
/// if its declared length had room for the header, broken otherwise.
fn short_at(off: usize, e: &err::LenError, end: usize) -> ParseError {
    if off + e.required_len > end {
        ParseError::Malformed
    } else {
        ParseError::Incomplete
    }
}

pub fn locate_tcp_payload(packet: &[u8], family: AddressFamily) -> ParseOutcome<ByteSpan<'_>> {
    locate(packet, family).into()
}

fn locate(packet: &[u8], family: AddressFamily) -> ParseResult<ByteSpan<'_>> {
    let version = packet.first().ok_or(ParseError::Incomplete)? >> 4;
    if version != family.ip_version() {
        return Err(ParseError::Malformed);
    }

    let ip = match family {
        AddressFamily::V4 => ipv4(packet)?,
        AddressFamily::V6 => ipv6(packet)?,
    };

    tcp(packet, ip)
}

fn ipv4(packet: &[u8]) -> ParseResult<IpLayer> {
    use err::ipv4::HeaderSliceError::{Content, Len};

    let hdr = match Ipv4HeaderSlice::from_slice(packet) {
        Ok(hdr) => hdr,
        Err(Len(_)) if packet.len() < IPV4_HDR_MIN => return Err(ParseError::Incomplete),
        Err(Len(_)) => return Err(ParseError::Malformed), // IHL past the buffer
        Err(Content(_)) => return Err(ParseError::Malformed),
    };

    let ihl = hdr.slice().len();
    let total = usize::from(hdr.total_len());
    if total < ihl {
        return Err(ParseError::Malformed);
    }

    if hdr.fragments_offset().value() != 0 {
        return Err(ParseError::NotApplicable); // no TCP header in here
    }

    if hdr.protocol() != IpNumber::TCP {
        return Err(ParseError::Malformed);
    }

    Ok(IpLayer { hdr_end: ihl, end: total })
}

fn ipv6(packet: &[u8]) -> ParseResult<IpLayer> {
    use err::ipv6::HeaderSliceError::{Content, Len};

    let hdr = match Ipv6HeaderSlice::from_slice(packet) {
        Ok(hdr) => hdr,
        Err(Len(_)) => return Err(ParseError::Incomplete),
        Err(Content(_)) => return Err(ParseError::Malformed),
    };

    if hdr.payload_length() == 0 {
        return Err(ParseError::Malformed); // jumbogram
    }

    let end = hdr.header_len() + usize::from(hdr.payload_length());
    let avail = end.min(packet.len());
    let mut off = hdr.header_len();
    let mut next = hdr.next_header();

    for hop in 0..=MAX_EXT_HOPS {
        match next {
            IpNumber::TCP => return Ok(IpLayer { hdr_end: off, end }),

            IpNumber::IPV6_HEADER_HOP_BY_HOP
                | IpNumber::IPV6_ROUTE_HEADER
                | IpNumber::IPV6_DESTINATION_OPTIONS
                | IpNumber::IPV6_FRAGMENTATION_HEADER
                | IpNumber::AUTHENTICATION_HEADER => {
                if hop == MAX_EXT_HOPS {
                    break;
                }

                let rest = packet.get(off..avail).ok_or(ParseError::Malformed)?;
                let (len, after) = ipv6_ext(next, rest).map_err(|e| match e {
                    ExtError::Short(e) => short_at(off, &e, end),
                    ExtError::Outcome(e) => e,
                })?;

                next = after;
                off += len;
            }

            IpNumber::ENCAPSULATING_SECURITY_PAYLOAD
                | IpNumber::IPV6_NO_NEXT_HEADER => return Err(ParseError::NotApplicable),

            _ => return Err(ParseError::Malformed),
        }
    }

    Err(ParseError::Malformed) // chain too long
}

enum ExtError {
    Short(err::LenError),
    Outcome(ParseError),
}

/// Length and next header of the extension header of type `kind` at
/// the start of `rest`.
fn ipv6_ext(kind: IpNumber, rest: &[u8]) -> Result<(usize, IpNumber), ExtError> {
    use err::ip_auth::HeaderSliceError::{Content, Len};

    match kind {
        IpNumber::IPV6_FRAGMENTATION_HEADER => {
            let frag = Ipv6FragmentHeaderSlice::from_slice(rest).map_err(ExtError::Short)?;
            if frag.fragment_offset().value() != 0 {
                return Err(ExtError::Outcome(ParseError::NotApplicable));
            }
            Ok((frag.slice().len(), frag.next_header()))
        }
        IpNumber::AUTHENTICATION_HEADER => match IpAuthHeaderSlice::from_slice(rest) {
            Ok(ah) => Ok((ah.slice().len(), ah.next_header())),
            Err(Len(e)) => Err(ExtError::Short(e)),
            Err(Content(_)) => Err(ExtError::Outcome(ParseError::Malformed)),
        },
        _ => {
            let ext = Ipv6RawExtHeaderSlice::from_slice(rest).map_err(ExtError::Short)?;
            Ok((ext.slice().len(), ext.next_header()))
        }
    }
}

fn tcp(packet: &[u8], ip: IpLayer) -> ParseResult<ByteSpan<'_>> {
    use err::tcp::HeaderSliceError::{Content, Len};

    let avail = ip.avail(packet);
    let rest = packet.get(ip.hdr_end..avail).ok_or(ParseError::Malformed)?;

    let hdr = match TcpHeaderSlice::from_slice(rest) {
        Ok(hdr) => hdr,
        Err(Len(e)) => return Err(short_at(ip.hdr_end, &e, ip.end)),
        Err(Content(_)) => return Err(ParseError::Malformed), // data offset < 5
    };

    let tcp_end = ip.hdr_end + hdr.slice().len();
    if tcp_end >= avail {
        return Err(ParseError::Incomplete); // no payload captured yet
    }

    ByteSpan::sub(packet, tcp_end, avail - tcp_end).ok_or(ParseError::Malformed)
}
