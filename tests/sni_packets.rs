// SPDX-FileCopyrightText: 2026 Dilluti0n <hskimse1@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use etherparse::PacketBuilder;
use hex_literal::hex;

use snisift::{
    AddressFamily, ParseOutcome,
    extract_sni, is_valid_utf8, locate_tcp_payload, server_name,
    pkt::PktView,
};

const SPEEDTEST: [u8; 180] = hex!(
    "16030100af010000ab03032d804e0bff3f6d121e276ee9e6f8e1ca128ba8d9b3"
    "7389207f2939c40d719011000018c02bc02ccca9c02fc030cca8c013c014009c"
    "009d002f00350100006aff010001000000001b0019000016757365722d617069"
    "2e7370656564746573742e6e65740017000000230000000d0016001406010603"
    "050105030401040303010303020102030010000e000c02683208687474702f31"
    "2e31000b00020100000a00080006001700180019"
);

const DADDR4: [u8; 4] = hex!("924b5edb");
const DADDR6: [u8; 16] = hex!("2a04 4e42 0000 0000 0000 0000 0000 0223");

fn ipv4(payload: &[u8]) -> Vec<u8> {
    let b = PacketBuilder::ipv4([10, 0, 0, 2], DADDR4, 64)
        .tcp(51234, 443, 0x1000_0000, 64240);
    let mut out = Vec::with_capacity(b.size(payload.len()));
    b.write(&mut out, payload).unwrap();
    out
}

fn ipv6(payload: &[u8]) -> Vec<u8> {
    let mut src = [0u8; 16];
    src[0] = 0xfd;
    src[15] = 2;
    let b = PacketBuilder::ipv6(src, DADDR6, 64)
        .tcp(51234, 443, 0x1000_0000, 64240);
    let mut out = Vec::with_capacity(b.size(payload.len()));
    b.write(&mut out, payload).unwrap();
    out
}

#[inline]
fn xorshift64(s: &mut u64) -> u64 {
    let mut x = *s;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *s = x;
    x
}

#[test]
fn speedtest_over_ipv4() {
    let p = ipv4(&SPEEDTEST);
    assert_eq!(server_name(&p, &DADDR4),
               ParseOutcome::Ok(Some("user-api.speedtest.net".to_string())));
}

#[test]
fn speedtest_over_ipv6() {
    let p = ipv6(&SPEEDTEST);
    assert_eq!(server_name(&p, &DADDR6),
               ParseOutcome::Ok(Some("user-api.speedtest.net".to_string())));
}

#[test]
fn located_payload_is_a_view_into_the_packet() {
    let p = ipv4(&SPEEDTEST);
    let span = locate_tcp_payload(&p, AddressFamily::V4).ok().unwrap();

    assert_eq!(span.offset(), 40);
    assert_eq!(span.as_slice().as_ptr(), p[40..].as_ptr());

    let name = extract_sni(span.as_slice()).ok().flatten().unwrap();
    assert!(is_valid_utf8(name.as_bytes()));
    assert_eq!(name.to_str(), Some("user-api.speedtest.net"));
}

#[test]
fn locator_agrees_with_etherparse() {
    let mut seed = 0xDEC0DE_u64;

    for len in 1..300 {
        let payload: Vec<u8> = (0..len).map(|_| xorshift64(&mut seed) as u8).collect();

        for (p, fam) in [(ipv4(&payload), AddressFamily::V4), (ipv6(&payload), AddressFamily::V6)] {
            let view = PktView::from_raw(&p).unwrap();
            let span = locate_tcp_payload(&p, fam).ok().unwrap();

            assert_eq!(view.family(), fam);
            assert_eq!(span.as_slice(), view.tcp.payload());
        }
    }
}

#[test]
fn empty_segment_is_incomplete() {
    assert_eq!(server_name(&ipv4(&[]), &DADDR4), ParseOutcome::Incomplete);
    assert_eq!(server_name(&ipv6(&[]), &DADDR6), ParseOutcome::Incomplete);
}

#[test]
fn truncated_captures_are_incomplete() {
    for (p, daddr) in [(ipv4(&SPEEDTEST), &DADDR4[..]), (ipv6(&SPEEDTEST), &DADDR6[..])] {
        for n in 0..p.len() {
            assert_eq!(server_name(&p[..n], daddr), ParseOutcome::Incomplete, "prefix {n}");
        }
    }
}

#[test]
fn split_client_hello_is_incomplete_then_not_applicable() {
    let (first, second) = SPEEDTEST.split_at(100);

    assert_eq!(server_name(&ipv4(first), &DADDR4), ParseOutcome::Incomplete);
    // The continuation starts mid-record, it does not open a handshake.
    assert_eq!(server_name(&ipv4(second), &DADDR4), ParseOutcome::NotApplicable);
}

#[test]
fn wrong_family_for_packet() {
    assert_eq!(server_name(&ipv4(&SPEEDTEST), &DADDR6), ParseOutcome::Malformed);
    assert_eq!(server_name(&ipv6(&SPEEDTEST), &DADDR4), ParseOutcome::Malformed);
}

#[test]
fn random_buffers_never_panic() {
    let mut seed = 0xBADC0FFEE_u64;

    for _ in 0..20_000 {
        let len = (xorshift64(&mut seed) % 96) as usize;
        let mut buf: Vec<u8> = (0..len).map(|_| xorshift64(&mut seed) as u8).collect();
        if let Some(b) = buf.first_mut() {
            *b = (*b & 0x0F) | if xorshift64(&mut seed) & 1 == 0 { 0x40 } else { 0x60 };
        }

        for daddr in [&DADDR4[..], &DADDR6[..]] {
            let a = server_name(&buf, daddr);
            assert_eq!(a, server_name(&buf, daddr));
        }
        let _ = extract_sni(&buf);
        let _ = is_valid_utf8(&buf);
    }
}

#[test]
fn mutated_packets_stay_in_bounds() {
    let base = ipv4(&SPEEDTEST);
    let mut seed = 0x1234_5678_u64;

    for _ in 0..20_000 {
        let mut p = base.clone();
        let r = xorshift64(&mut seed);
        let i = (r % p.len() as u64) as usize;
        p[i] = (r >> 40) as u8;

        if let ParseOutcome::Ok(span) = locate_tcp_payload(&p, AddressFamily::V4) {
            assert!(span.offset() + span.len() <= p.len());
        }
        if let ParseOutcome::Ok(Some(name)) = server_name(&p, &DADDR4) {
            assert!(is_valid_utf8(name.as_bytes()));
        }
    }
}

#[test]
fn concurrent_calls_on_a_shared_buffer() {
    let p = ipv6(&SPEEDTEST);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| server_name(&p, &DADDR6)))
            .collect();

        for h in handles {
            assert_eq!(h.join().unwrap(),
                       ParseOutcome::Ok(Some("user-api.speedtest.net".to_string())));
        }
    });
}
