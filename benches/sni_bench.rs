// SPDX-FileCopyrightText: 2026 Dilluti0n <hskimse1@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

#![cfg(feature = "bench")]

use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId, Throughput};
use hex_literal::hex;
use std::hint::black_box;

use snisift::{AddressFamily, extract_sni, is_valid_utf8, locate_tcp_payload};

const SPEEDTEST: [u8; 180] = hex!(
    "16030100af010000ab03032d804e0bff3f6d121e276ee9e6f8e1ca128ba8d9b3"
    "7389207f2939c40d719011000018c02bc02ccca9c02fc030cca8c013c014009c"
    "009d002f00350100006aff010001000000001b0019000016757365722d617069"
    "2e7370656564746573742e6e65740017000000230000000d0016001406010603"
    "050105030401040303010303020102030010000e000c02683208687474702f31"
    "2e31000b00020100000a00080006001700180019"
);

const HEADERS: [u8; 40] = hex!(
    "450000dc00004000400600000a000002924b5edb"
    "c82201bb10000000000000005018faf000000000"
);

#[inline]
fn xorshift64(s: &mut u64) -> u64 {
    let mut x = *s;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    *s = x;
    x
}

fn bench_sni(c: &mut Criterion) {
    let mut packet = HEADERS.to_vec();
    packet.extend_from_slice(&SPEEDTEST);

    let mut group = c.benchmark_group("SNI_Core");
    group.throughput(Throughput::Bytes(packet.len() as u64));

    group.bench_function("locate_tcp_payload", |b| {
        b.iter(|| {
            _ = black_box(locate_tcp_payload(black_box(&packet), AddressFamily::V4));
        })
    });

    group.bench_function("extract_sni", |b| {
        b.iter(|| {
            _ = black_box(extract_sni(black_box(&SPEEDTEST)));
        })
    });

    group.bench_function("server_name", |b| {
        b.iter(|| {
            _ = black_box(snisift::server_name(black_box(&packet), &HEADERS[16..20]));
        })
    });

    group.finish();
}

fn bench_utf8(c: &mut Criterion) {
    let mut group = c.benchmark_group("UTF8");
    let mut seed = 0xC0FFEE_u64;

    for &len in &[16usize, 255, 4096] {
        let ascii: Vec<u8> = (0..len).map(|_| b'a' + (xorshift64(&mut seed) % 26) as u8).collect();
        let mixed = "ü€🦀a".repeat(len / 10 + 1).into_bytes();

        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("ascii", len), &ascii, |b, buf| {
            b.iter(|| is_valid_utf8(black_box(buf)))
        });
        group.bench_with_input(BenchmarkId::new("mixed", len), &mixed, |b, buf| {
            b.iter(|| is_valid_utf8(black_box(buf)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sni, bench_utf8);
criterion_main!(benches);
