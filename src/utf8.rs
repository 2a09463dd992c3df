// SPDX-FileCopyrightText: 2026 Dilluti0n <hskimse1@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Whole-buffer UTF-8 validation.
//!
//! ```text
//!  code points          | byte sequence
//!  U+0000   .. U+007F   | 0xxxxxxx
//!  U+0080   .. U+07FF   | 110xxxxx 10xxxxxx
//!  U+0800   .. U+FFFF   | 1110xxxx 10xxxxxx 10xxxxxx
//!  U+10000  .. U+10FFFF | 11110xxx 10xxxxxx 10xxxxxx 10xxxxxx
//! ```
//!
//! Overlong forms, surrogates (U+D800..U+DFFF) and anything above
//! U+10FFFF are rejected. A sequence cut off by the end of the buffer
//! is invalid; there is no incremental mode.

const MAX_SCALAR: u32 = 0x10_FFFF;
const SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDFFF;

#[inline]
fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// (sequence width, smallest code point that needs it, payload bits of
/// the lead byte)
#[inline]
fn lead(b: u8) -> Option<(usize, u32, u32)> {
    match b {
        0xC0..=0xDF => Some((2, 0x80, (b & 0x1F) as u32)),
        0xE0..=0xEF => Some((3, 0x800, (b & 0x0F) as u32)),
        0xF0..=0xF7 => Some((4, 0x1_0000, (b & 0x07) as u32)),
        _ => None,              // stray continuation or 11111xxx
    }
}

pub fn is_valid_utf8(buf: &[u8]) -> bool {
    let mut i = 0;

    while i < buf.len() {
        let b = buf[i];
        if b < 0x80 {
            i += 1;
            continue;
        }

        let Some((width, min, bits)) = lead(b) else {
            return false;
        };

        let Some(tail) = buf.get(i + 1..i + width) else {
            return false;       // truncated
        };

        let mut cp = bits;
        for &c in tail {
            if !is_continuation(c) {
                return false;
            }
            cp = (cp << 6) | (c & 0x3F) as u32;
        }

        if cp < min || cp > MAX_SCALAR || SURROGATES.contains(&cp) {
            return false;
        }

        i += width;
    }

    true
}
