// SPDX-FileCopyrightText: 2026 Dilluti0n <hskimse1@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Non-owning views over packet buffers.
//!
//! [`ByteSpan`] names a region of a caller-owned buffer by offset and
//! length, so the locator can hand the TCP payload to the extractor
//! without copying. [`Cursor`] walks a slice front to back; every read
//! is checked against the bytes that are actually there.

/// Region `[off, off + len)` of `buf`. `off + len <= buf.len()` holds
/// for every value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan<'a> {
    buf: &'a [u8],
    off: usize,
    len: usize,
}

impl<'a> ByteSpan<'a> {
    /// Span covering all of `buf`.
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, off: 0, len: buf.len() }
    }

    /// `None` if the region does not fit inside `buf`.
    #[inline]
    pub fn sub(buf: &'a [u8], off: usize, len: usize) -> Option<Self> {
        let end = off.checked_add(len)?;
        if end > buf.len() {
            return None;
        }

        Some(Self { buf, off, len })
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.off
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The underlying buffer the offset refers to.
    #[inline]
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [u8] {
        &self.buf[self.off..self.off + self.len]
    }
}

impl AsRef<[u8]> for ByteSpan<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

fn bytes_to_usize(bytes: &[u8]) -> Option<usize> {
    Some(match bytes.len() {
        1 => bytes[0] as usize,
        2 => u16::from_be_bytes(bytes.try_into().ok()?) as usize,
        3 => {
            ((bytes[0] as usize) << 16)
                | ((bytes[1] as usize) << 8)
                | (bytes[2] as usize)
        }
        4 => u32::from_be_bytes(bytes.try_into().ok()?) as usize,
        _ => return None,
    })
}

/// Forward-only reader. A read that does not fit leaves the cursor
/// where it was and returns `None`.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    ptr: usize,
    payload: &'a [u8],
}

impl<'a> Cursor<'a> {
    #[inline]
    pub fn new(payload: &'a [u8]) -> Self {
        Self { ptr: 0, payload }
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.payload.len() - self.ptr
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    pub fn get_ptr(&self) -> usize {
        self.ptr
    }

    /// Unread tail.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.payload[self.ptr..]
    }

    pub fn pass(&mut self, size: usize) -> Option<()> {
        self.get_bytes(size).map(|_| ())
    }

    pub fn get_bytes(&mut self, size: usize) -> Option<&'a [u8]> {
        if size > self.remaining() {
            return None;
        }

        let end = self.ptr + size;
        let ret = &self.payload[self.ptr..end];
        self.ptr = end;
        Some(ret)
    }

    /// Big-endian unsigned integer of `size` (1..=4) bytes.
    pub fn get_uint(&mut self, size: usize) -> Option<usize> {
        if !(1..=4).contains(&size) {
            return None;
        }

        bytes_to_usize(self.get_bytes(size)?)
    }

    /// Reads a `size`-byte length prefix, then that many bytes.
    pub fn get_prefixed(&mut self, size: usize) -> Option<&'a [u8]> {
        let saved = self.ptr;
        let len = self.get_uint(size)?;

        match self.get_bytes(len) {
            Some(b) => Some(b),
            None => {
                self.ptr = saved;
                None
            }
        }
    }
}
