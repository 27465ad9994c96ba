// Copyright 2024 the idna2003 developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Punycode ([RFC 3492](https://tools.ietf.org/html/rfc3492)) implementation.
//!
//! The codec works on sequences of code points. Encoding streams through
//! any cloneable code-point iterator without allocating; decoding fills a
//! caller-provided buffer. `encode_str` and `decode_to_string` are
//! convenience wrappers over Rust's UTF-8 `str` and `String`.

use alloc::string::String;
use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::utf8::{Counter, Sink};
use crate::{Error, ErrorKind};

// Bootstring parameters for Punycode
const BASE: usize = 36;
const T_MIN: usize = 1;
const T_MAX: usize = 26;
const SKEW: usize = 38;
const DAMP: usize = 700;
const INITIAL_BIAS: usize = 72;
const INITIAL_N: usize = 0x80;

#[inline]
fn adapt(mut delta: usize, num_points: usize, first_time: bool) -> usize {
    delta /= if first_time { DAMP } else { 2 };
    delta += delta / num_points;
    let mut k = 0;
    while delta > ((BASE - T_MIN) * T_MAX) / 2 {
        delta /= BASE - T_MIN;
        k += BASE;
    }
    k + (((BASE - T_MIN + 1) * delta) / (delta + SKEW))
}

#[inline]
fn threshold(k: usize, bias: usize) -> usize {
    if k <= bias {
        T_MIN
    } else if k >= bias + T_MAX {
        T_MAX
    } else {
        k - bias
    }
}

#[inline]
fn encode_digit(value: usize) -> u32 {
    match value {
        0..=25 => value as u32 + u32::from(b'a'),       // a..z
        26..=35 => value as u32 - 26 + u32::from(b'0'), // 0..9
        _ => panic!("digit out of range"),
    }
}

// case-insensitive, like the transfer encoding itself
#[inline]
fn decode_digit(byte: u8) -> Option<usize> {
    match byte {
        b'0'..=b'9' => Some(usize::from(byte - b'0') + 26),
        b'a'..=b'z' => Some(usize::from(byte - b'a')),
        b'A'..=b'Z' => Some(usize::from(byte - b'A')),
        _ => None,
    }
}

/// Encode a code-point sequence into `sink`.
///
/// The input is re-scanned several times by cloning the iterator, the way
/// the delta-insertion sort of RFC 3492 section 6.3 walks the source once
/// per distinct inserted code point.
pub(crate) fn encode_into<I, S>(sink: &mut S, input: I) -> Result<(), Error>
where
    I: Iterator<Item = u32> + Clone,
    S: Sink,
{
    // Basic (ASCII) code points are copied up front, in input order.
    let mut srclen = 0usize;
    let mut basic = 0usize;
    for cp in input.clone() {
        srclen += 1;
        if cp < 0x80 {
            basic += 1;
            sink.write(cp);
        }
    }

    // An all-ASCII input stops here, with no trailing delimiter. That is
    // the canonical Punycode form, but it makes encode and decode asymmetric
    // for such inputs; the domain driver never takes this return, since it
    // only encodes labels after seeing a non-ASCII point.
    if basic >= srclen {
        return Ok(());
    }

    if basic > 0 {
        sink.write(u32::from(b'-'));
    }

    let b = basic;
    let mut h = basic;
    let mut n = INITIAL_N;
    let mut bias = INITIAL_BIAS;
    let mut delta = 0usize;

    while h < srclen {
        // Next code point to insert: the smallest one not yet handled.
        let m = match input
            .clone()
            .map(|cp| cp as usize)
            .filter(|&cp| cp >= n)
            .min()
        {
            Some(m) => m,
            None => return Err(Error::new(ErrorKind::Overflow)),
        };

        if m - n > (usize::MAX - delta) / (h + 1) {
            return Err(Error::new(ErrorKind::Overflow));
        }
        // Advance the decoder's <n, i> state to <m, 0>.
        delta += (m - n) * (h + 1);
        n = m;

        for cp in input.clone() {
            let cp = cp as usize;
            if cp < n {
                delta = delta.checked_add(1).ok_or(Error::new(ErrorKind::Overflow))?;
            } else if cp == n {
                // Emit delta as a generalized variable-length integer.
                let mut q = delta;
                let mut k = BASE;
                loop {
                    let t = threshold(k, bias);
                    if q < t {
                        break;
                    }
                    sink.write(encode_digit(t + (q - t) % (BASE - t)));
                    q = (q - t) / (BASE - t);
                    k += BASE;
                }
                sink.write(encode_digit(q));
                bias = adapt(delta, h + 1, h == b);
                delta = 0;
                h += 1;
            }
        }
        delta += 1;
        n += 1;
    }
    Ok(())
}

// punycode output is pure ASCII, so pushing bytes as chars is exact
struct StringSink<'a> {
    out: &'a mut String,
}

impl Sink for StringSink<'_> {
    fn write(&mut self, cp: u32) {
        debug_assert!(cp < 0x80);
        self.out.push(cp as u8 as char);
    }
}

/// Encode a code-point slice to Punycode.
pub fn encode(input: &[char]) -> Result<String, Error> {
    let mut out = String::with_capacity(input.len());
    encode_into(
        &mut StringSink { out: &mut out },
        input.iter().map(|&c| u32::from(c)),
    )?;
    Ok(out)
}

/// Encode a `str` to Punycode.
pub fn encode_str(input: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(input.len());
    encode_into(&mut StringSink { out: &mut out }, input.chars().map(u32::from))?;
    Ok(out)
}

/// Number of ASCII bytes [`encode_str`] would produce.
pub fn encoded_size(input: &str) -> Result<usize, Error> {
    let mut counter = Counter::default();
    encode_into(&mut counter, input.chars().map(u32::from))?;
    Ok(counter.count())
}

/// Decode Punycode into a caller-provided code-point buffer.
///
/// Returns the number of code points written. Decoding stops early,
/// without error, once the buffer fills during insertion; a basic run
/// longer than the whole buffer is [`ErrorKind::BufferTooSmall`]. Bytes
/// outside the ASCII range and bytes that are not Punycode digits are
/// [`ErrorKind::InvalidArgument`].
///
/// Code points are written as raw `u32` values; the caller decides whether
/// to reject values that are not Unicode scalars, as [`decode`] does.
pub fn decode_slice(input: &[u8], out: &mut [u32]) -> Result<usize, Error> {
    // The basic run extends to the last delimiter, if any.
    let mut delim_pos = 0usize;
    for (idx, &byte) in input.iter().enumerate() {
        if byte >= 0x80 {
            return Err(Error::at(ErrorKind::InvalidArgument, idx));
        }
        if byte == b'-' {
            delim_pos = idx;
        }
    }

    if out.len() < delim_pos {
        return Err(Error::new(ErrorKind::BufferTooSmall));
    }
    for (slot, &byte) in out.iter_mut().zip(&input[..delim_pos]) {
        *slot = u32::from(byte);
    }
    let mut len = delim_pos;

    let mut i = 0usize;
    let mut n = INITIAL_N;
    let mut bias = INITIAL_BIAS;
    // A delimiter in first position is no delimiter at all: digits are then
    // read from the very beginning, and `-` is not a digit.
    let mut pos = if delim_pos > 0 { delim_pos + 1 } else { 0 };

    while pos < input.len() && len < out.len() {
        let i0 = i;
        let mut w = 1usize;
        let mut k = BASE;
        loop {
            let digit = match input.get(pos).copied().and_then(decode_digit) {
                Some(digit) => digit,
                None => return Err(Error::at(ErrorKind::InvalidArgument, pos)),
            };
            pos += 1;
            if digit > (usize::MAX - i) / w {
                return Err(Error::new(ErrorKind::Overflow));
            }
            i += digit * w;
            let t = threshold(k, bias);
            if digit < t {
                break;
            }
            if w > usize::MAX / (BASE - t) {
                return Err(Error::new(ErrorKind::Overflow));
            }
            w *= BASE - t;
            k += BASE;
        }

        bias = adapt(i - i0, len + 1, i0 == 0);

        // i wraps around from len+1 to 0, incrementing n each time
        if i / (len + 1) > usize::MAX - n {
            return Err(Error::new(ErrorKind::Overflow));
        }
        n += i / (len + 1);
        i %= len + 1;
        let cp = match u32::try_from(n) {
            Ok(cp) => cp,
            Err(_) => return Err(Error::new(ErrorKind::Overflow)),
        };

        // move earlier insertions farther out
        out.copy_within(i..len, i + 1);
        out[i] = cp;
        i += 1;
        len += 1;
    }
    Ok(len)
}

/// Decode Punycode, allocating the output.
///
/// Decoded positions that are not Unicode scalar values are rejected.
pub fn decode(input: &str) -> Result<Vec<char>, Error> {
    // the decoded form never has more code points than the input has bytes,
    // and DNS-sized labels fit on the stack
    let mut buf: SmallVec<[u32; 63]> = SmallVec::new();
    buf.resize(input.len(), 0);
    let len = decode_slice(input.as_bytes(), &mut buf)?;
    buf[..len]
        .iter()
        .map(|&cp| core::char::from_u32(cp).ok_or(Error::new(ErrorKind::InvalidArgument)))
        .collect()
}

/// Decode Punycode to a `String`.
pub fn decode_to_string(input: &str) -> Result<String, Error> {
    Ok(decode(input)?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn digit_codec_round_trips() {
        for value in 0..36 {
            let digit = encode_digit(value) as u8;
            assert_eq!(decode_digit(digit), Some(value));
            assert_eq!(decode_digit(digit.to_ascii_uppercase()), Some(value));
        }
        assert_eq!(decode_digit(b'-'), None);
        assert_eq!(decode_digit(b'~'), None);
    }

    #[test]
    fn adapt_is_monotone_in_delta() {
        for num_points in [1, 2, 10, 100] {
            let mut last = 0;
            for delta in 0..4000 {
                let bias = adapt(delta, num_points, false);
                assert!(bias >= last, "adapt went down at delta {}", delta);
                last = bias;
            }
        }
    }

    #[test]
    fn encodes_known_labels() {
        assert_eq!(encode_str("bücher").unwrap(), "bcher-kva");
        assert_eq!(encode_str("münchen").unwrap(), "mnchen-3ya");
        // no basic run means no delimiter
        assert_eq!(encode_str("中文").unwrap(), "fiq228c");
        assert_eq!(encode_str("テスト").unwrap(), "zckzah");
    }

    #[test]
    fn all_ascii_input_keeps_no_delimiter() {
        assert_eq!(encode_str("abc").unwrap(), "abc");
        assert_eq!(encode_str("").unwrap(), "");
    }

    #[test]
    fn encode_of_char_slice_matches_str() {
        let label: Vec<char> = "bücher".chars().collect();
        assert_eq!(encode(&label).unwrap(), "bcher-kva");
    }

    #[test]
    fn encoded_size_matches_output() {
        for label in ["bücher", "中文", "abc", "faß"] {
            assert_eq!(encoded_size(label).unwrap(), encode_str(label).unwrap().len());
        }
    }

    #[test]
    fn decodes_known_labels() {
        assert_eq!(decode_to_string("bcher-kva").unwrap(), "bücher");
        assert_eq!(decode_to_string("fiq228c").unwrap(), "中文");
        // digits are case-insensitive, the basic run is copied verbatim
        assert_eq!(decode_to_string("BCHER-KVA").unwrap(), "BüCHER");
    }

    #[test]
    fn round_trips_mixed_labels() {
        for label in ["bücher", "münchen", "中文", "a-b-ü", "-ü", "ü"] {
            let encoded = encode_str(label).unwrap();
            assert_eq!(decode_to_string(&encoded).unwrap(), label);
        }
    }

    #[test]
    fn rejects_high_bit_bytes() {
        let mut out = [0u32; 8];
        assert_matches!(
            decode_slice(b"b\xFFcher-kva", &mut out),
            Err(e) if e.kind() == ErrorKind::InvalidArgument && e.position() == Some(1)
        );
    }

    #[test]
    fn rejects_non_digit_bytes() {
        let mut out = [0u32; 8];
        assert_matches!(
            decode_slice(b"abc-d_f", &mut out),
            Err(e) if e.kind() == ErrorKind::InvalidArgument
        );
        // a lone leading delimiter is read as a digit, and fails as one
        assert_matches!(
            decode_slice(b"-", &mut out),
            Err(e) if e.kind() == ErrorKind::InvalidArgument && e.position() == Some(0)
        );
    }

    #[test]
    fn rejects_truncated_delta() {
        let mut out = [0u32; 8];
        assert_matches!(
            decode_slice(b"fi", &mut out),
            Err(e) if e.kind() == ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn overflow_guard_fires_on_huge_deltas() {
        let mut out = [0u32; 40];
        assert_matches!(
            decode_slice(b"99999999999999999999999999", &mut out),
            Err(e) if e.kind() == ErrorKind::Overflow
        );
    }

    #[test]
    fn stops_at_capacity_during_insertion() {
        let mut out = [0u32; 1];
        assert_eq!(decode_slice(b"fiq228c", &mut out), Ok(1));
        assert_eq!(out[0], 0x4E2D);
    }

    #[test]
    fn basic_run_longer_than_buffer() {
        let mut out = [0u32; 3];
        assert_matches!(
            decode_slice(b"bcher-kva", &mut out),
            Err(e) if e.kind() == ErrorKind::BufferTooSmall
        );
    }
}
