// Copyright 2024 the idna2003 developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The ToASCII label driver: split the mapped code-point stream on `.`,
//! copy labels that stay ASCII, and emit everything else as `xn--` plus
//! its Punycode form.

use crate::punycode;
use crate::utf8::Sink;
use crate::Error;

const DOT: u32 = '.' as u32;

fn copy(sink: &mut impl Sink, points: impl Iterator<Item = u32>) {
    for cp in points {
        sink.write(cp);
    }
}

fn write_ace_prefix(sink: &mut impl Sink) {
    for &byte in b"xn--" {
        sink.write(u32::from(byte));
    }
}

/// Walk a mapped code-point stream label by label and write the ACE form.
///
/// A label is copied verbatim while every point seen is ASCII; the first
/// non-ASCII point commits the label to the Punycode branch, which re-reads
/// it from a clone of the cursor taken at the label boundary. `it` must
/// already be Nameprep output, so `.` only ever appears as a separator.
pub(crate) fn encode_idna<I, S>(sink: &mut S, mut it: I) -> Result<(), Error>
where
    I: Iterator<Item = u32> + Clone,
    S: Sink,
{
    let mut first = it.clone();
    let mut len = 0usize;
    loop {
        let cp = match it.next() {
            Some(cp) => cp,
            None => break,
        };
        if cp == DOT {
            copy(sink, first.clone().take(len));
            sink.write(DOT);
            first = it.clone();
            len = 0;
            continue;
        }
        if cp < 0x80 {
            len += 1;
            continue;
        }
        // non-ASCII seen: scan to the end of the label, then encode it
        len += 1;
        loop {
            match it.next() {
                None => {
                    write_ace_prefix(sink);
                    return punycode::encode_into(sink, first.take(len));
                }
                Some(DOT) => {
                    write_ace_prefix(sink);
                    punycode::encode_into(sink, first.clone().take(len))?;
                    sink.write(DOT);
                    first = it.clone();
                    len = 0;
                    break;
                }
                Some(_) => len += 1,
            }
        }
    }
    copy(sink, first.take(len));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nameprep::Nameprep;
    use alloc::string::String;

    #[derive(Default)]
    struct Collect {
        out: String,
    }

    impl Sink for Collect {
        fn write(&mut self, cp: u32) {
            self.out.push(core::char::from_u32(cp).unwrap());
        }
    }

    fn drive(input: &str) -> String {
        let mut sink = Collect::default();
        encode_idna(&mut sink, Nameprep::new(input.chars().map(u32::from))).unwrap();
        sink.out
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert_eq!(drive(""), "");
    }

    #[test]
    fn dots_are_preserved() {
        assert_eq!(drive("."), ".");
        assert_eq!(drive("a."), "a.");
        assert_eq!(drive(".a"), ".a");
        assert_eq!(drive("a..b"), "a..b");
    }

    #[test]
    fn trailing_dot_after_encoded_label() {
        assert_eq!(drive("bücher."), "xn--bcher-kva.");
    }

    #[test]
    fn label_deleted_to_nothing_stays_empty() {
        assert_eq!(drive("a.\u{00AD}.b"), "a..b");
    }

    #[test]
    fn mixed_labels() {
        assert_eq!(drive("bücher.example"), "xn--bcher-kva.example");
        assert_eq!(drive("example.bücher"), "example.xn--bcher-kva");
        assert_eq!(drive("ü.ü"), "xn--tda.xn--tda");
    }
}
