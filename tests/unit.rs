// Copyright 2024 the idna2003 developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use assert_matches::assert_matches;
use idna2003::{domain_to_ascii, nameprep, punycode, utf8_to_idna, ErrorKind};

fn ascii(domain: &str) -> String {
    domain_to_ascii(domain).unwrap()
}

#[test]
fn ascii_domains_pass_through() {
    assert_eq!(ascii("example.com"), "example.com");
    assert_eq!(ascii("a.b.c"), "a.b.c");
    assert_eq!(ascii("123.example"), "123.example");
}

#[test]
fn ascii_case_is_folded_without_ace_prefix() {
    assert_eq!(ascii("ExAmPlE.CoM"), "example.com");
    assert_eq!(ascii("LOCALHOST"), "localhost");
    assert!(!ascii("ABC").starts_with("xn--"));
}

#[test]
fn simple_german_domains() {
    assert_eq!(
        utf8_to_idna("bücher.example".as_bytes()).unwrap(),
        b"xn--bcher-kva.example"
    );
    assert_eq!(ascii("münchen"), "xn--mnchen-3ya");
}

#[test]
fn sharp_s_becomes_plain_ascii() {
    // ß folds to ss before the driver decides, so no ACE label appears
    assert_eq!(ascii("faß.de"), "fass.de");
    assert_eq!(ascii("STRASSE.de"), "strasse.de");
}

#[test]
fn japanese_domains() {
    assert_eq!(ascii("例え.テスト"), "xn--r8jz45g.xn--zckzah");
    assert_eq!(ascii("そのスピードで"), "xn--d9juau41awczczp");
}

#[test]
fn arabic_label() {
    let label = "\u{644}\u{64A}\u{647}\u{645}\u{627}\u{628}\u{62A}\u{643}\u{644}\
                 \u{645}\u{648}\u{634}\u{639}\u{631}\u{628}\u{64A}\u{61F}";
    assert_eq!(ascii(label), "xn--egbpdaj6bu4bxfgehfvwxn");
}

#[test]
fn single_code_point_labels() {
    assert_eq!(ascii("ü"), "xn--tda");
    assert_eq!(ascii("α"), "xn--mxa");
    assert_eq!(ascii("☃"), "xn--n3h");
    assert_eq!(ascii("mañana.com"), "xn--maana-pta.com");
}

#[test]
fn punycode_primitive_without_basic_run() {
    // no ASCII in the source, so no basic run and no delimiter
    assert_eq!(punycode::encode_str("中文").unwrap(), "fiq228c");
    assert_eq!(punycode::decode_to_string("fiq228c").unwrap(), "中文");
}

#[test]
fn empty_and_dot_boundaries() {
    assert_eq!(ascii(""), "");
    assert_eq!(ascii("."), ".");
    assert_eq!(ascii("example."), "example.");
    assert_eq!(ascii("bücher."), "xn--bcher-kva.");
    assert_eq!(ascii(".."), "..");
}

#[test]
fn label_boundaries_are_preserved() {
    for domain in ["a.b.c.d", "ü.ü.ü", "例え.example.テスト"] {
        let labels = domain.split('.').count();
        let out = ascii(domain);
        assert_eq!(out.split('.').count(), labels);
    }
}

#[test]
fn deletable_only_label_collapses() {
    assert_eq!(ascii("a.\u{00AD}\u{200B}.b"), "a..b");
    assert_eq!(ascii("\u{FEFF}"), "");
}

#[test]
fn output_is_always_ascii() {
    for domain in ["bücher.example", "例え.テスト", "faß.de", "ExAmPlE.CoM"] {
        assert!(ascii(domain).is_ascii());
    }
}

#[test]
fn to_ascii_is_idempotent() {
    for domain in ["bücher.example", "例え.テスト", "faß.de", "münchen"] {
        let once = ascii(domain);
        assert_eq!(ascii(&once), once);
    }
}

#[test]
fn punycode_round_trip() {
    for label in ["bücher", "münchen", "中文", "そのスピードで", "mañana"] {
        let encoded = punycode::encode_str(label).unwrap();
        assert_eq!(punycode::decode_to_string(&encoded).unwrap(), label);
    }
}

#[test]
fn malformed_utf8_is_rejected() {
    assert_matches!(
        utf8_to_idna(b"\xFFexample"),
        Err(e) if e.kind() == ErrorKind::InvalidArgument && e.position() == Some(0)
    );
    assert_matches!(
        utf8_to_idna(b"ab\xC3"),
        Err(e) if e.kind() == ErrorKind::InvalidArgument && e.position() == Some(2)
    );
}

#[test]
fn punycode_decode_rejects_bad_bytes() {
    let mut out = [0u32; 16];
    assert_matches!(
        punycode::decode_slice(b"caf\xC3\xA9", &mut out),
        Err(e) if e.kind() == ErrorKind::InvalidArgument
    );
    assert_matches!(
        punycode::decode_slice(b"abc-d!f", &mut out),
        Err(e) if e.kind() == ErrorKind::InvalidArgument
    );
}

#[test]
fn punycode_decode_stops_at_capacity() {
    let mut out = [0u32; 2];
    assert_eq!(punycode::decode_slice(b"fiq228c", &mut out), Ok(2));
    assert_eq!(&out, &[0x4E2D, 0x6587]);
}

#[test]
fn nameprep_is_applied_before_label_decisions() {
    // the mapping may turn a non-ASCII label fully ASCII...
    assert_eq!(nameprep::map_str("faß"), "fass");
    assert_eq!(ascii("faß"), "fass");
    // ...or leave it needing an ACE form
    assert_eq!(nameprep::map_str("BÜCHER"), "bücher");
    assert_eq!(ascii("BÜCHER"), "xn--bcher-kva");
}

#[test]
fn mapped_len_supports_presizing() {
    assert_eq!(nameprep::mapped_len("ﬃ.ﬄ"), 7);
    assert_eq!(nameprep::mapped_len("example"), 7);
}
