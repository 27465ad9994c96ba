#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    // The bytes entry point must never panic, whatever the input
    let _ = idna2003::utf8_to_idna(data);

    let Ok(input) = str::from_utf8(data) else {
        return;
    };

    if let Ok(ascii) = idna2003::domain_to_ascii(input) {
        assert!(ascii.is_ascii());
        // ToASCII output passes through a second conversion unchanged
        assert_eq!(idna2003::domain_to_ascii(&ascii).as_deref(), Ok(ascii.as_str()));
    }

    // Round-trip the Punycode primitive whenever a non-basic code point
    // forces a real encoding (an all-ASCII source has no delimiter and is
    // not re-readable)
    if !input.is_ascii() {
        if let Ok(encoded) = idna2003::punycode::encode_str(input) {
            let decoded = idna2003::punycode::decode_to_string(&encoded).unwrap();
            assert_eq!(input, decoded);
        }
    }
});
