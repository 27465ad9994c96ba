// Copyright 2024 the idna2003 developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! This crate converts internationalized domain names to their
//! ASCII-Compatible Encoding per the original IDNA family of RFCs:
//! [IDNA (RFC 3490)](https://tools.ietf.org/html/rfc3490) driving
//! [Nameprep (RFC 3491)](https://tools.ietf.org/html/rfc3491) mapping and
//! [Punycode (RFC 3492)](https://tools.ietf.org/html/rfc3492).
//!
//! `bücher.example` becomes `xn--bcher-kva.example`: each label is mapped
//! through the RFC 3454 B.1 (delete) and B.2 (case/compatibility fold)
//! tables, then either copied verbatim when it is pure ASCII or emitted as
//! `xn--` plus its Punycode form.
//!
//! Only the mapping step of Nameprep is performed. NFKC normalization, the
//! prohibited-character tables and the bidi rule are out of scope here, as
//! is the newer UTS #46 processing found in the `idna` crate.
#![no_std]

// For forwards compatibility
#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

#[cfg(not(feature = "alloc"))]
compile_error!("the `alloc` feature must be enabled");

use alloc::string::String;
use alloc::vec::Vec;

mod idna;
pub mod nameprep;
pub mod punycode;
mod utf8;

/// The ways a conversion can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed UTF-8, or a byte that cannot appear in Punycode input.
    InvalidArgument,
    /// A caller-provided output buffer cannot hold even the basic run.
    BufferTooSmall,
    /// An arithmetic guard in the Punycode codec fired.
    Overflow,
}

/// Error type for every fallible operation in this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    position: Option<usize>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Error {
            kind,
            position: None,
        }
    }

    pub(crate) fn at(kind: ErrorKind, position: usize) -> Self {
        Error {
            kind,
            position: Some(position),
        }
    }

    /// What went wrong.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset into the input where the error was detected, if known.
    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let what = match self.kind {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::BufferTooSmall => "output buffer too small",
            ErrorKind::Overflow => "arithmetic overflow",
        };
        match self.position {
            Some(position) => write!(f, "{} at byte {}", what, position),
            None => f.write_str(what),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Convert a UTF-8 encoded domain name to its ACE form.
///
/// Labels that are pure ASCII after Nameprep mapping are copied verbatim
/// (case-folded); labels with any remaining non-ASCII code point become
/// `xn--` followed by their Punycode encoding. The `.` separators are
/// preserved, and empty input yields empty output.
///
/// The pipeline runs twice over the input: once into a counting sink to
/// size the output exactly, then into the writing sink. Both passes take
/// identical branches.
///
/// # Examples
///
/// ```
/// let ace = idna2003::utf8_to_idna("bücher.example".as_bytes())?;
/// assert_eq!(ace, b"xn--bcher-kva.example");
/// # Ok::<(), idna2003::Error>(())
/// ```
pub fn utf8_to_idna(domain: &[u8]) -> Result<Vec<u8>, Error> {
    utf8::validate(domain)?;
    let points = utf8::CodePoints::new(domain);

    let mut counter = utf8::Utf8Count::default();
    idna::encode_idna(&mut counter, nameprep::Nameprep::new(points.clone()))?;

    let mut buf = Vec::with_capacity(counter.count());
    idna::encode_idna(
        &mut utf8::Utf8Writer::new(&mut buf),
        nameprep::Nameprep::new(points),
    )?;
    debug_assert_eq!(buf.len(), counter.count());
    Ok(buf)
}

/// Convert a domain name to its ACE form.
///
/// Convenience wrapper around [`utf8_to_idna`] for input that is already
/// known to be well-formed UTF-8.
pub fn domain_to_ascii(domain: &str) -> Result<String, Error> {
    let bytes = utf8_to_idna(domain.as_bytes())?;
    // ToASCII output never leaves the ASCII range.
    match String::from_utf8(bytes) {
        Ok(ascii) => Ok(ascii),
        Err(_) => unreachable!(),
    }
}
