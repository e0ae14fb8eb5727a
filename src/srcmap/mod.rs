// Source map filter
//
//  Copyright (C) 2014-2022 Ryan Specialty Group, LLC.
//
//  This file is part of JSLD.
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Extraction of source positions from generated code.
//!
//! The compiler embeds _position cookies_ in generated code:
//!   the byte [`global::POS_SENTINEL`] followed by a
//!   [`global::POS_COOKIE_WIDTH`]-byte big-endian [`PosCookie`] identifying
//!   a position in the original source.
//! The sentinel never otherwise appears in generated code.
//!
//! [`SourceMapFilter`] is a [`Write`]r that strips cookies out of the
//!   stream before it reaches the underlying writer,
//!     tracking the line and column of the output as it goes.
//! For each cookie it reports a [`Mapping`] from the current output
//!   position to the cookie to a [`MappingSink`].
//! What the cookie means
//!   (and how mappings become a source map)
//!   is up to the sink.
//!
//! ```
//! use jsld::srcmap::{Mapping, SourceMapFilter};
//! use std::io::Write;
//!
//! let mut mappings = vec![];
//! let mut out: Vec<u8> = vec![];
//!
//! {
//!     let mut sut = SourceMapFilter::with_sink(&mut out, |m: Mapping| mappings.push(m));
//!
//!     // Cookies may be split across writes.
//!     sut.write_all(b"a\nbc\x08\x00\x00").unwrap();
//!     sut.write_all(b"\x01\x00d").unwrap();
//! }
//!
//! assert_eq!(b"a\nbcd", &out[..]);
//! assert_eq!(
//!     vec![Mapping { generated_line: 2, generated_column: 2, original: 256 }],
//!     mappings,
//! );
//! ```

use crate::global::{self, PosCookie};
use arrayvec::ArrayVec;
use memchr::{memchr, memchr_iter, memrchr};
use std::io::{self, Write};

/// Association of a generated position with an original source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    /// One-based line of the generated output.
    pub generated_line: usize,

    /// Zero-based byte column of the generated output.
    pub generated_column: usize,

    /// Cookie identifying the original source position.
    pub original: PosCookie,
}

/// Recipient of [`Mapping`]s.
///
/// Any `FnMut(Mapping)` is a sink.
pub trait MappingSink {
    /// Notification that code for the package `import_path` is about to be
    ///   written.
    ///
    /// `positions` is the package's opaque position table,
    ///   against which subsequent cookies should be interpreted.
    fn begin_package(&mut self, _import_path: &str, _positions: &[u8]) {}

    fn map(&mut self, mapping: Mapping);
}

impl<F: FnMut(Mapping)> MappingSink for F {
    fn map(&mut self, mapping: Mapping) {
        self(mapping)
    }
}

/// A sink that ignores all mappings.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl MappingSink for Discard {
    fn map(&mut self, _mapping: Mapping) {}
}

type PartialCookie = ArrayVec<u8, { global::POS_COOKIE_WIDTH }>;

/// Pass-through writer stripping position cookies.
///
/// See the [module-level documentation](self) for more information.
pub struct SourceMapFilter<W: Write, M: MappingSink = Discard> {
    inner: W,
    sink: Option<M>,

    /// Zero-based line of the next byte to be written.
    line: usize,

    /// Zero-based column of the next byte to be written.
    column: usize,

    /// Bytes of a cookie whose sentinel has been consumed but which has
    ///   not yet been read in full.
    cookie: Option<PartialCookie>,
}

impl<W: Write> SourceMapFilter<W, Discard> {
    /// Strip cookies without reporting mappings.
    pub fn new(inner: W) -> Self {
        Self::from_parts(inner, None)
    }
}

impl<W: Write, M: MappingSink> SourceMapFilter<W, M> {
    /// Strip cookies,
    ///   reporting a mapping for each to `sink`.
    pub fn with_sink(inner: W, sink: M) -> Self {
        Self::from_parts(inner, Some(sink))
    }

    fn from_parts(inner: W, sink: Option<M>) -> Self {
        Self {
            inner,
            sink,
            line: 0,
            column: 0,
            cookie: None,
        }
    }

    /// Announce the package whose code is about to be written.
    pub fn begin_package(&mut self, import_path: &str, positions: &[u8]) {
        if let Some(sink) = self.sink.as_mut() {
            sink.begin_package(import_path, positions);
        }
    }

    /// Zero-based line of the next byte to be written.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Zero-based column of the next byte to be written.
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Decompose into the underlying writer and sink.
    pub fn into_parts(self) -> (W, Option<M>) {
        (self.inner, self.sink)
    }

    /// Write bytes known to contain no sentinel and advance the position.
    fn forward(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;

        match memrchr(b'\n', bytes) {
            Some(last) => {
                self.line += memchr_iter(b'\n', bytes).count();
                self.column = bytes.len() - last - 1;
            }
            None => self.column += bytes.len(),
        }

        Ok(())
    }

    /// Consume as much of a pending cookie as `buf` provides,
    ///   returning what remains of `buf`.
    fn fill_cookie<'b>(
        &mut self,
        mut partial: PartialCookie,
        buf: &'b [u8],
    ) -> &'b [u8] {
        let take = (partial.capacity() - partial.len()).min(buf.len());
        partial.extend(buf[..take].iter().copied());

        match partial.into_inner() {
            Ok(bytes) => self.report(PosCookie::from_be_bytes(bytes)),
            Err(partial) => self.cookie = Some(partial),
        }

        &buf[take..]
    }

    fn report(&mut self, original: PosCookie) {
        let mapping = Mapping {
            generated_line: self.line + 1,
            generated_column: self.column,
            original,
        };

        if let Some(sink) = self.sink.as_mut() {
            sink.map(mapping);
        }
    }
}

impl<W: Write, M: MappingSink> Write for SourceMapFilter<W, M> {
    /// Write `buf`,
    ///   stripping any cookies.
    ///
    /// The entire buffer is always consumed on success,
    ///   including any partial cookie at its end.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut rest = buf;

        while !rest.is_empty() {
            if let Some(partial) = self.cookie.take() {
                rest = self.fill_cookie(partial, rest);
                continue;
            }

            match memchr(global::POS_SENTINEL, rest) {
                Some(i) => {
                    self.forward(&rest[..i])?;
                    self.cookie = Some(PartialCookie::new());
                    rest = &rest[i + 1..];
                }
                None => {
                    self.forward(rest)?;
                    rest = &[];
                }
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod test;
