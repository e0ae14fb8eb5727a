// Whitespace removal for linker-generated code
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

//! Minification of text generated by the linker itself.
//!
//! This is applied to the prelude,
//!   package headers and footers,
//!   and dispatch tables.
//! Declaration code from archives is never minified here;
//!   the compiler is responsible for that.
//!
//! This is not a general-purpose minifier.
//! It understands just enough to avoid changing the meaning of the code
//!   it is applied to:
//!     whitespace separating two identifier characters is retained,
//!     as is whitespace in `+ +` and `- -`;
//!     string literals are copied verbatim;
//!     `/* */` comments are dropped;
//!     and position cookies are copied through untouched,
//!       since their bytes may be anything.

use crate::global;
use std::borrow::Cow;

/// Remove whitespace from `src` that is not needed to preserve its
///   meaning,
///     if `minify` is set.
///
/// ```
/// use jsld::ld::minify::remove_whitespace;
///
/// assert_eq!(
///     &b"var a=b+ +c;"[..],
///     &remove_whitespace(b"var a = b + +c;\n", true)[..],
/// );
/// assert_eq!(&b" x "[..], &remove_whitespace(b" x ", false)[..]);
/// ```
pub fn remove_whitespace(src: &[u8], minify: bool) -> Cow<'_, [u8]> {
    if !minify {
        return Cow::Borrowed(src);
    }

    let mut out = Vec::with_capacity(src.len());

    // Last byte emitted that is significant for separation purposes.
    let mut prev: Option<u8> = None;
    let mut i = 0;

    while i < src.len() {
        let c = src[i];

        match c {
            global::POS_SENTINEL => {
                let end = (i + 1 + global::POS_COOKIE_WIDTH).min(src.len());
                out.extend_from_slice(&src[i..end]);
                i = end;
            }

            b' ' | b'\t' | b'\n' | b'\r' => {
                let next = src.get(i + 1).copied();

                if needs_separation(prev, next) {
                    out.push(c);
                }

                i += 1;
            }

            b'"' | b'\'' => {
                let end = string_end(src, i);
                out.extend_from_slice(&src[i..end]);
                prev = Some(c);
                i = end;
            }

            b'/' if src.get(i + 1) == Some(&b'*') => {
                i = comment_end(src, i);
            }

            _ => {
                out.push(c);
                prev = Some(c);
                i += 1;
            }
        }
    }

    Cow::Owned(out)
}

fn needs_separation(prev: Option<u8>, next: Option<u8>) -> bool {
    match (prev, next) {
        (Some(a), Some(b)) if is_ident_byte(a) && is_ident_byte(b) => true,
        (Some(b'+'), Some(b'+')) | (Some(b'-'), Some(b'-')) => true,
        _ => false,
    }
}

/// Bytes that may appear within an identifier or numeric literal.
///
/// Any byte of a multi-byte UTF-8 sequence is treated as an identifier
///   byte.
fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$' || c >= 0x80
}

/// Index one past the closing quote of the string literal opening at
///   `start`,
///     or the end of `src` if it is unterminated.
fn string_end(src: &[u8], start: usize) -> usize {
    let quote = src[start];
    let mut i = start + 1;

    while i < src.len() {
        match src[i] {
            b'\\' => i += 2,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }

    src.len()
}

/// Index one past the `*/` closing the comment opening at `start`,
///   or the end of `src` if it is unterminated.
fn comment_end(src: &[u8], start: usize) -> usize {
    src[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(src.len(), |pos| start + 2 + pos + 2)
}
