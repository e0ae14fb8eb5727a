// Archive errors
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

//! Errors while processing archives.

use crate::global;
use crate::types::ResolutionError;
use std::fmt::Display;

/// Error during archive processing.
///
/// Every error is fatal to the load of the archive that produced it;
///   no partial archive is ever returned.
#[derive(Debug)]
pub enum ArchiveError {
    /// The archive identified by `id` is malformed.
    Decode { id: String, err: DecodeError },

    /// The archive's type information references packages that have not
    ///   yet been loaded.
    Resolution(ResolutionError),

    /// The archive could not be serialized.
    Encode(postcard::Error),
}

impl ArchiveError {
    pub(super) fn decode<S: Into<String>>(id: S, err: DecodeError) -> Self {
        Self::Decode { id: id.into(), err }
    }
}

impl Display for ArchiveError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Decode { id, err } => {
                write!(fmt, "malformed archive `{id}`: {err}")
            }
            Self::Resolution(err) => Display::fmt(err, fmt),
            Self::Encode(err) => write!(fmt, "failed to encode archive: {err}"),
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { err, .. } => Some(err),
            Self::Resolution(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<ResolutionError> for ArchiveError {
    fn from(err: ResolutionError) -> Self {
        Self::Resolution(err)
    }
}

/// Structural problem with the bytes of an archive.
///
/// This archive is corrupt or was produced by an incompatible version of
///   the compiler;
///     removing it to force it to be rebuilt should resolve the issue.
#[derive(Debug)]
pub enum DecodeError {
    /// The data do not begin with [`global::ARCHIVE_MAGIC`].
    BadMagic,

    /// The archive was written using a different format version.
    UnsupportedVersion(u8),

    /// The archive payload or its type information is truncated or
    ///   otherwise invalid.
    Malformed(postcard::Error),

    /// Data remain after the end of the archive.
    TrailingBytes(usize),

    /// The type information describes a different package than the
    ///   archive itself.
    TypePkgMismatch { found: String },
}

impl Display for DecodeError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::BadMagic => write!(fmt, "not an archive"),
            Self::UnsupportedVersion(ver) => write!(
                fmt,
                "unsupported archive version {ver} (expected {})",
                global::ARCHIVE_VERSION,
            ),
            Self::Malformed(err) => Display::fmt(err, fmt),
            Self::TrailingBytes(n) => {
                write!(fmt, "{n} unexpected byte(s) after end of archive")
            }
            Self::TypePkgMismatch { found } => {
                write!(fmt, "type information is for package `{found}`")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<postcard::Error> for DecodeError {
    fn from(err: postcard::Error) -> Self {
        Self::Malformed(err)
    }
}
