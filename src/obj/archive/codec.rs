// Archive serialization
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

//! Serialized form of [`Archive`]s.
//!
//! An archive is serialized as:
//!
//!   1. The four bytes [`global::ARCHIVE_MAGIC`];
//!   2. One byte holding [`global::ARCHIVE_VERSION`]; and
//!   3. The [`postcard`] encoding of the [`Archive`],
//!        in which every variable-length field is length-prefixed.
//!
//! The format is internal to this system and must round-trip exactly;
//!   no other toolchain reads it.
//!
//! Loading an archive has two parts:
//!   [`decode`] parses the bytes,
//!   and [`register_types`] adds the package's type information to a
//!     [`TypeRegistry`].
//! [`unmarshal`] performs both.
//! They are separate so that a loader can inspect an archive's
//!   dependencies before its types can be registered
//!   (see [`ld::load`](crate::ld::load)).

use super::{Archive, ArchiveError, DecodeError};
use crate::global;
use crate::types::{TypePkg, TypeRegistry};
use tracing::debug;

const HEADER_LEN: usize = global::ARCHIVE_MAGIC.len() + 1;

/// Serialize an archive.
pub fn marshal(archive: &Archive) -> Result<Vec<u8>, ArchiveError> {
    let mut buf = Vec::with_capacity(HEADER_LEN);
    buf.extend_from_slice(&global::ARCHIVE_MAGIC);
    buf.push(global::ARCHIVE_VERSION);

    postcard::to_extend(archive, buf).map_err(ArchiveError::Encode)
}

/// Deserialize an archive without registering its type information.
///
/// `id` identifies the archive in errors
///   (e.g. its file name);
///     the archive's own import path cannot be trusted until it has been
///     decoded.
pub fn decode(id: &str, data: &[u8]) -> Result<Archive, ArchiveError> {
    decode_payload(data).map_err(|err| ArchiveError::decode(id, err))
}

fn decode_payload(data: &[u8]) -> Result<Archive, DecodeError> {
    let payload = match data.strip_prefix(&global::ARCHIVE_MAGIC[..]) {
        Some(rest) => rest,
        None => return Err(DecodeError::BadMagic),
    };

    let payload = match payload.split_first() {
        Some((&global::ARCHIVE_VERSION, rest)) => rest,
        Some((&ver, _)) => return Err(DecodeError::UnsupportedVersion(ver)),
        None => return Err(DecodeError::BadMagic),
    };

    let (archive, rest) = postcard::take_from_bytes::<Archive>(payload)?;

    if !rest.is_empty() {
        return Err(DecodeError::TrailingBytes(rest.len()));
    }

    Ok(archive)
}

/// Decode the type information of `archive` into `registry`.
///
/// The type information of every package that `archive` depends on must
///   already be registered.
pub fn register_types(
    archive: &Archive,
    registry: &mut TypeRegistry,
) -> Result<(), ArchiveError> {
    let decode_err = |err| ArchiveError::decode(&archive.import_path, err);

    let tpkg = if archive.type_data.is_empty() {
        TypePkg::new(&archive.import_path)
    } else {
        TypePkg::decode(&archive.type_data)
            .map_err(|err| decode_err(DecodeError::Malformed(err)))?
    };

    if tpkg.path != archive.import_path {
        return Err(decode_err(DecodeError::TypePkgMismatch {
            found: tpkg.path,
        }));
    }

    registry.register(tpkg)?;

    Ok(())
}

/// Deserialize an archive and register its type information.
///
/// This is equivalent to [`decode`] followed by [`register_types`].
pub fn unmarshal(
    id: &str,
    data: &[u8],
    registry: &mut TypeRegistry,
) -> Result<Archive, ArchiveError> {
    let archive = decode(id, data)?;
    register_types(&archive, registry)?;

    debug!(
        pkg = %archive.import_path,
        decls = archive.decls.len(),
        "unmarshaled archive"
    );

    Ok(archive)
}
