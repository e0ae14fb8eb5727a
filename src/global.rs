// Global constants across the entirety of JSLD
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

//! System-wide static configuration.
//!
//! This module provides a system-wide configuration.
//! Subsystems should reference these values rather than defining their own
//!   and risk incompatibilities or maintenance issues as requirements
//!   change.
//!
//! By convention,
//!   import this entire module rather than individual members and reference
//!   them as `global::foo` to emphasize their nature and risk.

/// A size capable of representing every interned string in a program.
pub type ProgSymSize = u32;

/// Initial capacity of the global interner.
///
/// Every package path and every declaration name of a program is interned
///   during dead code elimination,
///     so this should be large enough to avoid rehashing for
///     moderately-sized programs.
pub const INIT_GLOBAL_INTERNER_CAPACITY: usize = 4096;

/// Byte introducing a source position cookie in generated code.
///
/// The upstream code generator guarantees that this byte never appears in
///   ordinary output.
pub const POS_SENTINEL: u8 = b'\x08';

/// Width in bytes of the big-endian source position cookie that follows
///   [`POS_SENTINEL`].
pub const POS_COOKIE_WIDTH: usize = 4;

/// Source position cookie as read from the output stream.
pub type PosCookie = u32;

const_assert_eq!(std::mem::size_of::<PosCookie>(), POS_COOKIE_WIDTH);

/// Leading bytes of every serialized archive.
pub const ARCHIVE_MAGIC: [u8; 4] = *b"JSAR";

/// Serialization format version of archives.
///
/// This must be incremented whenever the layout of
///   [`Archive`](crate::obj::archive::Archive) or
///   [`TypePkg`](crate::types::TypePkg) changes,
///     since archives are cached between link invocations.
pub const ARCHIVE_VERSION: u8 = 1;

/// File extension of archives resolved from a library directory.
pub const ARCHIVE_EXT: &str = "jsa";

/// Runtime reference of the package registry object.
pub const PKG_REGISTRY: &str = "$packages";

/// Runtime reference of the universal `error` interface type.
///
/// This is distinct from the per-package naming scheme since `error` is
///   not declared by any package.
pub const ERROR_TYPE_REF: &str = "$error";

/// Name of the procedure invoked on the entry-point package.
pub const ENTRY_PROC: &str = "main";
