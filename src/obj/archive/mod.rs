// Compiled package archives
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

//! Archives of compiled packages.
//!
//! An [`Archive`] is the compiled form of a single package:
//!
//!   - The package's import path and the import paths of every package it
//!       depends on;
//!   - Bindings for each imported package;
//!   - A list of [`Decl`]s in source file order,
//!       each holding opaque generated code along with the metadata
//!       needed for [dead code elimination](crate::ld::dce);
//!   - The names of test entry points;
//!   - Type metadata (see [`TypePkg`](crate::types::TypePkg)); and
//!   - An opaque source position table for source map generation.
//!
//! Archives are produced once by the compiler and are not modified by the
//!   linker,
//!     with the exception of dependency de-duplication
//!     (see [`Archive::add_dependencies_of`]).
//!
//! See [`codec`] for the serialized form.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod codec;
mod error;

pub use codec::{decode, marshal, register_types, unmarshal};
pub use error::{ArchiveError, DecodeError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    pub import_path: String,

    /// Serialized [`TypePkg`](crate::types::TypePkg).
    ///
    /// An empty blob denotes a package that declares no types.
    pub type_data: Vec<u8>,

    /// Import paths of every package that this package (transitively)
    ///   depends on.
    pub dependencies: Vec<String>,

    /// Import bindings in order of first use.
    pub imports: Vec<PkgImport>,

    /// Declarations in source file order.
    pub decls: Vec<Decl>,

    /// Names of test entry points.
    pub tests: Vec<String>,

    /// Opaque source position table,
    ///   interpreted only by source map consumers.
    pub positions: Vec<u8>,
}

impl Archive {
    pub fn new<S: Into<String>>(import_path: S) -> Self {
        Self {
            import_path: import_path.into(),
            ..Default::default()
        }
    }

    /// Record a dependency on the package at `path` unless one has already
    ///   been recorded.
    pub fn add_dependency(&mut self, path: &str) {
        if !self.dependencies.iter().any(|dep| dep == path) {
            self.dependencies.push(path.into());
        }
    }

    /// Merge the dependencies of `other` into this archive,
    ///   preserving the order of first occurrence.
    pub fn add_dependencies_of(&mut self, other: &Archive) {
        for path in &other.dependencies {
            self.add_dependency(path);
        }
    }
}

/// Binding of an imported package to a local name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkgImport {
    pub path: String,
    pub var_name: String,
}

impl PkgImport {
    pub fn new<P: Into<String>, V: Into<String>>(path: P, var_name: V) -> Self {
        Self {
            path: path.into(),
            var_name: var_name.into(),
        }
    }
}

/// A compiled package-level declaration.
///
/// A declaration with no [`filters`](Decl::filters) is always live.
/// Otherwise it is live only if,
///   for each of its filters,
///   some live declaration depends on that symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decl {
    /// Fragment hoisted into the package's shared `var` statement.
    pub var: Option<String>,

    /// Code defining the symbol.
    pub body: Fragment,

    /// Code run during package initialization.
    pub init: Fragment,

    /// Symbols that must each be used before this declaration is live.
    pub filters: Vec<DepId>,

    /// Symbols referenced by this declaration's code.
    pub deps: Vec<DepId>,
}

impl Decl {
    /// Whether this declaration is subject to dead code elimination.
    pub fn is_filtered(&self) -> bool {
        !self.filters.is_empty()
    }
}

/// Identifier of a package-level symbol,
///   displayed as `pkg:name`.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct DepId {
    pub pkg: String,
    pub name: String,
}

impl DepId {
    pub fn new<P: Into<String>, N: Into<String>>(pkg: P, name: N) -> Self {
        Self {
            pkg: pkg.into(),
            name: name.into(),
        }
    }
}

impl Display for DepId {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}:{}", self.pkg, self.name)
    }
}

/// Generated code.
///
/// Fragments are produced and validated entirely by the compiler and may
///   contain embedded [source position cookies](crate::srcmap).
/// The linker never parses or rewrites them.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fragment(Vec<u8>);

impl Fragment {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<u8>> for Fragment {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Fragment {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for Fragment {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "Fragment({:?})", String::from_utf8_lossy(&self.0))
    }
}
