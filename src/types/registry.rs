// Registry of package type information
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

//! Store of [`TypePkg`]s keyed by import path.
//!
//! A registry is scoped to a single link:
//!   construct one,
//!   load archives into it in dependency order,
//!   and hand it to the [linker](crate::ld).
//! Entries are added only while loading and are never replaced or removed.

use super::{
    MethodSig, NamedType, ResolutionError, Signature, TypePkg, TypeRef,
    Underlying, UNIVERSE,
};
use fxhash::FxHashMap;
use tracing::trace;

/// Type information for every package of a program.
#[derive(Debug)]
pub struct TypeRegistry {
    pkgs: FxHashMap<String, TypePkg>,

    /// The predeclared `error` interface.
    error: NamedType,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            pkgs: Default::default(),
            error: Self::universe_error(),
        }
    }

    /// The predeclared `interface { Error() string }`.
    fn universe_error() -> NamedType {
        NamedType::new(
            "error",
            Underlying::Interface(vec![MethodSig::exported(
                "Error",
                Signature::new(vec![], vec![TypeRef::basic("string")]),
            )]),
        )
    }

    /// The predeclared `error` interface type.
    pub fn error_type(&self) -> &NamedType {
        &self.error
    }

    pub fn get(&self, path: &str) -> Option<&TypePkg> {
        self.pkgs.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.pkgs.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.pkgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pkgs.is_empty()
    }

    /// Look up a named type by its package-qualified name.
    pub fn lookup(&self, pkg: &str, name: &str) -> Option<&NamedType> {
        if pkg == UNIVERSE {
            return (name == self.error.name).then(|| &self.error);
        }

        self.get(pkg).and_then(|tpkg| tpkg.lookup(name))
    }

    /// Register the type information of a package.
    ///
    /// Every package that `tpkg` references must already be registered.
    /// A package is registered at most once;
    ///   registering a path a second time leaves the first registration in
    ///   place.
    pub fn register(&mut self, tpkg: TypePkg) -> Result<(), ResolutionError> {
        if self.contains(&tpkg.path) {
            trace!(pkg = %tpkg.path, "type information already registered");
            return Ok(());
        }

        self.check_resolved(&tpkg)?;

        trace!(pkg = %tpkg.path, types = tpkg.types.len(), "registered types");
        self.pkgs.insert(tpkg.path.clone(), tpkg);

        Ok(())
    }

    fn check_resolved(&self, tpkg: &TypePkg) -> Result<(), ResolutionError> {
        let missing_pkg = |dep: &str| ResolutionError::MissingPackage {
            pkg: tpkg.path.clone(),
            dep: dep.into(),
        };

        if let Some(dep) = tpkg
            .imports
            .iter()
            .find(|dep| **dep != tpkg.path && !self.contains(dep))
        {
            return Err(missing_pkg(dep));
        }

        let mut result = Ok(());

        for ty in &tpkg.types {
            ty.visit_named(&mut |dep, name| {
                if result.is_err() {
                    return;
                }

                let found = if dep == tpkg.path {
                    tpkg.lookup(name).is_some()
                } else if dep != UNIVERSE && !self.contains(dep) {
                    result = Err(missing_pkg(dep));
                    return;
                } else {
                    self.lookup(dep, name).is_some()
                };

                if !found {
                    result = Err(ResolutionError::MissingType {
                        pkg: tpkg.path.clone(),
                        dep: dep.into(),
                        name: name.into(),
                    });
                }
            });
        }

        result
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
