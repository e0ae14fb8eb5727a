// Interface dispatch tables
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

//! Interface dispatch tables.
//!
//! The runtime answers type assertions and type switches against an
//!   interface by consulting that interface's `implementedBy` list.
//! Since any package may declare a type implementing an interface of any
//!   other,
//!     these lists can only be computed once the whole program is known.
//!
//! The named types considered are the [candidates]:
//!   the universal `error` interface followed by the named types of each
//!   package in link order
//!     (sorted by name within each package),
//!   excluding those whose declarations were eliminated as dead.
//! Every non-interface candidate is tested in both its value and pointer
//!   forms against every interface candidate that declares at least one
//!   method.

use super::dce::{DceKey, Liveness};
use super::pkg::PkgRef;
use crate::global;
use crate::obj::archive::Archive;
use crate::types::{
    MethodSig, NamedType, RecvForm, ResolutionError, TypeRegistry, UNIVERSE,
};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// A named type eligible for dispatch tables.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Import path of the declaring package,
    ///   or [`UNIVERSE`].
    pub pkg: &'a str,
    pub ty: &'a NamedType,
}

/// Reference to an interface whose `implementedBy` list is to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfaceRef<'a> {
    /// The universal `error` interface.
    Error,
    Named { pkg: &'a str, name: &'a str },
}

impl<'a> From<Candidate<'a>> for IfaceRef<'a> {
    fn from(cand: Candidate<'a>) -> Self {
        match cand.pkg {
            UNIVERSE => Self::Error,
            pkg => Self::Named {
                pkg,
                name: &cand.ty.name,
            },
        }
    }
}

impl Display for IfaceRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Error => f.write_str(global::ERROR_TYPE_REF),
            Self::Named { pkg, name } => write!(f, "{}.{}", PkgRef(pkg), name),
        }
    }
}

/// A type form assignable to some interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Implementor<'a> {
    pub pkg: &'a str,
    pub name: &'a str,
    pub form: RecvForm,

    /// Whether the underlying type is a struct,
    ///   which determines how the runtime refers to its pointer type.
    pub is_struct: bool,
}

impl Display for Implementor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Self {
            pkg,
            name,
            form,
            is_struct,
        } = self;

        match (form, is_struct) {
            (RecvForm::Value, _) => write!(f, "{}.{}", PkgRef(pkg), name),
            (RecvForm::Pointer, true) => {
                write!(f, "{}.{}.Ptr", PkgRef(pkg), name)
            }
            (RecvForm::Pointer, false) => {
                write!(f, "$ptrType({}.{})", PkgRef(pkg), name)
            }
        }
    }
}

/// The implementors of a single interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable<'a> {
    pub iface: IfaceRef<'a>,

    /// Implementors sorted by their rendered reference,
    ///   without duplicates.
    pub implementors: Vec<Implementor<'a>>,
}

impl DispatchTable<'_> {
    pub fn is_empty(&self) -> bool {
        self.implementors.is_empty()
    }
}

impl Display for DispatchTable<'_> {
    /// Render as the statement assigning `implementedBy`,
    ///   terminated by a newline.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.implementedBy = [", self.iface)?;

        for (i, imp) in self.implementors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }

            write!(f, "{}", imp)?;
        }

        f.write_str("];\n")
    }
}

/// Named types of the program that survived dead code elimination,
///   in dispatch order.
///
/// See the [module-level documentation](self) for more information.
///
/// Every package in `pkgs` must have registered type information in
///   `registry`.
pub fn candidates<'a>(
    pkgs: &'a [Archive],
    registry: &'a TypeRegistry,
    liveness: &Liveness,
) -> Result<Vec<Candidate<'a>>, ResolutionError> {
    let mut cands = vec![Candidate {
        pkg: UNIVERSE,
        ty: registry.error_type(),
    }];

    for pkg in pkgs {
        let path = pkg.import_path.as_str();
        let tpkg = registry
            .get(path)
            .ok_or_else(|| ResolutionError::Unregistered { pkg: path.into() })?;

        cands.extend(
            tpkg.sorted_types()
                .into_iter()
                .filter(|ty| liveness.is_used(&DceKey::new(path, &ty.name)))
                .map(|ty| Candidate { pkg: path, ty }),
        );
    }

    Ok(cands)
}

/// Compute a dispatch table for each interface candidate with at least
///   one method,
///     in candidate order.
///
/// Tables may be empty.
pub fn dispatch_tables<'a>(cands: &[Candidate<'a>]) -> Vec<DispatchTable<'a>> {
    cands
        .iter()
        .filter_map(|cand| match cand.ty.interface_methods() {
            Some(methods) if !methods.is_empty() => Some(DispatchTable {
                iface: IfaceRef::from(*cand),
                implementors: implementors(cands, methods),
            }),
            _ => None,
        })
        .collect()
}

fn implementors<'a>(
    cands: &[Candidate<'a>],
    required: &[MethodSig],
) -> Vec<Implementor<'a>> {
    let mut found: BTreeMap<String, Implementor<'a>> = BTreeMap::new();

    for cand in cands.iter().filter(|cand| !cand.ty.is_interface()) {
        for form in [RecvForm::Value, RecvForm::Pointer] {
            if cand.ty.satisfies(required, form) {
                let imp = Implementor {
                    pkg: cand.pkg,
                    name: &cand.ty.name,
                    form,
                    is_struct: cand.ty.is_struct(),
                };

                found.entry(imp.to_string()).or_insert(imp);
            }
        }
    }

    found.into_values().collect()
}
