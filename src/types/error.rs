// Type resolution errors
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

use std::fmt::Display;

/// A package's type metadata references types that are not known to the
///   [`TypeRegistry`](super::TypeRegistry).
///
/// This almost always means that archives were loaded out of dependency
///   order:
///     dependencies must be loaded before their dependents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// `pkg` references `dep`,
    ///   which has not been registered.
    MissingPackage { pkg: String, dep: String },

    /// `pkg` references the type `name` of the registered package `dep`,
    ///   but `dep` declares no such type.
    MissingType {
        pkg: String,
        dep: String,
        name: String,
    },

    /// Type information for `pkg` was never registered.
    Unregistered { pkg: String },
}

impl Display for ResolutionError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::MissingPackage { pkg, dep } => write!(
                fmt,
                "package `{pkg}` depends on `{dep}`, \
                   whose type information has not been loaded"
            ),
            Self::MissingType { pkg, dep, name } => write!(
                fmt,
                "package `{pkg}` references unknown type `{dep}.{name}`"
            ),
            Self::Unregistered { pkg } => write!(
                fmt,
                "type information for package `{pkg}` has not been loaded"
            ),
        }
    }
}

impl std::error::Error for ResolutionError {}
