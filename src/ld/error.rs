// Linker errors
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

use crate::types::ResolutionError;
use std::fmt::Display;
use std::io;

/// Failure to link a program.
#[derive(Debug)]
pub enum LinkError {
    /// Type information required for dispatch tables is unavailable.
    Resolution(ResolutionError),

    /// The designated main package is not among the packages being
    ///   linked.
    MissingEntry(String),

    Io(io::Error),
}

impl From<ResolutionError> for LinkError {
    fn from(err: ResolutionError) -> Self {
        Self::Resolution(err)
    }
}

impl From<io::Error> for LinkError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl Display for LinkError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Resolution(err) => err.fmt(fmt),
            Self::MissingEntry(pkg) => {
                write!(fmt, "main package `{pkg}` is not being linked")
            }
            Self::Io(err) => err.fmt(fmt),
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolution(err) => Some(err),
            Self::MissingEntry(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
