// JSLD linker library
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

//! The [linker][] is responsible for combining individually compiled
//!   [archives](crate::obj::archive) into a single program.
//!
//! Its user-facing binary is `jsld`.
//!
//! [linker]: https://en.wikipedia.org/wiki/Linker_(computing)
//!
//! Linking proceeds in the following steps:
//!
//!   1. [`load`] reads archives in dependency order,
//!        registering the type information of each;
//!   2. [`dce`] determines which declarations of every package are live;
//!   3. [`iface`] computes interface dispatch tables over the named types
//!        that survived elimination; and
//!   4. [`program`] writes the program,
//!        using [`pkg`] to write each package.
//!
//! All output passes through a
//!   [`SourceMapFilter`](crate::srcmap::SourceMapFilter),
//!     which strips source position cookies from generated code.
//!
//! The linker does not sort packages;
//!   archives must be provided in dependency order,
//!     which [`load`] takes care of.

pub mod dce;
mod error;
pub mod iface;
pub mod load;
pub mod minify;
pub mod pkg;
pub mod program;

pub use error::LinkError;
pub use program::{LinkOptions, LinkSummary, Linker, PkgSummary};
