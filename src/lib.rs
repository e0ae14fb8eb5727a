// JSLD library
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

//! Whole-program linker for separately compiled script packages.
//!
//! The compiler produces one [archive](obj::archive) per package,
//!   containing generated declarations and type information.
//! The [linker](ld) combines the archives of a program into a single
//!   script,
//!     eliminating declarations that nothing uses and generating the
//!     interface dispatch tables that the runtime needs in place of
//!     native interfaces.
//!
//! Source positions embedded in generated code are stripped and reported
//!   by the [`srcmap`] filter as code is written.

// We build docs for private items.
#![allow(rustdoc::private_intra_doc_links)]

pub mod global;

#[macro_use]
extern crate static_assertions;

pub mod ld;
pub mod obj;
pub mod srcmap;
pub mod sym;
pub mod types;
