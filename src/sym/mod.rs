// String internment
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

//! String internment system.
//!
//! Interned strings are represented by an integer [`SymbolId`],
//!   created by an [`Interner`].
//! Comparing two symbols is an integer comparison,
//!   which is what makes the liveness graph of the
//!   [linker](crate::ld) cheap to index:
//!     every package path and declaration name is interned once and
//!     thereafter compared and hashed as a `u32`.
//!
//! Global Interner
//! ===============
//! Most code should not use an [`Interner`] directly;
//!   the thread-local global interner is accessed through the
//!   [`GlobalSymbolIntern`] and [`GlobalSymbolResolve`] traits:
//!
//! ```
//! use jsld::sym::{GlobalSymbolIntern, GlobalSymbolResolve};
//!
//! let a = "example/pkg".intern();
//! let b = String::from("example/pkg").intern();
//!
//! assert_eq!(a, b);
//! assert_eq!("example/pkg", a.lookup_str());
//! ```
//!
//! Symbols are never freed.
//! This is acceptable for a linker,
//!   which is a short-lived process operating on a bounded set of names.

mod interner;
mod symbol;

pub use interner::{ArenaInterner, DefaultInterner, FxArenaInterner, Interner};
pub use symbol::{GlobalSymbolIntern, GlobalSymbolResolve, SymbolId};
