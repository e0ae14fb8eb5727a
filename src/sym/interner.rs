// String interners
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

//! Interners used to intern values as symbols.
//!
//! See the [parent module](super) for more information.
//!
//! ```
//! use jsld::sym::{DefaultInterner, Interner};
//!
//! // Interners employ interior mutability and so do not need to be
//! // declared `mut`
//! let interner = DefaultInterner::new();
//!
//! let (ia, ib, ic) = (
//!     interner.intern("foo"),
//!     interner.intern(&"foo".to_string()),
//!     interner.intern("foobar"),
//! );
//!
//! assert_eq!(ia, ib);
//! assert_ne!(ia, ic);
//!
//! assert_eq!(2, interner.len());
//! assert!(interner.contains("foobar"));
//! assert_eq!(Some("foo"), interner.index_lookup(ia));
//! ```

use super::SymbolId;
use crate::global;
use bumpalo::Bump;
use fxhash::FxBuildHasher;
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::hash::BuildHasher;

/// Create, store, compare, and retrieve interned values.
///
/// Interners accept string slices and produce values of type [`SymbolId`].
/// The same [`SymbolId`] will always be returned for a given string.
pub trait Interner<'i> {
    /// Intern a string slice or return an existing [`SymbolId`].
    fn intern(&self, value: &str) -> SymbolId;

    /// Retrieve an existing intern for the provided string slice
    ///   without interning it.
    fn intern_soft(&self, value: &str) -> Option<SymbolId>;

    /// Determine whether the given value has already been interned.
    fn contains(&self, value: &str) -> bool {
        self.intern_soft(value).is_some()
    }

    /// Number of interned strings in this interner's pool.
    fn len(&self) -> usize;

    /// Whether nothing has yet been interned.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a symbol's string value by its [`SymbolId`].
    ///
    /// If the index was not allocated by this interner,
    ///   the result is [`None`].
    fn index_lookup(&'i self, index: SymbolId) -> Option<&'i str>;
}

/// An interner backed by an [arena](bumpalo).
///
/// Since all symbols exist until the interner itself is freed,
///   an arena provides a stable location in memory for symbol data.
pub struct ArenaInterner<'i, S>
where
    S: BuildHasher + Default,
{
    /// Storage for interned strings.
    arena: Bump,

    /// Interned strings by [`SymbolId`].
    ///
    /// The first index is populated during initialization so that no
    ///   [`SymbolId`] is ever `0`.
    strings: RefCell<Vec<&'i str>>,

    /// Map of interned strings to their respective [`SymbolId`].
    map: RefCell<HashMap<&'i str, SymbolId, S>>,
}

impl<'i, S> ArenaInterner<'i, S>
where
    S: BuildHasher + Default,
{
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Initialize a new interner with an initial capacity for the
    ///   underlying [`HashMap`].
    ///
    /// The given `capacity` has no effect on arena allocation.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut strings = Vec::with_capacity(capacity + 1);
        strings.push("");

        Self {
            arena: Bump::new(),
            strings: RefCell::new(strings),
            map: RefCell::new(HashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }

    fn next_symbol_id(syms: &[&'i str]) -> SymbolId {
        global::ProgSymSize::try_from(syms.len())
            .ok()
            .and_then(SymbolId::from_index)
            .unwrap_or_else(|| panic!("internal error: SymbolId range exhausted"))
    }

    fn copy_slice_into_arena(&self, value: &str) -> &'i str {
        // The arena lives as long as `self`,
        //   and strings are never removed from it.
        unsafe { &*(self.arena.alloc_str(value) as *const str) }
    }
}

impl<'i, S> Default for ArenaInterner<'i, S>
where
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'i, S> Interner<'i> for ArenaInterner<'i, S>
where
    S: BuildHasher + Default,
{
    fn intern(&self, value: &str) -> SymbolId {
        let mut map = self.map.borrow_mut();

        if let Some(sym) = map.get(value) {
            return *sym;
        }

        let mut syms = self.strings.borrow_mut();

        let id = Self::next_symbol_id(&syms);
        let clone = self.copy_slice_into_arena(value);

        map.insert(clone, id);
        syms.push(clone);

        id
    }

    #[inline]
    fn intern_soft(&self, value: &str) -> Option<SymbolId> {
        self.map.borrow().get(value).copied()
    }

    #[inline]
    fn len(&self) -> usize {
        self.map.borrow().len()
    }

    fn index_lookup(&'i self, index: SymbolId) -> Option<&'i str> {
        self.strings.borrow().get(index.as_usize()).copied()
    }
}

/// Interner using the [Fx Hash][fxhash] hashing function.
///
/// Symbol names come from trusted compiler output,
///   so denial of service against the hash function is not a concern.
pub type FxArenaInterner<'i> = ArenaInterner<'i, FxBuildHasher>;

/// Recommended [`Interner`] and configuration.
pub type DefaultInterner<'i> = FxArenaInterner<'i>;

#[cfg(test)]
mod test {
    use super::*;

    type Sut<'i> = DefaultInterner<'i>;

    #[test]
    fn recognizes_equal_strings() {
        let a = "foo";
        let b = a.to_string();
        let c = "bar";

        let sut = Sut::new();

        let (ia, ib, ic) = (sut.intern(a), sut.intern(&b), sut.intern(c));

        assert_eq!(ia, ib);
        assert_ne!(ia, ic);
    }

    #[test]
    fn symbol_id_increases_with_each_new_intern() {
        let sut = Sut::new();

        // Identifiers begin at 1
        assert_eq!(SymbolId::test_from_int(1), sut.intern("foo"));
        assert_eq!(SymbolId::test_from_int(2), sut.intern("bar"));
        assert_eq!(SymbolId::test_from_int(1), sut.intern("foo"));
    }

    #[test]
    fn length_increases_only_on_new_strings() {
        let sut = Sut::new();

        assert!(sut.is_empty());

        sut.intern("foo");
        sut.intern("foo");
        sut.intern("bar");

        assert_eq!(2, sut.len());
    }

    #[test]
    fn intern_soft_does_not_intern() {
        let sut = Sut::new();

        assert_eq!(None, sut.intern_soft("foo"));
        assert!(!sut.contains("foo"));

        let foo = sut.intern("foo");

        assert_eq!(Some(foo), sut.intern_soft("foo"));
    }

    #[test]
    fn lookup_by_index() {
        let sut = Sut::with_capacity(4);

        let foo = sut.intern("foo");
        let bar = sut.intern("bar");

        assert_eq!(Some("foo"), sut.index_lookup(foo));
        assert_eq!(Some("bar"), sut.index_lookup(bar));
        assert_eq!(None, sut.index_lookup(SymbolId::test_from_int(99)));
    }
}
