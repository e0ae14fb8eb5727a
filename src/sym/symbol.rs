// Interned symbols
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

//! Symbol identifiers and the global interner.
//!
//! See the [parent module](super) for more information.

use super::{DefaultInterner, Interner};
use crate::global;
use std::fmt::{Debug, Display};
use std::num::NonZeroU32;
use std::thread::LocalKey;

/// Reference to an interned string.
///
/// The value `0` is never a valid symbol,
///   which permits `Option<SymbolId>` to be the same size as
///   [`SymbolId`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(NonZeroU32);

assert_eq_size!(Option<SymbolId>, SymbolId);

impl SymbolId {
    /// Construct a symbol from a raw index.
    ///
    /// This is used only by interners,
    ///   which guarantee that `n` refers to an allocated string.
    pub(super) fn from_index(n: global::ProgSymSize) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    pub fn as_usize(self) -> usize {
        self.0.get() as usize
    }

    /// Construct a symbol from an arbitrary integer for testing.
    ///
    /// The resulting symbol is not guaranteed to resolve to anything.
    #[cfg(test)]
    pub fn test_from_int(n: global::ProgSymSize) -> Self {
        Self(NonZeroU32::new(n).expect("test symbol must be non-zero"))
    }
}

type StaticInterner = DefaultInterner<'static>;

thread_local! {
    static INTERNER: StaticInterner =
        StaticInterner::with_capacity(global::INIT_GLOBAL_INTERNER_CAPACITY);
}

/// Acquire a static reference to the global interner.
///
/// The global interner is thread-local.
/// [`LocalKey`] provides access only for the duration of a closure,
///   but interned strings must outlive it.
///
/// The lifetime of the interner is transmuted to `'static`.
/// This is sound because the thread-local storage is never deallocated
///   before the thread exits and is accessible only to that thread.
fn with_static_interner<F, R>(key: &'static LocalKey<StaticInterner>, f: F) -> R
where
    F: FnOnce(&'static StaticInterner) -> R,
{
    key.with(|interner| {
        f(unsafe {
            std::mem::transmute::<&StaticInterner, &'static StaticInterner>(
                interner,
            )
        })
    })
}

/// Resolve a [`SymbolId`] to the string value it represents using the
///   global interner.
///
/// This exists as its own trait
///   (rather than simply adding to [`SymbolId`])
///   to make it easy to see what systems rely on global state.
pub trait GlobalSymbolResolve {
    /// Resolve a [`SymbolId`] allocated using the global interner.
    ///
    /// Panics
    /// ======
    /// This will panic if the symbol cannot be found,
    ///   which can only happen if the symbol was allocated by some other
    ///   interner.
    fn lookup_str(&self) -> &'static str;

    /// Attempt to resolve a [`SymbolId`] allocated using the global
    ///   interner.
    ///
    /// Unlike [`GlobalSymbolResolve::lookup_str`],
    ///   this cannot panic.
    fn try_lookup_str(&self) -> Option<&'static str>;
}

impl GlobalSymbolResolve for SymbolId {
    fn lookup_str(&self) -> &'static str {
        with_static_interner(&INTERNER, |interner| {
            interner.index_lookup(*self).unwrap_or_else(|| {
                panic!(
                    "failed to resolve SymbolId({}) using global \
                         interner of length {}",
                    self.0,
                    interner.len()
                )
            })
        })
    }

    fn try_lookup_str(&self) -> Option<&'static str> {
        with_static_interner(&INTERNER, |interner| {
            interner.index_lookup(*self)
        })
    }
}

/// Intern a string using the global interner.
pub trait GlobalSymbolIntern {
    /// Intern a string,
    ///   or return the existing [`SymbolId`] if it has already been
    ///   interned.
    fn intern(self) -> SymbolId;
}

impl GlobalSymbolIntern for &str {
    fn intern(self) -> SymbolId {
        with_static_interner(&INTERNER, |interner| interner.intern(self))
    }
}

impl GlobalSymbolIntern for &String {
    fn intern(self) -> SymbolId {
        self.as_str().intern()
    }
}

impl GlobalSymbolIntern for String {
    fn intern(self) -> SymbolId {
        self.as_str().intern()
    }
}

impl Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.lookup_str())
    }
}

impl Debug for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // This may be called during a panic,
        //   so we must not panic again if the symbol is unknown.
        write!(
            f,
            "SymbolId({} {:?})",
            self.0,
            self.try_lookup_str().unwrap_or("<#!UNKNOWN_SYMBOL>")
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn global_intern_is_idempotent() {
        let a = "sym::global::a".intern();
        let b = String::from("sym::global::a").intern();
        let c = "sym::global::c".intern();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn str_lookup_using_global_interner() {
        let given = "sym::global::lookup";
        let sym = given.intern();

        assert_eq!(given, sym.lookup_str());
        assert_eq!(given, format!("{}", sym));
    }

    #[test]
    fn debug_of_unknown_symbol_does_not_panic() {
        let sym = SymbolId::test_from_int(u32::MAX);

        assert!(format!("{:?}", sym).contains("UNKNOWN_SYMBOL"));
    }
}
