// Dead code elimination
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

//! Cross-package dead code elimination.
//!
//! Every [`Decl`](crate::obj::archive::Decl) with no filters is live.
//! A filtered declaration becomes live once _each_ of its filters has been
//!   named as a dependency by some live declaration.
//!
//! Edges point from users to guards rather than the reverse,
//!   so this is not a mark-and-sweep over a dependency graph.
//! Instead,
//!   declarations are indexed by the symbols that guard them,
//!   and a worklist of live declarations drains that index:
//!
//!   1. Index every filtered declaration under each of its filters;
//!   2. Seed the worklist with every unfiltered declaration;
//!   3. For each declaration taken from the worklist,
//!        remove each of its dependencies from the index,
//!        satisfying that filter of every declaration found there;
//!          a declaration whose filters are all satisfied joins the
//!          worklist.
//!
//! Each index entry is consumed at most once.
//! The result depends only on filters and dependencies,
//!   not on the order in which the worklist is processed.
//!
//! Symbols that guard no declaration are inert,
//!   and a declaration that guards itself can become live only through
//!   some _other_ live declaration.
//!
//! ```
//! use jsld::ld::dce::{self, DeclRef};
//! use jsld::obj::archive::{Archive, Decl, DepId};
//!
//! let mut pkg = Archive::new("p");
//! pkg.decls = vec![
//!     Decl {
//!         deps: vec![DepId::new("p", "f")],
//!         ..Default::default()
//!     },
//!     Decl {
//!         filters: vec![DepId::new("p", "f")],
//!         ..Default::default()
//!     },
//!     Decl {
//!         filters: vec![DepId::new("p", "g")],
//!         ..Default::default()
//!     },
//! ];
//!
//! let liveness = dce::eliminate(&[pkg]);
//!
//! assert!(liveness.is_live(DeclRef { pkg: 0, decl: 1 }));
//! assert!(!liveness.is_live(DeclRef { pkg: 0, decl: 2 }));
//! ```

use crate::obj::archive::{Archive, DepId};
use crate::sym::{GlobalSymbolIntern, SymbolId};
use fixedbitset::FixedBitSet;
use fxhash::FxHashMap;
use tracing::debug;

/// Interned identifier of a package-level symbol.
///
/// This is the interned form of [`DepId`],
///   and compares equal exactly when the package paths and names of the
///   respective [`DepId`]s do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DceKey {
    pub pkg: SymbolId,
    pub name: SymbolId,
}

impl DceKey {
    pub fn new(pkg: &str, name: &str) -> Self {
        Self {
            pkg: pkg.intern(),
            name: name.intern(),
        }
    }
}

impl From<&DepId> for DceKey {
    fn from(id: &DepId) -> Self {
        Self::new(&id.pkg, &id.name)
    }
}

/// Position of a declaration within the list of archives of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclRef {
    /// Index of the archive.
    pub pkg: usize,

    /// Index of the declaration within that archive.
    pub decl: usize,
}

/// Result of dead code elimination.
#[derive(Debug)]
pub struct Liveness {
    /// Live declarations of each package,
    ///   indexed by declaration.
    live: Vec<FixedBitSet>,

    /// Index entries that were never drained.
    ///
    /// Each key is a symbol guarding at least one declaration that no live
    ///   declaration depends upon.
    unused: FxHashMap<DceKey, Vec<DeclRef>>,
}

impl Liveness {
    pub fn is_live(&self, decl: DeclRef) -> bool {
        self.live
            .get(decl.pkg)
            .map_or(false, |live| live.contains(decl.decl))
    }

    /// Live declarations of the package at index `pkg`.
    pub fn pkg(&self, pkg: usize) -> Option<&FixedBitSet> {
        self.live.get(pkg)
    }

    /// Number of live declarations in the package at index `pkg`.
    pub fn live_count(&self, pkg: usize) -> usize {
        self.live.get(pkg).map_or(0, |live| live.count_ones(..))
    }

    /// Whether the symbol `key` survived elimination.
    ///
    /// A symbol is unused only if it guards some declaration and nothing
    ///   live depends on it.
    /// Symbols that guard nothing are never filtered and are therefore
    ///   considered used.
    pub fn is_used(&self, key: &DceKey) -> bool {
        !self.unused.contains_key(key)
    }

    /// Total number of live declarations across all packages.
    pub fn total_live(&self) -> usize {
        (0..self.live.len()).map(|pkg| self.live_count(pkg)).sum()
    }
}

/// Live declarations of `pkg` in the absence of any other package:
///   exactly those that are unfiltered.
///
/// This is useful for writing a single package on its own,
///   where there are no other packages to consult.
pub fn unfiltered(pkg: &Archive) -> FixedBitSet {
    let mut live = FixedBitSet::with_capacity(pkg.decls.len());

    pkg.decls
        .iter()
        .enumerate()
        .filter(|(_, decl)| !decl.is_filtered())
        .for_each(|(i, _)| live.insert(i));

    live
}

/// Determine the live declarations of every package of a program.
///
/// See the [module-level documentation](self) for more information.
pub fn eliminate(pkgs: &[Archive]) -> Liveness {
    let mut guarded: FxHashMap<DceKey, Vec<DeclRef>> = Default::default();

    // Number of distinct filters not yet satisfied,
    //   by package and declaration.
    let mut remaining: Vec<Vec<usize>> = Vec::with_capacity(pkgs.len());
    let mut pending: Vec<DeclRef> = Vec::new();

    for (pkg_index, pkg) in pkgs.iter().enumerate() {
        let mut pkg_remaining = vec![0; pkg.decls.len()];

        for (decl_index, decl) in pkg.decls.iter().enumerate() {
            let dref = DeclRef {
                pkg: pkg_index,
                decl: decl_index,
            };

            if !decl.is_filtered() {
                pending.push(dref);
                continue;
            }

            let mut keys: Vec<DceKey> =
                decl.filters.iter().map(DceKey::from).collect();
            keys.sort_unstable();
            keys.dedup();

            pkg_remaining[decl_index] = keys.len();

            for key in keys {
                guarded.entry(key).or_default().push(dref);
            }
        }

        remaining.push(pkg_remaining);
    }

    let mut live: Vec<FixedBitSet> = pkgs
        .iter()
        .map(|pkg| FixedBitSet::with_capacity(pkg.decls.len()))
        .collect();

    while let Some(dref) = pending.pop() {
        live[dref.pkg].insert(dref.decl);

        for dep in &pkgs[dref.pkg].decls[dref.decl].deps {
            let decls = match guarded.remove(&DceKey::from(dep)) {
                Some(decls) => decls,
                None => continue,
            };

            for gref in decls {
                let count = &mut remaining[gref.pkg][gref.decl];
                *count -= 1;

                if *count == 0 {
                    pending.push(gref);
                }
            }
        }
    }

    let liveness = Liveness {
        live,
        unused: guarded,
    };

    debug!(
        live = liveness.total_live(),
        total = pkgs.iter().map(|pkg| pkg.decls.len()).sum::<usize>(),
        unused_symbols = liveness.unused.len(),
        "dead code elimination complete"
    );

    liveness
}

#[cfg(test)]
mod test;
