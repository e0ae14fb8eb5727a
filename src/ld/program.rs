// Program linker
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

//! Assembly of a complete program.
//!
//! A program is written in this order:
//!
//!   1. The opening boilerplate and the runtime [`PRELUDE`];
//!   2. Each package as written by [`write_pkg`],
//!        in the order given;
//!   3. The non-empty [dispatch tables](super::iface);
//!   4. A call to each package's `init`,
//!        in the same order as (2); and
//!   5. A call to the entry procedure of the main package followed by the
//!        closing boilerplate.
//!
//! The output is a function of the input archives and [`LinkOptions`]
//!   alone,
//!     and so is byte-for-byte reproducible.

use super::dce;
use super::iface;
use super::pkg::{write_generated, write_pkg, PkgRef};
use super::LinkError;
use crate::global;
use crate::obj::archive::Archive;
use crate::srcmap::{MappingSink, SourceMapFilter};
use crate::types::TypeRegistry;
use fixedbitset::FixedBitSet;
use std::io::Write;
use tracing::debug;

/// Runtime support code preceding all packages.
pub const PRELUDE: &str = include_str!("prelude.js");

const PROGRAM_HEAD: &[u8] = b"\"use strict\";\n(function() {\n\n";
const PROGRAM_TAIL: &[u8] = b"\n})();\n";

/// Configuration of a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOptions {
    /// Remove insignificant whitespace from linker-generated code.
    pub minify: bool,

    /// Import path of the package whose entry procedure starts the
    ///   program.
    pub main_pkg: String,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            minify: false,
            main_pkg: "main".into(),
        }
    }
}

/// Declaration counts of a linked package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgSummary {
    pub import_path: String,
    pub live: usize,
    pub dead: usize,
}

/// Statistics of a completed link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSummary {
    /// One entry per package,
    ///   in link order.
    pub pkgs: Vec<PkgSummary>,

    /// Number of dispatch tables written.
    pub tables: usize,
}

impl LinkSummary {
    pub fn total_dead(&self) -> usize {
        self.pkgs.iter().map(|pkg| pkg.dead).sum()
    }
}

/// Links archives into a program.
///
/// The type information of every package to be linked must already be
///   registered in `registry`.
pub struct Linker<'r> {
    registry: &'r TypeRegistry,
    options: LinkOptions,
}

impl<'r> Linker<'r> {
    pub fn new(registry: &'r TypeRegistry, options: LinkOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    /// Write the program consisting of `pkgs` to `w`.
    ///
    /// Packages must be ordered such that each follows all of its
    ///   dependencies.
    /// Nothing is written if the program cannot be linked.
    pub fn write_program<W: Write, M: MappingSink>(
        &self,
        pkgs: &[Archive],
        w: &mut SourceMapFilter<W, M>,
    ) -> Result<LinkSummary, LinkError> {
        let minify = self.options.minify;
        let main_pkg = self.options.main_pkg.as_str();

        if !pkgs.iter().any(|pkg| pkg.import_path == main_pkg) {
            return Err(LinkError::MissingEntry(main_pkg.into()));
        }

        let liveness = dce::eliminate(pkgs);
        let cands = iface::candidates(pkgs, self.registry, &liveness)?;
        let tables = iface::dispatch_tables(&cands);

        w.write_all(PROGRAM_HEAD)?;
        write_generated(w, PRELUDE.trim(), minify)?;
        w.write_all(b"\n")?;

        let mut summary = LinkSummary::default();
        let none = FixedBitSet::new();

        for (i, pkg) in pkgs.iter().enumerate() {
            let live = liveness.pkg(i).unwrap_or(&none);

            write_pkg(pkg, live, minify, w)?;

            let live_count = live.count_ones(..);
            let dead = pkg.decls.len() - live_count;

            debug!(pkg = %pkg.import_path, live = live_count, dead, "wrote package");

            summary.pkgs.push(PkgSummary {
                import_path: pkg.import_path.clone(),
                live: live_count,
                dead,
            });
        }

        for table in tables.iter().filter(|table| !table.is_empty()) {
            write_generated(w, &table.to_string(), minify)?;

            summary.tables += 1;
        }

        for pkg in pkgs {
            writeln!(w, "{}.init();", PkgRef(&pkg.import_path))?;
        }

        writeln!(
            w,
            "{}.{}(function() {{}});",
            PkgRef(main_pkg),
            global::ENTRY_PROC
        )?;
        w.write_all(PROGRAM_TAIL)?;

        debug!(
            pkgs = pkgs.len(),
            tables = summary.tables,
            dead = summary.total_dead(),
            "linked program"
        );

        Ok(summary)
    }
}
