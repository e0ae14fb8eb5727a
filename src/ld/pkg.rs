// Package emitter
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

//! Writing the code of a single package.
//!
//! Each package is wrapped in a function whose result is stored in the
//!   package registry:
//!
//! ```text
//! $packages["path"] = (function() {
//!     var $pkg = {}, imp = $packages["imp"], x, y;
//!     <bodies of live declarations>
//!     $pkg.init = function() {
//!         <inits of live declarations>
//!     };
//!     return $pkg;
//! })();
//! ```
//!
//! Only the text generated here is subject to minification;
//!   declaration code is written exactly as it appears in the archive.

use super::minify::remove_whitespace;
use crate::global;
use crate::obj::archive::Archive;
use crate::srcmap::{MappingSink, SourceMapFilter};
use fixedbitset::FixedBitSet;
use std::fmt::{self, Display};
use std::io::{self, Write};

/// Reference to a package in the runtime package registry.
///
/// ```
/// use jsld::ld::pkg::PkgRef;
///
/// assert_eq!(r#"$packages["a/b"]"#, PkgRef("a/b").to_string());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PkgRef<'a>(pub &'a str);

impl Display for PkgRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}[\"{}\"]", global::PKG_REGISTRY, self.0)
    }
}

/// Write `pkg` to `w`,
///   including only those declarations whose index is set in `live`.
///
/// The sink of `w` is first notified of the package and its position
///   table.
/// Nothing is retained between invocations.
pub fn write_pkg<W: Write, M: MappingSink>(
    pkg: &Archive,
    live: &FixedBitSet,
    minify: bool,
    w: &mut SourceMapFilter<W, M>,
) -> io::Result<()> {
    w.begin_package(&pkg.import_path, &pkg.positions);

    let live_decls = || {
        pkg.decls
            .iter()
            .enumerate()
            .filter(|(i, _)| live.contains(*i))
            .map(|(_, decl)| decl)
    };

    let header = format!("{} = (function() {{\n", PkgRef(&pkg.import_path));
    write_generated(w, &header, minify)?;

    let vars: Vec<String> = std::iter::once("$pkg = {}".to_string())
        .chain(
            pkg.imports
                .iter()
                .map(|imp| format!("{} = {}", imp.var_name, PkgRef(&imp.path))),
        )
        .chain(
            live_decls()
                .filter_map(|decl| decl.var.as_deref())
                .filter(|var| !var.is_empty())
                .map(String::from),
        )
        .collect();

    write_generated(w, &format!("\tvar {};\n", vars.join(", ")), minify)?;

    for decl in live_decls() {
        w.write_all(decl.body.as_bytes())?;
    }

    write_generated(w, "\t$pkg.init = function() {\n", minify)?;

    for decl in live_decls() {
        w.write_all(decl.init.as_bytes())?;
    }

    write_generated(w, "\t};\n\treturn $pkg;\n})();", minify)?;

    // Always retained so that packages remain on separate lines.
    w.write_all(b"\n")
}

/// Write text generated by the linker,
///   minifying it if requested.
pub(super) fn write_generated<W: Write>(
    w: &mut W,
    text: &str,
    minify: bool,
) -> io::Result<()> {
    w.write_all(&remove_whitespace(text.as_bytes(), minify))
}
