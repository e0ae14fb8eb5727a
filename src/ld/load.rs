// Archive loader
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

//! Loading archives from the filesystem in dependency order.
//!
//! The type information of a package can only be registered once that of
//!   each of its dependencies has been.
//! Given a library directory,
//!   [`Loader`] resolves each dependency `path` of an archive to the file
//!   `<libdir>/<path>.jsa` and loads it first,
//!     depth-first,
//!     so that the resulting list of archives is in dependency order.
//! Each package is loaded only once,
//!   no matter how many packages depend on it.
//!
//! Without a library directory,
//!   archives are loaded in the order requested and must therefore be
//!   requested in dependency order.

use crate::global;
use crate::obj::archive::{self, Archive, ArchiveError};
use crate::types::TypeRegistry;
use fxhash::FxHashSet;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Loads archives,
///   registering their type information.
pub struct Loader<'r> {
    registry: &'r mut TypeRegistry,
    libdir: Option<PathBuf>,

    /// Import paths of packages already loaded.
    visited: FxHashSet<String>,

    archives: Vec<Archive>,
}

impl<'r> Loader<'r> {
    pub fn new(registry: &'r mut TypeRegistry) -> Self {
        Self {
            registry,
            libdir: None,
            visited: Default::default(),
            archives: Vec::new(),
        }
    }

    /// Resolve dependencies relative to `libdir`.
    pub fn with_libdir<P: Into<PathBuf>>(mut self, libdir: P) -> Self {
        self.libdir = Some(libdir.into());
        self
    }

    /// Path of the archive file of the package `import_path`,
    ///   if there is a library directory.
    pub fn resolve(&self, import_path: &str) -> Option<PathBuf> {
        self.libdir.as_ref().map(|dir| {
            dir.join(format!("{}.{}", import_path, global::ARCHIVE_EXT))
        })
    }

    /// Load the archive at `path` along with any dependencies not yet
    ///   loaded.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let archive = self.read(path.as_ref())?;
        self.load_archive(archive)
    }

    /// Load an already decoded archive along with any dependencies not yet
    ///   loaded.
    ///
    /// This does nothing if a package of the same import path has already
    ///   been loaded.
    pub fn load_archive(&mut self, archive: Archive) -> Result<(), LoadError> {
        if !self.visited.insert(archive.import_path.clone()) {
            trace!(pkg = %archive.import_path, "already loaded");
            return Ok(());
        }

        for dep in &archive.dependencies {
            if self.visited.contains(dep) {
                continue;
            }

            let path = match self.resolve(dep) {
                Some(path) => path,
                None => break,
            };

            let dep_archive = self.read(&path)?;

            if dep_archive.import_path != *dep {
                return Err(LoadError::PathMismatch {
                    path,
                    expected: dep.clone(),
                    found: dep_archive.import_path,
                });
            }

            self.load_archive(dep_archive)?;
        }

        archive::register_types(&archive, self.registry)?;

        debug!(
            pkg = %archive.import_path,
            decls = archive.decls.len(),
            "loaded package"
        );

        self.archives.push(archive);

        Ok(())
    }

    fn read(&self, path: &Path) -> Result<Archive, LoadError> {
        trace!(path = %path.display(), "reading archive");

        let data = fs::read(path).map_err(|err| LoadError::Io {
            path: path.into(),
            err,
        })?;

        Ok(archive::decode(&path.display().to_string(), &data)?)
    }

    /// Archives loaded so far,
    ///   in dependency order.
    pub fn archives(&self) -> &[Archive] {
        &self.archives
    }

    pub fn finish(self) -> Vec<Archive> {
        self.archives
    }
}

/// Failure to load an archive.
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, err: io::Error },
    Archive(ArchiveError),

    /// The archive resolved for the dependency `expected` declares the
    ///   import path `found`.
    PathMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },
}

impl From<ArchiveError> for LoadError {
    fn from(err: ArchiveError) -> Self {
        Self::Archive(err)
    }
}

impl Display for LoadError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io { path, err } => {
                write!(fmt, "{}: {}", path.display(), err)
            }
            Self::Archive(err) => err.fmt(fmt),
            Self::PathMismatch {
                path,
                expected,
                found,
            } => write!(
                fmt,
                "{}: expected package `{expected}`, found `{found}`",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { err, .. } => Some(err),
            Self::Archive(err) => Some(err),
            Self::PathMismatch { .. } => None,
        }
    }
}
