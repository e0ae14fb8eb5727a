// Package type metadata
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

//! Type metadata of compiled packages.
//!
//! Type checking happens upstream;
//!   the linker consumes its results as a trusted oracle for exactly one
//!   purpose:
//!     determining which named types structurally satisfy which
//!     interfaces,
//!       so that [dispatch tables](crate::ld::iface) can be generated for
//!       a runtime that has no native notion of interfaces.
//!
//! Each [archive](crate::obj::archive::Archive) carries its package's
//!   [`TypePkg`] as an opaque blob,
//!     which is decoded into a [`TypeRegistry`] when the archive is
//!     loaded.
//!
//! Method Sets
//! ===========
//! Method sets are recorded _flattened_:
//!   promoted methods of embedded fields are listed on the embedding type
//!   by the type checker,
//!     each tagged with whether it requires a pointer receiver.
//! The value form `T` of a named type has only the value-receiver
//!   methods in its method set;
//!     the pointer form `*T` has all of them.

use serde::{Deserialize, Serialize};

mod error;
mod registry;

pub use error::ResolutionError;
pub use registry::TypeRegistry;

/// Package path of predeclared identifiers such as `error`.
pub const UNIVERSE: &str = "";

/// Type information of a single package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePkg {
    /// Import path of the package.
    pub path: String,

    /// Packages whose types are referenced by this package.
    ///
    /// Every one of these must be registered before this package.
    pub imports: Vec<String>,

    /// Package-level named types,
    ///   in no particular order.
    pub types: Vec<NamedType>,
}

impl TypePkg {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            imports: vec![],
            types: vec![],
        }
    }

    pub fn with_import<S: Into<String>>(mut self, path: S) -> Self {
        self.imports.push(path.into());
        self
    }

    pub fn with_type(mut self, ty: NamedType) -> Self {
        self.types.push(ty);
        self
    }

    /// Look up a named type declared by this package.
    pub fn lookup(&self, name: &str) -> Option<&NamedType> {
        self.types.iter().find(|ty| ty.name == name)
    }

    /// Named types sorted by name.
    ///
    /// This is the iteration order used when generating dispatch tables,
    ///   and so must be deterministic.
    pub fn sorted_types(&self) -> Vec<&NamedType> {
        let mut types: Vec<_> = self.types.iter().collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }

    pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_stdvec(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(data)
    }
}

/// A package-level named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub name: String,
    pub underlying: Underlying,

    /// Flattened method set,
    ///   including promoted methods.
    pub methods: Vec<Method>,
}

impl NamedType {
    pub fn new<S: Into<String>>(name: S, underlying: Underlying) -> Self {
        Self {
            name: name.into(),
            underlying,
            methods: vec![],
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn is_interface(&self) -> bool {
        matches!(self.underlying, Underlying::Interface(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.underlying, Underlying::Struct(_))
    }

    /// Methods required by this type if it is an interface.
    pub fn interface_methods(&self) -> Option<&[MethodSig]> {
        match &self.underlying {
            Underlying::Interface(methods) => Some(methods),
            _ => None,
        }
    }

    /// Whether the given form of this type is assignable to an interface
    ///   requiring `required`.
    ///
    /// Interfaces are never considered to be implementors,
    ///   even if they are structurally assignable.
    pub fn satisfies(&self, required: &[MethodSig], form: RecvForm) -> bool {
        if self.is_interface() {
            return false;
        }

        required.iter().all(|req| {
            self.methods
                .iter()
                .any(|own| own.sig == *req && own.in_method_set(form))
        })
    }

    /// Invoke `f` for every named type referenced by this type's
    ///   definition and method signatures.
    pub fn visit_named<F: FnMut(&str, &str)>(&self, f: &mut F) {
        self.underlying.visit_named(f);
        self.methods.iter().for_each(|m| m.sig.sig.visit_named(f));
    }
}

/// Underlying type of a [`NamedType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Underlying {
    /// Interface with its full (flattened) set of required methods.
    Interface(Vec<MethodSig>),
    Struct(Vec<Field>),
    /// Any other type (basic, slice, map, function, etc).
    Other(TypeRef),
}

impl Underlying {
    fn visit_named<F: FnMut(&str, &str)>(&self, f: &mut F) {
        match self {
            Self::Interface(methods) => {
                methods.iter().for_each(|m| m.sig.visit_named(f))
            }
            Self::Struct(fields) => {
                fields.iter().for_each(|field| field.ty.visit_named(f))
            }
            Self::Other(ty) => ty.visit_named(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    pub embedded: bool,
}

/// A method of a named type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub sig: MethodSig,

    /// Whether the method is declared on (or promoted through) a pointer
    ///   receiver.
    pub ptr_recv: bool,
}

impl Method {
    pub fn value(sig: MethodSig) -> Self {
        Self {
            sig,
            ptr_recv: false,
        }
    }

    pub fn pointer(sig: MethodSig) -> Self {
        Self {
            sig,
            ptr_recv: true,
        }
    }

    /// Whether this method is in the method set of the given form of its
    ///   receiver type.
    pub fn in_method_set(&self, form: RecvForm) -> bool {
        match form {
            RecvForm::Value => !self.ptr_recv,
            RecvForm::Pointer => true,
        }
    }
}

/// Form of a named type used as an interface implementor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecvForm {
    /// The named type `T` itself.
    Value,
    /// A pointer `*T` to the named type.
    Pointer,
}

/// Identity of a method.
///
/// Two methods are identical if their names and signatures are identical.
/// Unexported method names are additionally qualified by the package that
///   declares them,
///     since two unexported methods of the same name in different packages
///     are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: String,
    pub pkg: Option<String>,
    pub sig: Signature,
}

impl MethodSig {
    pub fn exported<S: Into<String>>(name: S, sig: Signature) -> Self {
        Self {
            name: name.into(),
            pkg: None,
            sig,
        }
    }

    pub fn unexported<P: Into<String>, S: Into<String>>(
        pkg: P,
        name: S,
        sig: Signature,
    ) -> Self {
        Self {
            name: name.into(),
            pkg: Some(pkg.into()),
            sig,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<TypeRef>,
    pub results: Vec<TypeRef>,
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<TypeRef>, results: Vec<TypeRef>) -> Self {
        Self {
            params,
            results,
            variadic: false,
        }
    }

    fn visit_named<F: FnMut(&str, &str)>(&self, f: &mut F) {
        self.params
            .iter()
            .chain(self.results.iter())
            .for_each(|ty| ty.visit_named(f));
    }
}

/// Structural reference to a type.
///
/// Identity is structural,
///   with the exception of [`TypeRef::Named`],
///   which is identical only to a reference to the same package-qualified
///   name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    Basic(String),
    Named { pkg: String, name: String },
    Pointer(Box<TypeRef>),
    Slice(Box<TypeRef>),
    Array(u64, Box<TypeRef>),
    Map(Box<TypeRef>, Box<TypeRef>),
    Chan(Box<TypeRef>),
    Func(Box<Signature>),
    Interface(Vec<MethodSig>),
    Struct(Vec<Field>),
}

impl TypeRef {
    pub fn basic<S: Into<String>>(name: S) -> Self {
        Self::Basic(name.into())
    }

    pub fn named<P: Into<String>, S: Into<String>>(pkg: P, name: S) -> Self {
        Self::Named {
            pkg: pkg.into(),
            name: name.into(),
        }
    }

    /// Invoke `f` with the package path and name of every named type
    ///   referenced (transitively) by this type.
    pub fn visit_named<F: FnMut(&str, &str)>(&self, f: &mut F) {
        match self {
            Self::Basic(_) => (),
            Self::Named { pkg, name } => f(pkg, name),
            Self::Pointer(elem)
            | Self::Slice(elem)
            | Self::Array(_, elem)
            | Self::Chan(elem) => elem.visit_named(f),
            Self::Map(key, elem) => {
                key.visit_named(f);
                elem.visit_named(f);
            }
            Self::Func(sig) => sig.visit_named(f),
            Self::Interface(methods) => {
                methods.iter().for_each(|m| m.sig.visit_named(f))
            }
            Self::Struct(fields) => {
                fields.iter().for_each(|field| field.ty.visit_named(f))
            }
        }
    }
}
