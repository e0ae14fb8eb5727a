// Tests for dead code elimination
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

use super::*;
use crate::obj::archive::Decl;

fn id(pkg: &str, name: &str) -> DepId {
    DepId::new(pkg, name)
}

fn decl(filters: &[DepId], deps: &[DepId]) -> Decl {
    Decl {
        filters: filters.to_vec(),
        deps: deps.to_vec(),
        ..Default::default()
    }
}

fn pkg(path: &str, decls: Vec<Decl>) -> Archive {
    let mut archive = Archive::new(path);
    archive.decls = decls;
    archive
}

fn live_of(liveness: &Liveness, pkg: usize) -> Vec<usize> {
    liveness
        .pkg(pkg)
        .map(|live| live.ones().collect())
        .unwrap_or_default()
}

#[test]
fn unfiltered_decls_are_live() {
    let pkgs = [pkg("a", vec![decl(&[], &[]), decl(&[], &[])])];

    let sut = eliminate(&pkgs);

    assert_eq!(vec![0, 1], live_of(&sut, 0));
    assert_eq!(2, sut.total_live());
}

#[test]
fn filtered_decl_without_user_is_dead() {
    let pkgs = [pkg(
        "a",
        vec![decl(&[], &[]), decl(&[id("a", "T.m")], &[])],
    )];

    let sut = eliminate(&pkgs);

    assert_eq!(vec![0], live_of(&sut, 0));
    assert!(!sut.is_used(&DceKey::new("a", "T.m")));
}

// Package A's unfiltered decl depends on "B.f";
//   B declares one decl filtered by "B.f" and another filtered by "Z.g",
//   which nothing depends on.
#[test]
fn cross_package_dependency_enables_guarded_decl() {
    let pkgs = [
        pkg(
            "b",
            vec![
                decl(&[id("b", "f")], &[]),
                decl(&[id("z", "g")], &[]),
            ],
        ),
        pkg("a", vec![decl(&[], &[id("b", "f")])]),
    ];

    let sut = eliminate(&pkgs);

    assert!(sut.is_live(DeclRef { pkg: 0, decl: 0 }));
    assert!(!sut.is_live(DeclRef { pkg: 0, decl: 1 }));
    assert!(sut.is_live(DeclRef { pkg: 1, decl: 0 }));

    assert!(sut.is_used(&DceKey::new("b", "f")));
    assert!(!sut.is_used(&DceKey::new("z", "g")));
}

#[test]
fn liveness_propagates_transitively() {
    let pkgs = [pkg(
        "p",
        vec![
            decl(&[id("p", "c")], &[]),
            decl(&[id("p", "b")], &[id("p", "c")]),
            decl(&[id("p", "a")], &[id("p", "b")]),
            decl(&[], &[id("p", "a")]),
        ],
    )];

    let sut = eliminate(&pkgs);

    assert_eq!(vec![0, 1, 2, 3], live_of(&sut, 0));
}

#[test]
fn every_filter_must_be_satisfied() {
    let both = [id("p", "x"), id("p", "y")];

    let one = [pkg(
        "p",
        vec![decl(&both, &[]), decl(&[], &[id("p", "x")])],
    )];
    assert!(!eliminate(&one).is_live(DeclRef { pkg: 0, decl: 0 }));

    let all = [pkg(
        "p",
        vec![
            decl(&both, &[]),
            decl(&[], &[id("p", "x")]),
            decl(&[], &[id("p", "y")]),
        ],
    )];
    assert!(eliminate(&all).is_live(DeclRef { pkg: 0, decl: 0 }));
}

// A filter listed twice must not require two separate users.
#[test]
fn duplicate_filters_count_once() {
    let pkgs = [pkg(
        "p",
        vec![
            decl(&[id("p", "x"), id("p", "x")], &[]),
            decl(&[], &[id("p", "x")]),
        ],
    )];

    assert!(eliminate(&pkgs).is_live(DeclRef { pkg: 0, decl: 0 }));
}

#[test]
fn self_guarded_decl_stays_dead_without_other_user() {
    let pkgs = [pkg("p", vec![decl(&[id("p", "f")], &[id("p", "f")])])];

    let sut = eliminate(&pkgs);

    assert!(!sut.is_live(DeclRef { pkg: 0, decl: 0 }));
}

#[test]
fn self_guarded_decl_lives_through_other_user() {
    let pkgs = [pkg(
        "p",
        vec![
            decl(&[id("p", "f")], &[id("p", "f")]),
            decl(&[], &[id("p", "f")]),
        ],
    )];

    assert_eq!(vec![0, 1], live_of(&eliminate(&pkgs), 0));
}

#[test]
fn dependency_guarding_nothing_is_inert() {
    let pkgs = [pkg(
        "p",
        vec![decl(&[], &[id("q", "nothing")]), decl(&[id("p", "g")], &[])],
    )];

    let sut = eliminate(&pkgs);

    assert_eq!(vec![0], live_of(&sut, 0));
    assert!(sut.is_used(&DceKey::new("q", "nothing")));
}

// Concatenated string forms of these ids would be equal,
//   but the ids themselves are distinct.
#[test]
fn ids_compare_by_package_and_name() {
    let pkgs = [pkg(
        "p",
        vec![decl(&[id("a", "b:c")], &[]), decl(&[], &[id("a:b", "c")])],
    )];

    assert!(!eliminate(&pkgs).is_live(DeclRef { pkg: 0, decl: 0 }));
}

#[test]
fn result_is_independent_of_package_order() {
    let a = pkg(
        "a",
        vec![decl(&[], &[id("b", "f")]), decl(&[id("a", "g")], &[])],
    );
    let b = pkg(
        "b",
        vec![decl(&[id("b", "f")], &[id("a", "g")]), decl(&[id("b", "h")], &[])],
    );

    let forward = eliminate(&[a.clone(), b.clone()]);
    let reverse = eliminate(&[b, a]);

    assert_eq!(live_of(&forward, 0), live_of(&reverse, 1));
    assert_eq!(live_of(&forward, 1), live_of(&reverse, 0));
    assert_eq!(vec![0, 1], live_of(&forward, 0));
    assert_eq!(vec![0], live_of(&forward, 1));
}

#[test]
fn empty_program() {
    let sut = eliminate(&[]);

    assert_eq!(0, sut.total_live());
    assert_eq!(None, sut.pkg(0));
    assert!(!sut.is_live(DeclRef { pkg: 0, decl: 0 }));
}

#[test]
fn unfiltered_ignores_other_packages() {
    let sut = pkg(
        "p",
        vec![decl(&[id("p", "x")], &[]), decl(&[], &[id("p", "x")])],
    );

    assert_eq!(vec![1], unfiltered(&sut).ones().collect::<Vec<_>>());
}
