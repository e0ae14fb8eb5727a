// Tests for jsld
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

use assert_cmd::prelude::*;
use jsld::obj::archive::{self, Archive, Decl, DepId, PkgImport};
use jsld::types::TypePkg;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Write the archives of a two-package program into `dir`,
///   returning the paths of `lib` and `main` respectively.
fn write_program(dir: &Path) -> Result<(PathBuf, PathBuf), Box<dyn std::error::Error>> {
    let mut lib = Archive::new("lib");
    lib.type_data = TypePkg::new("lib").encode()?;
    lib.decls = vec![
        Decl {
            var: Some("Used".into()),
            body: "\tUsed = function() {};\n".into(),
            filters: vec![DepId::new("lib", "Used")],
            ..Default::default()
        },
        Decl {
            var: Some("Unused".into()),
            body: "\tUnused = function() {};\n".into(),
            filters: vec![DepId::new("lib", "Unused")],
            ..Default::default()
        },
    ];

    let mut main = Archive::new("main");
    main.type_data = TypePkg::new("main").with_import("lib").encode()?;
    main.add_dependency("lib");
    main.imports = vec![PkgImport::new("lib", "lib")];
    main.decls = vec![Decl {
        var: Some("main".into()),
        body: b"\tmain = $pkg.main = \x08\x00\x00\x00\x09function() { lib.Used(); };\n"[..]
            .into(),
        deps: vec![DepId::new("lib", "Used")],
        ..Default::default()
    }];

    let lib_path = dir.join("lib.jsa");
    let main_path = dir.join("main.jsa");

    fs::write(&lib_path, archive::marshal(&lib)?)?;
    fs::write(&main_path, archive::marshal(&main)?)?;

    Ok((lib_path, main_path))
}

#[test]
fn link_invalid_argument() -> TestResult {
    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg("-q");
    cmd.assert()
        .failure()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("Unrecognized option:"));

    Ok(())
}

#[test]
fn link_missing_input_file() -> TestResult {
    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.assert()
        .failure()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("FILE"));

    Ok(())
}

#[test]
fn link_missing_output_file() -> TestResult {
    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg("foobar");
    cmd.assert()
        .failure()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("-o OUTPUT"));

    Ok(())
}

#[test]
fn link_help() -> TestResult {
    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));

    Ok(())
}

#[test]
fn link_input_file_does_not_exist() -> TestResult {
    let dir = TempDir::new()?;

    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg(dir.path().join("foobar.jsa"));
    cmd.arg("-o").arg(dir.path().join("out.js"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No such file or directory"));

    Ok(())
}

#[test]
fn link_invalid_input_file() -> TestResult {
    let dir = TempDir::new()?;
    let input = dir.path().join("invalid.jsa");
    fs::write(&input, b"<xml/>")?;

    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg(&input);
    cmd.arg("-o").arg(dir.path().join("out.js"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not an archive"));

    Ok(())
}

#[test]
fn link_out_of_order_inputs() -> TestResult {
    let dir = TempDir::new()?;
    let (lib, main) = write_program(dir.path())?;

    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg(&main).arg(&lib);
    cmd.arg("-o").arg(dir.path().join("out.js"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("`lib`"));

    Ok(())
}

#[test]
fn link_program() -> TestResult {
    let dir = TempDir::new()?;
    let (lib, main) = write_program(dir.path())?;
    let out = dir.path().join("out.js");

    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg(&lib).arg(&main);
    cmd.arg("-o").arg(&out);
    cmd.assert().success();

    let given = fs::read_to_string(&out)?;

    assert!(given.starts_with("\"use strict\";\n"));
    assert!(given.contains("\tUsed = function() {};\n"));
    assert!(!given.contains("Unused"));
    assert!(given.contains("main = $pkg.main = function() { lib.Used(); };\n"));
    assert!(given.ends_with(concat!(
        "$packages[\"lib\"].init();\n",
        "$packages[\"main\"].init();\n",
        "$packages[\"main\"].main(function() {});\n",
        "\n})();\n",
    )));
    assert!(!given.contains('\x08'));

    Ok(())
}

#[test]
fn link_resolves_dependencies_from_libdir() -> TestResult {
    let dir = TempDir::new()?;
    let (_, main) = write_program(dir.path())?;
    let out = dir.path().join("out.js");

    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg("-L").arg(dir.path());
    cmd.arg(&main);
    cmd.arg("-o").arg(&out);
    cmd.assert().success();

    let given = fs::read_to_string(&out)?;
    let lib_at = given.find("$packages[\"lib\"] = ");
    let main_at = given.find("$packages[\"main\"] = ");

    assert!(lib_at.is_some() && lib_at < main_at);

    Ok(())
}

#[test]
fn link_writes_mappings() -> TestResult {
    let dir = TempDir::new()?;
    let (lib, main) = write_program(dir.path())?;
    let out = dir.path().join("out.js");
    let map = dir.path().join("out.map");

    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg(&lib).arg(&main);
    cmd.arg("-o").arg(&out);
    cmd.arg("--mappings").arg(&map);
    cmd.assert().success();

    let program = fs::read_to_string(&out)?;
    let mappings = fs::read_to_string(&map)?;

    let line = program
        .lines()
        .position(|line| line.starts_with("\tmain = "))
        .map(|i| i + 1)
        .ok_or("main declaration not found")?;

    assert_eq!(format!("main\t{}\t20\t9\n", line), mappings);

    Ok(())
}

#[test]
fn link_minified_is_smaller() -> TestResult {
    let dir = TempDir::new()?;
    let (lib, main) = write_program(dir.path())?;
    let plain = dir.path().join("plain.js");
    let minified = dir.path().join("min.js");

    Command::cargo_bin("jsld")?
        .arg(&lib)
        .arg(&main)
        .arg("-o")
        .arg(&plain)
        .assert()
        .success();

    Command::cargo_bin("jsld")?
        .arg("--minify")
        .arg(&lib)
        .arg(&main)
        .arg("-o")
        .arg(&minified)
        .assert()
        .success();

    assert!(fs::metadata(&minified)?.len() < fs::metadata(&plain)?.len());

    Ok(())
}

#[test]
fn link_unknown_main_package() -> TestResult {
    let dir = TempDir::new()?;
    let (lib, main) = write_program(dir.path())?;

    let mut cmd = Command::cargo_bin("jsld")?;
    cmd.arg(&lib).arg(&main);
    cmd.arg("-m").arg("nope");
    cmd.arg("-o").arg(dir.path().join("out.js"));
    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("`nope`"));

    Ok(())
}
