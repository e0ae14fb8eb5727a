// Tests for source map filter
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

#[derive(Debug, Default)]
struct Collect(Vec<Mapping>);

impl MappingSink for Collect {
    fn map(&mut self, mapping: Mapping) {
        self.0.push(mapping);
    }
}

type Sut = SourceMapFilter<Vec<u8>, Collect>;

/// Run `f` against a filter collecting mappings,
///   returning the output and the mappings.
fn filter_with<F>(f: F) -> io::Result<(Vec<u8>, Vec<Mapping>)>
where
    F: FnOnce(&mut Sut) -> io::Result<()>,
{
    let mut sut = Sut::with_sink(vec![], Collect::default());
    f(&mut sut)?;

    let (out, sink) = sut.into_parts();

    Ok((out, sink.map(|Collect(mappings)| mappings).unwrap_or_default()))
}

fn cookie(n: PosCookie) -> Vec<u8> {
    let mut bytes = vec![global::POS_SENTINEL];
    bytes.extend_from_slice(&n.to_be_bytes());
    bytes
}

#[test]
fn passes_through_plain_bytes() -> io::Result<()> {
    let (out, mappings) = filter_with(|sut| sut.write_all(b"var x = 1;\n"))?;

    assert_eq!(b"var x = 1;\n", &out[..]);
    assert!(mappings.is_empty());

    Ok(())
}

#[test]
fn tracks_line_and_column() -> io::Result<()> {
    let mut out: Vec<u8> = vec![];
    let mut sut = SourceMapFilter::new(&mut out);

    sut.write_all(b"abc")?;
    assert_eq!((0, 3), (sut.line(), sut.column()));

    sut.write_all(b"de\nf")?;
    assert_eq!((1, 1), (sut.line(), sut.column()));

    sut.write_all(b"\n\n")?;
    assert_eq!((3, 0), (sut.line(), sut.column()));

    Ok(())
}

#[test]
fn strips_cookie_and_reports_position() -> io::Result<()> {
    let mut input = b"line one\n  x".to_vec();
    input.extend(cookie(0x01020304));
    input.extend_from_slice(b" = y;\n");

    let (out, mappings) = filter_with(|sut| sut.write_all(&input))?;

    assert_eq!(b"line one\n  x = y;\n", &out[..]);
    assert_eq!(
        vec![Mapping {
            generated_line: 2,
            generated_column: 3,
            original: 0x01020304,
        }],
        mappings
    );

    Ok(())
}

#[test]
fn reports_each_of_multiple_cookies() -> io::Result<()> {
    let mut input = cookie(1);
    input.extend_from_slice(b"a");
    input.extend(cookie(2));
    input.extend(cookie(3));
    input.extend_from_slice(b"\nb");

    let (out, mappings) = filter_with(|sut| sut.write_all(&input))?;

    assert_eq!(b"a\nb", &out[..]);
    assert_eq!(
        vec![(1, 0, 1), (1, 1, 2), (1, 1, 3)],
        mappings
            .iter()
            .map(|m| (m.generated_line, m.generated_column, m.original))
            .collect::<Vec<_>>(),
    );

    Ok(())
}

#[test]
fn cookie_bytes_resembling_newlines_do_not_advance_line() -> io::Result<()> {
    let mut input = cookie(u32::from_be_bytes([b'\n', b'\n', 0x08, b'\n']));
    input.extend_from_slice(b"x");

    let (out, mappings) = filter_with(|sut| sut.write_all(&input))?;

    assert_eq!(b"x", &out[..]);
    assert_eq!(1, mappings.len());
    assert_eq!(1, mappings[0].generated_line);

    Ok(())
}

#[test]
fn cookie_split_at_every_boundary_yields_same_mapping() -> io::Result<()> {
    let mut input = b"ab\ncd".to_vec();
    input.extend(cookie(0xdeadbeef));
    input.extend_from_slice(b"ef\n");

    let (expected_out, expected) = filter_with(|sut| sut.write_all(&input))?;

    assert_eq!(b"ab\ncdef\n", &expected_out[..]);
    assert_eq!(
        vec![Mapping {
            generated_line: 2,
            generated_column: 2,
            original: 0xdeadbeef,
        }],
        expected
    );

    for at in 0..=input.len() {
        let (head, tail) = input.split_at(at);

        let (out, mappings) = filter_with(|sut| {
            sut.write_all(head)?;
            sut.write_all(tail)
        })?;

        assert_eq!(expected_out, out, "output differs when split at {}", at);
        assert_eq!(expected, mappings, "mapping differs when split at {}", at);
    }

    Ok(())
}

#[test]
fn cookie_fed_one_byte_at_a_time() -> io::Result<()> {
    let mut input = b"x".to_vec();
    input.extend(cookie(42));
    input.extend(cookie(43));
    input.extend_from_slice(b"y");

    let (out, mappings) = filter_with(|sut| {
        input.iter().try_for_each(|byte| sut.write_all(&[*byte]))
    })?;

    assert_eq!(b"xy", &out[..]);
    assert_eq!(
        vec![42, 43],
        mappings.iter().map(|m| m.original).collect::<Vec<_>>()
    );

    Ok(())
}

#[test]
fn write_consumes_entire_buffer_including_cookie() -> io::Result<()> {
    let mut out: Vec<u8> = vec![];
    let mut sut = SourceMapFilter::new(&mut out);

    let mut input = b"ab".to_vec();
    input.extend(cookie(7));

    assert_eq!(input.len(), sut.write(&input)?);
    assert_eq!(2, sut.write(&input[..2])?);

    assert_eq!(b"abab", &out[..]);

    Ok(())
}

#[test]
fn strips_cookies_without_sink() -> io::Result<()> {
    let mut out: Vec<u8> = vec![];

    let mut input = cookie(1);
    input.extend_from_slice(b"ok");
    SourceMapFilter::new(&mut out).write_all(&input)?;

    assert_eq!(b"ok", &out[..]);

    Ok(())
}

#[test]
fn begin_package_notifies_sink() {
    #[derive(Default)]
    struct Recorder {
        pkgs: Vec<(String, Vec<u8>)>,
    }

    impl MappingSink for Recorder {
        fn begin_package(&mut self, import_path: &str, positions: &[u8]) {
            self.pkgs.push((import_path.into(), positions.into()));
        }

        fn map(&mut self, _mapping: Mapping) {}
    }

    let mut sut = SourceMapFilter::with_sink(Vec::<u8>::new(), Recorder::default());
    sut.begin_package("a/b", &[1, 2]);

    let (_, recorder) = sut.into_parts();

    assert_eq!(
        Some(vec![("a/b".to_string(), vec![1, 2])]),
        recorder.map(|r| r.pkgs)
    );
}
