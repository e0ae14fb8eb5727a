// JSLD linker
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

//! This is the JSLD linker.
//!
//! `jsld` takes the archives of each package of a program and produces a
//!   single script.
//!
//! For more information about the linker,
//!   see the [`jsld::ld`] module.

extern crate jsld;

use getopts::{Fail, Options};
use jsld::{
    ld::{
        load::{LoadError, Loader},
        LinkError, LinkOptions, LinkSummary, Linker,
    },
    srcmap::{Mapping, MappingSink, SourceMapFilter},
    types::TypeRegistry,
};
use std::{
    env,
    error::Error,
    fmt::{self, Display},
    fs::File,
    io::{self, BufWriter, Write},
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "JSLD_LOG";

/// Types of commands
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Link(LinkCommand),
    Usage,
}

#[derive(Debug, PartialEq, Eq)]
struct LinkCommand {
    inputs: Vec<String>,
    output: String,
    libdir: Option<String>,
    main_pkg: Option<String>,
    mappings: Option<String>,
    minify: bool,
}

/// Writes each mapping as a tab-separated record
///   `pkg line column cookie`.
///
/// [`MappingSink::map`] cannot fail,
///   so the first write error is retained until [`MappingWriter::finish`].
struct MappingWriter<W: Write> {
    out: W,
    pkg: String,
    err: Option<io::Error>,
}

impl<W: Write> MappingWriter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            pkg: String::new(),
            err: None,
        }
    }

    fn finish(mut self) -> io::Result<()> {
        match self.err.take() {
            Some(err) => Err(err),
            None => self.out.flush(),
        }
    }
}

impl<W: Write> MappingSink for MappingWriter<W> {
    fn begin_package(&mut self, import_path: &str, _positions: &[u8]) {
        self.pkg = import_path.into();
    }

    fn map(&mut self, mapping: Mapping) {
        if self.err.is_some() {
            return;
        }

        let result = writeln!(
            self.out,
            "{}\t{}\t{}\t{}",
            self.pkg,
            mapping.generated_line,
            mapping.generated_column,
            mapping.original
        );

        if let Err(err) = result {
            self.err = Some(err);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Load the requested archives and link them,
///   writing the program to the output path.
fn link(cmd: &LinkCommand) -> Result<LinkSummary, JsldError> {
    let mut registry = TypeRegistry::new();
    let mut loader = Loader::new(&mut registry);

    if let Some(libdir) = &cmd.libdir {
        loader = loader.with_libdir(libdir);
    }

    for input in &cmd.inputs {
        loader.load_file(input)?;
    }

    let archives = loader.finish();

    // The main package defaults to the last archive loaded,
    //   which is the last input unless it was already loaded as a
    //   dependency.
    let main_pkg = match &cmd.main_pkg {
        Some(pkg) => pkg.clone(),
        None => archives
            .last()
            .map(|archive| archive.import_path.clone())
            .unwrap_or_default(),
    };

    debug!(pkgs = archives.len(), main = %main_pkg, "linking");

    let linker = Linker::new(
        &registry,
        LinkOptions {
            minify: cmd.minify,
            main_pkg,
        },
    );

    let fout = BufWriter::new(File::create(&cmd.output)?);

    let summary = match &cmd.mappings {
        Some(path) => {
            let sink = MappingWriter::new(BufWriter::new(File::create(path)?));
            let mut w = SourceMapFilter::with_sink(fout, sink);

            let summary = linker.write_program(&archives, &mut w)?;

            let (mut fout, sink) = w.into_parts();
            fout.flush()?;

            if let Some(sink) = sink {
                sink.finish()?;
            }

            summary
        }
        None => {
            let mut w = SourceMapFilter::new(fout);
            let summary = linker.write_program(&archives, &mut w)?;
            w.flush()?;

            summary
        }
    };

    Ok(summary)
}

/// Entrypoint for the linker
pub fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let program = &args[0];
    let opts = get_opts();
    let usage =
        opts.usage(&format!("Usage: {} [OPTIONS] -o OUTPUT FILE...", program));

    match parse_options(opts, args) {
        Ok(Command::Link(cmd)) => match link(&cmd) {
            Ok(summary) => {
                debug!(
                    tables = summary.tables,
                    dead = summary.total_dead(),
                    "wrote `{}`",
                    cmd.output
                );

                std::process::exit(exitcode::OK);
            }
            Err(e) => {
                eprintln!("error: {}", e);
                eprintln!("fatal: failed to link `{}`", cmd.output);

                std::process::exit(1);
            }
        },
        Ok(Command::Usage) => {
            println!("{}", usage);
            std::process::exit(exitcode::OK);
        }
        Err(e) => {
            eprintln!("{}", e);
            println!("{}", usage);
            std::process::exit(exitcode::USAGE);
        }
    }
}

/// Get 'Options'
fn get_opts() -> Options {
    let mut opts = Options::new();
    opts.optopt("o", "output", "set output file name", "OUTPUT");
    opts.optopt(
        "m",
        "main",
        "import path of the main package (default: last archive)",
        "PKG",
    );
    opts.optopt("L", "libdir", "load dependencies from DIR", "DIR");
    opts.optopt("", "mappings", "write source mappings to FILE", "FILE");
    opts.optflag("", "minify", "remove insignificant whitespace");
    opts.optflag("h", "help", "print this help menu");

    opts
}

/// Option parser
fn parse_options(opts: Options, args: Vec<String>) -> Result<Command, Fail> {
    let matches = opts.parse(&args[1..])?;

    if matches.opt_present("h") {
        return Ok(Command::Usage);
    }

    if matches.free.is_empty() {
        return Err(Fail::OptionMissing(String::from("FILE")));
    }

    let output = match matches.opt_str("o") {
        Some(m) => m,
        None => {
            return Err(Fail::OptionMissing(String::from("-o OUTPUT")));
        }
    };

    let libdir = matches.opt_str("L");
    let main_pkg = matches.opt_str("m");
    let mappings = matches.opt_str("mappings");
    let minify = matches.opt_present("minify");

    Ok(Command::Link(LinkCommand {
        inputs: matches.free,
        output,
        libdir,
        main_pkg,
        mappings,
        minify,
    }))
}

/// Linker (`jsld`) error.
///
/// This represents the aggregation of all possible errors that can occur
///   during link-time.
#[derive(Debug)]
pub enum JsldError {
    Io(io::Error),
    Load(LoadError),
    Link(LinkError),
}

impl From<io::Error> for JsldError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<LoadError> for JsldError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

impl From<LinkError> for JsldError {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl Display for JsldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => Display::fmt(e, f),
            Self::Load(e) => Display::fmt(e, f),
            Self::Link(e) => Display::fmt(e, f),
        }
    }
}

impl Error for JsldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Load(e) => Some(e),
            Self::Link(e) => Some(e),
        }
    }
}
