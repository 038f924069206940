//! A `c++filt` clone built on the `cxxfilt` crate.

use clap::Parser;
use cxxfilt::{BorrowedSymbol, DemangleOptions, Demangler, ItaniumDemangler, ParseOptions};
use std::io::{self, BufRead, Write};
use std::process;

/// Demangle Itanium C++ ABI symbols.
///
/// Symbols given as arguments are demangled one per line. Without arguments,
/// every mangled symbol found in standard input is replaced with its
/// demangled form, and everything else is copied through unchanged.
#[derive(Debug, Parser)]
#[command(name = "cppfilt", version, about)]
struct Cli {
    /// Do not display function parameters, nor return types.
    #[arg(short = 'p', long)]
    no_params: bool,

    /// Do not display function return types.
    #[arg(long)]
    no_return_type: bool,

    /// Hide the types of literals in template arguments.
    #[arg(long)]
    hide_expression_literal_types: bool,

    /// Maximum nesting depth before a symbol is rejected.
    #[arg(long, value_name = "N")]
    recursion_limit: Option<u32>,

    /// Decode arguments without the `_Z` prefix as types.
    #[arg(short = 't', long)]
    internal: bool,

    /// Symbols to demangle.
    symbols: Vec<String>,
}

impl Cli {
    fn parse_options(&self) -> ParseOptions {
        match self.recursion_limit {
            Some(limit) => ParseOptions::new().recursion_limit(limit),
            None => ParseOptions::new(),
        }
    }

    fn demangle_options(&self) -> DemangleOptions {
        let mut options = DemangleOptions::new();
        if self.no_params {
            options = options.no_params();
        }
        if self.no_return_type {
            options = options.no_return_type();
        }
        if self.hide_expression_literal_types {
            options = options.hide_expression_literal_types();
        }
        options
    }
}

/// Find the index of the first (potential) occurrence of a mangled C++ symbol
/// in the given `haystack`.
fn find_mangled(haystack: &[u8]) -> Option<usize> {
    haystack.windows(2).enumerate().find_map(|(i, pair)| {
        let is_start = pair == b"_Z" || (pair == b"__" && haystack.get(i + 2) == Some(&b'Z'));
        if is_start {
            Some(i)
        } else {
            None
        }
    })
}

/// Print the given `line` to `out`, with all mangled C++ symbols replaced with
/// their demangled form.
fn demangle_line<W>(
    out: &mut W,
    line: &[u8],
    parse_options: &ParseOptions,
    demangle_options: &DemangleOptions,
) -> io::Result<()>
where
    W: Write,
{
    let mut line = line;

    while let Some(idx) = find_mangled(line) {
        out.write_all(&line[..idx])?;

        match BorrowedSymbol::with_tail_and_options(&line[idx..], parse_options) {
            Ok((sym, tail)) => {
                write!(out, "{}", sym.demangle(demangle_options))?;
                line = tail;
            }
            Err(e) => {
                log::debug!("not demangling at byte {}: {}", idx, e);
                out.write_all(&line[idx..idx + 2])?;
                line = &line[idx + 2..];
            }
        }
    }

    out.write_all(line)
}

/// Print all the lines from the given `input` to `out`, with all mangled C++
/// symbols replaced with their demangled form.
fn demangle_all<R, W>(
    input: &mut R,
    out: &mut W,
    parse_options: &ParseOptions,
    demangle_options: &DemangleOptions,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut buf = vec![];

    while input.read_until(b'\n', &mut buf)? > 0 {
        demangle_line(out, &buf[..], parse_options, demangle_options)?;
        buf.clear();
    }

    Ok(())
}

/// Print each symbol on its own line, demangled if possible and unchanged
/// otherwise.
fn demangle_symbols<W>(out: &mut W, cli: &Cli) -> io::Result<()>
where
    W: Write,
{
    let demangler = ItaniumDemangler::new()
        .with_parse_options(cli.parse_options())
        .with_demangle_options(cli.demangle_options());

    for symbol in &cli.symbols {
        match demangler.demangle(symbol, !cli.internal) {
            Ok(demangled) => writeln!(out, "{}", demangled)?,
            Err(e) => {
                log::debug!("could not demangle {:?}: {}", symbol, e);
                writeln!(out, "{}", symbol)?;
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    let result = if cli.symbols.is_empty() {
        let stdin = io::stdin();
        let mut stdin = stdin.lock();
        demangle_all(
            &mut stdin,
            &mut stdout,
            &cli.parse_options(),
            &cli.demangle_options(),
        )
    } else {
        demangle_symbols(&mut stdout, &cli)
    };

    let code = match result.and_then(|()| stdout.flush()) {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(io::stderr(), "error: {}", e);
            1
        }
    };

    process::exit(code);
}
