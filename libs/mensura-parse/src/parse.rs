//! Driver: trim, transcode, parse, verify full consumption.

use mensura_core::{Unit, UnitSystem};

use crate::error::{Error, Result};
use crate::parser::Parser;
use crate::transcode;

/// Input encodings the driver accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Utf8,
    Latin1,
}

const SNIPPET_MAX: usize = 50;

/// Parse a UTF-8 unit specification against `system`.
pub fn parse(system: &UnitSystem, specification: &str) -> Result<Unit> {
    parse_trimmed(system, specification, false)
}

/// Parse a unit specification supplied as raw bytes in `encoding`.
pub fn parse_bytes(
    system: &UnitSystem,
    specification: &[u8],
    encoding: Encoding,
) -> Result<Unit> {
    match encoding {
        Encoding::Latin1 => {
            let utf8 = transcode::latin1_to_utf8(specification);
            parse_trimmed(system, &utf8, true)
        }
        Encoding::Ascii | Encoding::Utf8 => {
            let utf8 = std::str::from_utf8(specification)?;
            parse_trimmed(system, utf8, false)
        }
    }
}

fn parse_trimmed(system: &UnitSystem, specification: &str, from_latin1: bool) -> Result<Unit> {
    let trimmed = trim(specification, from_latin1);
    let mut parser = Parser::new(system, trimmed);
    let outcome = parser.parse().and_then(|unit| match parser.remainder() {
        None => Ok(unit),
        Some(tail) => Err(Error::Syntax(format!(
            "Unexpected text after unit specification: \"{}\"",
            snippet(&tail)
        ))),
    });
    if let Err(err) = &outcome {
        tracing::debug!(specification = trimmed, error = %err, "unit specification rejected");
    }
    outcome
}

/// Newline is trimmed at the ends even though it is a syntax error inside
/// the specification; NBSP is trimmed only when the input was Latin-1.
fn trim(text: &str, from_latin1: bool) -> &str {
    text.trim_matches(|c: char| {
        matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{B}' | '\u{C}')
            || (from_latin1 && c == '\u{A0}')
    })
}

fn snippet(tail: &str) -> String {
    let mut out: String = tail.chars().take(SNIPPET_MAX).collect();
    if tail.chars().count() > SNIPPET_MAX {
        out.push_str("...");
    }
    out
}
