//! Parser for textual unit specifications.
//!
//! Translates specifications like `kg m s-2`, `millimeters`,
//! `seconds since 2000-01-01T12:00:00Z`, `lg(re 1 mW)` or
//! `celsius @ 273.15` into unit values over a [`mensura_core::UnitSystem`].
//!
//! ```
//! use mensura_core::UnitSystem;
//!
//! let newton = mensura_parse::parse(UnitSystem::si(), "kg m s-2").unwrap();
//! assert_eq!(newton, UnitSystem::si().unit_by_symbol("N").unwrap());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod lexer;
mod parse;
pub mod parser;
pub mod token;
pub mod transcode;

pub use error::{Error, Result, Status};
pub use parse::{parse, parse_bytes, Encoding};
