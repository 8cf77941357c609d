//! Grammar-directed assembly of unit expressions.
//!
//! Recursive descent over the token stream. Precedence (lowest to highest):
//! 1. shift (`@`, `since`, ...)
//! 2. product (explicit or juxtaposed multiplication, division)
//! 3. power (trailing integer, `^`, `**`, superscripts)
//! 4. basic (identifier, number, parenthesized expression, log reference)
//!
//! The parser feeds the lexer a time-context flag when it consumes a shift
//! operator, so digit runs on the right side can scan as dates. All state
//! lives in this per-parse value; parses are independent of each other.

use mensura_core::{Unit, UnitSystem};

use crate::error::{Error, Result};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

pub struct Parser<'s> {
    lexer: Lexer,
    system: &'s UnitSystem,
    /// `second` as registered in the system; when absent, no product is ever
    /// a time quantity and timestamps cannot appear.
    second: Option<Unit>,
    current: Token,
}

impl<'s> Parser<'s> {
    pub fn new(system: &'s UnitSystem, input: &str) -> Parser<'s> {
        Parser {
            lexer: Lexer::new(input),
            system,
            second: system.second(),
            current: Token::new(TokenKind::Eof, 0),
        }
    }

    fn advance(&mut self) -> Result<()> {
        let token = self.lexer.next_token();
        if let TokenKind::Error(message) = token.kind {
            return Err(Error::Syntax(message));
        }
        self.current = token;
        Ok(())
    }

    /// Parse a complete specification. The driver checks for residual input
    /// afterwards via [`Parser::remainder`].
    pub fn parse(&mut self) -> Result<Unit> {
        self.advance()?;
        if matches!(self.current.kind, TokenKind::Eof) {
            return Ok(Unit::one());
        }
        self.parse_shift()
    }

    /// Residual input after a successful parse, if any. A single trailing
    /// `)` was consumed as lookahead and counts as parsed.
    pub fn remainder(&self) -> Option<String> {
        let from = match self.current.kind {
            TokenKind::Eof => return None,
            TokenKind::RParen => self.lexer.position(),
            _ => self.current.start,
        };
        let tail = self.lexer.text_from(from);
        if tail.is_empty() {
            None
        } else {
            Some(tail)
        }
    }

    fn parse_shift(&mut self) -> Result<Unit> {
        let unit = self.parse_product()?;
        if !matches!(self.current.kind, TokenKind::Shift) {
            return Ok(unit);
        }
        let is_time = self
            .second
            .as_ref()
            .is_some_and(|second| unit.convertible_to(second));
        self.lexer.begin_shift_operand(is_time);
        self.advance()?;
        match self.current.kind {
            TokenKind::Int(n) => {
                self.advance()?;
                Ok(unit.offset(n as f64))
            }
            TokenKind::Real(amount) => {
                self.advance()?;
                Ok(unit.offset(amount))
            }
            TokenKind::Date(date) => {
                let origin = self.parse_timestamp(date)?;
                if !is_time {
                    return Err(Error::Syntax(
                        "origin timestamps apply only to time units".into(),
                    ));
                }
                Ok(unit.offset_by_time(origin))
            }
            _ => Err(Error::Syntax(
                "expected a number or timestamp after shift operator".into(),
            )),
        }
    }

    /// `DATE [CLOCK [TZ|Z|GMT|UTC]] | DATE Z`, folded into epoch seconds.
    fn parse_timestamp(&mut self, date: f64) -> Result<f64> {
        self.advance()?;
        match self.current.kind {
            TokenKind::Clock(clock) => {
                self.advance()?;
                match self.current.kind {
                    TokenKind::TzClock(zone) => {
                        self.advance()?;
                        Ok(date + (clock - zone))
                    }
                    TokenKind::Zulu | TokenKind::Gmt | TokenKind::Utc => {
                        self.advance()?;
                        Ok(date + clock)
                    }
                    _ => Ok(date + clock),
                }
            }
            TokenKind::Zulu => {
                self.advance()?;
                Ok(date)
            }
            _ => Ok(date),
        }
    }

    fn parse_product(&mut self) -> Result<Unit> {
        let mut unit = self.parse_power()?;
        loop {
            match self.current.kind {
                TokenKind::Multiply => {
                    self.advance()?;
                    let rhs = self.parse_power()?;
                    unit = unit.multiply(&rhs)?;
                }
                TokenKind::Divide => {
                    self.advance()?;
                    let rhs = self.parse_power()?;
                    unit = unit.divide(&rhs)?;
                }
                // juxtaposition: two adjacent basics multiply
                TokenKind::Id(_)
                | TokenKind::Int(_)
                | TokenKind::Real(_)
                | TokenKind::LParen
                | TokenKind::Logref(_) => {
                    let rhs = self.parse_power()?;
                    unit = unit.multiply(&rhs)?;
                }
                _ => return Ok(unit),
            }
        }
    }

    fn parse_power(&mut self) -> Result<Unit> {
        let unit = self.parse_basic()?;
        match self.current.kind {
            // a bare integer directly after a basic is its exponent
            TokenKind::Int(n) => {
                let exponent = i32::try_from(n)
                    .map_err(|_| Error::Syntax(format!("exponent {n} is out of range")))?;
                self.advance()?;
                Ok(unit.raise(exponent)?)
            }
            TokenKind::Exponent(n) => {
                self.advance()?;
                Ok(unit.raise(n)?)
            }
            _ => Ok(unit),
        }
    }

    fn parse_basic(&mut self) -> Result<Unit> {
        match &self.current.kind {
            TokenKind::Id(name) => {
                let name = name.clone();
                self.advance()?;
                self.resolve(&name)
            }
            TokenKind::Int(n) => {
                let n = *n;
                self.advance()?;
                Ok(Unit::one().scale(n as f64))
            }
            TokenKind::Real(r) => {
                let r = *r;
                self.advance()?;
                Ok(Unit::one().scale(r))
            }
            TokenKind::LParen => {
                self.advance()?;
                let unit = self.parse_shift()?;
                self.expect_rparen()?;
                Ok(unit)
            }
            TokenKind::Logref(base) => {
                let base = *base;
                self.advance()?;
                let reference = self.parse_product()?;
                self.expect_rparen()?;
                Ok(Unit::log(base, reference))
            }
            _ => Err(Error::Syntax(
                "expected a unit, number or parenthesized expression".into(),
            )),
        }
    }

    fn expect_rparen(&mut self) -> Result<()> {
        if matches!(self.current.kind, TokenKind::RParen) {
            self.advance()?;
            Ok(())
        } else {
            Err(Error::Syntax("expected ')'".into()))
        }
    }

    /// Resolve an identifier against the system's tables, peeling prefixes
    /// off the left end. Name prefixes may stack; at most one symbol prefix
    /// is consumed in total.
    fn resolve(&self, identifier: &str) -> Result<Unit> {
        let mut rest = identifier;
        let mut factor = 1.0;
        let mut symbol_prefix_seen = false;
        loop {
            if let Some(unit) = self.system.unit_by_name(rest) {
                return Ok(unit.scale(factor));
            }
            if let Some(unit) = self.system.unit_by_symbol(rest) {
                return Ok(unit.scale(factor));
            }
            if let Some((value, len)) = self.system.prefix_by_name(rest) {
                factor *= value;
                rest = &rest[len..];
                continue;
            }
            if !symbol_prefix_seen {
                if let Some((value, len)) = self.system.prefix_by_symbol(rest) {
                    symbol_prefix_seen = true;
                    factor *= value;
                    rest = &rest[len..];
                    continue;
                }
            }
            return Err(Error::Unknown(identifier.to_string()));
        }
    }
}
