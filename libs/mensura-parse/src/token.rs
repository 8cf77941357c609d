//! Tokens produced by the specification lexer.

/// Token kinds with their semantic values.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Real(f64),
    /// An identifier; the payload is the exact lexeme.
    Id(String),
    /// `@` or one of the words `after`, `from`, `since`, `ref`.
    Shift,
    /// `-`, `.`, `*`, `·`, or a blank run between two operands.
    Multiply,
    /// `/`, or `per` surrounded by ASCII spaces.
    Divide,
    /// `^N`, `**N`, or a superscript digit run.
    Exponent(i32),
    /// A date, as seconds since 1970-01-01T00:00:00Z at UTC midnight.
    Date(f64),
    /// A time of day, as seconds since midnight.
    Clock(f64),
    /// A timezone offset in seconds, East positive.
    TzClock(f64),
    /// The `Z` UTC marker.
    Zulu,
    Gmt,
    Utc,
    /// `<log>(re`, carrying the logarithm base.
    Logref(f64),
    LParen,
    RParen,
    /// A lexical diagnostic; the payload is the user-facing explanation.
    Error(String),
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset of the first character of the lexeme.
    pub start: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize) -> Token {
        Token { kind, start }
    }
}
