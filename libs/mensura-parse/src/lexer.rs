//! Unit-specification lexer.
//!
//! Tokenization is context-sensitive in a few places: a blank run acts as a
//! multiplication only between two operands, word operators (`per`, `since`,
//! ...) are distinguished from identifiers by their surroundings, a sign
//! glues to a following digit run anywhere, and a timestamp sub-scanner
//! takes over on the right side of a shift operator when the parser signals
//! that the preceding product is a time quantity. Each parse constructs a
//! fresh lexer, so there is no cross-parse state.

use chrono::{Days, NaiveDate, NaiveTime};

use crate::token::{Token, TokenKind};

/// Blank characters inside a specification. Newline is deliberately absent:
/// an embedded newline is a syntax error. NBSP is an identifier character,
/// not a blank.
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\u{B}' | '\u{C}')
}

/// ASCII letters and underscore, plus the Latin-1 letter-like set.
fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic()
        || c == '_'
        || matches!(c, '\u{A0}' | '\u{AD}' | '\u{B0}' | '\u{B5}')
        || ('\u{C0}'..='\u{D6}').contains(&c)
        || ('\u{D8}'..='\u{F6}').contains(&c)
        || ('\u{F8}'..='\u{FF}').contains(&c)
}

fn is_id_continue(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

fn superscript_digit(c: char) -> Option<i64> {
    Some(match c {
        '\u{2070}' => 0,
        '\u{B9}' => 1,
        '\u{B2}' => 2,
        '\u{B3}' => 3,
        '\u{2074}' => 4,
        '\u{2075}' => 5,
        '\u{2076}' => 6,
        '\u{2077}' => 7,
        '\u{2078}' => 8,
        '\u{2079}' => 9,
        _ => return None,
    })
}

fn is_superscript(c: char) -> bool {
    superscript_digit(c).is_some() || matches!(c, '\u{207A}' | '\u{207B}')
}

fn digits_value(digits: &[char]) -> i64 {
    digits
        .iter()
        .fold(0, |acc, c| acc * 10 + (*c as i64 - '0' as i64))
}

/// Which phase of a timestamp the scanner is in.
#[derive(Clone, Copy, Debug, PartialEq)]
enum TimeScan {
    Off,
    Date,
    Clock,
    Zone,
}

pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    /// Whether the previous token can end an operand; a blank run after such
    /// a token and before another operand is a multiplication.
    prev_ends_operand: bool,
    /// Set while the most recent token is a word-form shift operator.
    shift_was_word: bool,
    scan: TimeScan,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            prev_ends_operand: false,
            shift_was_word: false,
            scan: TimeScan::Off,
        }
    }

    /// Character offset of the next unread character.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The input from character offset `from` to the end.
    pub fn text_from(&self, from: usize) -> String {
        self.chars[from.min(self.chars.len())..].iter().collect()
    }

    /// Called by the parser after it consumed a shift operator, with the
    /// time-context flag of the just-reduced product. Word-form shifts
    /// expect a timestamp on their right regardless of the flag.
    pub fn begin_shift_operand(&mut self, time_context: bool) {
        if time_context || self.shift_was_word {
            self.scan = TimeScan::Date;
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_blanks(&mut self) -> bool {
        let mut skipped = false;
        while matches!(self.current(), Some(c) if is_blank(c)) {
            skipped = true;
            self.advance();
        }
        skipped
    }

    fn token(&mut self, start: usize, kind: TokenKind) -> Token {
        self.prev_ends_operand = matches!(
            kind,
            TokenKind::Int(_)
                | TokenKind::Real(_)
                | TokenKind::Id(_)
                | TokenKind::Exponent(_)
                | TokenKind::RParen
        );
        self.shift_was_word = false;
        Token::new(kind, start)
    }

    /// Get the next token from the input.
    pub fn next_token(&mut self) -> Token {
        match self.scan {
            TimeScan::Date => return self.date_token(),
            TimeScan::Clock => return self.clock_token(),
            TimeScan::Zone => return self.zone_token(),
            TimeScan::Off => {}
        }

        let had_blank = self.skip_blanks();
        let start = self.position;
        let Some(c) = self.current() else {
            return self.token(start, TokenKind::Eof);
        };

        // Word operators come before the juxtaposition test so `m per s`
        // divides rather than multiplies.
        if is_id_start(c) {
            if let Some(token) = self.try_word_operator(start) {
                return token;
            }
        }

        // A blank run between two operands is a multiplication.
        if had_blank && self.prev_ends_operand && self.starts_operand(c) {
            return self.token(start, TokenKind::Multiply);
        }

        self.lex_primary(start, c)
    }

    fn starts_operand(&self, c: char) -> bool {
        if is_id_start(c) || c.is_ascii_digit() || matches!(c, '(' | '%' | '\'' | '"') {
            return true;
        }
        match c {
            '.' => matches!(self.peek_at(self.position + 1), Some(d) if d.is_ascii_digit()),
            '+' | '-' => {
                matches!(self.peek_at(self.position + 1), Some(d) if d.is_ascii_digit())
                    || (self.peek_at(self.position + 1) == Some('.')
                        && matches!(self.peek_at(self.position + 2), Some(d) if d.is_ascii_digit()))
            }
            _ => false,
        }
    }

    fn word_span(&self, from: usize) -> usize {
        let mut end = from;
        while matches!(self.peek_at(end), Some(c) if is_id_continue(c)) {
            end += 1;
        }
        end - from
    }

    /// Recognize `per` and the word shift operators. `per` needs an ASCII
    /// space on both sides; shift words need a blank or delimiter on the
    /// left (otherwise they read as identifiers).
    fn try_word_operator(&mut self, start: usize) -> Option<Token> {
        let len = self.word_span(start);
        let word: String = self.chars[start..start + len]
            .iter()
            .collect::<String>()
            .to_lowercase();
        match word.as_str() {
            "per" => {
                let spaced_left = start > 0 && self.chars[start - 1] == ' ';
                let spaced_right = self.peek_at(start + len) == Some(' ');
                if spaced_left && spaced_right {
                    self.position = start + len;
                    return Some(self.token(start, TokenKind::Divide));
                }
                None
            }
            "after" | "from" | "since" | "ref" => {
                let delimited = start == 0 || !is_id_continue(self.chars[start - 1]);
                if delimited {
                    self.position = start + len;
                    let token = self.token(start, TokenKind::Shift);
                    self.shift_was_word = true;
                    return Some(token);
                }
                None
            }
            _ => None,
        }
    }

    fn lex_primary(&mut self, start: usize, c: char) -> Token {
        match c {
            '(' => {
                self.advance();
                self.token(start, TokenKind::LParen)
            }
            ')' => {
                self.advance();
                self.token(start, TokenKind::RParen)
            }
            '@' => {
                self.advance();
                self.token(start, TokenKind::Shift)
            }
            '/' => {
                self.advance();
                self.token(start, TokenKind::Divide)
            }
            '*' => {
                self.advance();
                if self.current() == Some('*') {
                    self.advance();
                    self.exponent_digits(start, "**")
                } else {
                    self.token(start, TokenKind::Multiply)
                }
            }
            '^' => {
                self.advance();
                self.exponent_digits(start, "^")
            }
            '\u{B7}' => {
                self.advance();
                self.token(start, TokenKind::Multiply)
            }
            '%' | '\'' | '"' => {
                self.advance();
                self.token(start, TokenKind::Id(c.to_string()))
            }
            '+' | '-' => self.signed(start, c),
            '.' => {
                if matches!(self.peek_at(self.position + 1), Some(d) if d.is_ascii_digit()) {
                    self.number(start)
                } else {
                    self.advance();
                    self.token(start, TokenKind::Multiply)
                }
            }
            c if c.is_ascii_digit() => self.number(start),
            c if is_superscript(c) => self.superscript(start),
            c if is_id_start(c) => self.identifier(start),
            _ => {
                self.advance();
                self.token(start, TokenKind::Error(format!("unexpected character '{c}'")))
            }
        }
    }

    /// A sign glues to a following digit run (so `s-2` is `s` raised to -2),
    /// and to a forbidden `inf`/`nan` word; a bare `-` multiplies.
    fn signed(&mut self, start: usize, sign: char) -> Token {
        let next = self.peek_at(self.position + 1);
        if matches!(next, Some(d) if d.is_ascii_digit())
            || (next == Some('.')
                && matches!(self.peek_at(self.position + 2), Some(d) if d.is_ascii_digit()))
        {
            return self.number(start);
        }
        if matches!(next, Some(n) if n.is_ascii_alphabetic()) {
            if let Some(token) = self.forbidden_literal(start, 1) {
                return token;
            }
        }
        self.advance();
        if sign == '-' {
            self.token(start, TokenKind::Multiply)
        } else {
            self.token(start, TokenKind::Error("unexpected character '+'".into()))
        }
    }

    /// `NaN`, `Inf` and `Infinity` are rejected with a diagnostic instead of
    /// reading as identifiers.
    fn forbidden_literal(&mut self, start: usize, word_offset: usize) -> Option<Token> {
        let word_start = start + word_offset;
        let mut end = word_start;
        while matches!(self.peek_at(end), Some(c) if c.is_ascii_alphabetic()) {
            end += 1;
        }
        let word: String = self.chars[word_start..end].iter().collect();
        if matches!(
            word.to_ascii_lowercase().as_str(),
            "nan" | "inf" | "infinity"
        ) {
            let lexeme: String = self.chars[start..end].iter().collect();
            self.position = end;
            return Some(self.token(
                start,
                TokenKind::Error(format!("\"{lexeme}\" not allowed")),
            ));
        }
        None
    }

    fn identifier(&mut self, start: usize) -> Token {
        if let Some(token) = self.try_logref(start) {
            return token;
        }
        if let Some(token) = self.forbidden_literal(start, 0) {
            return token;
        }
        let mut end = start;
        while matches!(self.peek_at(end), Some(c) if is_id_continue(c)) {
            end += 1;
        }
        // A multi-character identifier cannot end in a digit; trailing
        // digits read as an exponent on it.
        while end > start + 1 && self.chars[end - 1].is_ascii_digit() {
            end -= 1;
        }
        let lexeme: String = self.chars[start..end].iter().collect();
        self.position = end;
        self.token(start, TokenKind::Id(lexeme))
    }

    /// The compound opening `<log> ( re [:]` of a logarithmic reference.
    /// The closing parenthesis is left for the grammar.
    fn try_logref(&mut self, start: usize) -> Option<Token> {
        const BASES: [(&str, f64); 4] = [
            ("log", 10.0),
            ("lg", 10.0),
            ("ln", std::f64::consts::E),
            ("lb", 2.0),
        ];
        for (word, base) in BASES {
            if !self.matches_at(start, word) {
                continue;
            }
            let mut i = start + word.len();
            while matches!(self.peek_at(i), Some(c) if is_blank(c)) {
                i += 1;
            }
            if self.peek_at(i) != Some('(') {
                continue;
            }
            i += 1;
            while matches!(self.peek_at(i), Some(c) if is_blank(c)) {
                i += 1;
            }
            if !matches!(self.peek_at(i), Some(c) if c.eq_ignore_ascii_case(&'r')) {
                continue;
            }
            if !matches!(self.peek_at(i + 1), Some(c) if c.eq_ignore_ascii_case(&'e')) {
                continue;
            }
            i += 2;
            if self.peek_at(i) == Some(':') {
                i += 1;
            }
            while matches!(self.peek_at(i), Some(c) if is_blank(c)) {
                i += 1;
            }
            self.position = i;
            return Some(self.token(start, TokenKind::Logref(base)));
        }
        None
    }

    fn matches_at(&self, at: usize, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(at + i) == Some(c))
    }

    fn number(&mut self, start: usize) -> Token {
        if matches!(self.current(), Some('+' | '-')) {
            self.advance();
        }
        while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let mut is_real = false;
        if self.current() == Some('.') {
            self.advance();
            is_real = true;
            while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.current(), Some('e' | 'E')) {
            let mut i = self.position + 1;
            if matches!(self.peek_at(i), Some('+' | '-')) {
                i += 1;
            }
            if matches!(self.peek_at(i), Some(c) if c.is_ascii_digit()) {
                is_real = true;
                self.position = i;
                while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }
        let lexeme: String = self.chars[start..self.position].iter().collect();
        if !is_real {
            if let Ok(v) = lexeme.parse::<i64>() {
                return self.token(start, TokenKind::Int(v));
            }
        }
        match lexeme.parse::<f64>() {
            Ok(v) if v.is_finite() => self.token(start, TokenKind::Real(v)),
            _ => self.token(start, TokenKind::Error(format!("\"{lexeme}\" not allowed"))),
        }
    }

    fn superscript(&mut self, start: usize) -> Token {
        let mut sign = 1i64;
        match self.current() {
            Some('\u{207A}') => self.advance(),
            Some('\u{207B}') => {
                sign = -1;
                self.advance();
            }
            _ => {}
        }
        let mut value = 0i64;
        let mut any = false;
        while let Some(d) = self.current().and_then(superscript_digit) {
            any = true;
            value = value * 10 + d;
            if value > i32::MAX as i64 {
                return self.token(start, TokenKind::Error("exponent out of range".into()));
            }
            self.advance();
        }
        if !any {
            return self.token(
                start,
                TokenKind::Error("missing digits in superscript exponent".into()),
            );
        }
        self.token(start, TokenKind::Exponent((sign * value) as i32))
    }

    fn exponent_digits(&mut self, start: usize, operator: &str) -> Token {
        let mut sign = 1i64;
        match self.current() {
            Some('+') => self.advance(),
            Some('-') => {
                sign = -1;
                self.advance();
            }
            _ => {}
        }
        let mut value = 0i64;
        let mut any = false;
        while let Some(d) = self.current().and_then(|c| c.to_digit(10)) {
            any = true;
            value = value * 10 + d as i64;
            if value > i32::MAX as i64 {
                return self.token(start, TokenKind::Error("exponent out of range".into()));
            }
            self.advance();
        }
        if !any {
            return self.token(
                start,
                TokenKind::Error(format!("missing exponent after '{operator}'")),
            );
        }
        self.token(start, TokenKind::Exponent((sign * value) as i32))
    }

    /// Scan a date on the right side of a shift operator. A digit run with a
    /// decimal point or exponent is still a plain real number; anything
    /// non-numeric falls back to ordinary scanning.
    fn date_token(&mut self) -> Token {
        self.skip_blanks();
        let start = self.position;
        let sign = match self.current() {
            Some('+') => {
                self.advance();
                1i64
            }
            Some('-') => {
                self.advance();
                -1i64
            }
            _ => 1,
        };
        let digits_start = self.position;
        while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let ndigits = self.position - digits_start;
        if ndigits == 0 {
            self.scan = TimeScan::Off;
            self.position = start;
            return self.next_token();
        }
        let exp_follows = matches!(self.current(), Some('e' | 'E'))
            && (matches!(self.peek_at(self.position + 1), Some(c) if c.is_ascii_digit())
                || (matches!(self.peek_at(self.position + 1), Some('+' | '-'))
                    && matches!(self.peek_at(self.position + 2), Some(c) if c.is_ascii_digit())));
        if self.current() == Some('.') || exp_follows {
            self.scan = TimeScan::Off;
            self.position = start;
            return self.number(start);
        }

        let digits: Vec<char> = self.chars[digits_start..self.position].to_vec();
        let year;
        let mut month: Option<i64> = None;
        let mut day: Option<i64> = None;
        if ndigits <= 4 {
            year = sign * digits_value(&digits);
            if self.current() == Some('-')
                && matches!(self.peek_at(self.position + 1), Some(c) if c.is_ascii_digit())
            {
                self.advance();
                month = Some(self.take_digits(2));
                if self.current() == Some('-')
                    && matches!(self.peek_at(self.position + 1), Some(c) if c.is_ascii_digit())
                {
                    self.advance();
                    day = Some(self.take_digits(2));
                }
            }
        } else {
            // packed: YYYYM, YYYYMM, YYYYMMD, YYYYMMDD
            match ndigits {
                5 => {
                    year = sign * digits_value(&digits[..4]);
                    month = Some(digits_value(&digits[4..]));
                }
                6 => {
                    year = sign * digits_value(&digits[..4]);
                    month = Some(digits_value(&digits[4..]));
                }
                7 => {
                    year = sign * digits_value(&digits[..4]);
                    month = Some(digits_value(&digits[4..6]));
                    day = Some(digits_value(&digits[6..]));
                }
                8 => {
                    year = sign * digits_value(&digits[..4]);
                    month = Some(digits_value(&digits[4..6]));
                    day = Some(digits_value(&digits[6..]));
                }
                _ => {
                    self.scan = TimeScan::Off;
                    let lexeme: String = self.chars[start..self.position].iter().collect();
                    return self.token(
                        start,
                        TokenKind::Error(format!("invalid date \"{lexeme}\"")),
                    );
                }
            }
        }

        let month = month.unwrap_or(1);
        let day = day.unwrap_or(1);
        self.scan = TimeScan::Off;
        if !(1..=12).contains(&month) {
            return self.token(
                start,
                TokenKind::Error(format!("month {month} is out of range")),
            );
        }
        if !(1..=31).contains(&day) {
            return self.token(
                start,
                TokenKind::Error(format!("day {day} is out of range")),
            );
        }
        // Year 0 normalizes to year 1; days beyond a month's end overflow
        // into the next month.
        let year = if year == 0 { 1 } else { year };
        let Some(first) = NaiveDate::from_ymd_opt(year as i32, month as u32, 1) else {
            return self.token(start, TokenKind::Error(format!("year {year} is out of range")));
        };
        let Some(date) = first.checked_add_days(Days::new((day - 1) as u64)) else {
            return self.token(start, TokenKind::Error(format!("day {day} is out of range")));
        };
        let seconds = date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64;

        // The separator before an optional clock, `T` or blanks, belongs to
        // the date token.
        if self.current() == Some('T') {
            self.advance();
        } else {
            self.skip_blanks();
        }
        self.scan = TimeScan::Clock;
        self.token(start, TokenKind::Date(seconds))
    }

    fn clock_token(&mut self) -> Token {
        let start = self.position;
        match self.current() {
            None => {
                self.scan = TimeScan::Off;
                self.token(start, TokenKind::Eof)
            }
            Some('Z' | 'z') => {
                self.advance();
                self.scan = TimeScan::Off;
                self.token(start, TokenKind::Zulu)
            }
            Some(c) if c.is_ascii_digit() => self.clock_value(start),
            Some('+' | '-') => {
                self.scan = TimeScan::Zone;
                self.zone_token()
            }
            Some(_) => {
                self.scan = TimeScan::Off;
                self.next_token()
            }
        }
    }

    fn clock_value(&mut self, start: usize) -> Token {
        let digits_start = self.position;
        while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let digits: Vec<char> = self.chars[digits_start..self.position].to_vec();
        let hour;
        let minute;
        let mut second;
        if self.current() == Some(':') {
            hour = digits_value(&digits);
            self.advance();
            minute = self.take_digits(2);
            if self.current() == Some(':') {
                self.advance();
                second = self.take_digits(2) as f64;
                second += self.take_fraction();
            } else {
                second = 0.0;
            }
        } else {
            // packed, by length: H, HH, HHM, HHMM, HHMMS, HHMMSS
            match digits.len() {
                1 | 2 => {
                    hour = digits_value(&digits);
                    minute = 0;
                    second = 0.0;
                }
                3 => {
                    hour = digits_value(&digits[..2]);
                    minute = digits_value(&digits[2..]);
                    second = 0.0;
                }
                4 => {
                    hour = digits_value(&digits[..2]);
                    minute = digits_value(&digits[2..]);
                    second = 0.0;
                }
                5 | 6 => {
                    hour = digits_value(&digits[..2]);
                    minute = digits_value(&digits[2..4]);
                    second = digits_value(&digits[4..]) as f64;
                    second += self.take_fraction();
                }
                _ => {
                    self.scan = TimeScan::Off;
                    let lexeme: String = self.chars[start..self.position].iter().collect();
                    return self.token(
                        start,
                        TokenKind::Error(format!("invalid clock \"{lexeme}\"")),
                    );
                }
            }
        }
        if !(0..=23).contains(&hour) {
            self.scan = TimeScan::Off;
            return self.token(
                start,
                TokenKind::Error(format!("hour {hour} is out of range")),
            );
        }
        if !(0..=59).contains(&minute) {
            self.scan = TimeScan::Off;
            return self.token(
                start,
                TokenKind::Error(format!("minute {minute} is out of range")),
            );
        }
        // 60 is only the leap second at 23:59:60; anything above is invalid
        if second > 60.0 || (second == 60.0 && !(hour == 23 && minute == 59)) {
            self.scan = TimeScan::Off;
            return self.token(
                start,
                TokenKind::Error(format!("second {second} is out of range")),
            );
        }
        self.scan = TimeScan::Zone;
        self.token(
            start,
            TokenKind::Clock((hour * 3600 + minute * 60) as f64 + second),
        )
    }

    fn zone_token(&mut self) -> Token {
        self.skip_blanks();
        let start = self.position;
        self.scan = TimeScan::Off;
        match self.current() {
            None => self.token(start, TokenKind::Eof),
            Some('Z' | 'z') => {
                self.advance();
                self.token(start, TokenKind::Zulu)
            }
            Some('+' | '-') => self.zone_offset(start),
            Some(c) if c.is_ascii_alphabetic() => {
                let len = self.word_span(start);
                let word: String = self.chars[start..start + len]
                    .iter()
                    .collect::<String>()
                    .to_ascii_uppercase();
                match word.as_str() {
                    "GMT" => {
                        self.position = start + len;
                        self.token(start, TokenKind::Gmt)
                    }
                    "UTC" => {
                        self.position = start + len;
                        self.token(start, TokenKind::Utc)
                    }
                    _ => self.next_token(),
                }
            }
            Some(_) => self.next_token(),
        }
    }

    fn zone_offset(&mut self, start: usize) -> Token {
        let negative = self.current() == Some('-');
        self.advance();
        let digits_start = self.position;
        while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let digits: Vec<char> = self.chars[digits_start..self.position].to_vec();
        let hour;
        let minute;
        if self.current() == Some(':')
            && (1..=2).contains(&digits.len())
            && matches!(self.peek_at(self.position + 1), Some(c) if c.is_ascii_digit())
        {
            hour = digits_value(&digits);
            self.advance();
            minute = self.take_digits(2);
        } else {
            // packed, by length: H, HH, HHM, HHMM
            match digits.len() {
                1 | 2 => {
                    hour = digits_value(&digits);
                    minute = 0;
                }
                3 | 4 => {
                    hour = digits_value(&digits[..2]);
                    minute = digits_value(&digits[2..]);
                }
                _ => {
                    let lexeme: String = self.chars[start..self.position].iter().collect();
                    return self.token(
                        start,
                        TokenKind::Error(format!("invalid timezone \"{lexeme}\"")),
                    );
                }
            }
        }
        if hour > 14 || minute > 59 {
            return self.token(
                start,
                TokenKind::Error("timezone offset is out of range".into()),
            );
        }
        if negative && hour == 0 && minute == 0 {
            return self.token(
                start,
                TokenKind::Error("timezone \"-00:00\" not allowed".into()),
            );
        }
        let offset = (hour * 3600 + minute * 60) as f64;
        self.token(
            start,
            TokenKind::TzClock(if negative { -offset } else { offset }),
        )
    }

    fn take_digits(&mut self, max: usize) -> i64 {
        let mut value = 0i64;
        let mut taken = 0;
        while taken < max {
            let Some(d) = self.current().and_then(|c| c.to_digit(10)) else {
                break;
            };
            value = value * 10 + d as i64;
            self.advance();
            taken += 1;
        }
        value
    }

    fn take_fraction(&mut self) -> f64 {
        if self.current() != Some('.')
            || !matches!(self.peek_at(self.position + 1), Some(c) if c.is_ascii_digit())
        {
            return 0.0;
        }
        self.advance();
        let mut value = 0.0;
        let mut scale = 0.1;
        while let Some(d) = self.current().and_then(|c| c.to_digit(10)) {
            value += d as f64 * scale;
            scale /= 10.0;
            self.advance();
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(input);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = matches!(token.kind, TokenKind::Eof | TokenKind::Error(_));
            kinds.push(token.kind);
            if done {
                break;
            }
        }
        kinds
    }

    #[test]
    fn blanks_multiply_between_operands() {
        assert_eq!(
            tokenize("kg m"),
            vec![
                TokenKind::Id("kg".into()),
                TokenKind::Multiply,
                TokenKind::Id("m".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn sign_glues_to_digits_after_identifier() {
        assert_eq!(
            tokenize("s-2"),
            vec![TokenKind::Id("s".into()), TokenKind::Int(-2), TokenKind::Eof]
        );
        assert_eq!(
            tokenize("kg-m"),
            vec![
                TokenKind::Id("kg".into()),
                TokenKind::Multiply,
                TokenKind::Id("m".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn trailing_digits_split_off_identifiers() {
        assert_eq!(
            tokenize("m2"),
            vec![TokenKind::Id("m".into()), TokenKind::Int(2), TokenKind::Eof]
        );
    }

    #[test]
    fn explicit_multiplication_forms() {
        for input in ["kg*m", "kg.m", "kg\u{B7}m", "kg-m"] {
            assert_eq!(
                tokenize(input),
                vec![
                    TokenKind::Id("kg".into()),
                    TokenKind::Multiply,
                    TokenKind::Id("m".into()),
                    TokenKind::Eof,
                ],
                "for {input:?}"
            );
        }
    }

    #[test]
    fn per_needs_spaces_on_both_sides() {
        assert_eq!(
            tokenize("m per s"),
            vec![
                TokenKind::Id("m".into()),
                TokenKind::Divide,
                TokenKind::Id("s".into()),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            tokenize("mPer"),
            vec![TokenKind::Id("mPer".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn exponent_forms() {
        assert_eq!(
            tokenize("m^2"),
            vec![TokenKind::Id("m".into()), TokenKind::Exponent(2), TokenKind::Eof]
        );
        assert_eq!(
            tokenize("m**-2"),
            vec![TokenKind::Id("m".into()), TokenKind::Exponent(-2), TokenKind::Eof]
        );
        assert_eq!(
            tokenize("m\u{B2}"),
            vec![TokenKind::Id("m".into()), TokenKind::Exponent(2), TokenKind::Eof]
        );
        assert_eq!(
            tokenize("s\u{207B}\u{B9}"),
            vec![TokenKind::Id("s".into()), TokenKind::Exponent(-1), TokenKind::Eof]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(tokenize("42"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(tokenize("-3"), vec![TokenKind::Int(-3), TokenKind::Eof]);
        assert_eq!(
            tokenize("2.5e3"),
            vec![TokenKind::Real(2500.0), TokenKind::Eof]
        );
        assert_eq!(tokenize(".5"), vec![TokenKind::Real(0.5), TokenKind::Eof]);
        assert_eq!(tokenize("2e3"), vec![TokenKind::Real(2000.0), TokenKind::Eof]);
    }

    #[test]
    fn forbidden_numeric_literals() {
        for input in ["nan", "NaN", "+inf", "Infinity", "-INF"] {
            let kinds = tokenize(input);
            match kinds.last() {
                Some(TokenKind::Error(message)) => {
                    assert!(message.contains("not allowed"), "for {input:?}: {message}")
                }
                other => panic!("expected error token for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn log_reference_opening() {
        assert_eq!(
            tokenize("lg(re 1 mW)"),
            vec![
                TokenKind::Logref(10.0),
                TokenKind::Int(1),
                TokenKind::Multiply,
                TokenKind::Id("mW".into()),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
        // without the `(re` tail, `lg` is an ordinary identifier
        assert_eq!(
            tokenize("lg"),
            vec![TokenKind::Id("lg".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn latin1_letters_are_identifier_characters() {
        assert_eq!(
            tokenize("\u{B5}m"),
            vec![TokenKind::Id("\u{B5}m".into()), TokenKind::Eof]
        );
        assert_eq!(
            tokenize("\u{B0}C"),
            vec![TokenKind::Id("\u{B0}C".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn shift_words_need_a_left_boundary() {
        assert_eq!(
            tokenize("m since"),
            vec![TokenKind::Id("m".into()), TokenKind::Shift, TokenKind::Eof]
        );
        assert_eq!(
            tokenize("msince"),
            vec![TokenKind::Id("msince".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn word_shift_scans_a_full_timestamp() {
        let mut lexer = Lexer::new("s since 2000-01-01T12:30:00Z");
        assert_eq!(lexer.next_token().kind, TokenKind::Id("s".into()));
        assert_eq!(lexer.next_token().kind, TokenKind::Shift);
        lexer.begin_shift_operand(true);
        assert_eq!(lexer.next_token().kind, TokenKind::Date(946_684_800.0));
        assert_eq!(lexer.next_token().kind, TokenKind::Clock(45_000.0));
        assert_eq!(lexer.next_token().kind, TokenKind::Zulu);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn packed_date_and_clock() {
        let mut lexer = Lexer::new("@ 20231225 1430");
        assert_eq!(lexer.next_token().kind, TokenKind::Shift);
        lexer.begin_shift_operand(true);
        match lexer.next_token().kind {
            TokenKind::Date(_) => {}
            other => panic!("expected date, got {other:?}"),
        }
        assert_eq!(
            lexer.next_token().kind,
            TokenKind::Clock((14 * 3600 + 30 * 60) as f64)
        );
    }

    #[test]
    fn numeric_offset_stays_numeric_without_time_context() {
        let mut lexer = Lexer::new("\u{B0}C @ 273.15");
        assert_eq!(lexer.next_token().kind, TokenKind::Id("\u{B0}C".into()));
        assert_eq!(lexer.next_token().kind, TokenKind::Shift);
        lexer.begin_shift_operand(false);
        assert_eq!(lexer.next_token().kind, TokenKind::Real(273.15));
    }

    #[test]
    fn date_with_decimal_point_is_a_real() {
        let mut lexer = Lexer::new("since 273.15");
        assert_eq!(lexer.next_token().kind, TokenKind::Shift);
        lexer.begin_shift_operand(false);
        assert_eq!(lexer.next_token().kind, TokenKind::Real(273.15));
    }

    #[test]
    fn leap_second_rules() {
        let mut lexer = Lexer::new("since 2000-01-01 23:59:60");
        lexer.next_token();
        lexer.begin_shift_operand(true);
        lexer.next_token();
        assert_eq!(lexer.next_token().kind, TokenKind::Clock(86_400.0));

        let mut lexer = Lexer::new("since 2000-01-01 12:00:60");
        lexer.next_token();
        lexer.begin_shift_operand(true);
        lexer.next_token();
        match lexer.next_token().kind {
            TokenKind::Error(message) => assert!(message.contains("out of range")),
            other => panic!("expected error token, got {other:?}"),
        }
    }

    #[test]
    fn negative_zero_timezone_is_rejected() {
        let mut lexer = Lexer::new("since 2000-01-01 00:00 -00:00");
        lexer.next_token();
        lexer.begin_shift_operand(true);
        lexer.next_token();
        lexer.next_token();
        match lexer.next_token().kind {
            TokenKind::Error(message) => assert!(message.contains("-00:00")),
            other => panic!("expected error token, got {other:?}"),
        }
    }

    #[test]
    fn day_overflow_spills_into_next_month() {
        let mut a = Lexer::new("since 1999-02-29");
        a.next_token();
        a.begin_shift_operand(true);
        let overflowed = a.next_token().kind;

        let mut b = Lexer::new("since 1999-03-01");
        b.next_token();
        b.begin_shift_operand(true);
        assert_eq!(overflowed, b.next_token().kind);
    }
}
