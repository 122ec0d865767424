use crate::libjqs::error::CorruptFileError;
use log::warn;
use std::fmt::{Display, Write as _};
use std::io::{self, Write};
use std::iter::{Filter, Peekable};
use std::str::{FromStr, Split};

/// Field delimiter (ASCII unit separator).
pub const DELIM: char = '\u{1F}';
/// Stands in for an empty field, which would otherwise vanish between two delimiters.
pub const EMPTY_FIELD: char = '\u{06}';

const DELIM_STR: &str = "\u{1F}";
const EMPTY_FIELD_STR: &str = "\u{06}";

fn is_reserved(c: char) -> bool {
    c == DELIM || c == EMPTY_FIELD
}

pub(crate) struct TokenWriter<W: Write> {
    out: W,
}

impl<W: Write> TokenWriter<W> {
    pub fn new(out: W) -> Self {
        TokenWriter { out }
    }

    fn raw(&mut self, token: &str) -> io::Result<()> {
        self.out.write_all(token.as_bytes())?;
        self.out.write_all(DELIM_STR.as_bytes())
    }

    /// Free text. Reserved characters become spaces so character offsets
    /// into the text stay valid.
    pub fn text(&mut self, field: &'static str, value: &str) -> io::Result<()> {
        if value.is_empty() {
            return self.raw(EMPTY_FIELD_STR);
        }
        if value.contains(is_reserved) {
            warn!("[Codec] Replacing reserved characters in {field}.");
            let cleaned: String = value
                .chars()
                .map(|c| if is_reserved(c) { ' ' } else { c })
                .collect();
            return self.raw(&cleaned);
        }
        self.raw(value)
    }

    pub fn flag(&mut self, value: bool) -> io::Result<()> {
        self.raw(if value { "T" } else { "F" })
    }

    pub fn number(&mut self, value: impl Display) -> io::Result<()> {
        self.raw(&value.to_string())
    }

    /// Comma-terminated decimal pixels.
    pub fn pixels(&mut self, pixels: &[i32]) -> io::Result<()> {
        if pixels.is_empty() {
            return self.raw(EMPTY_FIELD_STR);
        }
        let mut csv = String::with_capacity(pixels.len() * 9);
        for px in pixels {
            // Writing to a String cannot fail.
            let _ = write!(csv, "{px},");
        }
        self.raw(&csv)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

type NonEmpty<'a> = Filter<Split<'a, char>, fn(&&'a str) -> bool>;

fn non_empty(token: &&str) -> bool {
    !token.is_empty()
}

/// Tokens of a payload. Delimiters are dropped, and so are empty tokens:
/// files from older writers carry doubled delimiters after the answer and
/// correct-index lists.
pub(crate) struct Tokens<'a> {
    inner: Peekable<NonEmpty<'a>>,
    read: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(payload: &'a str) -> Self {
        let filter: fn(&&'a str) -> bool = non_empty;
        Tokens {
            inner: payload.split(DELIM).filter(filter).peekable(),
            read: 0,
        }
    }

    pub fn is_exhausted(&mut self) -> bool {
        self.inner.peek().is_none()
    }

    /// How many tokens have been consumed so far.
    pub fn position(&self) -> usize {
        self.read
    }

    pub fn raw(&mut self, expected: &'static str) -> Result<&'a str, CorruptFileError> {
        let token = self
            .inner
            .next()
            .ok_or(CorruptFileError::UnexpectedEnd { expected })?;
        self.read += 1;
        Ok(token)
    }

    pub fn text(&mut self, expected: &'static str) -> Result<String, CorruptFileError> {
        let token = self.raw(expected)?;
        Ok(if is_empty_field(token) {
            String::new()
        } else {
            token.to_string()
        })
    }

    /// `T` (either case) is true, anything else false.
    pub fn flag(&mut self, expected: &'static str) -> Result<bool, CorruptFileError> {
        Ok(self.raw(expected)?.eq_ignore_ascii_case("T"))
    }

    pub fn number<T: FromStr>(&mut self, field: &'static str) -> Result<T, CorruptFileError> {
        let token = self.raw(field)?;
        parse_number(field, token)
    }
}

pub(crate) fn is_empty_field(token: &str) -> bool {
    token == EMPTY_FIELD_STR
}

pub(crate) fn parse_number<T: FromStr>(field: &'static str, token: &str) -> Result<T, CorruptFileError> {
    token.parse().map_err(|_| CorruptFileError::InvalidNumber {
        field,
        token: token.to_string(),
    })
}
