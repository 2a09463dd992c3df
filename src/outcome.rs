// SPDX-FileCopyrightText: 2026 Dilluti0n <hskimse1@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Result of one parse over untrusted bytes.
//!
//! Parsers are written against `Result<T, ParseError>` so `?` can
//! short-circuit, and hand a [`ParseOutcome`] to their callers.

use std::fmt;

/// Why a parse produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseError {
    /// More bytes are needed than are present. Expected when a message
    /// is split across segments.
    Incomplete,
    /// Bytes are present but violate the grammar.
    Malformed,
    /// Well-formed, but not what was asked for.
    NotApplicable,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseError::Incomplete    => "incomplete",
            ParseError::Malformed     => "malformed",
            ParseError::NotApplicable => "not applicable",
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseOutcome<T> {
    Ok(T),
    Incomplete,
    Malformed,
    NotApplicable,
}

impl<T> ParseOutcome<T> {
    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, ParseOutcome::Ok(_))
    }

    #[inline]
    pub fn ok(self) -> Option<T> {
        match self {
            ParseOutcome::Ok(v) => Some(v),
            _ => None,
        }
    }

    /// The failure kind, `None` for [`ParseOutcome::Ok`].
    #[inline]
    pub fn err(&self) -> Option<ParseError> {
        match self {
            ParseOutcome::Ok(_)          => None,
            ParseOutcome::Incomplete     => Some(ParseError::Incomplete),
            ParseOutcome::Malformed      => Some(ParseError::Malformed),
            ParseOutcome::NotApplicable  => Some(ParseError::NotApplicable),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ParseOutcome<U> {
        match self.into_result() {
            Ok(v) => ParseOutcome::Ok(f(v)),
            Err(e) => e.into(),
        }
    }

    pub fn and_then<U, F: FnOnce(T) -> ParseOutcome<U>>(self, f: F) -> ParseOutcome<U> {
        match self.into_result() {
            Ok(v) => f(v),
            Err(e) => e.into(),
        }
    }

    pub fn into_result(self) -> ParseResult<T> {
        match self {
            ParseOutcome::Ok(v)          => Ok(v),
            ParseOutcome::Incomplete     => Err(ParseError::Incomplete),
            ParseOutcome::Malformed      => Err(ParseError::Malformed),
            ParseOutcome::NotApplicable  => Err(ParseError::NotApplicable),
        }
    }
}

impl<T> From<ParseError> for ParseOutcome<T> {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Incomplete    => ParseOutcome::Incomplete,
            ParseError::Malformed     => ParseOutcome::Malformed,
            ParseError::NotApplicable => ParseOutcome::NotApplicable,
        }
    }
}

impl<T> From<ParseResult<T>> for ParseOutcome<T> {
    fn from(r: ParseResult<T>) -> Self {
        match r {
            Ok(v) => ParseOutcome::Ok(v),
            Err(e) => e.into(),
        }
    }
}

impl<T: fmt::Display> fmt::Display for ParseOutcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseOutcome::Ok(v)          => write!(f, "{v}"),
            ParseOutcome::Incomplete     => write!(f, "{}", ParseError::Incomplete),
            ParseOutcome::Malformed      => write!(f, "{}", ParseError::Malformed),
            ParseOutcome::NotApplicable  => write!(f, "{}", ParseError::NotApplicable),
        }
    }
}
