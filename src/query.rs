//! A small text protocol for driving an [`OSAvlSet`] from a stream of queries.
//!
//! Input is a sequence of `<opcode> <integer>` pairs separated by any whitespace:
//!
//! - `k <key>` inserts `key`; a key that is already present is ignored.
//! - `m <index>` writes the key at one-based position `index`, followed by a space.
//! - `n <key>` writes the number of keys less than `key`, followed by a space.
//!
//! The opcode is a single character and the operand may follow it directly
//! (`k5` is the same as `k 5`). Processing stops at the first malformed or failing
//! query; output written up to that point is kept.
//!
//! # Examples
//!
//! ```
//! use osavl_tree::OSAvlSet;
//! use osavl_tree::query;
//!
//! let mut set = OSAvlSet::new();
//! let mut output = String::new();
//! query::run("k 8 k 2 k -1 m 1 m 2 n 3", &mut set, &mut output).unwrap();
//! assert_eq!(output, "-1 2 2 ");
//! ```

use alloc::string::{String, ToString};
use core::fmt::{self, Write};
use core::iter::FusedIterator;
use core::str::FromStr;

use crate::{Error, OSAvlSet};

/// A single parsed query.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Query {
    /// `k <key>`
    Insert(i64),
    /// `m <index>`
    Select(usize),
    /// `n <key>`
    CountLessThan(i64),
}

/// Errors that stop a query stream.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum QueryError {
    /// The opcode is not one of `k`, `m` or `n`.
    UnknownOpcode(char),
    /// The input ended right after the given opcode.
    MissingOperand(char),
    /// The operand text is not an integer of the expected type.
    InvalidOperand(String),
    /// The set rejected the query.
    Tree(Error),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::UnknownOpcode(opcode) => write!(f, "invalid query: '{opcode}'"),
            QueryError::MissingOperand(opcode) => write!(f, "missing operand for query '{opcode}'"),
            QueryError::InvalidOperand(text) => write!(f, "invalid operand: '{text}'"),
            QueryError::Tree(error) => write!(f, "query failed: {error}"),
        }
    }
}

impl core::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            QueryError::Tree(error) => Some(error),
            _ => None,
        }
    }
}

impl From<Error> for QueryError {
    fn from(error: Error) -> Self {
        QueryError::Tree(error)
    }
}

/// An iterator over the queries in a piece of text.
///
/// This `struct` is created by [`parse`]. After yielding an error it yields nothing.
#[must_use = "iterators are lazy and do nothing unless consumed"]
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    rest: &'a str,
    failed: bool,
}

/// Parses `input` lazily into queries.
///
/// # Examples
///
/// ```
/// use osavl_tree::query::{self, Query, QueryError};
///
/// let queries: Vec<_> = query::parse("k 1\nm1 x 2").collect();
/// assert_eq!(
///     queries,
///     [Ok(Query::Insert(1)), Ok(Query::Select(1)), Err(QueryError::UnknownOpcode('x'))]
/// );
/// ```
pub fn parse(input: &str) -> Parser<'_> {
    Parser { rest: input, failed: false }
}

impl Parser<'_> {
    fn operand<N: FromStr>(&mut self, opcode: char) -> Result<N, QueryError> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() {
            return Err(QueryError::MissingOperand(opcode));
        }

        // An optional sign followed by decimal digits; anything after that starts the
        // next query.
        let bytes = self.rest.as_bytes();
        let digits_from = usize::from(matches!(bytes[0], b'+' | b'-'));
        let end = bytes[digits_from..]
            .iter()
            .position(|byte| !byte.is_ascii_digit())
            .map_or(bytes.len(), |offset| digits_from + offset);

        if end == digits_from {
            let token = self.rest.split_whitespace().next().unwrap_or_default();
            return Err(QueryError::InvalidOperand(token.to_string()));
        }

        let (text, rest) = self.rest.split_at(end);
        self.rest = rest;
        text.parse().map_err(|_| QueryError::InvalidOperand(text.to_string()))
    }

    fn next_query(&mut self) -> Option<Result<Query, QueryError>> {
        self.rest = self.rest.trim_start();
        let mut chars = self.rest.chars();
        let opcode = chars.next()?;
        self.rest = chars.as_str();

        let query = match opcode {
            'k' => self.operand(opcode).map(Query::Insert),
            'm' => self.operand(opcode).map(Query::Select),
            'n' => self.operand(opcode).map(Query::CountLessThan),
            _ => Err(QueryError::UnknownOpcode(opcode)),
        };
        Some(query)
    }
}

impl Iterator for Parser<'_> {
    type Item = Result<Query, QueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let query = self.next_query()?;
        self.failed = query.is_err();
        Some(query)
    }
}

impl FusedIterator for Parser<'_> {}

/// Applies one query to `set`, appending its output token to `output`.
///
/// # Errors
///
/// Returns [`QueryError::Tree`] when a select index is out of range.
pub fn execute(query: Query, set: &mut OSAvlSet<i64>, output: &mut String) -> Result<(), QueryError> {
    match query {
        Query::Insert(key) => {
            // Repeated keys are part of normal query streams.
            let _ = set.insert(key);
        }
        Query::Select(index) => {
            let key = set.select(index)?;
            let _ = write!(output, "{key} ");
        }
        Query::CountLessThan(key) => {
            let _ = write!(output, "{} ", set.count_less_than(&key));
        }
    }
    Ok(())
}

/// Parses and executes every query in `input`, in order.
///
/// # Errors
///
/// Returns the first parse or execution error. Queries before it have already been
/// applied and their output is in `output`.
pub fn run(input: &str, set: &mut OSAvlSet<i64>, output: &mut String) -> Result<(), QueryError> {
    for query in parse(input) {
        execute(query?, set, output)?;
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn collect(input: &str) -> Vec<Result<Query, QueryError>> {
        parse(input).collect()
    }

    #[test]
    fn parses_signed_and_glued_operands() {
        assert_eq!(
            collect("k-5 k +7\n\tn10m2"),
            [
                Ok(Query::Insert(-5)),
                Ok(Query::Insert(7)),
                Ok(Query::CountLessThan(10)),
                Ok(Query::Select(2)),
            ]
        );
        assert!(collect("   \n").is_empty());
    }

    #[test]
    fn stops_after_first_error() {
        assert_eq!(collect("q 1 k 2"), [Err(QueryError::UnknownOpcode('q'))]);
        assert_eq!(collect("k 1 m"), [Ok(Query::Insert(1)), Err(QueryError::MissingOperand('m'))]);
        assert_eq!(collect("k abc k 2"), [Err(QueryError::InvalidOperand("abc".into()))]);
        assert_eq!(collect("m -1"), [Err(QueryError::InvalidOperand("-1".into()))]);
        assert_eq!(collect("k 99999999999999999999"), [Err(QueryError::InvalidOperand("99999999999999999999".into()))]);
    }

    #[test]
    fn execute_writes_tokens() {
        let mut set = OSAvlSet::new();
        let mut output = String::new();
        execute(Query::Insert(4), &mut set, &mut output).unwrap();
        execute(Query::Insert(4), &mut set, &mut output).unwrap();
        execute(Query::Select(1), &mut set, &mut output).unwrap();
        execute(Query::CountLessThan(100), &mut set, &mut output).unwrap();
        assert_eq!(output, "4 1 ");
        assert_eq!(
            execute(Query::Select(2), &mut set, &mut output),
            Err(QueryError::Tree(Error::IndexOutOfRange { index: 2, len: 1 }))
        );
    }

    #[test]
    fn display_messages() {
        assert_eq!(QueryError::UnknownOpcode('z').to_string(), "invalid query: 'z'");
        assert_eq!(QueryError::MissingOperand('k').to_string(), "missing operand for query 'k'");
        assert_eq!(QueryError::InvalidOperand("x".into()).to_string(), "invalid operand: 'x'");
        assert_eq!(
            QueryError::from(Error::IndexOutOfRange { index: 0, len: 0 }).to_string(),
            "query failed: index 0 is out of range for a set of 0 keys"
        );
    }
}
