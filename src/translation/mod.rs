use std::borrow::Cow;
use std::fmt::Write as _;

mod parsers;
mod scanner;

use parsers::{
    is_block_comment_end, is_block_comment_start, is_escaped_quote, is_line_comment_start,
};
use scanner::{State, closing_quote};

use crate::error::MssqlDbError;

/// SQL text with positional `?` markers rewritten to SQL Server's `@Pn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated<'a> {
    pub sql: Cow<'a, str>,
    /// How many `?` markers were rewritten.
    pub placeholders: usize,
}

impl Translated<'_> {
    /// Check the rewritten marker count against the bound parameter count.
    ///
    /// SQL without any `?` is passed through untouched, so callers writing
    /// `@P1` themselves are not second-guessed.
    ///
    /// # Errors
    ///
    /// Returns `MssqlDbError::ParameterError` when the counts disagree.
    pub fn check_arity(&self, params: usize) -> Result<(), MssqlDbError> {
        if self.placeholders > 0 && self.placeholders != params {
            return Err(MssqlDbError::ParameterError(format!(
                "statement has {} placeholders but {params} parameters were supplied",
                self.placeholders
            )));
        }
        Ok(())
    }
}

/// Rewrite each `?` to `@P1`, `@P2`, ... in order of appearance.
///
/// String literals, quoted and bracketed identifiers, and comments are
/// skipped by a small state machine; T-SQL block comments nest.
///
/// ```rust
/// use mssql_db::translation::translate_placeholders;
///
/// let t = translate_placeholders("SELECT * FROM [a?] WHERE x = ? AND y = '?' AND z = ?");
/// assert_eq!(t.sql, "SELECT * FROM [a?] WHERE x = @P1 AND y = '?' AND z = @P2");
/// assert_eq!(t.placeholders, 2);
/// ```
/// Returns a borrowed `Cow` when no changes are needed.
#[must_use]
pub fn translate_placeholders(sql: &str) -> Translated<'_> {
    let mut out: Option<String> = None;
    let mut copied_to = 0;
    let mut count = 0;
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'[' => state = State::Bracketed,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment(1);
                    idx += 1;
                }
                b'?' => {
                    count += 1;
                    let buf = out.get_or_insert_with(|| String::with_capacity(sql.len() + 8));
                    buf.push_str(&sql[copied_to..idx]);
                    let _ = write!(buf, "@P{count}");
                    copied_to = idx + 1;
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted | State::Bracketed => {
                if let Some(quote) = closing_quote(state)
                    && b == quote
                {
                    if is_escaped_quote(bytes, idx, quote) {
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    idx += 1;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    idx += 1;
                }
            }
        }

        idx += 1;
    }

    let sql = match out {
        Some(mut buf) => {
            buf.push_str(&sql[copied_to..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(sql),
    };
    Translated {
        sql,
        placeholders: count,
    }
}
