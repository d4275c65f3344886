use std::fmt;

use unscanny::Scanner;

use crate::error::WireError;

/// One supplier/consumer pairing, addressed by zero-based indices.
///
/// Routes order row-major, so maps keyed by `Route` iterate in the same
/// order the editor walks the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Route {
    pub row: usize,
    pub column: usize,
}

impl Route {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Spaced key form used by restriction maps: `"row, column"`.
    pub fn key(self) -> String {
        format!("{}, {}", self.row, self.column)
    }

    /// Compact form used by capacity editors: `"row-column"`.
    pub fn compact(self) -> String {
        format!("{}-{}", self.row, self.column)
    }

    pub fn parse_key(input: &str) -> Result<Self, WireError> {
        Self::parse_pair(input, ',').ok_or_else(|| WireError::MalformedRouteKey {
            key: input.to_string(),
        })
    }

    pub fn parse_compact(input: &str) -> Result<Self, WireError> {
        Self::parse_pair(input, '-').ok_or_else(|| WireError::MalformedCompactRoute {
            key: input.to_string(),
        })
    }

    /// Two unsigned integers around `separator`, whitespace-tolerant.
    /// Anything else, including trailing junk, is rejected.
    fn parse_pair(input: &str, separator: char) -> Option<Self> {
        let mut s = Scanner::new(input);
        s.eat_while(|c: char| c.is_whitespace());
        let row = s.eat_while(|c: char| c.is_ascii_digit());
        if row.is_empty() {
            return None;
        }
        s.eat_while(|c: char| c.is_whitespace());
        if !s.eat_if(separator) {
            return None;
        }
        s.eat_while(|c: char| c.is_whitespace());
        let column = s.eat_while(|c: char| c.is_ascii_digit());
        if column.is_empty() {
            return None;
        }
        s.eat_while(|c: char| c.is_whitespace());
        if !s.done() {
            return None;
        }
        Some(Self {
            row: row.parse().ok()?,
            column: column.parse().ok()?,
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.row, self.column)
    }
}
