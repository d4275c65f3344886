use thiserror::Error;

use crate::route::Route;

/// Errors raised while translating wire payloads into the typed model.
///
/// Anything a remote peer controls goes through these; locally produced
/// data is encoded infallibly.
#[derive(Debug, Error, PartialEq)]
pub enum WireError {
    #[error("malformed route key '{key}' (expected \"row, column\")")]
    MalformedRouteKey { key: String },

    #[error("malformed compact route '{key}' (expected \"row-column\")")]
    MalformedCompactRoute { key: String },

    #[error("restriction at {route} does not start with '>' or '<': '{value}'")]
    MissingOperator { route: Route, value: String },

    #[error("restriction at {route} has an unreadable bound: '{value}'")]
    UnreadableBound { route: Route, value: String },

    #[error("price matrix has {actual} rows, expected {expected}")]
    MatrixRows { expected: usize, actual: usize },

    #[error("price matrix row {row} has {actual} columns, expected {expected}")]
    MatrixColumns {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
