//! Error taxonomy for store access.

use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("store unreachable: {0}")]
    StoreUnreachable(String),

    #[error("schema conflict: {0}")]
    SchemaConflict(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("failed to close store: {0}")]
    Close(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify an insert failure: key collisions become `ConstraintViolation`,
    /// anything else is a query error.
    pub(crate) fn from_insert(e: rusqlite::Error) -> Self {
        if is_constraint_violation(&e) {
            Error::ConstraintViolation(e.to_string())
        } else {
            Error::Query(e.to_string())
        }
    }

    /// Classify a `DROP TABLE` failure: only a missing table is a schema
    /// conflict.
    pub(crate) fn from_drop(e: rusqlite::Error) -> Self {
        if is_missing_table(&e) {
            Error::SchemaConflict(e.to_string())
        } else {
            Error::from(e)
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Query(e.to_string())
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: ErrorCode::ConstraintViolation,
                ..
            },
            _
        )
    )
}

fn is_missing_table(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: ErrorCode::Unknown,
                ..
            },
            Some(msg)
        ) if msg.starts_with("no such table")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_failures_are_classified() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY),
            Some("UNIQUE constraint failed: products.productID".to_string()),
        );
        assert!(matches!(
            Error::from_insert(err),
            Error::ConstraintViolation(msg) if msg.contains("products.productID")
        ));
    }

    #[test]
    fn missing_table_is_schema_conflict() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some("no such table: products".to_string()),
        );
        assert!(matches!(Error::from_drop(err), Error::SchemaConflict(_)));
    }

    #[test]
    fn locked_drop_is_not_schema_conflict() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        );
        assert!(matches!(Error::from_drop(err), Error::Query(msg) if msg.contains("locked")));
    }

    #[test]
    fn close_failures_name_the_close() {
        assert_eq!(
            Error::Close("unable to close due to unfinalized statements".into()).to_string(),
            "failed to close store: unable to close due to unfinalized statements"
        );
    }

    #[test]
    fn other_failures_are_query_errors() {
        let err = rusqlite::Error::InvalidColumnIndex(7);
        assert!(matches!(Error::from_insert(err), Error::Query(_)));
    }
}
