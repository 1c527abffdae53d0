//! Error type shared by every mooring operation.
//!
//! Three families matter to callers:
//! - store failures (`Postgres`), always propagated after a rollback in mutating helpers
//! - configuration errors (`Configuration`), raised before any statement is issued
//! - everything else (statement building, row parsing, payload encoding)
//!
//! "Not found" is never an error: lookups return `Ok(None)`.

use may_postgres::Error as PostgresError;
use std::fmt;

/// Error returned by sessions, transactions, the query builder and the CRUD helpers
#[derive(Debug)]
pub enum OrmError {
    /// `PostgreSQL` error from `may_postgres`, surfaced unchanged
    Postgres(PostgresError),
    /// Statement construction failed or the store returned an unexpected shape
    Query(String),
    /// Row parsing/conversion error
    Parse(String),
    /// A precondition on the entity type or the call arguments does not hold
    Configuration(String),
    /// The transaction was already committed or rolled back
    Transaction(String),
    /// Payload serialization failed
    Payload(serde_json::Error),
    /// Configuration file or environment could not be loaded
    Config(config::ConfigError),
}

impl OrmError {
    /// Shorthand for building a [`OrmError::Configuration`]
    pub fn configuration(message: impl Into<String>) -> Self {
        OrmError::Configuration(message.into())
    }

    /// `true` for errors raised before any statement reached the store
    pub fn is_configuration(&self) -> bool {
        matches!(self, OrmError::Configuration(_))
    }

    /// `true` when the error originated in the `PostgreSQL` client
    pub fn is_store_failure(&self) -> bool {
        matches!(self, OrmError::Postgres(_))
    }
}

impl fmt::Display for OrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrmError::Postgres(e) => write!(f, "PostgreSQL error: {e}"),
            OrmError::Query(s) => write!(f, "Query error: {s}"),
            OrmError::Parse(s) => write!(f, "Parse error: {s}"),
            OrmError::Configuration(s) => write!(f, "Configuration error: {s}"),
            OrmError::Transaction(s) => write!(f, "Transaction error: {s}"),
            OrmError::Payload(e) => write!(f, "Payload error: {e}"),
            OrmError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for OrmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OrmError::Postgres(e) => Some(e),
            OrmError::Payload(e) => Some(e),
            OrmError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PostgresError> for OrmError {
    fn from(err: PostgresError) -> Self {
        OrmError::Postgres(err)
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        OrmError::Payload(err)
    }
}

impl From<config::ConfigError> for OrmError {
    fn from(err: config::ConfigError) -> Self {
        OrmError::Config(err)
    }
}
