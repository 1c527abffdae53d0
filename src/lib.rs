//! # Mooring
//!
//! Entity lifecycle hooks, a fluent query builder and CRUD / pagination / transaction
//! helpers over `may_postgres`, with SQL generated by SeaQuery.
//!
//! - [`Entity`]: identity, table name, column values and four lifecycle hooks
//! - [`QueryBuilder`]: filter, order, paginate, group, project, join, lock, preload
//! - [`crud`]: `create`, `find`, `update`, `delete`, `soft_delete`, `paginate`, ...
//! - [`Session`]: the connection or transaction every helper runs on; open one with a
//!   [`SessionFactory`] and pass it explicitly
//!
//! ```no_run
//! use mooring::{paginate, transaction, OrmError, SessionFactory};
//! # use mooring::{Entity, FromRow};
//! # struct Note { id: Option<i64> }
//! # impl FromRow for Note {
//! #     fn from_row(row: &may_postgres::Row) -> Result<Self, may_postgres::Error> {
//! #         Ok(Self { id: row.try_get("id")? })
//! #     }
//! # }
//! # impl Entity for Note {
//! #     fn table_name() -> &'static str { "notes" }
//! #     fn id(&self) -> Option<i64> { self.id }
//! #     fn set_id(&mut self, id: i64) { self.id = Some(id); }
//! #     fn column_values(&self) -> Vec<(&'static str, sea_query::Value)> { vec![] }
//! # }
//!
//! # fn main() -> Result<(), OrmError> {
//! let factory = SessionFactory::from_env()?;
//! let session = factory.open()?;
//!
//! let first_page: Vec<Note> = paginate(&session, 1, 20)?;
//! for note in &first_page {
//!     transaction(&session, |tx| mooring::delete(tx, note))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod crud;
pub mod entity;
pub mod error;
pub mod metrics;
pub mod payload;
pub mod query;
pub mod raw_sql;
pub mod session;
pub mod transaction;

#[cfg(test)]
mod test_helpers;

pub use config::DatabaseConfig;
pub use connection::{connect, validate_connection_string, SessionFactory};
pub use crud::{
    batch_create, batch_delete, batch_update, create, data_version_control, delete, find,
    find_with_conditions, get_count, paginate, restore_snapshot, snapshot, soft_delete,
    soft_delete_by_condition, update, update_fields, HookPolicy,
};
pub use entity::{Entity, FromRow, Loaded, Relation, ID_COLUMN};
pub use error::OrmError;
pub use metrics::measure;
pub use payload::{from_payload_bytes, to_payload_bytes};
pub use query::{JoinSpec, LockMode, QueryBuilder};
pub use raw_sql::{
    execute_statement, execute_unprepared, find_by_statement, query_value, raw_query,
    raw_transaction,
};
pub use session::{PgSession, Session};
pub use transaction::{transaction, IsolationLevel, Transaction};
