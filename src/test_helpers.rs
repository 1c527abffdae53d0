//! Test doubles shared by the unit tests.
//!
//! `MockSession` records every statement and parameter count, can be told to fail on
//! statements starting with a given prefix, and never returns rows: `query_all` yields an
//! empty set and `query_one` fails (a `may_postgres::Row` can't be built without a server).

use crate::entity::{Entity, FromRow};
use crate::error::OrmError;
use crate::session::Session;
use chrono::{DateTime, Utc};
use may_postgres::types::ToSql;
use may_postgres::Row;
use sea_query::Value;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub(crate) struct MockSession {
    captured_sql: Arc<Mutex<Vec<String>>>,
    captured_param_counts: Arc<Mutex<Vec<usize>>>,
    fail_on: Option<String>,
}

impl MockSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Fail every statement that starts with `prefix`
    pub(crate) fn failing_on(prefix: &str) -> Self {
        Self {
            fail_on: Some(prefix.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.captured_sql.lock().unwrap().clone()
    }

    pub(crate) fn param_counts(&self) -> Vec<usize> {
        self.captured_param_counts.lock().unwrap().clone()
    }

    fn record(&self, sql: &str, params: &[&dyn ToSql]) -> Result<(), OrmError> {
        self.captured_sql.lock().unwrap().push(sql.to_string());
        self.captured_param_counts.lock().unwrap().push(params.len());
        match &self.fail_on {
            Some(prefix) if sql.starts_with(prefix.as_str()) => Err(OrmError::Query(format!(
                "MockSession: forced failure on {sql}"
            ))),
            _ => Ok(()),
        }
    }
}

impl Session for MockSession {
    fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<u64, OrmError> {
        self.record(sql, params)?;
        Ok(1)
    }

    fn query_one(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Row, OrmError> {
        self.record(sql, params)?;
        Err(OrmError::Query(
            "MockSession: No rows available for testing".to_string(),
        ))
    }

    fn query_all(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<Row>, OrmError> {
        self.record(sql, params)?;
        Ok(vec![])
    }
}

pub(crate) type HookLog = Rc<RefCell<Vec<&'static str>>>;

/// Soft-deletable, versioned entity that records its hook calls
#[derive(Debug, Clone, Default)]
pub(crate) struct Note {
    pub id: Option<i64>,
    pub title: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub hooks: HookLog,
    pub fail_before_save: bool,
}

impl Note {
    pub(crate) fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub(crate) fn hook_calls(&self) -> Vec<&'static str> {
        self.hooks.borrow().clone()
    }
}

impl FromRow for Note {
    fn from_row(row: &Row) -> Result<Self, may_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            deleted_at: row.try_get("deleted_at")?,
            version: row.try_get("version")?,
            ..Self::default()
        })
    }
}

impl Entity for Note {
    fn table_name() -> &'static str {
        "notes"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("title", self.title.clone().into()),
            ("deleted_at", self.deleted_at.into()),
            ("version", self.version.into()),
        ]
    }

    fn soft_delete_column() -> Option<&'static str> {
        Some("deleted_at")
    }

    fn set_deleted_at(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }

    fn version_column() -> Option<&'static str> {
        Some("version")
    }

    fn before_save<S: Session + ?Sized>(&mut self, _session: &S) -> Result<(), OrmError> {
        self.hooks.borrow_mut().push("before_save");
        if self.fail_before_save {
            return Err(OrmError::Query("before_save rejected the note".to_string()));
        }
        Ok(())
    }

    fn after_save<S: Session + ?Sized>(&self, _session: &S) -> Result<(), OrmError> {
        self.hooks.borrow_mut().push("after_save");
        Ok(())
    }

    fn before_delete<S: Session + ?Sized>(&self, _session: &S) -> Result<(), OrmError> {
        self.hooks.borrow_mut().push("before_delete");
        Ok(())
    }

    fn after_delete<S: Session + ?Sized>(&self, _session: &S) -> Result<(), OrmError> {
        self.hooks.borrow_mut().push("after_delete");
        Ok(())
    }
}

/// Plain entity: no soft delete, no version column, default hooks
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Tag {
    pub id: Option<i64>,
    pub label: String,
}

impl FromRow for Tag {
    fn from_row(row: &Row) -> Result<Self, may_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            label: row.try_get("label")?,
        })
    }
}

impl Entity for Tag {
    fn table_name() -> &'static str {
        "tags"
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn column_values(&self) -> Vec<(&'static str, Value)> {
        vec![("label", self.label.clone().into())]
    }
}
