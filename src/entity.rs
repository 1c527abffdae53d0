//! Entity contract implemented by record types.

use crate::error::OrmError;
use crate::session::Session;
use chrono::{DateTime, Utc};
use may_postgres::Row;
use sea_query::Value;

/// Name of the identifier column every entity table carries
pub const ID_COLUMN: &str = "id";

/// Build a value from a `may_postgres::Row`
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, may_postgres::Error>;
}

/// A persisted record type with identity and lifecycle hooks
///
/// The identifier is a `BIGSERIAL`/`BIGINT` column named `id`; it is `None` until the
/// store assigns one. Hooks default to no-ops; an error returned from a hook aborts the
/// operation and is what the caller of the helper sees.
///
/// # Examples
///
/// ```
/// use mooring::{Entity, FromRow, OrmError, Session};
/// use sea_query::Value;
///
/// #[derive(Debug, Clone)]
/// struct Invoice {
///     id: Option<i64>,
///     number: String,
///     total_cents: i64,
/// }
///
/// impl FromRow for Invoice {
///     fn from_row(row: &may_postgres::Row) -> Result<Self, may_postgres::Error> {
///         Ok(Self {
///             id: row.try_get("id")?,
///             number: row.try_get("number")?,
///             total_cents: row.try_get("total_cents")?,
///         })
///     }
/// }
///
/// impl Entity for Invoice {
///     fn table_name() -> &'static str { "invoices" }
///     fn id(&self) -> Option<i64> { self.id }
///     fn set_id(&mut self, id: i64) { self.id = Some(id); }
///     fn column_values(&self) -> Vec<(&'static str, Value)> {
///         vec![
///             ("number", self.number.clone().into()),
///             ("total_cents", self.total_cents.into()),
///         ]
///     }
///
///     fn before_save<S: Session + ?Sized>(&mut self, _session: &S) -> Result<(), OrmError> {
///         self.number = self.number.trim().to_uppercase();
///         Ok(())
///     }
/// }
/// ```
pub trait Entity: FromRow {
    /// Storage name, fixed per type
    fn table_name() -> &'static str;

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// Every persisted column except `id`, in declaration order
    fn column_values(&self) -> Vec<(&'static str, Value)>;

    /// Deletion timestamp column, if the type supports soft deletes
    fn soft_delete_column() -> Option<&'static str> {
        None
    }

    /// Store the deletion timestamp on the value after a soft delete
    fn set_deleted_at(&mut self, _at: DateTime<Utc>) {}

    /// Data version column, if the type tracks one
    fn version_column() -> Option<&'static str> {
        None
    }

    fn before_save<S: Session + ?Sized>(&mut self, _session: &S) -> Result<(), OrmError> {
        Ok(())
    }

    fn after_save<S: Session + ?Sized>(&self, _session: &S) -> Result<(), OrmError> {
        Ok(())
    }

    fn before_delete<S: Session + ?Sized>(&self, _session: &S) -> Result<(), OrmError> {
        Ok(())
    }

    fn after_delete<S: Session + ?Sized>(&self, _session: &S) -> Result<(), OrmError> {
        Ok(())
    }
}

/// A has-many relation loaded alongside a query's records
///
/// `table.foreign_key` references the `id` of the queried entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub name: &'static str,
    pub table: &'static str,
    pub foreign_key: &'static str,
}

impl Relation {
    pub const fn has_many(name: &'static str, table: &'static str, foreign_key: &'static str) -> Self {
        Self {
            name,
            table,
            foreign_key,
        }
    }
}

/// Records plus the related rows loaded for each requested relation
pub struct Loaded<E> {
    pub records: Vec<E>,
    related: Vec<(Relation, Vec<Row>)>,
}

impl<E: Entity> Loaded<E> {
    pub(crate) fn new(records: Vec<E>, related: Vec<(Relation, Vec<Row>)>) -> Self {
        Self { records, related }
    }

    /// Every row loaded for the relation called `name` (empty if it was not preloaded)
    pub fn related(&self, name: &str) -> &[Row] {
        self.related
            .iter()
            .find(|(relation, _)| relation.name == name)
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or(&[])
    }

    /// Rows of relation `name` that belong to `record`
    pub fn related_to(&self, name: &str, record: &E) -> Vec<&Row> {
        let Some(id) = record.id() else {
            return Vec::new();
        };
        let Some((relation, rows)) = self.related.iter().find(|(relation, _)| relation.name == name)
        else {
            return Vec::new();
        };
        rows.iter()
            .filter(|row| row.try_get::<_, Option<i64>>(relation.foreign_key).ok().flatten() == Some(id))
            .collect()
    }

    pub fn relation_names(&self) -> Vec<&'static str> {
        self.related.iter().map(|(relation, _)| relation.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{MockSession, Tag};

    #[test]
    fn test_default_hooks_are_noops() {
        let session = MockSession::new();
        let mut tag = Tag::default();
        tag.before_save(&session).unwrap();
        tag.after_save(&session).unwrap();
        tag.before_delete(&session).unwrap();
        tag.after_delete(&session).unwrap();
        assert!(session.statements().is_empty());
    }

    #[test]
    fn test_optional_columns_default_to_none() {
        assert_eq!(Tag::soft_delete_column(), None);
        assert_eq!(Tag::version_column(), None);
    }

    #[test]
    fn test_id_accessors() {
        let mut tag = Tag::default();
        assert_eq!(tag.id(), None);
        tag.set_id(42);
        assert_eq!(tag.id(), Some(42));
    }

    #[test]
    fn test_loaded_without_relations() {
        let loaded = Loaded::new(vec![Tag { id: Some(1), label: "a".into() }], vec![]);
        assert!(loaded.related("posts").is_empty());
        assert!(loaded.related_to("posts", &loaded.records[0]).is_empty());
        assert!(loaded.relation_names().is_empty());
    }

    #[test]
    fn test_loaded_lists_relation_names() {
        let posts = Relation::has_many("posts", "posts", "tag_id");
        let loaded: Loaded<Tag> = Loaded::new(vec![], vec![(posts, vec![])]);
        assert_eq!(loaded.relation_names(), vec!["posts"]);
        assert!(loaded.related("posts").is_empty());
    }
}
