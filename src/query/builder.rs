//! Fluent SELECT builder bound to a session and an entity type.

use crate::entity::{Entity, Loaded, Relation, ID_COLUMN};
use crate::error::OrmError;
use crate::query::value_conversion::with_converted_params;
use crate::query::{column_ref, ident};
use crate::session::Session;
use may_postgres::Row;
use sea_query::{
    Asterisk, Condition, Expr, ExprTrait, IntoCondition, JoinType,
    LockType, Order, PostgresQueryBuilder, Query, SelectStatement, Values,
};
use std::marker::PhantomData;

/// A join recorded on a [`QueryBuilder`]
#[derive(Debug, Clone)]
pub struct JoinSpec {
    join_type: JoinType,
    table: String,
    on: Condition,
}

impl JoinSpec {
    /// `INNER JOIN table ON on`
    pub fn inner<C: IntoCondition>(table: &str, on: C) -> Self {
        Self {
            join_type: JoinType::InnerJoin,
            table: table.to_string(),
            on: on.into_condition(),
        }
    }

    /// `LEFT JOIN table ON on`
    pub fn left<C: IntoCondition>(table: &str, on: C) -> Self {
        Self {
            join_type: JoinType::LeftJoin,
            table: table.to_string(),
            on: on.into_condition(),
        }
    }
}

/// Row lock requested with `FOR ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// `FOR UPDATE`
    Update,
    /// `FOR NO KEY UPDATE`
    NoKeyUpdate,
    /// `FOR SHARE`
    Share,
    /// `FOR KEY SHARE`
    KeyShare,
}

impl From<LockMode> for LockType {
    fn from(mode: LockMode) -> Self {
        match mode {
            LockMode::Update => LockType::Update,
            LockMode::NoKeyUpdate => LockType::NoKeyUpdate,
            LockMode::Share => LockType::Share,
            LockMode::KeyShare => LockType::KeyShare,
        }
    }
}

/// Query builder for records of `E`
///
/// Chain methods only record state; nothing touches the session until one of the
/// `execute*` methods consumes the builder. The generated statement does not depend on
/// the order in which the chain methods were called, and calling an overwriting method
/// (`order`, `limit`, `offset`, `select`, `group_by`, `having`, `lock`) twice keeps the
/// last value.
pub struct QueryBuilder<'s, S: Session + ?Sized, E: Entity> {
    session: &'s S,
    filters: Vec<Condition>,
    joins: Vec<JoinSpec>,
    order_key: Option<(String, Order)>,
    limit_value: Option<u64>,
    offset_value: Option<u64>,
    projection: Option<Vec<String>>,
    group_key: Option<String>,
    having_condition: Option<Condition>,
    preloads: Vec<Relation>,
    distinct_rows: bool,
    lock_mode: Option<LockMode>,
    _entity: PhantomData<E>,
}

impl<'s, S: Session + ?Sized, E: Entity> QueryBuilder<'s, S, E> {
    /// `SELECT * FROM <E::table_name()>` with no filters
    pub fn new(session: &'s S) -> Self {
        Self {
            session,
            filters: Vec::new(),
            joins: Vec::new(),
            order_key: None,
            limit_value: None,
            offset_value: None,
            projection: None,
            group_key: None,
            having_condition: None,
            preloads: Vec::new(),
            distinct_rows: false,
            lock_mode: None,
            _entity: PhantomData,
        }
    }

    /// Add a predicate; predicates are AND-ed together
    pub fn filter<C: IntoCondition>(mut self, condition: C) -> Self {
        self.filters.push(condition.into_condition());
        self
    }

    pub fn join(mut self, spec: JoinSpec) -> Self {
        self.joins.push(spec);
        self
    }

    /// Set the ordering key (`column` or `table.column`)
    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.order_key = Some((column.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_value = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_value = Some(offset);
        self
    }

    /// Replace the projection
    ///
    /// Plain names (`title`, `notes.title`) are quoted as columns; anything containing
    /// a parenthesis or a space (`COUNT(*) AS total`) is emitted verbatim.
    pub fn select<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn group_by(mut self, column: &str) -> Self {
        self.group_key = Some(column.to_string());
        self
    }

    /// Post-grouping filter
    pub fn having<C: IntoCondition>(mut self, condition: C) -> Self {
        self.having_condition = Some(condition.into_condition());
        self
    }

    /// Shorthand for `filter(id = id).limit(1)`
    pub fn by_id(self, id: i64) -> Self {
        self.filter(Expr::col(ident(ID_COLUMN)).eq(id)).limit(1)
    }

    /// Load a has-many relation alongside the records (see [`Self::execute_loaded`])
    pub fn preload(mut self, relation: Relation) -> Self {
        self.preloads.push(relation);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct_rows = true;
        self
    }

    pub fn lock(mut self, mode: LockMode) -> Self {
        self.lock_mode = Some(mode);
        self
    }

    /// The statement `execute` would run, with its bound values
    pub fn to_sql(&self) -> (String, Values) {
        self.build_statement().build(PostgresQueryBuilder)
    }

    /// Run the query and decode every row into `E`
    ///
    /// # Errors
    ///
    /// Returns `OrmError::Configuration` if relations were requested with `preload`
    /// (use [`Self::execute_loaded`]), `OrmError::Parse` if a row does not decode, or the
    /// store error.
    pub fn execute(self) -> Result<Vec<E>, OrmError> {
        if !self.preloads.is_empty() {
            return Err(OrmError::configuration(format!(
                "{} relation(s) preloaded on {}; use execute_loaded() to load them",
                self.preloads.len(),
                E::table_name()
            )));
        }
        let rows = self.execute_rows()?;
        decode_rows(&rows)
    }

    /// Run the query and return the raw rows (for projections and grouping)
    ///
    /// # Errors
    ///
    /// Returns `OrmError` if the query fails.
    pub fn execute_rows(self) -> Result<Vec<Row>, OrmError> {
        let (sql, values) = self.to_sql();
        with_converted_params(&values, |params| self.session.query_all(&sql, params))
    }

    /// Run the query, then load each preloaded relation for the returned records
    ///
    /// Each relation costs one extra statement:
    /// `SELECT * FROM <table> WHERE <foreign_key> IN (<record ids>)`.
    ///
    /// # Errors
    ///
    /// Returns `OrmError` if any query fails or a row does not decode.
    pub fn execute_loaded(self) -> Result<Loaded<E>, OrmError> {
        let (sql, values) = self.to_sql();
        let rows = with_converted_params(&values, |params| self.session.query_all(&sql, params))?;
        let records: Vec<E> = decode_rows(&rows)?;

        let ids: Vec<i64> = records.iter().filter_map(|record| record.id()).collect();
        let mut related = Vec::with_capacity(self.preloads.len());
        for relation in &self.preloads {
            let rows = if ids.is_empty() {
                Vec::new()
            } else {
                let (sql, values) = Query::select()
                    .column(Asterisk)
                    .from(ident(relation.table))
                    .and_where(Expr::col(ident(relation.foreign_key)).is_in(ids.iter().copied()))
                    .build(PostgresQueryBuilder);
                with_converted_params(&values, |params| self.session.query_all(&sql, params))?
            };
            log::debug!(
                "preloaded {} {} row(s) for {} {} record(s)",
                rows.len(),
                relation.name,
                records.len(),
                E::table_name()
            );
            related.push((*relation, rows));
        }

        Ok(Loaded::new(records, related))
    }

    fn build_statement(&self) -> SelectStatement {
        let mut stmt = Query::select();
        stmt.from(ident(E::table_name()));

        if self.distinct_rows {
            stmt.distinct();
        }
        if let Some((column, order)) = &self.order_key {
            stmt.order_by(column_ref(column), order.clone());
        }
        if let Some(limit) = self.limit_value {
            stmt.limit(limit);
        }
        if let Some(offset) = self.offset_value {
            stmt.offset(offset);
        }
        if let Some(column) = &self.group_key {
            stmt.group_by_col(column_ref(column));
        }
        if let Some(condition) = &self.having_condition {
            stmt.cond_having(condition.clone());
        }
        match &self.projection {
            Some(fields) if !fields.is_empty() => {
                for field in fields {
                    if field == "*" {
                        stmt.column(Asterisk);
                    } else if field.contains('(') || field.contains(' ') {
                        stmt.expr(Expr::cust(field.clone()));
                    } else {
                        stmt.column(column_ref(field));
                    }
                }
            }
            _ => {
                stmt.column(Asterisk);
            }
        }
        for condition in &self.filters {
            stmt.cond_where(condition.clone());
        }

        for join in &self.joins {
            stmt.join(join.join_type, ident(&join.table), join.on.clone());
        }
        if let Some(mode) = self.lock_mode {
            stmt.lock(mode.into());
        }

        stmt
    }
}

fn decode_rows<E: Entity>(rows: &[Row]) -> Result<Vec<E>, OrmError> {
    rows.iter()
        .map(|row| {
            E::from_row(row).map_err(|e| {
                OrmError::Parse(format!("Failed to parse {} row: {e}", E::table_name()))
            })
        })
        .collect()
}
