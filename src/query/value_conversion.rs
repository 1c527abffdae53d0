//! SeaQuery `Value` to `may_postgres` parameter conversion.
//!
//! Every value is converted into an owned, boxed `ToSql` of the Rust type PostgreSQL
//! expects for it, so NULLs keep their type (`Option<String>` for a text column,
//! `Option<DateTime<Utc>>` for a timestamptz column, ...). The boxes live for the
//! duration of the closure that receives the parameter slice.

use crate::error::OrmError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use may_postgres::types::ToSql;
use sea_query::{Value, Values};

/// Convert SeaQuery values and run `f` with the resulting parameters.
///
/// # Errors
///
/// Returns `OrmError::Query` for a value type with no PostgreSQL mapping (or an
/// unsigned value too large for `BIGINT`), otherwise whatever `f` returns.
pub fn with_converted_params<F, R>(values: &Values, f: F) -> Result<R, OrmError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, OrmError>,
{
    let owned = values
        .iter()
        .map(to_sql_param)
        .collect::<Result<Vec<_>, _>>()?;
    let params: Vec<&dyn ToSql> = owned.iter().map(|p| &**p as &dyn ToSql).collect();
    f(&params)
}

fn to_sql_param(value: &Value) -> Result<Box<dyn ToSql>, OrmError> {
    let param: Box<dyn ToSql> = match value {
        Value::Bool(v) => Box::new(*v),
        Value::TinyInt(v) => Box::new(v.map(i16::from)),
        Value::SmallInt(v) => Box::new(*v),
        Value::Int(v) => Box::new(*v),
        Value::BigInt(v) => Box::new(*v),
        Value::TinyUnsigned(v) => Box::new(v.map(i16::from)),
        Value::SmallUnsigned(v) => Box::new(v.map(i32::from)),
        Value::Unsigned(v) => Box::new(v.map(i64::from)),
        Value::BigUnsigned(v) => {
            let converted = match v {
                Some(u) => Some(i64::try_from(*u).map_err(|_| {
                    OrmError::Query(format!(
                        "BigUnsigned value {u} exceeds i64::MAX ({}), cannot be bound as BIGINT",
                        i64::MAX
                    ))
                })?),
                None => None,
            };
            Box::new(converted)
        }
        Value::Float(v) => Box::new(*v),
        Value::Double(v) => Box::new(*v),
        Value::String(v) => Box::new(v.as_ref().map(|s| s.to_string())),
        Value::Char(v) => Box::new(v.map(|c| c.to_string())),
        Value::Bytes(v) => Box::new(v.as_ref().map(|b| b.to_vec())),
        Value::Json(v) => Box::new(v.as_ref().map(|j| serde_json::Value::clone(j))),
        Value::ChronoDateTimeUtc(v) => Box::new(v.as_ref().map(|ts| DateTime::<Utc>::clone(ts))),
        Value::ChronoDateTime(v) => Box::new(v.as_ref().map(|ts| NaiveDateTime::clone(ts))),
        Value::ChronoDate(v) => Box::new(v.as_ref().map(|d| NaiveDate::clone(d))),
        _ => {
            return Err(OrmError::Query(format!(
                "Unsupported value type in query: {value:?}"
            )));
        }
    };
    Ok(param)
}
