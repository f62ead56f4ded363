//! Column/value filters.
//!
//! A `Filter` maps column names to JSON values and turns into a sea-orm
//! `Condition`: scalars compare with `=`, `null` becomes `IS NULL` and arrays
//! become `IN (...)`. Column names are resolved against the entity, so a typo
//! fails here instead of reaching the database.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{ColumnTrait, ColumnType, Condition, EntityName, EntityTrait, IdenStatic, Value};
use serde_json::Value as Json;

use crate::error::DbError;

/// Equality filter keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(BTreeMap<String, Json>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value` (or `IS NULL` / `IN` for null and arrays).
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Json>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Json)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// WHERE condition for entity `E`.
    pub(crate) fn condition<E: EntityTrait>(&self) -> Result<Condition, DbError> {
        let mut condition = Condition::all();
        for (name, value) in &self.0 {
            let column = resolve_column::<E>(name)?;
            let expr = match value {
                Json::Null => column.is_null(),
                Json::Array(items) => {
                    let values = items
                        .iter()
                        .map(|item| to_value(&column, item))
                        .collect::<Result<Vec<_>, _>>()?;
                    column.is_in(values)
                }
                other => column.eq(to_value(&column, other)?),
            };
            condition = condition.add(expr);
        }
        Ok(condition)
    }

    /// SET list for an UPDATE on entity `E`.
    pub(crate) fn assignments<E: EntityTrait>(&self) -> Result<Vec<(E::Column, SimpleExpr)>, DbError> {
        self.0
            .iter()
            .map(|(name, value)| {
                let column = resolve_column::<E>(name)?;
                let expr = match value {
                    // Untyped NULL so the column type decides
                    Json::Null => Expr::cust("NULL"),
                    other => Expr::value(to_value(&column, other)?),
                };
                Ok((column, expr))
            })
            .collect()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("{}");
        }
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl<K: Into<String>, V: Into<Json>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Map<String, Json>> for Filter {
    fn from(map: serde_json::Map<String, Json>) -> Self {
        map.into_iter().collect()
    }
}

impl TryFrom<Json> for Filter {
    type Error = DbError;

    /// Accepts a JSON object; `null` is the empty filter.
    fn try_from(value: Json) -> Result<Self, Self::Error> {
        match value {
            Json::Object(map) => Ok(map.into()),
            Json::Null => Ok(Self::new()),
            other => Err(DbError::InvalidFilter(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }
}

pub(crate) fn resolve_column<E: EntityTrait>(name: &str) -> Result<E::Column, DbError> {
    E::Column::from_str(name.trim()).map_err(|_| DbError::UnknownColumn {
        table: E::default().table_name().to_string(),
        column: name.to_string(),
    })
}

/// Convert a JSON scalar into a bind value shaped for the column.
fn to_value<C: ColumnTrait>(column: &C, value: &Json) -> Result<Value, DbError> {
    let invalid = |reason: String| DbError::InvalidValue {
        column: column.as_str().to_string(),
        reason,
    };

    let def = column.def();
    match (value, def.get_column_type()) {
        (Json::Number(n), ColumnType::Integer) => n
            .as_i64()
            .and_then(|i| i32::try_from(i).ok())
            .map(Value::from)
            .ok_or_else(|| invalid(format!("{n} does not fit a 32-bit integer"))),
        (Json::Number(n), ColumnType::SmallInteger) => n
            .as_i64()
            .and_then(|i| i16::try_from(i).ok())
            .map(Value::from)
            .ok_or_else(|| invalid(format!("{n} does not fit a 16-bit integer"))),
        (Json::String(s), ColumnType::Integer) => s
            .trim()
            .parse::<i32>()
            .map(Value::from)
            .map_err(|e| invalid(format!("'{s}' is not a 32-bit integer: {e}"))),
        (Json::String(s), ColumnType::SmallInteger) => s
            .trim()
            .parse::<i16>()
            .map(Value::from)
            .map_err(|e| invalid(format!("'{s}' is not a 16-bit integer: {e}"))),
        (Json::String(s), ColumnType::BigInteger) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| invalid(format!("'{s}' is not a 64-bit integer: {e}"))),
        (Json::String(s), ColumnType::Boolean) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(Value::from(true)),
            "false" | "f" | "0" => Ok(Value::from(false)),
            _ => Err(invalid(format!("'{s}' is not a boolean"))),
        },
        (Json::String(s), ColumnType::Uuid) => uuid::Uuid::parse_str(s)
            .map(Value::from)
            .map_err(|e| invalid(e.to_string())),
        (Json::Bool(b), _) => Ok(Value::from(*b)),
        (Json::Number(n), _) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                n.as_f64()
                    .map(Value::from)
                    .ok_or_else(|| invalid(format!("unsupported number {n}")))
            }
        }
        (Json::String(s), _) => Ok(Value::from(s.clone())),
        (Json::Null, _) => Err(invalid("null is not a bindable value".into())),
        (json @ (Json::Array(_) | Json::Object(_)), _) => Ok(Value::from(json.clone())),
    }
}
