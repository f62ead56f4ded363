//! ORDER BY clauses parsed from `"created_at desc, id"` style strings.

use std::str::FromStr;

use sea_orm::{EntityTrait, Order, QueryOrder};

use super::filter::resolve_column;
use crate::error::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        }
    }
}

/// Ordered list of `(column, direction)` terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBy(Vec<(String, Direction)>);

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self(vec![(column.into(), Direction::Asc)])
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self(vec![(column.into(), Direction::Desc)])
    }

    pub fn then(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.0.push((column.into(), direction));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn terms(&self) -> &[(String, Direction)] {
        &self.0
    }

    /// Append the terms to a query, resolving each column on `E`.
    pub(crate) fn apply<E, Q>(&self, mut query: Q) -> Result<Q, DbError>
    where
        E: EntityTrait,
        Q: QueryOrder,
    {
        for (name, direction) in &self.0 {
            let column = resolve_column::<E>(name)?;
            query = query.order_by(column, Order::from(*direction));
        }
        Ok(query)
    }
}

impl FromStr for OrderBy {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut terms = Vec::new();
        for term in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let mut words = term.split_whitespace();
            let column = words
                .next()
                .ok_or_else(|| DbError::InvalidOrder(term.to_string()))?;
            let direction = match words.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => Direction::Asc,
                Some("desc") => Direction::Desc,
                Some(other) => {
                    return Err(DbError::InvalidOrder(format!(
                        "unknown direction '{other}' in '{term}'"
                    )))
                }
            };
            if words.next().is_some() {
                return Err(DbError::InvalidOrder(format!("unexpected tokens in '{term}'")));
            }
            terms.push((column.to_string(), direction));
        }
        Ok(Self(terms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::user;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn parses_terms() {
        let order: OrderBy = "created_at desc, id".parse().unwrap();
        assert_eq!(
            order,
            OrderBy::desc("created_at").then("id", Direction::Asc)
        );
    }

    #[test]
    fn direction_is_case_insensitive() {
        let order: OrderBy = "name DESC".parse().unwrap();
        assert_eq!(order, OrderBy::desc("name"));
    }

    #[test]
    fn empty_string_is_unordered() {
        assert!("".parse::<OrderBy>().unwrap().is_empty());
        assert!("  , ".parse::<OrderBy>().unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_direction() {
        assert!(matches!(
            "name sideways".parse::<OrderBy>(),
            Err(DbError::InvalidOrder(_))
        ));
        assert!("name desc nulls".parse::<OrderBy>().is_err());
    }

    #[test]
    fn applies_to_select() {
        let order: OrderBy = "created_at desc, id".parse().unwrap();
        let sql = order
            .apply::<user::Entity, _>(user::Entity::find())
            .unwrap()
            .build(DbBackend::Postgres)
            .to_string();
        assert!(
            sql.ends_with(r#"ORDER BY "users"."created_at" DESC, "users"."id" ASC"#),
            "{sql}"
        );
    }

    #[test]
    fn apply_rejects_unknown_column() {
        let order = OrderBy::asc("missing");
        let err = order
            .apply::<user::Entity, _>(user::Entity::find())
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownColumn { .. }));
    }
}
