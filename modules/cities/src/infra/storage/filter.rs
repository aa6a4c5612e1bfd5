//! `CityFilter` → parameterized `WHERE` clause.
//!
//! Placeholders are positional `?`, so the argument vector must follow the
//! fragment order exactly: id, name, population, population_gte,
//! population_lte, then limit/offset.

use crate::contract::model::CityFilter;

/// Always-true base predicate; keeps "no filters" on the same code path.
pub const BASE_PREDICATE: &str = "1 = 1";

/// SQLite and MySQL both accept this as "no limit".
const UNBOUNDED_LIMIT: i64 = i64::MAX;

/// A value bound to one `?` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlArg {
    Int(i64),
    Text(String),
}

/// Composed predicate plus its arguments, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhereClause {
    pub sql: String,
    pub args: Vec<SqlArg>,
}

pub fn compose_where(filter: &CityFilter) -> WhereClause {
    let mut fragments = vec![BASE_PREDICATE];
    let mut args = Vec::new();

    if let Some(id) = filter.id {
        fragments.push("id = ?");
        args.push(SqlArg::Int(id));
    }
    if let Some(name) = &filter.name {
        fragments.push("name = ?");
        args.push(SqlArg::Text(name.clone()));
    }
    if let Some(population) = filter.population {
        fragments.push("population = ?");
        args.push(SqlArg::Int(population));
    }
    if let Some(population) = filter.population_gte {
        fragments.push("population >= ?");
        args.push(SqlArg::Int(population));
    }
    if let Some(population) = filter.population_lte {
        fragments.push("population <= ?");
        args.push(SqlArg::Int(population));
    }

    WhereClause {
        sql: fragments.join(" AND "),
        args,
    }
}

/// Full `SELECT` for a filter: composed predicate, ascending id, then
/// optional pagination.
pub fn select_cities_sql(filter: &CityFilter) -> (String, Vec<SqlArg>) {
    let WhereClause { sql: predicate, mut args } = compose_where(filter);

    let mut sql = format!(
        "SELECT id, name, population FROM cities WHERE {predicate} ORDER BY id ASC"
    );

    match (filter.limit, filter.offset) {
        (None, None) => {}
        (limit, offset) => {
            sql.push_str(" LIMIT ?");
            args.push(SqlArg::Int(limit.map(i64::from).unwrap_or(UNBOUNDED_LIMIT)));
            if let Some(offset) = offset {
                sql.push_str(" OFFSET ?");
                args.push(SqlArg::Int(i64::from(offset)));
            }
        }
    }

    (sql, args)
}
