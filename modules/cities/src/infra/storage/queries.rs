//! Statements against the `cities` table.
//!
//! Every function takes a bare connection; callers pass `&mut *tx` so the
//! statement joins the caller's transaction. Driver errors are wrapped into
//! `DomainError::Internal` here, at the point of detection.

use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, AnyConnection, Row};

use crate::contract::model::{City, CityFilter};
use crate::domain::error::DomainError;
use crate::infra::storage::filter::{select_cities_sql, SqlArg};

fn bind_args<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    args: Vec<SqlArg>,
) -> Query<'q, Any, AnyArguments<'q>> {
    for arg in args {
        query = match arg {
            SqlArg::Int(v) => query.bind(v),
            SqlArg::Text(v) => query.bind(v),
        };
    }
    query
}

fn city_from_row(row: &AnyRow) -> Result<City, sqlx::Error> {
    Ok(City {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        population: row.try_get("population")?,
    })
}

/// Insert and return the generated id.
pub async fn insert_city(conn: &mut AnyConnection, city: &City) -> Result<i64, DomainError> {
    let res = sqlx::query("INSERT INTO cities (name, population) VALUES (?, ?)")
        .bind(city.name.clone())
        .bind(city.population)
        .execute(&mut *conn)
        .await
        .map_err(|e| DomainError::storage("failed to insert city", e))?;

    // MySQL reports the id on the result; SQLite under `Any` does not.
    match res.last_insert_id() {
        Some(id) => Ok(id),
        None => last_insert_rowid(conn).await,
    }
}

/// SQLite's rowid of the last insert on this connection.
async fn last_insert_rowid(conn: &mut AnyConnection) -> Result<i64, DomainError> {
    let row = sqlx::query("SELECT last_insert_rowid() AS id")
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| DomainError::storage("failed to retrieve generated city id", e))?;
    row.try_get("id")
        .map_err(|e| DomainError::storage("failed to retrieve generated city id", e))
}

/// Returns the number of deleted rows.
pub async fn delete_city_by_id(conn: &mut AnyConnection, id: i64) -> Result<u64, DomainError> {
    let res = sqlx::query("DELETE FROM cities WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DomainError::storage("failed to delete city", e))?;
    Ok(res.rows_affected())
}

pub async fn update_population(
    conn: &mut AnyConnection,
    id: i64,
    population: i64,
) -> Result<u64, DomainError> {
    let res = sqlx::query("UPDATE cities SET population = ? WHERE id = ?")
        .bind(population)
        .bind(id)
        .execute(&mut *conn)
        .await
        .map_err(|e| DomainError::storage("failed to update city", e))?;
    Ok(res.rows_affected())
}

/// All rows matching `filter`, ascending id.
pub async fn select_cities(
    conn: &mut AnyConnection,
    filter: &CityFilter,
) -> Result<Vec<City>, DomainError> {
    let (sql, args) = select_cities_sql(filter);

    let rows = bind_args(sqlx::query(&sql), args)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DomainError::storage("failed to query cities", e))?;

    rows.iter()
        .map(city_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DomainError::storage("failed to scan city", e))
}

/// Id of the last row, in ascending id order, named `name`.
///
/// Duplicate names are allowed; the scan keeps overwriting so the highest
/// id wins.
pub async fn select_last_id_by_name(
    conn: &mut AnyConnection,
    name: &str,
) -> Result<Option<i64>, DomainError> {
    let rows = sqlx::query("SELECT id FROM cities WHERE name = ? ORDER BY id ASC")
        .bind(name.to_owned())
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| DomainError::storage("failed to look up city id", e))?;

    let mut last = None;
    for row in &rows {
        let id: i64 = row
            .try_get("id")
            .map_err(|e| DomainError::storage("failed to scan city id", e))?;
        last = Some(id);
    }
    Ok(last)
}
