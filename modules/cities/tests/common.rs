use std::sync::Arc;

use cities::domain::service::Service;
use cities::infra::storage::ensure_schema;
use db::{ConnectOpts, DbHandle};
use sqlx::Row;
use tempfile::TempDir;

/// A service over a fresh SQLite file; the directory lives as long as this value.
pub struct TestDb {
    pub db: Arc<DbHandle>,
    pub service: Arc<Service>,
    _dir: TempDir,
}

pub async fn setup() -> TestDb {
    let dir = TempDir::new().expect("tempdir");
    let dsn = format!("sqlite://{}?mode=rwc", dir.path().join("cities.db").display());

    let db = Arc::new(
        DbHandle::connect(&dsn, ConnectOpts::default())
            .await
            .expect("connect sqlite"),
    );
    ensure_schema(&db).await.expect("create schema");

    TestDb {
        service: Arc::new(Service::new(db.clone())),
        db,
        _dir: dir,
    }
}

/// Insert a row directly, bypassing entity validation.
#[allow(dead_code)]
pub async fn insert_raw(db: &DbHandle, name: &str, population: i64) -> i64 {
    let row = sqlx::query("INSERT INTO cities (name, population) VALUES (?, ?) RETURNING id")
        .bind(name.to_owned())
        .bind(population)
        .fetch_one(db.pool())
        .await
        .expect("raw insert");
    row.try_get("id").expect("generated id")
}
