use db::{DbEngine, DbHandle};
use tracing::info;

const SQLITE_CITIES: &str = "\
CREATE TABLE IF NOT EXISTS cities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    population INTEGER NOT NULL
)";

const MYSQL_CITIES: &str = "\
CREATE TABLE IF NOT EXISTS cities (
    id BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    population BIGINT NOT NULL
)";

/// Create the `cities` table if it does not exist yet.
pub async fn ensure_schema(db: &DbHandle) -> db::Result<()> {
    let ddl = match db.engine() {
        DbEngine::Sqlite => SQLITE_CITIES,
        DbEngine::MySql => MYSQL_CITIES,
    };
    sqlx::query(ddl).execute(db.pool()).await?;
    info!(engine = ?db.engine(), "cities schema ready");
    Ok(())
}
