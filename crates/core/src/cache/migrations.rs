//! Schema migrations for the clubwatch store.
//!
//! Applied migrations are recorded with their name in `_migrations`. Opening
//! a store whose history disagrees with this build fails instead of guessing.

use tokio_rusqlite::{Connection, params, rusqlite};

use super::Error;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "cache_records", sql: include_str!("../../migrations/001_cache_records.sql") },
    Migration { version: 2, name: "entities", sql: include_str!("../../migrations/002_entities.sql") },
];

fn applied(conn: &rusqlite::Connection) -> Result<Vec<(i64, String)>, Error> {
    let mut stmt = conn.prepare("SELECT version, name FROM _migrations ORDER BY version")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect::<Result<_, _>>().map_err(Error::from)
}

/// Check recorded history against the known list and return the current version.
fn verify(history: &[(i64, String)]) -> Result<i64, Error> {
    for (version, name) in history {
        match MIGRATIONS.iter().find(|m| m.version == *version) {
            Some(m) if m.name == name.as_str() => {}
            Some(m) => {
                return Err(Error::MigrationFailed(format!(
                    "migration {version} recorded as '{name}', expected '{}'",
                    m.name
                )));
            }
            None => {
                return Err(Error::MigrationFailed(format!(
                    "store has migration {version} ('{name}') unknown to this build"
                )));
            }
        }
    }
    Ok(history.last().map_or(0, |(version, _)| *version))
}

/// Apply pending migrations, each in its own transaction.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current = verify(&applied(conn)?)?;

        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql)
                .map_err(|e| Error::MigrationFailed(format!("{} ({}): {e}", migration.version, migration.name)))?;
            tx.execute(
                "INSERT INTO _migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![migration.version, migration.name, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::info!(version = migration.version, name = migration.name, "applied migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
