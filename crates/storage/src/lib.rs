use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{
    CatalogueSummary, Festival, FestivalId, FestivalInput, Performer, PerformerId,
    PerformerInput,
};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to apply catalogue migrations")?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn summary(&self) -> Result<CatalogueSummary> {
        Ok(CatalogueSummary {
            performers: self.count_performers().await?,
            festivals: self.count_festivals().await?,
        })
    }

    pub async fn create_festival(&self, input: &FestivalInput) -> Result<FestivalId> {
        let rec = sqlx::query(
            "INSERT INTO festivals (name, start_date, end_date, location) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&input.name)
        .bind(input.start)
        .bind(input.end)
        .bind(&input.location)
        .fetch_one(&self.pool)
        .await?;
        Ok(FestivalId(rec.get::<i64, _>(0)))
    }

    pub async fn get_festival(&self, festival_id: FestivalId) -> Result<Option<Festival>> {
        let row = sqlx::query(
            "SELECT id, name, start_date, end_date, location FROM festivals WHERE id = ?",
        )
        .bind(festival_id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(festival_from_row))
    }

    pub async fn list_festivals(&self) -> Result<Vec<Festival>> {
        let rows = sqlx::query(
            "SELECT id, name, start_date, end_date, location FROM festivals ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(festival_from_row).collect())
    }

    pub async fn count_festivals(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM festivals")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Returns `false` when no festival has the given id.
    pub async fn update_festival(
        &self,
        festival_id: FestivalId,
        input: &FestivalInput,
    ) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE festivals SET name = ?, start_date = ?, end_date = ?, location = ? WHERE id = ?",
        )
        .bind(&input.name)
        .bind(input.start)
        .bind(input.end)
        .bind(&input.location)
        .bind(festival_id.0)
        .execute(&self.pool)
        .await?
        .rows_affected();
        Ok(updated > 0)
    }

    /// Deletes a festival. Performers that referenced it are kept and lose
    /// their festival reference within the same transaction.
    pub async fn delete_festival(&self, festival_id: FestivalId) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin festival delete")?;

        let detached = sqlx::query("UPDATE performers SET festival_id = NULL WHERE festival_id = ?")
            .bind(festival_id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query("DELETE FROM festivals WHERE id = ?")
            .bind(festival_id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit()
            .await
            .context("failed to commit festival delete")?;
        debug!(festival_id = festival_id.0, detached, deleted, "festival delete applied");
        Ok(deleted > 0)
    }

    pub async fn create_performer(&self, input: &PerformerInput) -> Result<PerformerId> {
        let rec = sqlx::query(
            "INSERT INTO performers (name, is_band, festival_id) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&input.name)
        .bind(input.is_band)
        .bind(input.festival.map(|id| id.0))
        .fetch_one(&self.pool)
        .await?;
        Ok(PerformerId(rec.get::<i64, _>(0)))
    }

    pub async fn get_performer(&self, performer_id: PerformerId) -> Result<Option<Performer>> {
        let row = sqlx::query(
            "SELECT id, name, is_band, festival_id FROM performers WHERE id = ?",
        )
        .bind(performer_id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(performer_from_row))
    }

    pub async fn list_performers(&self) -> Result<Vec<Performer>> {
        let rows = sqlx::query(
            "SELECT id, name, is_band, festival_id FROM performers ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(performer_from_row).collect())
    }

    pub async fn list_performers_for_festival(
        &self,
        festival_id: FestivalId,
    ) -> Result<Vec<Performer>> {
        let rows = sqlx::query(
            "SELECT id, name, is_band, festival_id FROM performers WHERE festival_id = ? ORDER BY id ASC",
        )
        .bind(festival_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(performer_from_row).collect())
    }

    pub async fn count_performers(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM performers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Returns `false` when no performer has the given id.
    pub async fn update_performer(
        &self,
        performer_id: PerformerId,
        input: &PerformerInput,
    ) -> Result<bool> {
        let updated =
            sqlx::query("UPDATE performers SET name = ?, is_band = ?, festival_id = ? WHERE id = ?")
                .bind(&input.name)
                .bind(input.is_band)
                .bind(input.festival.map(|id| id.0))
                .bind(performer_id.0)
                .execute(&self.pool)
                .await?
                .rows_affected();
        Ok(updated > 0)
    }

    pub async fn delete_performer(&self, performer_id: PerformerId) -> Result<bool> {
        let deleted = sqlx::query("DELETE FROM performers WHERE id = ?")
            .bind(performer_id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}

/// Whether a write failed because it referenced a festival that does not
/// exist. The check runs inside the writing statement, so it also catches a
/// festival deleted by a concurrent request.
pub fn is_missing_festival(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(sqlx::Error::as_database_error)
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

fn festival_from_row(r: &SqliteRow) -> Festival {
    Festival {
        id: FestivalId(r.get::<i64, _>(0)),
        name: r.get::<String, _>(1),
        start: r.get::<Option<NaiveDate>, _>(2),
        end: r.get::<Option<NaiveDate>, _>(3),
        location: r.get::<String, _>(4),
    }
}

fn performer_from_row(r: &SqliteRow) -> Performer {
    Performer {
        id: PerformerId(r.get::<i64, _>(0)),
        name: r.get::<String, _>(1),
        is_band: r.get::<bool, _>(2),
        festival: r.get::<Option<i64>, _>(3).map(FestivalId),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.starts_with("sqlite::memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() || path == ":memory:" {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
