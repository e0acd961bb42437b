use crate::{Result, StoreError};
use core::str::FromStr;
use core::time::Duration;
use numgen::{Number, NumberStore};
use sqlx::{
    QueryBuilder, Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};
use std::path::Path;

/// Rows per `INSERT` statement. Two bind parameters per row keeps every
/// statement well below SQLite's bound-variable limit.
pub const INSERT_BATCH_ROWS: usize = 5_000;

/// [`NumberStore`] backed by a SQLite database.
///
/// The schema is ensured on construction, so a freshly opened store is ready
/// for [`NumberStore::save_all`].
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        Self::with_options(options, SqlitePoolOptions::new().max_connections(4)).await
    }

    /// Opens the database named by a `sqlite:` URL, e.g.
    /// `sqlite://numbers.db`.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        Self::with_options(options, SqlitePoolOptions::new().max_connections(4)).await
    }

    /// Opens a private in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::with_options(options, pool).await
    }

    async fn with_options(
        options: SqliteConnectOptions,
        pool_options: SqlitePoolOptions,
    ) -> Result<Self> {
        let pool = pool_options
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options.busy_timeout(Duration::from_secs(5)))
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of stored records.
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Number")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn into_numbers(rows: Vec<(i32, i32)>) -> Result<Vec<Number>> {
    rows.into_iter()
        .map(|(value, flag)| {
            Number::from_flag(value, flag).ok_or(StoreError::InvalidFlag { value, flag })
        })
        .collect()
}

impl NumberStore for SqliteStore {
    type Error = StoreError;

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS Number (
                Value INTEGER NOT NULL,
                IsPrime INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        #[cfg(feature = "tracing")]
        tracing::info!("Ensured 'Number' table exists");
        Ok(())
    }

    async fn save_all(&self, records: &[Number]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for chunk in records.chunks(INSERT_BATCH_ROWS) {
            let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO Number (Value, IsPrime) ");
            builder.push_values(chunk, |mut row, number| {
                row.push_bind(number.value).push_bind(number.prime_flag());
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        #[cfg(feature = "tracing")]
        tracing::info!(count = records.len(), "Saved numbers");
        Ok(())
    }

    async fn fetch_first(&self, count: usize) -> Result<Vec<Number>> {
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        let rows: Vec<(i32, i32)> =
            sqlx::query_as("SELECT Value, IsPrime FROM Number ORDER BY rowid LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(requested = count, fetched = rows.len(), "Fetched numbers");
        into_numbers(rows)
    }

    async fn fetch_all(&self) -> Result<Vec<Number>> {
        let rows: Vec<(i32, i32)> =
            sqlx::query_as("SELECT Value, IsPrime FROM Number ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(fetched = rows.len(), "Fetched all numbers");
        into_numbers(rows)
    }

    async fn delete_all(&self) -> Result<u64> {
        let removed = sqlx::query("DELETE FROM Number")
            .execute(&self.pool)
            .await?
            .rows_affected();

        #[cfg(feature = "tracing")]
        tracing::info!(removed, "Deleted all numbers");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numgen::{GenerationConfig, ProducerOrchestrator};

    async fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(tmp.path().join("numbers.db")).await.unwrap();
        (tmp, store)
    }

    fn sorted(mut records: Vec<Number>) -> Vec<Number> {
        records.sort();
        records
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let (_tmp, store) = temp_store().await;
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn save_then_fetch_all_round_trips() {
        let (_tmp, store) = temp_store().await;
        let records: Vec<_> = [-13, -2, 1, 2, 4, 4, 97, 100]
            .into_iter()
            .map(Number::classify)
            .collect();

        store.save_all(&records).await.unwrap();

        let fetched = store.fetch_all().await.unwrap();
        assert_eq!(sorted(fetched), sorted(records));
    }

    #[tokio::test]
    async fn large_batches_span_several_statements() {
        let (_tmp, store) = temp_store().await;
        let records: Vec<_> = (0..(INSERT_BATCH_ROWS as i32 * 2 + 17))
            .map(Number::classify)
            .collect();

        store.save_all(&records).await.unwrap();

        assert_eq!(store.count().await.unwrap(), records.len() as u64);
        assert_eq!(store.fetch_all().await.unwrap(), records);
    }

    #[tokio::test]
    async fn fetch_first_limits_in_insertion_order() {
        let (_tmp, store) = temp_store().await;
        let records: Vec<_> = (10..20).map(Number::classify).collect();
        store.save_all(&records).await.unwrap();

        assert_eq!(store.fetch_first(3).await.unwrap(), records[..3].to_vec());
        assert_eq!(store.fetch_first(0).await.unwrap(), Vec::new());
        assert_eq!(store.fetch_first(usize::MAX).await.unwrap(), records);
    }

    #[tokio::test]
    async fn delete_all_reports_removed_rows() {
        let (_tmp, store) = temp_store().await;
        let records: Vec<_> = (0..25).map(Number::classify).collect();
        store.save_all(&records).await.unwrap();

        assert_eq!(store.delete_all().await.unwrap(), 25);
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(store.delete_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_batch_is_rolled_back() {
        let (_tmp, store) = temp_store().await;
        sqlx::query(
            r#"
            CREATE TRIGGER reject_sentinel BEFORE INSERT ON Number
            WHEN NEW.Value = -1
            BEGIN
                SELECT RAISE(ABORT, 'sentinel');
            END
            "#,
        )
        .execute(store.pool())
        .await
        .unwrap();

        let mut records: Vec<_> = (0..(INSERT_BATCH_ROWS as i32 + 10))
            .map(Number::classify)
            .collect();
        records.push(Number::classify(-1));

        let err = store.save_all(&records).await.unwrap_err();

        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn invalid_flag_is_reported() {
        let (_tmp, store) = temp_store().await;
        sqlx::query("INSERT INTO Number (Value, IsPrime) VALUES (5, 3)")
            .execute(store.pool())
            .await
            .unwrap();

        let err = store.fetch_all().await.unwrap_err();

        assert!(matches!(err, StoreError::InvalidFlag { value: 5, flag: 3 }));
    }

    #[tokio::test]
    async fn in_memory_store_keeps_data_across_calls() {
        let store = SqliteStore::in_memory().await.unwrap();
        store.save_all(&[Number::classify(3)]).await.unwrap();
        store.save_all(&[Number::classify(-3)]).await.unwrap();

        let fetched = store.fetch_all().await.unwrap();
        assert_eq!(fetched, vec![Number::new(3, true), Number::new(-3, false)]);
    }

    #[tokio::test]
    async fn connect_by_url() {
        let tmp = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", tmp.path().join("url.db").display());

        let store = SqliteStore::connect(&url).await.unwrap();
        store.save_all(&[Number::classify(7)]).await.unwrap();
        store.close().await;

        let reopened = SqliteStore::connect(&url).await.unwrap();
        assert_eq!(reopened.fetch_all().await.unwrap(), vec![Number::new(7, true)]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn orchestrated_run_persists_classified_multiset() {
        let (_tmp, store) = temp_store().await;
        let config = GenerationConfig::new(4_000, 1_000, 50_000).unwrap();
        let orchestrator = ProducerOrchestrator::new(config);
        orchestrator.start().await.unwrap();

        let saved = orchestrator.save(&store).await.unwrap();

        assert_eq!(saved, 4_000);
        let expected: Vec<_> = orchestrator
            .buffer()
            .snapshot()
            .into_iter()
            .map(Number::classify)
            .collect();
        assert_eq!(sorted(store.fetch_all().await.unwrap()), sorted(expected));
        assert!(
            store
                .fetch_all()
                .await
                .unwrap()
                .iter()
                .filter(|n| n.value < 0)
                .all(|n| !n.is_prime)
        );
    }
}
