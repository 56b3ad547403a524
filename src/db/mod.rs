//! Database module
//!
//! Embedded SurrealDB: RocksDB-backed for the server binary, in-memory for
//! tests. Schema setup defines the unique email index and re-syncs the
//! product id counter against existing data.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "snackaroo";
const DATABASE: &str = "store";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at `path`
    pub async fn new(path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::setup(db).await
    }

    /// In-memory database, used by the test suites
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::setup(db).await
    }

    async fn setup(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        // Store-level duplicate protection for signup
        db.query("DEFINE INDEX IF NOT EXISTS user_email ON TABLE user FIELDS email UNIQUE")
            .await
            .map_err(|e| AppError::database(format!("Failed to define email index: {e}")))?;

        Self::sync_product_counter(&db).await?;

        tracing::info!("Database ready (ns={NAMESPACE}, db={DATABASE})");
        Ok(Self { db })
    }

    /// Make sure `counter:product` is at least the current max product id,
    /// so ids stay monotonic across restarts and imported data.
    async fn sync_product_counter(db: &Surreal<Db>) -> Result<(), AppError> {
        let mut result = db
            .query("SELECT VALUE product_id FROM product ORDER BY product_id DESC LIMIT 1")
            .query("SELECT VALUE value FROM counter:product")
            .await
            .map_err(|e| AppError::database(format!("Counter sync query failed: {e}")))?;

        let max_id: Option<i64> = result
            .take::<Vec<i64>>(0)
            .map_err(|e| AppError::database(e.to_string()))?
            .into_iter()
            .next();
        let counter: Option<i64> = result
            .take::<Vec<i64>>(1)
            .map_err(|e| AppError::database(e.to_string()))?
            .into_iter()
            .next();

        if let Some(max_id) = max_id {
            if counter.unwrap_or(0) < max_id {
                db.query("UPSERT counter:product SET value = $max")
                    .bind(("max", max_id))
                    .await
                    .map_err(|e| AppError::database(format!("Counter sync failed: {e}")))?;
                tracing::info!(max_id, "Product id counter re-synced");
            }
        }

        Ok(())
    }
}
