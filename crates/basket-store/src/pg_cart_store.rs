//! `PostgreSQL` implementation of the `CartStore` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use basket_core::error::DomainError;
use basket_core::store::{CartSnapshot, CartStore, SessionKey};

type SnapshotRow = (Uuid, i64, serde_json::Value, DateTime<Utc>);

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("cart store query failed: {err}"))
}

/// PostgreSQL-backed cart store. One row per session key, overwritten on
/// every save.
#[derive(Debug, Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Creates a new `PgCartStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled migrations.
    ///
    /// # Errors
    ///
    /// Returns the migration error if a migration fails to apply.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn load(&self, key: &SessionKey) -> Result<Option<CartSnapshot>, DomainError> {
        let row: Option<SnapshotRow> = sqlx::query_as(
            r"
            SELECT cart_id, version, items, saved_at
            FROM cart_snapshots
            WHERE session_key = $1
            ",
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(row.map(|(cart_id, version, items, saved_at)| CartSnapshot {
            cart_id,
            version,
            items,
            saved_at,
        }))
    }

    async fn save(&self, key: &SessionKey, snapshot: &CartSnapshot) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO cart_snapshots (session_key, cart_id, version, items, saved_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (session_key) DO UPDATE
            SET cart_id = EXCLUDED.cart_id,
                version = EXCLUDED.version,
                items = EXCLUDED.items,
                saved_at = EXCLUDED.saved_at
            ",
        )
        .bind(key.as_str())
        .bind(snapshot.cart_id)
        .bind(snapshot.version)
        .bind(&snapshot.items)
        .bind(snapshot.saved_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;

        debug!(session_key = %key, version = snapshot.version, "saved cart snapshot");
        Ok(())
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM cart_snapshots WHERE session_key = $1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}
