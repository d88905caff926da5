//! # Platform Repository
//!
//! Database operations for sales platforms.
//!
//! Platform edits never touch existing sales: each sale keeps the name and
//! commission it was last calculated with until it is edited again.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use margin_core::validation::ValidPlatform;
use margin_core::{Patch, Platform, PlatformChanges, PlatformLookup};

/// Platforms inserted into an empty database: `(name, fixed fee cents, commission bps)`.
pub const DEFAULT_PLATFORMS: &[(&str, i64, i64)] = &[
    ("Shopee", 500, 1200),
    ("Mercado Livre", 600, 1500),
    ("Instagram", 0, 0),
    ("Direto", 0, 0),
    ("WhatsApp", 0, 0),
];

/// Repository for platform database operations.
#[derive(Debug, Clone)]
pub struct PlatformRepository {
    pool: SqlitePool,
}

impl PlatformRepository {
    /// Creates a new PlatformRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PlatformRepository { pool }
    }

    /// Lists all platforms ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Platform>> {
        let platforms = sqlx::query_as::<_, Platform>(
            r#"
            SELECT id, name, fixed_fee_cents, commission_bps, created_at, updated_at
            FROM platforms
            ORDER BY name COLLATE NOCASE, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = platforms.len(), "Listed platforms");
        Ok(platforms)
    }

    /// Gets a platform by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Platform>> {
        let platform = sqlx::query_as::<_, Platform>(
            r#"
            SELECT id, name, fixed_fee_cents, commission_bps, created_at, updated_at
            FROM platforms
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(platform)
    }

    /// Inserts a validated platform with a fresh id.
    pub async fn insert(&self, input: ValidPlatform) -> DbResult<Platform> {
        let now = Utc::now();
        let platform = Platform {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            fixed_fee_cents: input.fixed_fee_cents,
            commission_bps: input.commission_bps,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %platform.id, name = %platform.name, "Inserting platform");

        sqlx::query(
            r#"
            INSERT INTO platforms (id, name, fixed_fee_cents, commission_bps, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&platform.id)
        .bind(&platform.name)
        .bind(platform.fixed_fee_cents)
        .bind(platform.commission_bps)
        .bind(platform.created_at)
        .bind(platform.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %platform.id, name = %platform.name, "Platform created");
        Ok(platform)
    }

    /// Applies the supplied fields of a validated change set.
    ///
    /// ## Errors
    /// `DbError::NotFound` when no platform has this id.
    pub async fn update(&self, id: &str, changes: &PlatformChanges) -> DbResult<Platform> {
        let mut query: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("UPDATE platforms SET updated_at = ");
        query.push_bind(Utc::now());

        if let Patch::Set(name) = &changes.name {
            query.push(", name = ").push_bind(name.clone());
        }
        if let Patch::Set(fee) = changes.fixed_fee_cents {
            query.push(", fixed_fee_cents = ").push_bind(fee);
        }
        if let Patch::Set(commission) = changes.commission_bps {
            query.push(", commission_bps = ").push_bind(commission);
        }

        query.push(" WHERE id = ").push_bind(id.to_string());
        query.push(" RETURNING id, name, fixed_fee_cents, commission_bps, created_at, updated_at");

        let platform = query
            .build_query_as::<Platform>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Platform", id))?;

        info!(id = %platform.id, "Platform updated");
        Ok(platform)
    }

    /// Deletes a platform. Sales referencing it are left as they are.
    ///
    /// ## Errors
    /// `DbError::NotFound` when no platform has this id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM platforms WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Platform", id));
        }

        info!(id = %id, "Platform deleted");
        Ok(())
    }

    /// Counts platforms.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM platforms")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Inserts [`DEFAULT_PLATFORMS`].
    pub async fn seed_defaults(&self) -> DbResult<Vec<Platform>> {
        let mut inserted = Vec::with_capacity(DEFAULT_PLATFORMS.len());

        for (name, fee, commission) in DEFAULT_PLATFORMS {
            let platform = self
                .insert(ValidPlatform {
                    name: name.to_string(),
                    fixed_fee_cents: *fee,
                    commission_bps: *commission,
                })
                .await?;
            inserted.push(platform);
        }

        Ok(inserted)
    }

    /// Inserts [`DEFAULT_PLATFORMS`] when the table is empty.
    ///
    /// Returns the number of platforms inserted.
    pub async fn seed_defaults_if_empty(&self) -> DbResult<usize> {
        let existing = self.count().await?;
        if existing > 0 {
            debug!(existing, "Platforms present, skipping default seed");
            return Ok(0);
        }

        let inserted = self.seed_defaults().await?;
        info!(count = inserted.len(), "Seeded default platforms");
        Ok(inserted.len())
    }
}

#[async_trait]
impl PlatformLookup for PlatformRepository {
    type Error = DbError;

    async fn find_platform_by_id(&self, id: &str) -> Result<Option<Platform>, DbError> {
        debug!(id = %id, "Looking up platform");
        self.get_by_id(id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
