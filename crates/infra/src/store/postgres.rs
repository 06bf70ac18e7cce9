//! Postgres-backed stores (feature `postgres`).
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE companies (
//!     id          UUID PRIMARY KEY,
//!     name        TEXT NOT NULL,
//!     website     TEXT,
//!     description TEXT,
//!     created_at  TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE products (
//!     id          UUID PRIMARY KEY,
//!     company_id  UUID NOT NULL REFERENCES companies(id),
//!     name        TEXT NOT NULL,
//!     description TEXT,
//!     url         TEXT,
//!     created_at  TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE content_items (
//!     id          UUID PRIMARY KEY,
//!     company_id  UUID NOT NULL REFERENCES companies(id),
//!     product_id  UUID REFERENCES products(id),
//!     title       TEXT NOT NULL,
//!     brief       TEXT,
//!     created_at  TIMESTAMPTZ NOT NULL
//! );
//! CREATE TABLE social_posts (
//!     id              UUID PRIMARY KEY,
//!     content_item_id UUID NOT NULL REFERENCES content_items(id),
//!     channel         TEXT NOT NULL,
//!     body            TEXT NOT NULL,
//!     cta_text        TEXT,
//!     cta_url         TEXT,
//!     hashtags        JSONB NOT NULL DEFAULT '[]',
//!     status          TEXT NOT NULL,
//!     scheduled_for   TIMESTAMPTZ,
//!     published_at    TIMESTAMPTZ,
//!     created_at      TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX social_posts_due ON social_posts (scheduled_for)
//!     WHERE status = 'SCHEDULED';
//! CREATE TABLE schedules (
//!     id              UUID PRIMARY KEY,
//!     company_id      UUID NOT NULL REFERENCES companies(id),
//!     channel         TEXT NOT NULL,
//!     enabled         BOOLEAN NOT NULL,
//!     posts_per_week  SMALLINT NOT NULL,
//!     preferred_days  JSONB NOT NULL DEFAULT '[]',
//!     preferred_hours JSONB NOT NULL DEFAULT '[]',
//!     timezone        TEXT NOT NULL,
//!     randomize       BOOLEAN NOT NULL,
//!     created_at      TIMESTAMPTZ NOT NULL,
//!     UNIQUE (company_id, channel)
//! );
//! ```
//!
//! The store traits are synchronous; these implementations bridge into the
//! ambient tokio runtime. Conditional transitions are single `UPDATE ...
//! WHERE status = ...` statements, so the status/field pairs change atomically
//! and claim races are decided by the database.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use postpilot_core::{CompanyId, ContentItemId, DomainError, ProductId, ScheduleId, SocialPostId};
use postpilot_content::{Channel, Company, ContentItem, PostStatus, Product, SocialPost};
use postpilot_scheduling::{Cadence, Schedule};

use super::{ContentStore, PostStore, ScheduleStore, StoreError};

fn map_sqlx_error(op: &str, e: sqlx::Error) -> StoreError {
    StoreError::Storage(format!("{op}: {e}"))
}

fn block_on<F: std::future::Future>(fut: F) -> Result<F::Output, StoreError> {
    let handle = tokio::runtime::Handle::try_current().map_err(|_| {
        StoreError::Storage("Postgres stores require a tokio runtime".to_string())
    })?;
    Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
}

fn json_to_u8s(value: serde_json::Value) -> Result<Vec<u8>, StoreError> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::Storage(format!("malformed number array: {e}")))
}

/// Postgres-backed post store.
#[derive(Debug, Clone)]
pub struct PostgresPostStore {
    pool: Arc<PgPool>,
}

impl PostgresPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    fn decode_post(row: &sqlx::postgres::PgRow) -> Result<SocialPost, StoreError> {
        let channel: String = row.try_get("channel").map_err(|e| map_sqlx_error("decode", e))?;
        let status: String = row.try_get("status").map_err(|e| map_sqlx_error("decode", e))?;
        let hashtags: serde_json::Value =
            row.try_get("hashtags").map_err(|e| map_sqlx_error("decode", e))?;
        let hashtags: Vec<String> = serde_json::from_value(hashtags)
            .map_err(|e| StoreError::Storage(format!("malformed hashtags: {e}")))?;

        let post = SocialPost::restore(
            SocialPostId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error("decode", e))?),
            ContentItemId::from_uuid(
                row.try_get("content_item_id")
                    .map_err(|e| map_sqlx_error("decode", e))?,
            ),
            channel.parse::<Channel>()?,
            row.try_get("body").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("cta_text").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("cta_url").map_err(|e| map_sqlx_error("decode", e))?,
            hashtags,
            status.parse::<PostStatus>()?,
            row.try_get("scheduled_for").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("published_at").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("created_at").map_err(|e| map_sqlx_error("decode", e))?,
        )?;
        Ok(post)
    }

    async fn fetch_posts(&self, query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>) -> Result<Vec<SocialPost>, StoreError> {
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("fetch_posts", e))?;
        rows.iter().map(Self::decode_post).collect()
    }

    async fn insert_async(&self, post: SocialPost) -> Result<SocialPostId, StoreError> {
        let id = post.id_typed();
        sqlx::query(
            r#"
            INSERT INTO social_posts
                (id, content_item_id, channel, body, cta_text, cta_url,
                 hashtags, status, scheduled_for, published_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(id.as_uuid())
        .bind(post.content_item_id().as_uuid())
        .bind(post.channel().as_str())
        .bind(post.body())
        .bind(post.cta_text())
        .bind(post.cta_url())
        .bind(serde_json::json!(post.hashtags()))
        .bind(post.status().as_str())
        .bind(post.scheduled_for())
        .bind(post.published_at())
        .bind(post.created_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::AlreadyExists(id.to_string())
            }
            e => map_sqlx_error("insert_post", e),
        })?;
        Ok(id)
    }

    async fn get_async(&self, id: SocialPostId) -> Result<Option<SocialPost>, StoreError> {
        let row = sqlx::query("SELECT * FROM social_posts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_post", e))?;
        row.as_ref().map(Self::decode_post).transpose()
    }

    /// Run a guarded UPDATE; 0 rows means the post is missing or in the wrong
    /// state. A follow-up existence check disambiguates the two.
    async fn guarded_update(
        &self,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
        id: SocialPostId,
        conflict: &str,
    ) -> Result<bool, StoreError> {
        let result = query
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_post", e))?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        match self.get_async(id).await? {
            Some(_) => Err(StoreError::Domain(DomainError::conflict(conflict.to_string()))),
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

impl PostStore for PostgresPostStore {
    fn insert(&self, post: SocialPost) -> Result<SocialPostId, StoreError> {
        block_on(self.insert_async(post))?
    }

    fn get(&self, id: SocialPostId) -> Result<Option<SocialPost>, StoreError> {
        block_on(self.get_async(id))?
    }

    fn list_for_content_item(&self, item: ContentItemId) -> Result<Vec<SocialPost>, StoreError> {
        block_on(self.fetch_posts(
            sqlx::query(
                "SELECT * FROM social_posts WHERE content_item_id = $1 ORDER BY created_at, id",
            )
            .bind(*item.as_uuid()),
        ))?
    }

    fn due_for_publish(&self, now: DateTime<Utc>) -> Result<Vec<SocialPost>, StoreError> {
        block_on(self.fetch_posts(
            sqlx::query(
                r#"
                SELECT * FROM social_posts
                WHERE status = 'SCHEDULED' AND scheduled_for <= $1
                ORDER BY scheduled_for, id
                "#,
            )
            .bind(now),
        ))?
    }

    fn transition_to_scheduled(
        &self,
        id: SocialPostId,
        slot: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        block_on(async {
            self.guarded_update(
                sqlx::query(
                    r#"
                    UPDATE social_posts
                    SET status = 'SCHEDULED', scheduled_for = $2
                    WHERE id = $1 AND status = 'DRAFT' AND scheduled_for IS NULL
                    "#,
                )
                .bind(id.as_uuid())
                .bind(slot),
                id,
                "only DRAFT posts can be scheduled",
            )
            .await
            .map(|_| ())
        })?
    }

    fn claim_for_publish(&self, id: SocialPostId) -> Result<bool, StoreError> {
        block_on(async {
            let result = sqlx::query(
                "UPDATE social_posts SET status = 'PUBLISHING' WHERE id = $1 AND status = 'SCHEDULED'",
            )
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("claim_post", e))?;

            if result.rows_affected() == 1 {
                return Ok(true);
            }
            // Lost the race (or the post is terminal): a skip, not an error,
            // unless the post does not exist at all.
            match self.get_async(id).await? {
                Some(_) => Ok(false),
                None => Err(StoreError::NotFound(id.to_string())),
            }
        })?
    }

    fn record_publish_result(
        &self,
        id: SocialPostId,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        block_on(async {
            let query = if success {
                sqlx::query(
                    r#"
                    UPDATE social_posts
                    SET status = 'PUBLISHED', published_at = $2, scheduled_for = NULL
                    WHERE id = $1 AND status IN ('SCHEDULED', 'PUBLISHING')
                    "#,
                )
                .bind(id.as_uuid())
                .bind(now)
            } else {
                sqlx::query(
                    r#"
                    UPDATE social_posts
                    SET status = 'FAILED', published_at = NULL, scheduled_for = NULL
                    WHERE id = $1 AND status IN ('SCHEDULED', 'PUBLISHING')
                    "#,
                )
                .bind(id.as_uuid())
            };

            self.guarded_update(query, id, "post has no publish attempt to record")
                .await
                .map(|_| ())
        })?
    }
}

/// Postgres-backed schedule store.
#[derive(Debug, Clone)]
pub struct PostgresScheduleStore {
    pool: Arc<PgPool>,
}

impl PostgresScheduleStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    fn decode_schedule(row: &sqlx::postgres::PgRow) -> Result<Schedule, StoreError> {
        let channel: String = row.try_get("channel").map_err(|e| map_sqlx_error("decode", e))?;
        let timezone: String = row.try_get("timezone").map_err(|e| map_sqlx_error("decode", e))?;
        let posts_per_week: i16 = row
            .try_get("posts_per_week")
            .map_err(|e| map_sqlx_error("decode", e))?;
        let days = json_to_u8s(row.try_get("preferred_days").map_err(|e| map_sqlx_error("decode", e))?)?;
        let hours =
            json_to_u8s(row.try_get("preferred_hours").map_err(|e| map_sqlx_error("decode", e))?)?;

        let cadence = Cadence::from_parts(
            u8::try_from(posts_per_week)
                .map_err(|_| StoreError::Storage("posts_per_week out of range".to_string()))?,
            days,
            hours,
            &timezone,
            row.try_get("randomize").map_err(|e| map_sqlx_error("decode", e))?,
        )?;

        Ok(Schedule::new(
            ScheduleId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error("decode", e))?),
            CompanyId::from_uuid(
                row.try_get("company_id").map_err(|e| map_sqlx_error("decode", e))?,
            ),
            channel.parse::<Channel>()?,
            row.try_get("enabled").map_err(|e| map_sqlx_error("decode", e))?,
            cadence,
            row.try_get("created_at").map_err(|e| map_sqlx_error("decode", e))?,
        ))
    }

    async fn list_async(
        &self,
        company: CompanyId,
        enabled_only: bool,
    ) -> Result<Vec<Schedule>, StoreError> {
        let sql = if enabled_only {
            "SELECT * FROM schedules WHERE company_id = $1 AND enabled ORDER BY channel"
        } else {
            "SELECT * FROM schedules WHERE company_id = $1 ORDER BY channel"
        };
        let rows = sqlx::query(sql)
            .bind(company.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_schedules", e))?;
        rows.iter().map(Self::decode_schedule).collect()
    }
}

impl ScheduleStore for PostgresScheduleStore {
    fn upsert(&self, schedule: Schedule) -> Result<ScheduleId, StoreError> {
        block_on(async {
            let id = schedule.id_typed();
            let cadence = schedule.cadence();
            sqlx::query(
                r#"
                INSERT INTO schedules
                    (id, company_id, channel, enabled, posts_per_week,
                     preferred_days, preferred_hours, timezone, randomize, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (company_id, channel) DO UPDATE SET
                    id = EXCLUDED.id,
                    enabled = EXCLUDED.enabled,
                    posts_per_week = EXCLUDED.posts_per_week,
                    preferred_days = EXCLUDED.preferred_days,
                    preferred_hours = EXCLUDED.preferred_hours,
                    timezone = EXCLUDED.timezone,
                    randomize = EXCLUDED.randomize
                "#,
            )
            .bind(id.as_uuid())
            .bind(schedule.company_id().as_uuid())
            .bind(schedule.channel().as_str())
            .bind(schedule.is_enabled())
            .bind(i16::from(cadence.posts_per_week()))
            .bind(serde_json::json!(cadence.preferred_days()))
            .bind(serde_json::json!(cadence.preferred_hours()))
            .bind(cadence.timezone().name())
            .bind(cadence.randomize())
            .bind(schedule.created_at())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("upsert_schedule", e))?;
            Ok(id)
        })?
    }

    fn get(&self, id: ScheduleId) -> Result<Option<Schedule>, StoreError> {
        block_on(async {
            let row = sqlx::query("SELECT * FROM schedules WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("get_schedule", e))?;
            row.as_ref().map(Self::decode_schedule).transpose()
        })?
    }

    fn list_for_company(&self, company: CompanyId) -> Result<Vec<Schedule>, StoreError> {
        block_on(self.list_async(company, false))?
    }

    fn enabled_for_company(&self, company: CompanyId) -> Result<Vec<Schedule>, StoreError> {
        block_on(self.list_async(company, true))?
    }

    fn delete(&self, id: ScheduleId) -> Result<(), StoreError> {
        block_on(async {
            let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("delete_schedule", e))?;
            if result.rows_affected() == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Ok(())
        })?
    }
}

/// Postgres-backed content store.
#[derive(Debug, Clone)]
pub struct PostgresContentStore {
    pool: Arc<PgPool>,
}

impl PostgresContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    fn decode_company(row: &sqlx::postgres::PgRow) -> Result<Company, StoreError> {
        Ok(Company::new(
            CompanyId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error("decode", e))?),
            row.try_get::<String, _>("name").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("website").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("description").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("created_at").map_err(|e| map_sqlx_error("decode", e))?,
        )?)
    }

    fn decode_product(row: &sqlx::postgres::PgRow) -> Result<Product, StoreError> {
        Ok(Product::new(
            ProductId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error("decode", e))?),
            CompanyId::from_uuid(
                row.try_get("company_id").map_err(|e| map_sqlx_error("decode", e))?,
            ),
            row.try_get::<String, _>("name").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("description").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("url").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("created_at").map_err(|e| map_sqlx_error("decode", e))?,
        )?)
    }

    fn decode_item(row: &sqlx::postgres::PgRow) -> Result<ContentItem, StoreError> {
        let product_id: Option<uuid::Uuid> =
            row.try_get("product_id").map_err(|e| map_sqlx_error("decode", e))?;
        Ok(ContentItem::new(
            ContentItemId::from_uuid(row.try_get("id").map_err(|e| map_sqlx_error("decode", e))?),
            CompanyId::from_uuid(
                row.try_get("company_id").map_err(|e| map_sqlx_error("decode", e))?,
            ),
            product_id.map(ProductId::from_uuid),
            row.try_get::<String, _>("title").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("brief").map_err(|e| map_sqlx_error("decode", e))?,
            row.try_get("created_at").map_err(|e| map_sqlx_error("decode", e))?,
        )?)
    }
}

impl ContentStore for PostgresContentStore {
    fn insert_company(&self, company: Company) -> Result<CompanyId, StoreError> {
        block_on(async {
            let id = company.id_typed();
            sqlx::query(
                r#"
                INSERT INTO companies (id, name, website, description, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id.as_uuid())
            .bind(company.name())
            .bind(company.website())
            .bind(company.description())
            .bind(company.created_at())
            .execute(&*self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::AlreadyExists(id.to_string())
                }
                e => map_sqlx_error("insert_company", e),
            })?;
            Ok(id)
        })?
    }

    fn get_company(&self, id: CompanyId) -> Result<Option<Company>, StoreError> {
        block_on(async {
            let row = sqlx::query("SELECT * FROM companies WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("get_company", e))?;
            row.as_ref().map(Self::decode_company).transpose()
        })?
    }

    fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        block_on(async {
            let rows = sqlx::query("SELECT * FROM companies ORDER BY created_at, id")
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("list_companies", e))?;
            rows.iter().map(Self::decode_company).collect()
        })?
    }

    fn insert_product(&self, product: Product) -> Result<ProductId, StoreError> {
        block_on(async {
            let id = product.id_typed();
            sqlx::query(
                r#"
                INSERT INTO products (id, company_id, name, description, url, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id.as_uuid())
            .bind(product.company_id().as_uuid())
            .bind(product.name())
            .bind(product.description())
            .bind(product.url())
            .bind(product.created_at())
            .execute(&*self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    StoreError::NotFound(product.company_id().to_string())
                }
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::AlreadyExists(id.to_string())
                }
                e => map_sqlx_error("insert_product", e),
            })?;
            Ok(id)
        })?
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        block_on(async {
            let row = sqlx::query("SELECT * FROM products WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("get_product", e))?;
            row.as_ref().map(Self::decode_product).transpose()
        })?
    }

    fn list_products(&self, company: CompanyId) -> Result<Vec<Product>, StoreError> {
        block_on(async {
            let rows =
                sqlx::query("SELECT * FROM products WHERE company_id = $1 ORDER BY created_at, id")
                    .bind(company.as_uuid())
                    .fetch_all(&*self.pool)
                    .await
                    .map_err(|e| map_sqlx_error("list_products", e))?;
            rows.iter().map(Self::decode_product).collect()
        })?
    }

    fn insert_item(&self, item: ContentItem) -> Result<ContentItemId, StoreError> {
        block_on(async {
            let id = item.id_typed();
            sqlx::query(
                r#"
                INSERT INTO content_items (id, company_id, product_id, title, brief, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id.as_uuid())
            .bind(item.company_id().as_uuid())
            .bind(item.product_id().map(|p| *p.as_uuid()))
            .bind(item.title())
            .bind(item.brief())
            .bind(item.created_at())
            .execute(&*self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    StoreError::NotFound(item.company_id().to_string())
                }
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::AlreadyExists(id.to_string())
                }
                e => map_sqlx_error("insert_item", e),
            })?;
            Ok(id)
        })?
    }

    fn get_item(&self, id: ContentItemId) -> Result<Option<ContentItem>, StoreError> {
        block_on(async {
            let row = sqlx::query("SELECT * FROM content_items WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("get_item", e))?;
            row.as_ref().map(Self::decode_item).transpose()
        })?
    }

    fn list_items(&self, company: CompanyId) -> Result<Vec<ContentItem>, StoreError> {
        block_on(async {
            let rows = sqlx::query(
                "SELECT * FROM content_items WHERE company_id = $1 ORDER BY created_at, id",
            )
            .bind(company.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_items", e))?;
            rows.iter().map(Self::decode_item).collect()
        })?
    }
}
