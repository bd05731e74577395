mod models;

pub use models::*;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::review::ReviewRecord;

pub type DbPool = Arc<PgPool>;

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Persistence for submitted reviews.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn set_review(&self, user_id: &str, record: &ReviewRecord) -> AppResult<()>;

    async fn get_review(&self, review_id: &str) -> AppResult<Option<ReviewRecord>>;
}

pub struct PgReviewStore {
    pool: DbPool,
}

impl PgReviewStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn set_review(&self, user_id: &str, record: &ReviewRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews (
                review_id, user_id, contents, paper_title, venue, year,
                journal_name, journal_pages, journal_vol, authors, doi, link,
                reviewer_name, created_by, tags, image_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(&record.id)
        .bind(user_id)
        .bind(&record.contents)
        .bind(&record.paper_title)
        .bind(&record.venue)
        .bind(record.year)
        .bind(&record.journal_name)
        .bind(&record.journal_pages)
        .bind(&record.journal_vol)
        .bind(&record.authors)
        .bind(&record.doi)
        .bind(&record.link)
        .bind(&record.reviewer_name)
        .bind(&record.created_by)
        .bind(&record.tags)
        .bind(&record.image_url)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn get_review(&self, review_id: &str) -> AppResult<Option<ReviewRecord>> {
        let row = sqlx::query_as::<_, ReviewRow>("SELECT * FROM reviews WHERE review_id = $1")
            .bind(review_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(row.map(ReviewRecord::from))
    }
}
