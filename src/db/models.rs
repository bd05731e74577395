use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::review::ReviewRecord;

#[derive(Debug, FromRow, Serialize)]
pub struct ReviewRow {
    pub id: i32,
    pub review_id: String,
    pub user_id: String,
    pub contents: String,
    pub paper_title: String,
    pub venue: String,
    pub year: Option<i32>,
    pub journal_name: String,
    pub journal_pages: String,
    pub journal_vol: String,
    pub authors: String,
    pub doi: String,
    pub link: String,
    pub reviewer_name: String,
    pub created_by: String,
    pub tags: Vec<String>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for ReviewRecord {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.review_id,
            contents: row.contents,
            paper_title: row.paper_title,
            venue: row.venue,
            year: row.year,
            journal_name: row.journal_name,
            journal_pages: row.journal_pages,
            journal_vol: row.journal_vol,
            authors: row.authors,
            doi: row.doi,
            link: row.link,
            reviewer_name: row.reviewer_name,
            created_by: row.created_by,
            tags: row.tags,
            image_url: row.image_url,
        }
    }
}
