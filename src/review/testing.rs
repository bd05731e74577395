//! In-memory collaborators for exercising the form without the network,
//! the filesystem or Postgres.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::form::PendingImage;
use super::model::{Author, ExternalIds, PaperLookup, PaperMetadata, ReviewRecord};
use crate::db::ReviewStore;
use crate::errors::{AppError, AppResult};
use crate::papers::PaperSource;
use crate::storage::ImageStore;

/// Resolves anything starting with `10.` to a paper; everything else fails.
pub struct FakePapers {
    delays: HashMap<String, Duration>,
    pub calls: AtomicUsize,
}

impl FakePapers {
    pub fn new(delays: &[(&str, u64)]) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(q, ms)| (q.to_string(), Duration::from_millis(*ms)))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PaperSource for FakePapers {
    async fn fetch_by_doi(&self, query: &str) -> PaperLookup {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if query.starts_with("10.") {
            PaperLookup::Found(paper_for(query))
        } else {
            PaperLookup::failed("Not a DOI")
        }
    }
}

#[derive(Default)]
pub struct FakeImages {
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ImageStore for FakeImages {
    async fn upload(&self, image: &PendingImage, review_id: &str) -> AppResult<String> {
        self.uploads.lock().unwrap().push(review_id.to_string());
        Ok(format!("https://x/{}", image.file_name))
    }
}

#[derive(Default)]
pub struct FakeReviews {
    pub saved: Mutex<Vec<(String, ReviewRecord)>>,
    pub fail_next: Mutex<bool>,
}

#[async_trait]
impl ReviewStore for FakeReviews {
    async fn set_review(&self, user_id: &str, record: &ReviewRecord) -> AppResult<()> {
        let mut fail = self.fail_next.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )));
        }
        self.saved
            .lock()
            .unwrap()
            .push((user_id.to_string(), record.clone()));
        Ok(())
    }

    async fn get_review(&self, review_id: &str) -> AppResult<Option<ReviewRecord>> {
        Ok(self
            .saved
            .lock()
            .unwrap()
            .iter()
            .find(|(_, r)| r.id == review_id)
            .map(|(_, r)| r.clone()))
    }
}

pub fn paper_for(doi: &str) -> PaperMetadata {
    PaperMetadata {
        title: format!("Paper {}", doi),
        venue: "ICML".into(),
        year: Some(2021),
        journal: None,
        authors: vec![
            Author { name: "First Author".into() },
            Author { name: "Second Author".into() },
        ],
        external_ids: Some(ExternalIds { doi: Some(doi.into()) }),
        url: format!("https://example.org/{}", doi),
    }
}
