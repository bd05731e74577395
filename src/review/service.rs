use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::form::{FormLocked, SubmissionDraft, SubmitRejection};
use super::model::PaperLookup;
use super::registry::SharedForm;
use super::validation::FormFields;
use crate::db::ReviewStore;
use crate::errors::AppResult;
use crate::papers::PaperSource;
use crate::storage::{generate_review_id, ImageStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupReply {
    Applied { lookup: PaperLookup, title: String },
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted { review_id: String },
    Rejected(SubmitRejection),
    Failed(String),
}

/// Wires a form to the three external collaborators.
#[derive(Clone)]
pub struct ReviewService {
    papers: Arc<dyn PaperSource>,
    images: Arc<dyn ImageStore>,
    reviews: Arc<dyn ReviewStore>,
    debounce: Duration,
}

impl ReviewService {
    pub fn new(
        papers: Arc<dyn PaperSource>,
        images: Arc<dyn ImageStore>,
        reviews: Arc<dyn ReviewStore>,
        debounce: Duration,
    ) -> Self {
        Self {
            papers,
            images,
            reviews,
            debounce,
        }
    }

    pub fn reviews(&self) -> &Arc<dyn ReviewStore> {
        &self.reviews
    }

    /// Debounced lookup. The request is dropped if another lookup arrives
    /// within the debounce window, and its result is discarded if a newer
    /// lookup was issued while it was in flight.
    pub async fn lookup(&self, form: &SharedForm, query: &str) -> Result<LookupReply, FormLocked> {
        let ticket = form.lock().await.begin_lookup(query)?;

        tokio::time::sleep(self.debounce).await;
        if !form.lock().await.is_current(&ticket) {
            return Ok(LookupReply::Superseded);
        }

        let lookup = self.papers.fetch_by_doi(&ticket.query).await;

        let mut guard = form.lock().await;
        if guard.apply_lookup(&ticket, lookup.clone()) {
            Ok(LookupReply::Applied {
                title: guard.fields().title.clone(),
                lookup,
            })
        } else {
            tracing::debug!(query = %ticket.query, "stale lookup discarded");
            Ok(LookupReply::Superseded)
        }
    }

    /// Validates and submits the form. Upload and persistence failures are
    /// logged and leave the form in `Failed`, from which it can be retried.
    pub async fn submit(&self, form: &SharedForm, posted: FormFields) -> SubmitOutcome {
        let draft = match form
            .lock()
            .await
            .begin_submission(posted, generate_review_id())
        {
            Ok(draft) => draft,
            Err(rejection) => return SubmitOutcome::Rejected(rejection),
        };

        let review_id = draft.record.id.clone();
        let result = self.persist(draft).await;

        let mut guard = form.lock().await;
        match result {
            Ok(()) => {
                info!(review_id = %review_id, user_id = guard.user_id(), "review submitted");
                guard.finish_submission(Ok(review_id.clone()));
                SubmitOutcome::Submitted { review_id }
            }
            Err(e) => {
                error!(review_id = %review_id, error = %e, "review submission failed");
                let reason = e.to_string();
                guard.finish_submission(Err(reason.clone()));
                SubmitOutcome::Failed(reason)
            }
        }
    }

    async fn persist(&self, mut draft: SubmissionDraft) -> AppResult<()> {
        if let Some(image) = &draft.image {
            draft.record.image_url = self.images.upload(image, &draft.record.id).await?;
        }
        self.reviews.set_review(&draft.user_id, &draft.record).await
    }
}
