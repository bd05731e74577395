mod doi;
mod semantic_scholar;

pub use doi::normalize_doi;
pub use semantic_scholar::SemanticScholarClient;

use async_trait::async_trait;

use crate::review::PaperLookup;

/// Source of paper metadata, looked up by DOI.
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Resolves raw user input to paper metadata. Failures come back as
    /// [`PaperLookup::Failed`].
    async fn fetch_by_doi(&self, query: &str) -> PaperLookup;
}
