use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{info, warn};

use super::{normalize_doi, PaperSource};
use crate::review::{PaperLookup, PaperMetadata};

const PAPER_FIELDS: &str = "title,venue,year,journal,authors,externalIds,url";

pub struct SemanticScholarClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key,
        })
    }

    fn paper_url(&self, doi: &str) -> String {
        format!("{}/paper/DOI:{}", self.base_url, doi)
    }

    async fn request(&self, doi: &str) -> Result<PaperLookup, reqwest::Error> {
        let mut request = self
            .client
            .get(self.paper_url(doi))
            .query(&[("fields", PAPER_FIELDS)]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            let paper: PaperMetadata = response.json().await?;
            info!(doi, title = %paper.title, "paper metadata fetched");
            return Ok(PaperLookup::Found(paper));
        }

        let message = match status {
            StatusCode::NOT_FOUND => "Paper not found".to_string(),
            StatusCode::TOO_MANY_REQUESTS => "Paper lookup is rate limited, try again shortly".to_string(),
            other => format!("Paper lookup failed with status {}", other.as_u16()),
        };
        warn!(doi, status = status.as_u16(), "paper lookup rejected");
        Ok(PaperLookup::failed(message))
    }
}

#[async_trait]
impl PaperSource for SemanticScholarClient {
    async fn fetch_by_doi(&self, query: &str) -> PaperLookup {
        let Some(doi) = normalize_doi(query) else {
            return PaperLookup::failed("Not a DOI");
        };

        match self.request(&doi).await {
            Ok(lookup) => lookup,
            Err(e) => {
                warn!(doi = %doi, error = %e, "paper lookup request failed");
                PaperLookup::failed(format!("Request failed: {}", e))
            }
        }
    }
}
