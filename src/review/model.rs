use serde::{Deserialize, Deserializer, Serialize};

/// Paper metadata as returned by the Semantic Scholar graph API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub venue: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub journal: Option<Journal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

impl PaperMetadata {
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(|a| a.name.as_str())
    }

    pub fn doi(&self) -> Option<&str> {
        self.external_ids.as_ref()?.doi.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pages: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Outcome of a DOI lookup. Failures are values, never errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaperLookup {
    Found(PaperMetadata),
    Failed { error: String },
}

impl PaperLookup {
    pub fn failed(error: impl Into<String>) -> Self {
        PaperLookup::Failed {
            error: error.into(),
        }
    }

    pub fn metadata(&self) -> Option<&PaperMetadata> {
        match self {
            PaperLookup::Found(paper) => Some(paper),
            PaperLookup::Failed { .. } => None,
        }
    }

    /// Title to place in the form's title field once this lookup lands.
    pub fn title(&self) -> &str {
        self.metadata().map(|p| p.title.as_str()).unwrap_or("")
    }
}

/// The persisted review: the user's text plus a snapshot of the paper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub id: String,
    pub contents: String,
    #[serde(rename = "paperTitle")]
    pub paper_title: String,
    pub venue: String,
    pub year: Option<i32>,
    pub journal_name: String,
    pub journal_pages: String,
    pub journal_vol: String,
    pub authors: String,
    pub doi: String,
    pub link: String,
    #[serde(rename = "reviewerName")]
    pub reviewer_name: String,
    #[serde(rename = "createdBy")]
    pub created_by: String,
    pub tags: Vec<String>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
}

impl ReviewRecord {
    /// Assembles a record from a successful lookup. `image_url` is filled in
    /// after the pending image (if any) has been uploaded.
    pub fn assemble(
        id: String,
        paper: &PaperMetadata,
        contents: &str,
        tags: Vec<String>,
        reviewer_name: &str,
        created_by: &str,
    ) -> Self {
        let journal = paper.journal.clone().unwrap_or_default();
        Self {
            id,
            contents: contents.to_string(),
            paper_title: paper.title.clone(),
            venue: paper.venue.clone(),
            year: paper.year,
            journal_name: journal.name.unwrap_or_default(),
            journal_pages: journal.pages.unwrap_or_default(),
            journal_vol: journal.volume.unwrap_or_default(),
            authors: paper.first_author().unwrap_or_default().to_string(),
            doi: paper.doi().unwrap_or_default().to_string(),
            link: paper.url.clone(),
            reviewer_name: reviewer_name.to_string(),
            created_by: created_by.to_string(),
            tags,
            image_url: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S2_BODY: &str = r#"{
        "paperId": "649def34f8be52c8b66281af98ae884c09aef38b",
        "title": "Construction of the Literature Graph in Semantic Scholar",
        "venue": "NAACL",
        "year": 2018,
        "journal": { "name": "ArXiv", "pages": "84-91", "volume": "abs/1805.02262" },
        "authors": [
            { "authorId": "1741101", "name": "Waleed Ammar" },
            { "authorId": "3458736", "name": "Dirk Groeneveld" }
        ],
        "externalIds": { "DOI": "10.18653/v1/N18-3011", "CorpusId": 19170988 },
        "url": "https://www.semanticscholar.org/paper/649def34f8be52c8b66281af98ae884c09aef38b"
    }"#;

    #[test]
    fn deserializes_semantic_scholar_payload() {
        let paper: PaperMetadata = serde_json::from_str(S2_BODY).unwrap();
        assert_eq!(paper.year, Some(2018));
        assert_eq!(paper.first_author(), Some("Waleed Ammar"));
        assert_eq!(paper.doi(), Some("10.18653/v1/N18-3011"));
    }

    #[test]
    fn record_takes_first_author_and_journal_fields() {
        let paper: PaperMetadata = serde_json::from_str(S2_BODY).unwrap();
        let record = ReviewRecord::assemble(
            "1700000000000_abcd1234".into(),
            &paper,
            "Solid work.",
            vec!["nlp".into()],
            "Hanako",
            "user-1",
        );

        assert_eq!(record.authors, "Waleed Ammar");
        assert_eq!(record.doi, "10.18653/v1/N18-3011");
        assert_eq!(record.journal_pages, "84-91");
        assert_eq!(record.journal_vol, "abs/1805.02262");
        assert_eq!(record.image_url, "");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["paperTitle"], paper.title.as_str());
        assert_eq!(json["reviewerName"], "Hanako");
        assert_eq!(json["createdBy"], "user-1");
        assert_eq!(json["imageUrl"], "");
    }

    #[test]
    fn sparse_metadata_yields_empty_strings() {
        let paper: PaperMetadata =
            serde_json::from_str(r#"{ "title": "Untitled", "venue": null, "journal": null }"#).unwrap();
        let record = ReviewRecord::assemble("1".into(), &paper, "ok", vec![], "a", "b");
        assert_eq!(record.authors, "");
        assert_eq!(record.journal_name, "");
        assert_eq!(record.doi, "");
    }

    #[test]
    fn failed_lookup_clears_title() {
        assert_eq!(PaperLookup::failed("not found").title(), "");
    }
}
