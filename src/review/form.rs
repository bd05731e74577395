use serde::Serialize;

use super::model::{PaperLookup, PaperMetadata, ReviewRecord};
use super::tags::split_tags;
use super::validation::{validate, FieldErrors, FormFields};

/// Construction-time feature set of a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub has_image_upload: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Edit,
    Preview,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Failed(String),
    Submitted { review_id: String },
}

/// Identifies one lookup request. Only the newest ticket may update the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    seq: u64,
    pub query: String,
}

/// An image held on the form until submit uploads it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub data_url: String,
}

/// Everything submit needs once the form lock has been released.
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub user_id: String,
    pub record: ReviewRecord,
    pub image: Option<PendingImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejection {
    Invalid(FieldErrors),
    InvalidDoi,
    InProgress,
    AlreadySubmitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormLocked {
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    Unsupported,
    NotAnImage(String),
    Locked(FormLocked),
}

/// Server-side state of one review form session.
#[derive(Debug, Clone)]
pub struct ReviewForm {
    user_id: String,
    user_name: String,
    capabilities: Capabilities,
    fields: FormFields,
    doi_query: String,
    mode: ViewMode,
    paper: Option<PaperLookup>,
    lookup_seq: u64,
    pending_image: Option<PendingImage>,
    submission: SubmissionState,
    errors: FieldErrors,
}

impl ReviewForm {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            capabilities,
            fields: FormFields::default(),
            doi_query: String::new(),
            mode: ViewMode::Edit,
            paper: None,
            lookup_seq: 0,
            pending_image: None,
            submission: SubmissionState::Idle,
            errors: FieldErrors::default(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn doi_query(&self) -> &str {
        &self.doi_query
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn paper(&self) -> Option<&PaperLookup> {
        self.paper.as_ref()
    }

    pub fn pending_image(&self) -> Option<&PendingImage> {
        self.pending_image.as_ref()
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// True while the submit button should show the loading state.
    pub fn is_loading(&self) -> bool {
        matches!(self.submission, SubmissionState::Submitting)
    }

    fn check_editable(&self) -> Result<(), FormLocked> {
        match self.submission {
            SubmissionState::Submitting => Err(FormLocked::Submitting),
            SubmissionState::Submitted { .. } => Err(FormLocked::Submitted),
            _ => Ok(()),
        }
    }

    pub fn begin_lookup(&mut self, query: &str) -> Result<LookupTicket, FormLocked> {
        self.check_editable()?;
        self.lookup_seq += 1;
        self.doi_query = query.to_string();
        Ok(LookupTicket {
            seq: self.lookup_seq,
            query: query.to_string(),
        })
    }

    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        ticket.seq == self.lookup_seq
    }

    /// Stores a lookup result unless a newer lookup has been issued since
    /// `ticket`. Returns whether the result was applied.
    pub fn apply_lookup(&mut self, ticket: &LookupTicket, outcome: PaperLookup) -> bool {
        if !self.is_current(ticket) || self.check_editable().is_err() {
            return false;
        }
        self.fields.title = outcome.title().to_string();
        self.paper = Some(outcome);
        true
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> ViewMode {
        self.mode = match self.mode {
            ViewMode::Edit => ViewMode::Preview,
            ViewMode::Preview => ViewMode::Edit,
        };
        self.mode
    }

    pub fn set_contents(&mut self, contents: &str) -> Result<(), FormLocked> {
        self.check_editable()?;
        self.fields.review_contents = contents.to_string();
        Ok(())
    }

    pub fn set_tags(&mut self, tags: &str) -> Result<(), FormLocked> {
        self.check_editable()?;
        self.fields.tags = tags.to_string();
        Ok(())
    }

    pub fn preview_html(&self) -> String {
        super::preview::render_markdown(&self.fields.review_contents)
    }

    /// Holds `image` until submit and points `photo_url` at its data URL.
    /// A later attach replaces the earlier one.
    pub fn attach_image(&mut self, image: PendingImage) -> Result<(), AttachError> {
        if !self.capabilities.has_image_upload {
            return Err(AttachError::Unsupported);
        }
        self.check_editable().map_err(AttachError::Locked)?;
        if !image.content_type.starts_with("image/") {
            return Err(AttachError::NotAnImage(image.content_type));
        }
        self.fields.photo_url = Some(image.data_url.clone());
        self.pending_image = Some(image);
        Ok(())
    }

    /// Validates `posted`, checks the lookup precondition and moves the form
    /// to `Submitting`. The returned draft has an empty `image_url`.
    pub fn begin_submission(
        &mut self,
        posted: FormFields,
        review_id: String,
    ) -> Result<SubmissionDraft, SubmitRejection> {
        match self.submission {
            SubmissionState::Submitting => return Err(SubmitRejection::InProgress),
            SubmissionState::Submitted { .. } => return Err(SubmitRejection::AlreadySubmitted),
            _ => {}
        }

        // The photo URL is owned by the attach step, not by what the browser posts.
        self.fields = FormFields {
            photo_url: self.fields.photo_url.clone(),
            ..posted
        };

        if let Err(errors) = validate(&self.fields, self.capabilities.has_image_upload) {
            self.errors = errors.clone();
            return Err(SubmitRejection::Invalid(errors));
        }
        self.errors = FieldErrors::default();

        let paper: PaperMetadata = match self.paper.as_ref().and_then(PaperLookup::metadata) {
            Some(paper) => paper.clone(),
            None => return Err(SubmitRejection::InvalidDoi),
        };

        let record = ReviewRecord::assemble(
            review_id,
            &paper,
            &self.fields.review_contents,
            split_tags(&self.fields.tags),
            &self.user_name,
            &self.user_id,
        );

        self.submission = SubmissionState::Submitting;
        Ok(SubmissionDraft {
            user_id: self.user_id.clone(),
            record,
            image: if self.capabilities.has_image_upload {
                self.pending_image.clone()
            } else {
                None
            },
        })
    }

    pub fn finish_submission(&mut self, outcome: Result<String, String>) -> &SubmissionState {
        self.submission = match outcome {
            Ok(review_id) => {
                self.pending_image = None;
                SubmissionState::Submitted { review_id }
            }
            Err(reason) => SubmissionState::Failed(reason),
        };
        &self.submission
    }
}
