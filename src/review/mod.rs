//! The review submission form: field state, lookup sequencing, validation
//! and the submission state machine.

mod form;
mod model;
mod preview;
mod registry;
mod service;
mod tags;
mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use form::{
    AttachError, Capabilities, FormLocked, PendingImage, ReviewForm, SubmitRejection, ViewMode,
};
pub use model::{PaperLookup, PaperMetadata, ReviewRecord};
pub use preview::render_markdown;
pub use registry::FormRegistry;
pub use service::{LookupReply, ReviewService, SubmitOutcome};
pub use tags::split_tags;
pub use validation::FormFields;
