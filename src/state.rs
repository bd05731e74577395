use crate::config::Config;
use crate::review::{FormRegistry, ReviewService};
use std::sync::Arc;

pub struct AppState {
    pub config: Arc<Config>,
    pub forms: FormRegistry,
    pub reviews: ReviewService,
}
