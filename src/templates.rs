use std::path::Path;
use std::sync::OnceLock;
use tera::Tera;

use crate::errors::{AppError, AppResult};

static TERA: OnceLock<Tera> = OnceLock::new();

/// Loads every `*.html` template under `dir`, named by file name.
pub fn load(dir: &Path) -> Result<Tera, tera::Error> {
    Tera::new(&format!("{}/**/*.html", dir.display()))
}

pub fn init(dir: &Path) -> Result<(), tera::Error> {
    let tera = load(dir)?;
    tracing::info!(templates = tera.get_template_names().count(), "templates loaded");
    let _ = TERA.set(tera);
    Ok(())
}

pub fn get_tera() -> AppResult<&'static Tera> {
    TERA.get()
        .ok_or_else(|| AppError::Template(tera::Error::msg("templates not loaded")))
}
