use regex::Regex;
use std::sync::OnceLock;

static DOI_PATTERN: OnceLock<Regex> = OnceLock::new();
static DOI_PREFIX: OnceLock<Regex> = OnceLock::new();

/// Extracts a bare DOI (`10.xxxx/...`) from user input, accepting `doi:` and
/// `https://doi.org/` forms.
pub fn normalize_doi(input: &str) -> Option<String> {
    let prefix = DOI_PREFIX.get_or_init(|| {
        Regex::new(r"(?i)^(?:doi:\s*|https?://(?:dx\.)?doi\.org/)").expect("valid DOI prefix regex")
    });
    let pattern = DOI_PATTERN
        .get_or_init(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("valid DOI regex"));

    let trimmed = input.trim();
    let bare = prefix.replace(trimmed, "");
    if pattern.is_match(&bare) {
        Some(bare.into_owned())
    } else {
        None
    }
}
