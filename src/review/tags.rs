/// Splits the raw comma-delimited tag input. Entries are trimmed and blank
/// entries dropped; order and duplicates are preserved.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_empty_and_blank_entries() {
        assert_eq!(split_tags("a,,b, ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_input_has_no_tags() {
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ,").is_empty());
    }

    #[test]
    fn inner_whitespace_is_kept() {
        assert_eq!(
            split_tags(" machine learning ,NLP"),
            vec!["machine learning", "NLP"]
        );
    }
}
