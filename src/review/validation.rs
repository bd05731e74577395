use serde::Serialize;

pub const TITLE_REQUIRED: &str = "Title Required";
pub const CONTENTS_TOO_SHORT: &str = "ReviewContents must be at least 2 characters.";
pub const PHOTO_URL_INVALID: &str = "Photo must be a valid URL.";

const MIN_CONTENTS_CHARS: usize = 2;

/// Values posted by the browser when the user presses submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    pub title: String,
    pub review_contents: String,
    pub tags: String,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn message_for(&self, field: &str) -> Option<&'static str> {
        self.0.iter().find(|e| e.field == field).map(|e| e.message)
    }

    fn push(&mut self, field: &'static str, message: &'static str) {
        self.0.push(FieldError { field, message });
    }
}

/// Field-level checks run before any network call.
pub fn validate(fields: &FormFields, has_image_upload: bool) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();

    if fields.title.is_empty() {
        errors.push("title", TITLE_REQUIRED);
    }

    if fields.review_contents.chars().count() < MIN_CONTENTS_CHARS {
        errors.push("review_contents", CONTENTS_TOO_SHORT);
    }

    if has_image_upload {
        if let Some(photo_url) = fields.photo_url.as_deref().filter(|u| !u.is_empty()) {
            if url::Url::parse(photo_url).is_err() {
                errors.push("photo_url", PHOTO_URL_INVALID);
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str, contents: &str) -> FormFields {
        FormFields {
            title: title.into(),
            review_contents: contents.into(),
            ..FormFields::default()
        }
    }

    #[test]
    fn empty_title_is_required() {
        let errors = validate(&fields("", "Looks good"), false).unwrap_err();
        assert_eq!(errors.message_for("title"), Some(TITLE_REQUIRED));
        assert_eq!(errors.message_for("review_contents"), None);
    }

    #[test]
    fn contents_shorter_than_two_chars_rejected() {
        for contents in ["", "x", "論"] {
            let errors = validate(&fields("A paper", contents), false).unwrap_err();
            assert_eq!(errors.message_for("review_contents"), Some(CONTENTS_TOO_SHORT));
        }
        assert!(validate(&fields("A paper", "論文"), false).is_ok());
    }

    #[test]
    fn tags_are_not_validated() {
        let mut f = fields("A paper", "ok");
        f.tags = ",,,#$%".into();
        assert!(validate(&f, false).is_ok());
    }

    #[test]
    fn photo_url_checked_only_for_image_forms() {
        let mut f = fields("A paper", "ok");
        f.photo_url = Some("not a url".into());
        assert!(validate(&f, false).is_ok());
        let errors = validate(&f, true).unwrap_err();
        assert_eq!(errors.message_for("photo_url"), Some(PHOTO_URL_INVALID));

        f.photo_url = Some("data:image/png;base64,iVBORw0KGgo=".into());
        assert!(validate(&f, true).is_ok());
    }
}
