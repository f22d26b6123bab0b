//! Validation schema for the note creation form
//!
//! Pure functions over [`NoteFormValues`]: no UI state, no I/O. The form
//! controller calls [`validate_field`] as fields change and [`validate`] on
//! submit.

use super::models::{NoteFormValues, NoteTag};
use std::collections::BTreeMap;
use std::fmt;

pub const TITLE_MIN_LEN: usize = 3;
pub const TITLE_MAX_LEN: usize = 50;
pub const CONTENT_MAX_LEN: usize = 500;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const TITLE_TOO_SHORT: &str = "Title too short";
pub const TITLE_TOO_LONG: &str = "Title too long";
pub const CONTENT_TOO_LONG: &str = "Message too long";
pub const TAG_REQUIRED: &str = "Tag is required";
pub const TAG_INVALID: &str = "tag must match one of the allowed values";

/// A field of the note form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormField {
    Title,
    Content,
    Tag,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Title, FormField::Content, FormField::Tag];
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Content => write!(f, "content"),
            Self::Tag => write!(f, "tag"),
        }
    }
}

/// Field → error message. Empty means the values are valid.
pub type FieldErrors = BTreeMap<FormField, String>;

/// Validate every field
pub fn validate(values: &NoteFormValues) -> FieldErrors {
    FormField::ALL
        .iter()
        .filter_map(|&field| validate_field(field, values).map(|msg| (field, msg)))
        .collect()
}

/// Validate a single field, returning its error message if any
pub fn validate_field(field: FormField, values: &NoteFormValues) -> Option<String> {
    let message = match field {
        FormField::Title => check_title(&values.title),
        FormField::Content => check_content(&values.content),
        FormField::Tag => check_tag(&values.tag),
    };
    message.map(str::to_string)
}

fn check_title(title: &str) -> Option<&'static str> {
    let len = title.trim().chars().count();
    if len == 0 {
        Some(TITLE_REQUIRED)
    } else if len < TITLE_MIN_LEN {
        Some(TITLE_TOO_SHORT)
    } else if len > TITLE_MAX_LEN {
        Some(TITLE_TOO_LONG)
    } else {
        None
    }
}

fn check_content(content: &str) -> Option<&'static str> {
    (content.chars().count() > CONTENT_MAX_LEN).then_some(CONTENT_TOO_LONG)
}

fn check_tag(tag: &str) -> Option<&'static str> {
    if tag.is_empty() {
        Some(TAG_REQUIRED)
    } else if tag.parse::<NoteTag>().is_err() {
        Some(TAG_INVALID)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(title: &str, content: &str, tag: &str) -> NoteFormValues {
        NoteFormValues {
            title: title.into(),
            content: content.into(),
            tag: tag.into(),
        }
    }

    #[test]
    fn test_valid_values_have_no_errors() {
        let errors = validate(&values("Groceries", "Milk, eggs", "Shopping"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_title_rules() {
        let fifty = "x".repeat(50);
        let fifty_one = "x".repeat(51);
        let cases: [(&str, Option<&str>); 7] = [
            ("", Some(TITLE_REQUIRED)),
            ("   ", Some(TITLE_REQUIRED)),
            ("Hi", Some(TITLE_TOO_SHORT)),
            ("  Hi  ", Some(TITLE_TOO_SHORT)),
            ("Hey", None),
            (&fifty, None),
            (&fifty_one, Some(TITLE_TOO_LONG)),
        ];
        for (title, expected) in cases {
            assert_eq!(
                validate_field(FormField::Title, &values(title, "", "Todo")).as_deref(),
                expected,
                "title {:?}",
                title
            );
        }
    }

    #[test]
    fn test_title_counts_characters_not_bytes() {
        // 3 characters, 9 bytes
        let v = values("нот", "", "Todo");
        assert_eq!(validate_field(FormField::Title, &v), None);
    }

    #[test]
    fn test_content_is_optional_but_bounded() {
        assert_eq!(validate_field(FormField::Content, &values("Title", "", "Todo")), None);
        assert_eq!(
            validate_field(FormField::Content, &values("Title", &"a".repeat(500), "Todo")),
            None
        );
        assert_eq!(
            validate_field(FormField::Content, &values("Title", &"a".repeat(501), "Todo"))
                .as_deref(),
            Some(CONTENT_TOO_LONG)
        );
    }

    #[test]
    fn test_tag_rules() {
        assert_eq!(
            validate_field(FormField::Tag, &values("Title", "", "")).as_deref(),
            Some(TAG_REQUIRED)
        );
        assert_eq!(
            validate_field(FormField::Tag, &values("Title", "", "Errands")).as_deref(),
            Some(TAG_INVALID)
        );
        for tag in NoteTag::ALL {
            assert_eq!(
                validate_field(FormField::Tag, &values("Title", "", tag.as_str())),
                None
            );
        }
    }

    #[test]
    fn test_validate_reports_every_failing_field() {
        let errors = validate(&values("", &"a".repeat(600), "nope"));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[&FormField::Title], TITLE_REQUIRED);
        assert_eq!(errors[&FormField::Content], CONTENT_TOO_LONG);
        assert_eq!(errors[&FormField::Tag], TAG_INVALID);
    }
}
