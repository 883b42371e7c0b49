//! Request bodies and their validation into storage types.

use crate::db::{BookChanges, DEFAULT_STATUS, NewBook};
use crate::error::{AppError, Result};
use serde::{Deserialize, Deserializer};

/// Page counts arrive either as JSON numbers or as form strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    /// JSON integer.
    Int(i64),
    /// Text such as `"320"` or `""`.
    Text(String),
}

/// Book fields as sent by the client.
///
/// Each slot distinguishes "absent" (`None`) from "null" (`Some(None)`).
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookPayload {
    /// Book title.
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    /// Author name.
    #[serde(default, deserialize_with = "present")]
    pub author: Option<Option<String>>,
    /// Genre.
    #[serde(default, deserialize_with = "present")]
    pub genre: Option<Option<String>>,
    /// Total page count.
    #[serde(default, deserialize_with = "present")]
    pub total_pages: Option<Option<NumberInput>>,
    /// Pages read so far.
    #[serde(default, deserialize_with = "present")]
    pub pages_read: Option<Option<NumberInput>>,
    /// Reading status.
    #[serde(default, deserialize_with = "present")]
    pub status: Option<Option<String>>,
    /// Notes.
    #[serde(default, deserialize_with = "present")]
    pub notes: Option<Option<String>>,
    /// Cover URL (create only).
    #[serde(default, deserialize_with = "present")]
    pub cover_url: Option<Option<String>>,
}

/// Marks a field that appeared in the body, even as `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl BookPayload {
    /// Validate a create request.
    pub fn into_new_book(self) -> Result<NewBook> {
        let title = non_empty(self.title.flatten());
        let author = non_empty(self.author.flatten());
        let (Some(title), Some(author)) = (title, author) else {
            return Err(AppError::Validation(
                "Title and author are required".to_string(),
            ));
        };

        Ok(NewBook {
            title,
            author,
            genre: optional_text(self.genre.flatten()),
            total_pages: coerce_count("total_pages", self.total_pages.flatten())?,
            pages_read: coerce_count("pages_read", self.pages_read.flatten())?,
            status: non_empty(self.status.flatten()).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            notes: optional_text(self.notes.flatten()),
            cover_url: optional_text(self.cover_url.flatten()),
        })
    }

    /// Validate an update request.
    ///
    /// `cover_url` from the client is ignored; covers are only filled by lookup.
    pub fn into_changes(self) -> Result<BookChanges> {
        Ok(BookChanges {
            title: self.title.map(|v| required("title", v)).transpose()?,
            author: self.author.map(|v| required("author", v)).transpose()?,
            genre: self.genre.map(optional_text),
            total_pages: self
                .total_pages
                .map(|v| coerce_count("total_pages", v))
                .transpose()?,
            pages_read: self
                .pages_read
                .map(|v| coerce_count("pages_read", v))
                .transpose()?,
            status: self.status.map(|v| required("status", v)).transpose()?,
            notes: self.notes.map(optional_text),
            cover_url: None,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    non_empty(value).ok_or_else(|| AppError::Validation(format!("{} cannot be empty", field)))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Coerce a page count to a non-negative integer. Empty text means unset.
fn coerce_count(field: &str, value: Option<NumberInput>) -> Result<Option<i64>> {
    let number = match value {
        None => return Ok(None),
        Some(NumberInput::Int(n)) => n,
        Some(NumberInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>().map_err(|_| {
                AppError::Validation(format!("{} must be an integer, got '{}'", field, text))
            })?
        }
    };

    if number < 0 {
        return Err(AppError::Validation(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(Some(number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> BookPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_requires_title_and_author() {
        for body in [
            json!({"author": "Frank Herbert"}),
            json!({"title": "Dune"}),
            json!({"title": "", "author": "Frank Herbert"}),
            json!({"title": "Dune", "author": "   "}),
            json!({"title": null, "author": "Frank Herbert"}),
        ] {
            let err = payload(body).into_new_book().unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn create_coerces_numbers_and_defaults_status() {
        let book = payload(json!({
            "title": "Dune",
            "author": "Frank Herbert",
            "total_pages": "412",
            "pages_read": 12,
            "genre": "",
            "unknown": "ignored"
        }))
        .into_new_book()
        .unwrap();

        assert_eq!(book.total_pages, Some(412));
        assert_eq!(book.pages_read, Some(12));
        assert_eq!(book.status, DEFAULT_STATUS);
        assert_eq!(book.genre, None);
    }

    #[test]
    fn create_rejects_bad_numbers() {
        let err = payload(json!({"title": "Dune", "author": "F", "total_pages": "many"}))
            .into_new_book()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = payload(json!({"title": "Dune", "author": "F", "pages_read": -3}))
            .into_new_book()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn changes_distinguish_absent_and_null() {
        let changes = payload(json!({"genre": null, "pages_read": "40"}))
            .into_changes()
            .unwrap();

        assert_eq!(changes.genre, Some(None));
        assert_eq!(changes.pages_read, Some(Some(40)));
        assert_eq!(changes.notes, None);
        assert_eq!(changes.title, None);
        assert!(!changes.changes_identity());
    }

    #[test]
    fn changes_reject_empty_required_fields() {
        for body in [
            json!({"title": ""}),
            json!({"author": null}),
            json!({"status": " "}),
        ] {
            let err = payload(body).into_changes().unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn changes_ignore_client_cover() {
        let changes = payload(json!({"title": "Dune", "cover_url": "https://x/y.jpg"}))
            .into_changes()
            .unwrap();
        assert_eq!(changes.cover_url, None);
        assert!(changes.changes_identity());
    }
}
