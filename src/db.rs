mod schema;

pub use schema::{Database, MIGRATION};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status filter value that disables status filtering.
pub const STATUS_ALL: &str = "all";

/// Status assigned when a book is created without one.
pub const DEFAULT_STATUS: &str = "to-read";

/// Columns of the `books` table, in table-defined order.
pub const BOOK_COLUMNS: [&str; 10] = [
    "id",
    "title",
    "author",
    "genre",
    "total_pages",
    "pages_read",
    "status",
    "notes",
    "cover_url",
    "created_at",
];

/// A tracked book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Auto-assigned row ID.
    pub id: i64,
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Genre.
    pub genre: Option<String>,
    /// Total page count.
    pub total_pages: Option<i64>,
    /// Pages read so far.
    pub pages_read: Option<i64>,
    /// Reading status ("to-read", "reading", "finished", ...).
    pub status: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Cover thumbnail URL.
    pub cover_url: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Whether a cover URL is stored.
    pub fn has_cover(&self) -> bool {
        self.cover_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Validated fields for a new book.
#[derive(Debug, Clone, Default)]
pub struct NewBook {
    /// Book title (non-empty).
    pub title: String,
    /// Author name (non-empty).
    pub author: String,
    /// Genre.
    pub genre: Option<String>,
    /// Total page count.
    pub total_pages: Option<i64>,
    /// Pages read so far (stored as 0 when absent).
    pub pages_read: Option<i64>,
    /// Reading status.
    pub status: String,
    /// Notes.
    pub notes: Option<String>,
    /// Cover URL.
    pub cover_url: Option<String>,
}

/// Partial update of a book.
///
/// `None` leaves the column untouched. For nullable columns, `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default)]
pub struct BookChanges {
    /// New title.
    pub title: Option<String>,
    /// New author.
    pub author: Option<String>,
    /// New genre.
    pub genre: Option<Option<String>>,
    /// New total page count.
    pub total_pages: Option<Option<i64>>,
    /// New pages read.
    pub pages_read: Option<Option<i64>>,
    /// New status.
    pub status: Option<String>,
    /// New notes.
    pub notes: Option<Option<String>>,
    /// Cover URL, written only if the stored cover is empty.
    pub cover_url: Option<String>,
}

impl BookChanges {
    /// Whether the change touches title or author.
    pub fn changes_identity(&self) -> bool {
        self.title.is_some() || self.author.is_some()
    }

    /// Whether no slot is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.genre.is_none()
            && self.total_pages.is_none()
            && self.pages_read.is_none()
            && self.status.is_none()
            && self.notes.is_none()
            && self.cover_url.is_none()
    }
}

/// Filter for listing books.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Exact status match (`None` = any status).
    pub status: Option<String>,
    /// Case-insensitive substring of title or author.
    pub query: Option<String>,
}

impl BookFilter {
    /// Build a filter from raw request values.
    ///
    /// A status of `"all"` or an empty string disables status filtering,
    /// and an empty query disables text search.
    pub fn new(status: Option<&str>, query: Option<&str>) -> Self {
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != STATUS_ALL)
            .map(str::to_string);
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        Self { status, query }
    }
}

/// Timestamp helper.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
