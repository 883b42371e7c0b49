use crate::db::*;
use crate::error::{AppError, Result};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::path::Path;
use std::sync::Arc;

/// Schema definition, applied idempotently when a database is opened.
pub const MIGRATION: &str = r#"
-- Books table
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    genre TEXT,
    total_pages INTEGER,
    pages_read INTEGER DEFAULT 0,
    status TEXT NOT NULL,
    notes TEXT,
    cover_url TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_books_created_at ON books(created_at);
CREATE INDEX IF NOT EXISTS idx_books_status ON books(status);
"#;

const SELECT_BOOK: &str = "SELECT id, title, author, genre, total_pages, pages_read, status, notes,
        cover_url, created_at
 FROM books";

const ORDER_NEWEST: &str = " ORDER BY created_at DESC, id DESC";

/// Database wrapper for thread-safe access.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Open in-memory database (for testing).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Internal(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.migrate()?;
        Ok(db)
    }

    /// Apply the schema. Safe to run more than once.
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(MIGRATION)
            .map_err(|e| AppError::Internal(format!("Failed to initialize schema: {}", e)))?;
        Ok(())
    }

    /// List books matching the filter, newest first.
    pub fn list_books(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        let mut sql = String::from(SELECT_BOOK);
        let mut clauses = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(status) = &filter.status {
            clauses.push("status = ?");
            values.push(Value::from(status.clone()));
        }

        if let Some(query) = &filter.query {
            let pattern = format!("%{}%", escape_like(query));
            clauses.push(r"(title LIKE ? ESCAPE '\' OR author LIKE ? ESCAPE '\')");
            values.push(Value::from(pattern.clone()));
            values.push(Value::from(pattern));
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(ORDER_NEWEST);

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| AppError::Internal(format!("Failed to prepare query: {}", e)))?;

        let books = stmt
            .query_map(params_from_iter(values), row_to_book)
            .map_err(|e| AppError::Internal(format!("Failed to list books: {}", e)))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AppError::Internal(format!("Failed to collect books: {}", e)))?;

        Ok(books)
    }

    /// Get all books, newest first.
    pub fn all_books(&self) -> Result<Vec<Book>> {
        self.list_books(&BookFilter::default())
    }

    /// Get book by ID.
    pub fn get_book(&self, id: i64) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        fetch_book(&conn, id).map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))
    }

    /// Number of stored books.
    pub fn count_books(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))
            .map_err(|e| AppError::Internal(format!("Failed to count books: {}", e)))?;
        Ok(count as usize)
    }

    /// Insert a book and return the stored row.
    pub fn create_book(&self, book: &NewBook) -> Result<Book> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO books (title, author, genre, total_pages, pages_read, status, notes,
                                cover_url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                book.title,
                book.author,
                book.genre,
                book.total_pages,
                book.pages_read.unwrap_or(0),
                book.status,
                book.notes,
                book.cover_url,
                now(),
            ],
        )
        .map_err(|e| AppError::Internal(format!("Failed to create book: {}", e)))?;

        let id = conn.last_insert_rowid();
        fetch_book(&conn, id)
            .map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))?
            .ok_or_else(|| AppError::Internal(format!("Book {} vanished after insert", id)))
    }

    /// Apply a partial update and return the full updated row.
    ///
    /// `changes.cover_url` is only written when the stored cover is empty.
    pub fn update_book(&self, id: i64, changes: &BookChanges) -> Result<Book> {
        let conn = self.conn.lock();

        let current = fetch_book(&conn, id)
            .map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))?
            .ok_or_else(|| not_found(id))?;

        if changes.is_empty() {
            return Ok(current);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(title) = &changes.title {
            sets.push("title = ?");
            values.push(Value::from(title.clone()));
        }
        if let Some(author) = &changes.author {
            sets.push("author = ?");
            values.push(Value::from(author.clone()));
        }
        if let Some(genre) = &changes.genre {
            sets.push("genre = ?");
            values.push(Value::from(genre.clone()));
        }
        if let Some(total_pages) = changes.total_pages {
            sets.push("total_pages = ?");
            values.push(Value::from(total_pages));
        }
        if let Some(pages_read) = changes.pages_read {
            sets.push("pages_read = ?");
            values.push(Value::from(pages_read));
        }
        if let Some(status) = &changes.status {
            sets.push("status = ?");
            values.push(Value::from(status.clone()));
        }
        if let Some(notes) = &changes.notes {
            sets.push("notes = ?");
            values.push(Value::from(notes.clone()));
        }
        if let Some(cover_url) = &changes.cover_url {
            sets.push(
                "cover_url = CASE WHEN cover_url IS NULL OR cover_url = '' THEN ? ELSE cover_url END",
            );
            values.push(Value::from(cover_url.clone()));
        }

        let sql = format!("UPDATE books SET {} WHERE id = ?", sets.join(", "));
        values.push(Value::from(id));

        conn.execute(&sql, params_from_iter(values))
            .map_err(|e| AppError::Internal(format!("Failed to update book: {}", e)))?;

        fetch_book(&conn, id)
            .map_err(|e| AppError::Internal(format!("Failed to get book: {}", e)))?
            .ok_or_else(|| not_found(id))
    }

    /// Delete a book by ID.
    pub fn delete_book(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock();
        let rows = conn
            .execute("DELETE FROM books WHERE id = ?1", params![id])
            .map_err(|e| AppError::Internal(format!("Failed to delete book: {}", e)))?;

        if rows == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Book not found: {}", id))
}

/// Fetch a single book using an already locked connection.
fn fetch_book(conn: &Connection, id: i64) -> rusqlite::Result<Option<Book>> {
    conn.query_row(
        &format!("{} WHERE id = ?1", SELECT_BOOK),
        params![id],
        row_to_book,
    )
    .optional()
}

/// Helper to convert a row to Book.
fn row_to_book(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        genre: row.get(3)?,
        total_pages: row.get(4)?,
        pages_read: row.get(5)?,
        status: row.get(6)?,
        notes: row.get(7)?,
        cover_url: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Escape LIKE wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
