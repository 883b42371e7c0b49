//! CSV export of the reading log.

use crate::db::{BOOK_COLUMNS, Book, Database};
use crate::error::{AppError, Result};
use chrono::{DateTime, Local};

/// A rendered export file.
#[derive(Debug, Clone)]
pub struct CsvExport {
    /// Suggested file name.
    pub filename: String,
    /// CSV bytes.
    pub data: Vec<u8>,
    /// Number of exported books.
    pub rows: usize,
}

/// Export every stored book.
pub fn export_library(db: &Database) -> Result<CsvExport> {
    let books = db.all_books()?;
    if books.is_empty() {
        return Err(AppError::NoData);
    }

    let data = books_to_csv(&books)?;
    tracing::info!(rows = books.len(), bytes = data.len(), "Exported library");

    Ok(CsvExport {
        filename: export_filename(Local::now()),
        data,
        rows: books.len(),
    })
}

/// `reading_log_<YYYYMMDD_HHMMSS>.csv`
pub fn export_filename(at: DateTime<Local>) -> String {
    format!("reading_log_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Serialize books with a header row of table column names.
pub fn books_to_csv(books: &[Book]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(BOOK_COLUMNS)?;

    for book in books {
        writer.write_record([
            book.id.to_string(),
            book.title.clone(),
            book.author.clone(),
            book.genre.clone().unwrap_or_default(),
            opt_number(book.total_pages),
            opt_number(book.pages_read),
            book.status.clone(),
            book.notes.clone().unwrap_or_default(),
            book.cover_url.clone().unwrap_or_default(),
            book.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV: {}", e)))
}

fn opt_number(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn book(id: i64, title: &str, notes: Option<&str>) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: "Frank Herbert".to_string(),
            genre: None,
            total_pages: Some(412),
            pages_read: Some(0),
            status: "reading".to_string(),
            notes: notes.map(str::to_string),
            cover_url: None,
            created_at: chrono::Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let data = books_to_csv(&[book(2, "Dune Messiah", None), book(1, "Dune", None)]).unwrap();
        let text = String::from_utf8(data).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,title,author,genre,total_pages,pages_read,status,notes,cover_url,created_at"
        );
        assert_eq!(
            lines[1],
            "2,Dune Messiah,Frank Herbert,,412,0,reading,,,2024-03-01 09:30:00"
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_quotes_special_characters() {
        let data = books_to_csv(&[book(1, "Dune, Part \"One\"", Some("line1\nline2"))]).unwrap();

        let mut reader = csv::Reader::from_reader(data.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][1], "Dune, Part \"One\"");
        assert_eq!(&records[0][7], "line1\nline2");
    }

    #[test]
    fn filename_embeds_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(export_filename(at), "reading_log_20240102_030405.csv");
    }

    #[test]
    fn empty_library_is_no_data() {
        let db = Database::open_memory().unwrap();
        assert!(matches!(export_library(&db), Err(AppError::NoData)));
    }
}
