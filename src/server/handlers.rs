//! HTTP request handlers.

use crate::db::{Book, BookFilter};
use crate::error::{AppError, Result};
use crate::export;
use crate::server::AppState;
use crate::server::payload::BookPayload;
use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::Response,
};
use serde::{Deserialize, Serialize};

/// List query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    status: Option<String>,
    query: Option<String>,
}

/// Confirmation body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: String,
}

/// Turn a JSON extraction failure into a validation error.
fn json_body(payload: std::result::Result<Json<BookPayload>, JsonRejection>) -> Result<BookPayload> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

// ============================================================================
// BOOKS API
// ============================================================================

/// List books, optionally filtered by status and text query.
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Book>>> {
    let filter = BookFilter::new(params.status.as_deref(), params.query.as_deref());
    let books = state.db.list_books(&filter)?;

    tracing::debug!(
        status = ?filter.status,
        query = ?filter.query,
        count = books.len(),
        "Listed books"
    );
    Ok(Json(books))
}

/// Create a book, looking up its cover first.
pub async fn create_book(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BookPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>)> {
    let mut new_book = json_body(payload)?.into_new_book()?;

    if new_book.cover_url.is_none() {
        new_book.cover_url = state.covers.resolve(&new_book.title, &new_book.author).await;
    }

    let book = state.db.create_book(&new_book)?;
    tracing::info!(id = book.id, title = %book.title, has_cover = book.has_cover(), "Created book");

    Ok((StatusCode::CREATED, Json(book)))
}

/// Apply a partial update to a book.
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<BookPayload>, JsonRejection>,
) -> Result<Json<Book>> {
    let mut changes = json_body(payload)?.into_changes()?;

    if changes.changes_identity() {
        let current = state
            .db
            .get_book(id)?
            .ok_or_else(|| AppError::NotFound(format!("Book not found: {}", id)))?;

        if !current.has_cover() {
            let title = changes.title.as_deref().unwrap_or(&current.title);
            let author = changes.author.as_deref().unwrap_or(&current.author);
            changes.cover_url = state.covers.resolve(title, author).await;
        }
    }

    let book = state.db.update_book(id, &changes)?;
    tracing::info!(id = book.id, "Updated book");

    Ok(Json(book))
}

/// Delete a book.
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    state.db.delete_book(id)?;
    tracing::info!(id, "Deleted book");

    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}

// ============================================================================
// EXPORT
// ============================================================================

/// Download the whole library as CSV.
pub async fn export_books(State(state): State<AppState>) -> Result<Response<Body>> {
    let export = export::export_library(&state.db)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", export.filename),
        )
        .header(header::CONTENT_LENGTH, export.data.len())
        .body(Body::from(export.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}
