//! Book endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{book::BookListQuery, Book, BookDetail, BookForm, BookSummary, Page},
};

use super::{Deleted, FormBody, SeeOther, StaffUser};

/// List books, optionally filtered by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookListQuery),
    responses(
        (status = 200, description = "Page of books ordered by title", body = Page<BookSummary>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookListQuery>,
) -> AppResult<Json<Page<BookSummary>>> {
    let page = state.services.catalog.list_books(&query).await?;
    Ok(Json(page))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book with author, genres and copies", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.lookup.book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 303, description = "Book created, redirect to its detail view", body = Book),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    _user: StaffUser,
    FormBody(form): FormBody<BookForm>,
) -> AppResult<SeeOther<Book>> {
    let book = state.services.records.create_book(&form).await?;
    Ok(SeeOther::new(format!("/api/v1/books/{}", book.id), book))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 303, description = "Book updated, redirect to its detail view", body = Book),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    _user: StaffUser,
    Path(id): Path<i32>,
    FormBody(form): FormBody<BookForm>,
) -> AppResult<SeeOther<Book>> {
    let book = state.services.records.update_book(id, &form).await?;
    Ok(SeeOther::new(format!("/api/v1/books/{}", book.id), book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Book deleted, redirect to the book list", body = Deleted),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book still has copies")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    _user: StaffUser,
    Path(id): Path<i32>,
) -> AppResult<SeeOther<Deleted>> {
    state.services.records.delete_book(id).await?;
    Ok(SeeOther::new(
        "/api/v1/books",
        Deleted {
            id,
            message: "Book deleted".to_string(),
        },
    ))
}
