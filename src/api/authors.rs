//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        author::AuthorFormDefaults, pagination::PageQuery, Author, AuthorDetail, AuthorForm, Page,
    },
};

use super::{Deleted, FormBody, SeeOther, StaffUser};

/// List authors ordered by last then first name
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of authors", body = Page<Author>),
        (status = 404, description = "Page out of range")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Author>>> {
    let page = state.services.catalog.list_authors(query.page).await?;
    Ok(Json(page))
}

/// Initial values of the author creation form
#[utoipa::path(
    get,
    path = "/authors/new",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Form defaults", body = AuthorFormDefaults),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn new_author_form(
    State(state): State<crate::AppState>,
    _user: StaffUser,
) -> AppResult<Json<AuthorFormDefaults>> {
    Ok(Json(state.services.records.author_form_defaults()))
}

/// Get author details by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author with their books", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let author = state.services.lookup.author(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Author created, redirect to its detail view", body = Author),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Staff privileges required")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    _user: StaffUser,
    FormBody(form): FormBody<AuthorForm>,
) -> AppResult<SeeOther<Author>> {
    let author = state.services.records.create_author(&form).await?;
    Ok(SeeOther::new(format!("/api/v1/authors/{}", author.id), author))
}

/// Update an existing author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorForm,
    responses(
        (status = 303, description = "Author updated, redirect to its detail view", body = Author),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    _user: StaffUser,
    Path(id): Path<i32>,
    FormBody(form): FormBody<AuthorForm>,
) -> AppResult<SeeOther<Author>> {
    let author = state.services.records.update_author(id, &form).await?;
    Ok(SeeOther::new(format!("/api/v1/authors/{}", author.id), author))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Author deleted, redirect to the author list", body = Deleted),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still referenced by books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    _user: StaffUser,
    Path(id): Path<i32>,
) -> AppResult<SeeOther<Deleted>> {
    state.services.records.delete_author(id).await?;
    Ok(SeeOther::new(
        "/api/v1/authors",
        Deleted {
            id,
            message: "Author deleted".to_string(),
        },
    ))
}
