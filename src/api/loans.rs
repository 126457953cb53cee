//! Loan listing and renewal endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book_instance::{RenewalForm, RenewalFormView},
        pagination::PageQuery,
        BookInstance, Page,
    },
};

use super::{AuthenticatedUser, FormBody, Librarian, SeeOther};

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Borrowed copies, earliest due first", body = Page<BookInstance>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstance>>> {
    let page = state.services.catalog.my_loans(claims.user_id, query.page).await?;
    Ok(Json(page))
}

/// Every copy currently on loan
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Copies on loan, earliest due first", body = Page<BookInstance>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog.can_mark_returned")
    )
)]
pub async fn all_loans(
    State(state): State<crate::AppState>,
    _user: Librarian,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<BookInstance>>> {
    let page = state.services.catalog.all_loans(query.page).await?;
    Ok(Json(page))
}

/// Renewal form for a copy
#[utoipa::path(
    get,
    path = "/bookinstances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Copy with the proposed due-back date", body = RenewalFormView),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    _user: Librarian,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalFormView>> {
    let today = Utc::now().date_naive();
    let view = state.services.loans.renewal_form(id, today).await?;
    Ok(Json(view))
}

/// Set a new due-back date on a copy
#[utoipa::path(
    post,
    path = "/bookinstances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewalForm,
    responses(
        (status = 303, description = "Renewed, redirect to all borrowed copies", body = BookInstance),
        (status = 400, description = "Malformed body, due-back date missing or out of range, or copy not on loan"),
        (status = 403, description = "Missing catalog.can_mark_returned"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renew(
    State(state): State<crate::AppState>,
    _user: Librarian,
    Path(id): Path<Uuid>,
    FormBody(form): FormBody<RenewalForm>,
) -> AppResult<SeeOther<BookInstance>> {
    let today = Utc::now().date_naive();
    let instance = state.services.loans.renew(id, &form, today).await?;
    Ok(SeeOther::new("/api/v1/borrowed", instance))
}
