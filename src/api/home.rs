//! Home page: record counts and the visit counter

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{error::AppResult, models::{HomeSummary, Session}};

/// Home page summary
///
/// The visitor's session is identified by the session cookie; a new session
/// is started when the cookie is missing or refers to an expired session.
pub async fn home(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<HomeSummary>)> {
    let cookie_name = state.config.session.cookie_name.clone();

    let stored = match jar.get(&cookie_name) {
        Some(cookie) => state.services.sessions.load(cookie.value()).await?,
        None => None,
    };
    let mut session = stored.unwrap_or_else(Session::new);

    let summary = state.services.catalog.summary(&mut session).await?;
    state.services.sessions.save(&session).await?;

    let cookie = Cookie::build((cookie_name, session.id))
        .path("/")
        .http_only(true)
        .build();

    Ok((jar.add(cookie), Json(summary)))
}
