//! Authentication extractor.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;

use super::db as auth_db;
use crate::db::try_lock;
use crate::handlers::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "exam_session";

/// Authenticated request context.
/// Add this as a handler parameter to require authentication.
/// Rejects with 401 JSON if no valid session is presented.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
}

/// Session token from `Authorization: Bearer` or the session cookie.
/// The header wins when both are present.
fn session_token(parts: &Parts, jar: &CookieJar) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string()))
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let session_id = session_token(parts, &jar)
            .ok_or_else(|| ApiError::Unauthorized.into_response())?;

        let conn = try_lock(&state.db).map_err(|e| ApiError::from(e).into_response())?;

        let (user_id, username) = auth_db::get_session_user(&conn, &session_id)
            .map_err(|e| ApiError::from(e).into_response())?
            .ok_or_else(|| ApiError::Unauthorized.into_response())?;

        Ok(AuthContext { user_id, username })
    }
}
