use axum::http::{header, HeaderMap};
use chrono::Utc;
use sqlx::PgPool;

use crate::models::user::{Session, User};

/// Cookie set by the auth service. Over HTTPS it carries the `__Secure-` prefix.
pub const SESSION_COOKIE: &str = "better-auth.session_token";
const SECURE_PREFIX: &str = "__Secure-";

/// Extracts the session token from `Authorization: Bearer` or the session cookie.
///
/// Cookie values are `<token>.<signature>`; only the token is stored in the
/// `session` table, so the signature is dropped.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| {
            let name = name.strip_prefix(SECURE_PREFIX).unwrap_or(name);
            name == SESSION_COOKIE
        })
        .and_then(|(_, value)| {
            let token = value.split('.').next().unwrap_or_default().trim();
            (!token.is_empty()).then(|| token.to_string())
        })
}

/// Looks up an unexpired session and its user.
pub async fn find_session(
    pool: &PgPool,
    token: &str,
) -> Result<Option<(Session, User)>, sqlx::Error> {
    let session: Option<Session> =
        sqlx::query_as("SELECT * FROM session WHERE token = $1 AND expires_at > $2")
            .bind(token)
            .bind(Utc::now().naive_utc())
            .fetch_optional(pool)
            .await?;

    let Some(session) = session else {
        return Ok(None);
    };

    let user = find_user(pool, &session.user_id).await?;
    Ok(user.map(|user| (session, user)))
}

pub async fn find_user(pool: &PgPool, user_id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM "user" WHERE id = $1"#)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
