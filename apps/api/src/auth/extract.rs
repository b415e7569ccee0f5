use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::session::{find_session, session_token};
use crate::errors::AppError;
use crate::models::user::{Session, User};
use crate::state::AppState;

/// The signed-in caller. Rejects with 401 when there is no valid session.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = session_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let (session, user) = find_session(&state.db, &token)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthUser { user, session })
    }
}

/// The caller if signed in. Never rejects; lookup failures count as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        if session_token(&parts.headers).is_none() {
            return Ok(MaybeAuthUser(None));
        }
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(AppError::Unauthorized) => Ok(MaybeAuthUser(None)),
            Err(e) => {
                tracing::warn!("Session lookup failed, continuing anonymously: {e}");
                Ok(MaybeAuthUser(None))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{header, Request, StatusCode};

    use super::*;
    use crate::assistant::fake::ScriptedAssistants;
    use crate::chat::verticals::AssistantRegistry;
    use crate::config::Config;

    fn state() -> AppState {
        AppState::for_tests(
            Config::for_tests(AssistantRegistry::default()),
            Arc::new(ScriptedAssistants::default()),
        )
    }

    fn parts_with_token() -> Parts {
        let (parts, _) = Request::get("/api/chat/cs")
            .header(header::AUTHORIZATION, "Bearer tok_1")
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn test_optional_user_is_anonymous_when_lookup_fails() {
        let mut parts = parts_with_token();
        let MaybeAuthUser(user) = MaybeAuthUser::from_request_parts(&mut parts, &state())
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_required_user_surfaces_lookup_failure() {
        let mut parts = parts_with_token();
        let err = AuthUser::from_request_parts(&mut parts, &state())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
