use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use tracing::info;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::user::{Session, User, UserType};
use crate::profiles::professional::find_professional;
use crate::profiles::student::find_student;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub session: Session,
}

#[derive(Debug, Deserialize)]
pub struct UserTypeRequest {
    #[serde(rename = "type")]
    pub user_type: UserType,
}

/// GET /api/session
/// The caller's session and user; 401 when not signed in.
pub async fn handle_get_session(auth: AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: auth.user,
        session: auth.session,
    })
}

/// PUT /api/user/type
pub async fn handle_set_user_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UserTypeRequest>,
) -> Result<Json<User>, AppError> {
    let mut tx = state.db.begin().await?;
    let user = lock_user(&mut tx, &auth.user.id).await?;
    if user.kind() == Some(req.user_type) {
        return Ok(Json(user));
    }

    let other = req.user_type.other();
    let has_other_profile = match other {
        UserType::Student => find_student(&mut *tx, &user.id).await?.is_some(),
        UserType::Professional => find_professional(&mut *tx, &user.id).await?.is_some(),
    };
    if has_other_profile {
        return Err(type_conflict(other));
    }

    let user = update_user_type(&mut tx, &user.id, req.user_type).await?;
    tx.commit().await?;
    Ok(Json(user))
}

fn type_conflict(existing: UserType) -> AppError {
    AppError::Conflict(format!("User already has a {} profile", existing.as_str()))
}

/// Whether a user of type `current` may submit a `wanted` profile, and if so
/// whether the type still has to be recorded.
fn check_claim(current: Option<UserType>, wanted: UserType) -> Result<bool, AppError> {
    match current {
        Some(current) if current == wanted => Ok(false),
        Some(_) => Err(AppError::Forbidden),
        None => Ok(true),
    }
}

/// Records `wanted` as the user's type on first use; a user of the other
/// type may not submit this kind of profile.
///
/// Runs on the caller's transaction and holds the user row until it ends, so
/// a concurrent type change cannot slip in before the profile is written.
pub async fn claim_user_type(
    conn: &mut PgConnection,
    user_id: &str,
    wanted: UserType,
) -> Result<(), AppError> {
    let user = lock_user(conn, user_id).await?;
    if check_claim(user.kind(), wanted)? {
        update_user_type(conn, user_id, wanted).await?;
    }
    Ok(())
}

async fn lock_user(conn: &mut PgConnection, user_id: &str) -> Result<User, sqlx::Error> {
    sqlx::query_as(r#"SELECT * FROM "user" WHERE id = $1 FOR UPDATE"#)
        .bind(user_id)
        .fetch_one(conn)
        .await
}

async fn update_user_type(
    conn: &mut PgConnection,
    user_id: &str,
    user_type: UserType,
) -> Result<User, sqlx::Error> {
    let user: User = sqlx::query_as(
        r#"UPDATE "user" SET type = $1, updated_at = $2 WHERE id = $3 RETURNING *"#,
    )
    .bind(user_type.as_str())
    .bind(Utc::now().naive_utc())
    .bind(user_id)
    .fetch_one(conn)
    .await?;

    info!("User {user_id} is now a {}", user_type.as_str());
    Ok(user)
}
