//! Axum route handlers for onboarding profiles and their catalogs.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::extract::AuthUser;
use crate::auth::handlers::claim_user_type;
use crate::errors::AppError;
use crate::models::profile::{ProfessionalRow, StudentRow};
use crate::models::user::UserType;
use crate::profiles::archive::{archive_profile, ArchiveOutcome};
use crate::profiles::majors::{major_options, MajorGroup, MajorOption, MAJOR_GROUPS};
use crate::profiles::professional::{find_professional, upsert_professional, ProfessionalIntake};
use crate::profiles::student::{find_student, upsert_student};
use crate::profiles::survey::{validate_preferences, StudentPreferencesInput, SurveySection, SURVEY};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Body of `PUT /api/profile`: `{ "type": "student", "data": { ... } }`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ProfileSubmission {
    Student(StudentPreferencesInput),
    Professional(ProfessionalIntake),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "profile", rename_all = "snake_case")]
pub enum ProfileResponse {
    Student(StudentRow),
    Professional(ProfessionalRow),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalSaved {
    pub profile: ProfessionalRow,
    pub archived: bool,
    pub archive: ArchiveOutcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProfileSaved {
    Student { profile: StudentRow },
    Professional(ProfessionalSaved),
}

#[derive(Debug, Serialize)]
pub struct MajorsResponse {
    pub groups: Vec<MajorGroup>,
    pub options: Vec<MajorOption>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/survey
pub async fn handle_get_survey() -> Json<Vec<SurveySection>> {
    Json(SURVEY.to_vec())
}

/// GET /api/majors
pub async fn handle_get_majors() -> Json<MajorsResponse> {
    Json(MajorsResponse {
        groups: MAJOR_GROUPS.to_vec(),
        options: major_options(),
    })
}

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user_id = &auth.user.id;
    let profile = match auth.user.kind() {
        Some(UserType::Professional) => find_professional(&state.db, user_id)
            .await?
            .map(ProfileResponse::Professional),
        Some(UserType::Student) => find_student(&state.db, user_id)
            .await?
            .map(ProfileResponse::Student),
        None => None,
    };

    profile
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No profile for user {user_id}")))
}

/// PUT /api/profile
pub async fn handle_put_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(submission): Json<ProfileSubmission>,
) -> Result<Json<ProfileSaved>, AppError> {
    match submission {
        ProfileSubmission::Student(input) => {
            let prefs = validate_preferences(&input)
                .map_err(|problems| AppError::Validation(problems.join("; ")))?;
            let mut tx = state.db.begin().await?;
            claim_user_type(&mut tx, &auth.user.id, UserType::Student).await?;
            let profile = upsert_student(&mut *tx, &auth.user.id, &prefs).await?;
            tx.commit().await?;
            Ok(Json(ProfileSaved::Student { profile }))
        }
        ProfileSubmission::Professional(intake) => {
            let saved = save_professional(&state, &auth, &intake).await?;
            Ok(Json(ProfileSaved::Professional(saved)))
        }
    }
}

/// POST /api/user/professional-profile
pub async fn handle_professional_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(intake): Json<ProfessionalIntake>,
) -> Result<Json<ProfessionalSaved>, AppError> {
    Ok(Json(save_professional(&state, &auth, &intake).await?))
}

async fn save_professional(
    state: &AppState,
    auth: &AuthUser,
    intake: &ProfessionalIntake,
) -> Result<ProfessionalSaved, AppError> {
    let intake = intake
        .validate()
        .map_err(|problems| AppError::Validation(problems.join("; ")))?;

    let mut tx = state.db.begin().await?;
    claim_user_type(&mut tx, &auth.user.id, UserType::Professional).await?;
    let profile = upsert_professional(&mut *tx, &auth.user.id, &intake).await?;
    tx.commit().await?;

    let archive = archive_profile(state, &profile).await;
    info!(
        "Professional profile for {} saved (archived: {})",
        auth.user.id,
        archive.archived()
    );

    Ok(ProfessionalSaved {
        archived: archive.archived(),
        profile: ProfessionalRow {
            profile_document_key: archive
                .document_key
                .clone()
                .or(profile.profile_document_key.clone()),
            vector_store_id: archive.vector_store_id.clone(),
            vector_store_file_id: archive.vector_store_file_id.clone(),
            ..profile
        },
        archive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_dispatches_on_type() {
        let student: ProfileSubmission = serde_json::from_str(
            r#"{"type":"student","data":{"skills":["Communication and writing"],"workEnvironments":[""],"coreValues":"","industryInterests":[""],"learningStyles":[""],"updatedAt":"2025-02-16T00:00:00.000Z"}}"#,
        )
        .unwrap();
        assert!(matches!(student, ProfileSubmission::Student(ref s) if s.skills.len() == 1));

        let professional: ProfileSubmission = serde_json::from_str(
            r#"{"type":"professional","data":{"bio":"Analyst","yearsExperience":4,"company":null}}"#,
        )
        .unwrap();
        assert!(
            matches!(professional, ProfileSubmission::Professional(ref p) if p.years_experience == Some(4))
        );
    }
}
