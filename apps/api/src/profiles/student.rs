use chrono::Utc;
use sqlx::PgExecutor;
use tracing::info;

use crate::models::profile::StudentRow;
use crate::profiles::survey::StudentPreferences;

/// Creates or replaces the student's survey answers. One row per user.
pub async fn upsert_student<'e>(
    executor: impl PgExecutor<'e>,
    user_id: &str,
    prefs: &StudentPreferences,
) -> Result<StudentRow, sqlx::Error> {
    let now = Utc::now().naive_utc();
    let row: StudentRow = sqlx::query_as(
        r#"
        INSERT INTO student
            (user_id, skills, work_environments, core_values,
             industry_interests, learning_styles, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            skills = EXCLUDED.skills,
            work_environments = EXCLUDED.work_environments,
            core_values = EXCLUDED.core_values,
            industry_interests = EXCLUDED.industry_interests,
            learning_styles = EXCLUDED.learning_styles,
            updated_at = EXCLUDED.updated_at
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&prefs.skills)
    .bind(&prefs.work_environments)
    .bind(prefs.core_values_text())
    .bind(&prefs.industry_interests)
    .bind(&prefs.learning_styles)
    .bind(now)
    .fetch_one(executor)
    .await?;

    info!("Saved student preferences for user {user_id}");
    Ok(row)
}

pub async fn find_student<'e>(
    executor: impl PgExecutor<'e>,
    user_id: &str,
) -> Result<Option<StudentRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM student WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}
