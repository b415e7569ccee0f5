use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentRow {
    pub id: Uuid,
    pub user_id: String,
    pub skills: Vec<String>,
    pub work_environments: Vec<String>,
    pub core_values: String,
    pub industry_interests: Vec<String>,
    pub learning_styles: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalRow {
    pub id: Uuid,
    pub user_id: String,
    pub bio: String,
    pub industry: String,
    pub current_role: String,
    pub company: Option<String>,
    pub years_experience: i32,
    pub years_in_current_role: i32,
    pub career_timeline: String,
    pub career_journey: String,
    pub core_daily_activities: String,
    pub tools_and_technology: String,
    pub technical_skills: String,
    pub soft_skills: String,
    pub industry_trends: String,
    pub professional_development_activities: Option<String>,
    pub advice_for_newcomers: String,
    pub key_success_factors: String,
    pub resources: Option<String>,
    pub major: Option<String>,
    pub profile_document_key: Option<String>,
    pub vector_store_id: Option<String>,
    pub vector_store_file_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
