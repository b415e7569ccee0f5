use chrono::Utc;
use serde::Deserialize;
use sqlx::{PgExecutor, PgPool};
use tracing::info;

use crate::chat::verticals::Vertical;
use crate::models::profile::ProfessionalRow;
use crate::profiles::majors::is_known_major;

/// Professional experience intake as submitted by the profile form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfessionalIntake {
    pub bio: String,
    pub industry: String,
    pub current_role: String,
    pub company: Option<String>,
    pub years_experience: Option<i32>,
    pub years_in_current_role: Option<i32>,
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
}

/// An intake that passed validation: text trimmed, blank optionals cleared.
#[derive(Debug, Clone)]
pub struct ProfessionalDetails {
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
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ProfessionalIntake {
    fn required_fields(&self) -> [(&'static str, &str); 12] {
        [
            ("bio", self.bio.as_str()),
            ("industry", self.industry.as_str()),
            ("currentRole", self.current_role.as_str()),
            ("careerTimeline", self.career_timeline.as_str()),
            ("careerJourney", self.career_journey.as_str()),
            ("coreDailyActivities", self.core_daily_activities.as_str()),
            ("toolsAndTechnology", self.tools_and_technology.as_str()),
            ("technicalSkills", self.technical_skills.as_str()),
            ("softSkills", self.soft_skills.as_str()),
            ("industryTrends", self.industry_trends.as_str()),
            ("adviceForNewcomers", self.advice_for_newcomers.as_str()),
            ("keySuccessFactors", self.key_success_factors.as_str()),
        ]
    }

    /// Checks the intake and returns the normalized details.
    /// All problems are reported together.
    pub fn validate(&self) -> Result<ProfessionalDetails, Vec<String>> {
        let mut problems: Vec<String> = self
            .required_fields()
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| format!("{name} is required"))
            .collect();

        match self.years_experience {
            None => problems.push("yearsExperience is required".to_string()),
            Some(years) if years < 0 => {
                problems.push("yearsExperience must not be negative".to_string())
            }
            Some(_) => {}
        }
        match self.years_in_current_role {
            None => problems.push("yearsInCurrentRole is required".to_string()),
            Some(years) if years < 0 => {
                problems.push("yearsInCurrentRole must not be negative".to_string())
            }
            Some(_) => {}
        }
        if let (Some(total), Some(in_role)) = (self.years_experience, self.years_in_current_role) {
            if in_role > total {
                problems.push("yearsInCurrentRole cannot exceed yearsExperience".to_string());
            }
        }

        // Majors outside the catalog are fine as long as a mentor vertical covers them.
        let major = trimmed(&self.major);
        if let Some(major) = &major {
            if !is_known_major(major) && Vertical::for_major(major).is_none() {
                problems.push(format!("unknown major '{major}'"));
            }
        }

        let (Some(years_experience), Some(years_in_current_role), true) = (
            self.years_experience,
            self.years_in_current_role,
            problems.is_empty(),
        ) else {
            return Err(problems);
        };

        Ok(ProfessionalDetails {
            bio: self.bio.trim().to_string(),
            industry: self.industry.trim().to_string(),
            current_role: self.current_role.trim().to_string(),
            company: trimmed(&self.company),
            years_experience,
            years_in_current_role,
            career_timeline: self.career_timeline.trim().to_string(),
            career_journey: self.career_journey.trim().to_string(),
            core_daily_activities: self.core_daily_activities.trim().to_string(),
            tools_and_technology: self.tools_and_technology.trim().to_string(),
            technical_skills: self.technical_skills.trim().to_string(),
            soft_skills: self.soft_skills.trim().to_string(),
            industry_trends: self.industry_trends.trim().to_string(),
            professional_development_activities: trimmed(&self.professional_development_activities),
            advice_for_newcomers: self.advice_for_newcomers.trim().to_string(),
            key_success_factors: self.key_success_factors.trim().to_string(),
            resources: trimmed(&self.resources),
            major,
        })
    }
}

/// Creates or replaces the professional's intake. One row per user.
pub async fn upsert_professional<'e>(
    executor: impl PgExecutor<'e>,
    user_id: &str,
    intake: &ProfessionalDetails,
) -> Result<ProfessionalRow, sqlx::Error> {
    let now = Utc::now().naive_utc();
    let row: ProfessionalRow = sqlx::query_as(
        r#"
        INSERT INTO professional
            (user_id, bio, industry, "current_role", company, years_experience,
             years_in_current_role, career_timeline, career_journey,
             core_daily_activities, tools_and_technology, technical_skills,
             soft_skills, industry_trends, professional_development_activities,
             advice_for_newcomers, key_success_factors, resources, major,
             created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $20)
        ON CONFLICT (user_id) DO UPDATE SET
            bio = EXCLUDED.bio,
            industry = EXCLUDED.industry,
            "current_role" = EXCLUDED."current_role",
            company = EXCLUDED.company,
            years_experience = EXCLUDED.years_experience,
            years_in_current_role = EXCLUDED.years_in_current_role,
            career_timeline = EXCLUDED.career_timeline,
            career_journey = EXCLUDED.career_journey,
            core_daily_activities = EXCLUDED.core_daily_activities,
            tools_and_technology = EXCLUDED.tools_and_technology,
            technical_skills = EXCLUDED.technical_skills,
            soft_skills = EXCLUDED.soft_skills,
            industry_trends = EXCLUDED.industry_trends,
            professional_development_activities = EXCLUDED.professional_development_activities,
            advice_for_newcomers = EXCLUDED.advice_for_newcomers,
            key_success_factors = EXCLUDED.key_success_factors,
            resources = EXCLUDED.resources,
            major = EXCLUDED.major,
            updated_at = EXCLUDED.updated_at
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&intake.bio)
    .bind(&intake.industry)
    .bind(&intake.current_role)
    .bind(&intake.company)
    .bind(intake.years_experience)
    .bind(intake.years_in_current_role)
    .bind(&intake.career_timeline)
    .bind(&intake.career_journey)
    .bind(&intake.core_daily_activities)
    .bind(&intake.tools_and_technology)
    .bind(&intake.technical_skills)
    .bind(&intake.soft_skills)
    .bind(&intake.industry_trends)
    .bind(&intake.professional_development_activities)
    .bind(&intake.advice_for_newcomers)
    .bind(&intake.key_success_factors)
    .bind(&intake.resources)
    .bind(&intake.major)
    .bind(now)
    .fetch_one(executor)
    .await?;

    info!("Saved professional profile for user {user_id}");
    Ok(row)
}

pub async fn find_professional<'e>(
    executor: impl PgExecutor<'e>,
    user_id: &str,
) -> Result<Option<ProfessionalRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM professional WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn set_document_key(
    pool: &PgPool,
    profile: &ProfessionalRow,
    key: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE professional SET profile_document_key = $1 WHERE id = $2")
        .bind(key)
        .bind(profile.id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Records which vector store file currently carries this profile.
pub async fn set_vector_store_file(
    pool: &PgPool,
    profile: &ProfessionalRow,
    file: Option<(&str, &str)>,
) -> Result<(), sqlx::Error> {
    let (vector_store_id, file_id) = file.unzip();
    sqlx::query(
        "UPDATE professional SET vector_store_id = $1, vector_store_file_id = $2 WHERE id = $3",
    )
    .bind(vector_store_id)
    .bind(file_id)
    .bind(profile.id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Renders the profile as the plain-text document mentors are retrieved from.
pub fn render_profile_document(profile: &ProfessionalRow) -> String {
    let years_experience = profile.years_experience.to_string();
    let years_in_role = profile.years_in_current_role.to_string();
    let lines: [(&str, Option<&str>); 17] = [
        ("Bio", Some(profile.bio.as_str())),
        ("Major", profile.major.as_deref()),
        ("Industry", Some(profile.industry.as_str())),
        ("Current Role", Some(profile.current_role.as_str())),
        ("Company", profile.company.as_deref()),
        ("Years Experience", Some(years_experience.as_str())),
        ("Years In Current Role", Some(years_in_role.as_str())),
        ("Career Timeline", Some(profile.career_timeline.as_str())),
        ("Career Journey", Some(profile.career_journey.as_str())),
        ("Core Daily Activities", Some(profile.core_daily_activities.as_str())),
        ("Tools And Technology", Some(profile.tools_and_technology.as_str())),
        ("Technical Skills", Some(profile.technical_skills.as_str())),
        ("Soft Skills", Some(profile.soft_skills.as_str())),
        ("Industry Trends", Some(profile.industry_trends.as_str())),
        (
            "Professional Development",
            profile.professional_development_activities.as_deref(),
        ),
        ("Advice", Some(profile.advice_for_newcomers.as_str())),
        ("Key Success Factors", Some(profile.key_success_factors.as_str())),
    ];

    let mut doc = String::from("Professional Profile:\n");
    for (label, value) in lines {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            doc.push_str(&format!("{label}: {value}\n"));
        }
    }
    if let Some(resources) = profile.resources.as_deref() {
        doc.push_str(&format!("Resources: {resources}\n"));
    }
    doc
}
