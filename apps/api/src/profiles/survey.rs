use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// How many options a survey section accepts.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum SelectionRule {
    AtLeastOne,
    Exactly(usize),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySection {
    /// Field name in the submitted preferences.
    pub field: &'static str,
    pub title: &'static str,
    pub rule: SelectionRule,
    pub options: &'static [&'static str],
}

pub const SKILLS: SurveySection = SurveySection {
    field: "skills",
    title: "Skills and Strengths",
    rule: SelectionRule::AtLeastOne,
    options: &[
        "Working with numbers and data analysis",
        "Communication and writing",
        "Creative and artistic activities",
        "Problem-solving and logical thinking",
        "Working with people and building relationships",
        "Physical or hands-on activities",
        "Leadership and organizing teams",
        "Technology and digital tools",
        "Teaching and explaining concepts",
        "Research and investigation",
    ],
};

pub const WORK_ENVIRONMENTS: SurveySection = SurveySection {
    field: "workEnvironments",
    title: "Work Environment Preferences",
    rule: SelectionRule::Exactly(3),
    options: &[
        "In an office setting",
        "Outdoors or in the field",
        "From home/remotely",
        "In a laboratory or research facility",
        "In a creative studio",
        "In a hospital or healthcare setting",
        "In an educational environment",
        "In a retail or customer-facing space",
        "In an industrial or manufacturing setting",
        "In different locations (traveling)",
    ],
};

pub const CORE_VALUES: SurveySection = SurveySection {
    field: "coreValues",
    title: "Core Values and Motivations",
    rule: SelectionRule::Exactly(3),
    options: &[
        "Making a positive impact on society",
        "Financial security and growth",
        "Work-life balance",
        "Continuous learning and challenges",
        "Creative expression",
        "Leadership opportunities",
        "Job security and stability",
        "Innovation and cutting-edge work",
        "Helping others",
        "Building something of your own",
    ],
};

pub const INDUSTRY_INTERESTS: SurveySection = SurveySection {
    field: "industryInterests",
    title: "Industry Interests",
    rule: SelectionRule::Exactly(3),
    options: &[
        "Technology and Software",
        "Healthcare and Medicine",
        "Education and Training",
        "Finance and Business",
        "Arts and Entertainment",
        "Science and Research",
        "Engineering and Manufacturing",
        "Social Services",
        "Media and Communications",
        "Environmental and Sustainability",
    ],
};

pub const LEARNING_STYLES: SurveySection = SurveySection {
    field: "learningStyles",
    title: "Learning Style and Growth",
    rule: SelectionRule::AtLeastOne,
    options: &[
        "Through formal education (university/college)",
        "Through hands-on experience",
        "Through self-directed learning",
        "Through mentorship and guidance",
        "Through structured training programs",
        "Through trial and error",
        "Through collaborative projects",
        "Through theoretical study",
        "Through practical applications",
        "Through creative exploration",
    ],
};

/// Survey sections in the order the client presents them.
pub const SURVEY: [SurveySection; 5] = [
    SKILLS,
    WORK_ENVIRONMENTS,
    CORE_VALUES,
    INDUSTRY_INTERESTS,
    LEARNING_STYLES,
];

/// Core values travel as one comma-joined string.
pub const CORE_VALUES_SEPARATOR: &str = ", ";

/// Student preferences as submitted by the onboarding survey.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPreferencesInput {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub work_environments: Vec<String>,
    #[serde(default)]
    pub core_values: String,
    #[serde(default)]
    pub industry_interests: Vec<String>,
    #[serde(default)]
    pub learning_styles: Vec<String>,
}

/// Preferences that passed validation, with blanks and padding removed.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentPreferences {
    pub skills: Vec<String>,
    pub work_environments: Vec<String>,
    pub core_values: Vec<String>,
    pub industry_interests: Vec<String>,
    pub learning_styles: Vec<String>,
}

impl StudentPreferences {
    pub fn core_values_text(&self) -> String {
        self.core_values.join(CORE_VALUES_SEPARATOR)
    }
}

/// Blank entries stand for "nothing selected" (the client sends `[""]`).
fn clean(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn check_section(section: &SurveySection, selected: &[String], problems: &mut Vec<String>) {
    match section.rule {
        SelectionRule::AtLeastOne if selected.is_empty() => {
            problems.push(format!("{}: select at least one option", section.title));
        }
        SelectionRule::Exactly(n) if selected.len() != n => {
            problems.push(format!(
                "{}: select exactly {} options (got {})",
                section.title,
                n,
                selected.len()
            ));
        }
        _ => {}
    }

    let mut seen = HashSet::new();
    for choice in selected {
        if !section.options.contains(&choice.as_str()) {
            problems.push(format!("{}: unknown option '{}'", section.title, choice));
        } else if !seen.insert(choice.as_str()) {
            problems.push(format!("{}: '{}' selected twice", section.title, choice));
        }
    }
}

/// Validates every section and reports all problems together.
pub fn validate_preferences(
    input: &StudentPreferencesInput,
) -> Result<StudentPreferences, Vec<String>> {
    let core_values: Vec<String> = input
        .core_values
        .split(CORE_VALUES_SEPARATOR.trim())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    let prefs = StudentPreferences {
        skills: clean(&input.skills),
        work_environments: clean(&input.work_environments),
        core_values,
        industry_interests: clean(&input.industry_interests),
        learning_styles: clean(&input.learning_styles),
    };

    let mut problems = Vec::new();
    check_section(&SKILLS, &prefs.skills, &mut problems);
    check_section(&WORK_ENVIRONMENTS, &prefs.work_environments, &mut problems);
    check_section(&CORE_VALUES, &prefs.core_values, &mut problems);
    check_section(&INDUSTRY_INTERESTS, &prefs.industry_interests, &mut problems);
    check_section(&LEARNING_STYLES, &prefs.learning_styles, &mut problems);

    if problems.is_empty() {
        Ok(prefs)
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn valid_input() -> StudentPreferencesInput {
        StudentPreferencesInput {
            skills: strings(&["Communication and writing"]),
            work_environments: strings(&[
                "In an office setting",
                "From home/remotely",
                "In a creative studio",
            ]),
            core_values: "Work-life balance, Helping others, Creative expression".to_string(),
            industry_interests: strings(&[
                "Technology and Software",
                "Social Services",
                "Science and Research",
            ]),
            learning_styles: strings(&["Through hands-on experience", "Through trial and error"]),
        }
    }

    #[test]
    fn test_valid_preferences_pass() {
        let prefs = validate_preferences(&valid_input()).unwrap();
        assert_eq!(prefs.core_values.len(), 3);
        assert_eq!(
            prefs.core_values_text(),
            "Work-life balance, Helping others, Creative expression"
        );
    }

    #[test]
    fn test_placeholder_blank_counts_as_no_selection() {
        let mut input = valid_input();
        input.skills = strings(&[""]);
        let problems = validate_preferences(&input).unwrap_err();
        assert_eq!(problems, vec!["Skills and Strengths: select at least one option"]);
    }

    #[test]
    fn test_exact_count_enforced() {
        let mut input = valid_input();
        input.industry_interests.pop();
        let problems = validate_preferences(&input).unwrap_err();
        assert!(problems[0].contains("select exactly 3 options (got 2)"));
    }

    #[test]
    fn test_unknown_and_duplicate_options_reported_together() {
        let mut input = valid_input();
        input.work_environments = strings(&[
            "In an office setting",
            "In an office setting",
            "On a boat",
        ]);
        input.core_values = "Fame, Helping others, Work-life balance".to_string();
        let problems = validate_preferences(&input).unwrap_err();
        assert_eq!(problems.len(), 3);
        assert!(problems.iter().any(|p| p.contains("selected twice")));
        assert!(problems.iter().any(|p| p.contains("'On a boat'")));
        assert!(problems.iter().any(|p| p.contains("'Fame'")));
    }

    #[test]
    fn test_every_option_in_catalog_is_unique() {
        for section in SURVEY {
            let unique: HashSet<_> = section.options.iter().collect();
            assert_eq!(unique.len(), section.options.len(), "{}", section.title);
            assert!(section.options.iter().all(|o| !o.contains(',')));
        }
    }
}
