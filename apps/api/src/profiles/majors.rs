use serde::Serialize;

use crate::chat::verticals::Vertical;

#[derive(Debug, Clone, Serialize)]
pub struct MajorGroup {
    pub name: &'static str,
    pub majors: &'static [&'static str],
}

pub const MAJOR_GROUPS: [MajorGroup; 6] = [
    MajorGroup {
        name: "Engineering & Technology",
        majors: &[
            "Computer Science",
            "Electrical Engineering",
            "Mechanical Engineering",
            "Software Engineering",
            "Civil Engineering",
        ],
    },
    MajorGroup {
        name: "Natural Sciences",
        majors: &[
            "Biology",
            "Chemistry",
            "Physics",
            "Environmental Science",
            "Mathematics",
        ],
    },
    MajorGroup {
        name: "Business & Economics",
        majors: &[
            "Business Administration",
            "Economics",
            "Finance",
            "Marketing",
            "Accounting",
        ],
    },
    MajorGroup {
        name: "Arts & Humanities",
        majors: &[
            "English Literature",
            "History",
            "Philosophy",
            "Fine Arts",
            "Music",
        ],
    },
    MajorGroup {
        name: "Social Sciences",
        majors: &[
            "Psychology",
            "Sociology",
            "Political Science",
            "Anthropology",
            "Communications",
        ],
    },
    MajorGroup {
        name: "Health Sciences",
        majors: &[
            "Nursing",
            "Public Health",
            "Pre-Medicine",
            "Nutrition",
            "Physical Therapy",
        ],
    },
];

/// A major from the catalog, with the mentor vertical that covers it.
#[derive(Debug, Clone, Serialize)]
pub struct MajorOption {
    pub major: &'static str,
    pub category: &'static str,
    pub vertical: Option<Vertical>,
}

pub fn major_options() -> Vec<MajorOption> {
    MAJOR_GROUPS
        .iter()
        .flat_map(|group| {
            group.majors.iter().map(move |&major| MajorOption {
                major,
                category: group.name,
                vertical: Vertical::for_major(major),
            })
        })
        .collect()
}

pub fn is_known_major(major: &str) -> bool {
    MAJOR_GROUPS
        .iter()
        .any(|group| group.majors.contains(&major))
}
