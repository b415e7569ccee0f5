use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GigStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

/// A short project posted to the gig board.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gig {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub skills: &'static [&'static str],
    pub duration: &'static str,
    pub difficulty: Difficulty,
    pub posted_by: &'static str,
    pub status: GigStatus,
}

/// Sample board shown until real postings exist.
pub static SAMPLE_GIGS: [Gig; 4] = [
    Gig {
        id: "1",
        title: "Social Media Marketing Campaign",
        description: "Looking for help in designing and executing a social media campaign for a new product launch.",
        skills: &["Marketing", "Social Media", "Content Creation"],
        duration: "2 weeks",
        difficulty: Difficulty::Intermediate,
        posted_by: "TechStart Inc.",
        status: GigStatus::Open,
    },
    Gig {
        id: "2",
        title: "Financial Analysis Report",
        description: "Need assistance in creating a comprehensive financial analysis report for a startup.",
        skills: &["Financial Analysis", "Excel", "Data Visualization"],
        duration: "1 week",
        difficulty: Difficulty::Advanced,
        posted_by: "Finance Pro LLC",
        status: GigStatus::Open,
    },
    Gig {
        id: "3",
        title: "Web Development Project",
        description: "Looking for collaborators to build a responsive website for a local business.",
        skills: &["HTML", "CSS", "JavaScript", "React"],
        duration: "3 weeks",
        difficulty: Difficulty::Intermediate,
        posted_by: "WebDev Solutions",
        status: GigStatus::InProgress,
    },
    Gig {
        id: "4",
        title: "Market Research Study",
        description: "Conducting a market research study for a new app. Need help with data collection and analysis.",
        skills: &["Market Research", "Data Analysis", "Survey Design"],
        duration: "4 weeks",
        difficulty: Difficulty::Beginner,
        posted_by: "Research Team",
        status: GigStatus::Open,
    },
];

impl Gig {
    /// Case-insensitive substring match on title, description or any skill.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
            || self
                .skills
                .iter()
                .any(|s| s.to_lowercase().contains(needle_lower))
    }
}

/// Filters `gigs` by search text and status, keeping catalog order.
pub fn search<'a>(gigs: &'a [Gig], query: Option<&str>, status: Option<GigStatus>) -> Vec<&'a Gig> {
    let needle = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    gigs.iter()
        .filter(|g| status.map_or(true, |s| g.status == s))
        .filter(|g| needle.as_deref().map_or(true, |n| g.matches(n)))
        .collect()
}

pub fn find<'a>(gigs: &'a [Gig], id: &str) -> Option<&'a Gig> {
    gigs.iter().find(|g| g.id == id)
}
