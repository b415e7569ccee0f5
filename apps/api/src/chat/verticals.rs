use std::collections::HashMap;

use serde::Serialize;

/// Industry track with its own hosted assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertical {
    Cs,
    Health,
    Finance,
    Business,
}

impl Vertical {
    pub const ALL: [Vertical; 4] = [
        Vertical::Cs,
        Vertical::Health,
        Vertical::Finance,
        Vertical::Business,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Vertical::Cs => "cs",
            Vertical::Health => "health",
            Vertical::Finance => "finance",
            Vertical::Business => "business",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.slug() == slug)
    }

    /// Prefix of the `OPENAI_<PREFIX>_ASSISTANT_ID` variables.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Vertical::Cs => "CS",
            Vertical::Health => "HEALTH",
            Vertical::Finance => "FINANCE",
            Vertical::Business => "BUSINESS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Vertical::Cs => "Computer Science",
            Vertical::Health => "Healthcare",
            Vertical::Finance => "Finance",
            Vertical::Business => "Business",
        }
    }

    /// Which mentor assistant serves a student or professional of this major.
    pub fn for_major(major: &str) -> Option<Self> {
        match major.trim() {
            "Computer Science" | "Software Engineering" => Some(Vertical::Cs),
            "Healthcare" | "Nursing" | "Public Health" | "Pre-Medicine" | "Nutrition"
            | "Physical Therapy" => Some(Vertical::Health),
            "Finance" | "Accounting" | "Economics" => Some(Vertical::Finance),
            "Business" | "Business Administration" | "Marketing" => Some(Vertical::Business),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantBinding {
    pub assistant_id: String,
    pub vector_store_id: Option<String>,
}

/// Assistant IDs configured per vertical.
#[derive(Debug, Clone, Default)]
pub struct AssistantRegistry {
    bindings: HashMap<Vertical, AssistantBinding>,
}

impl AssistantRegistry {
    pub fn insert(&mut self, vertical: Vertical, binding: AssistantBinding) {
        self.bindings.insert(vertical, binding);
    }

    pub fn get(&self, vertical: Vertical) -> Option<&AssistantBinding> {
        self.bindings.get(&vertical)
    }

    /// Configured verticals, in declaration order.
    pub fn configured(&self) -> Vec<Vertical> {
        Vertical::ALL
            .into_iter()
            .filter(|v| self.bindings.contains_key(v))
            .collect()
    }
}
