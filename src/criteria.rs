use serde::{Deserialize, Serialize};

/// Named tool tiers and the power rank each one grants.
pub const TOOL_TIERS: [(&str, u32); 5] = [
    ("base", 2),
    ("copper", 3),
    ("silver", 5),
    ("gold", 7),
    ("orihalcum", 9),
];

/// Rank granted to any label missing from [`TOOL_TIERS`].
pub const FALLBACK_TOOL_POWER: u32 = 1;

pub fn tool_power(label: &str) -> u32 {
    TOOL_TIERS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, power)| *power)
        .unwrap_or(FALLBACK_TOOL_POWER)
}

/// The raw labels a user picked on the controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub toollevel: String,
    pub season: String,
    pub weather: String,
}

impl Selection {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_labels(&self.toollevel, &self.season, &self.weather)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub tool_power: u32,
    pub season: String,
    pub weather: String,
}

impl FilterCriteria {
    pub fn new(tool_power: u32, season: impl Into<String>, weather: impl Into<String>) -> Self {
        Self {
            tool_power,
            season: season.into(),
            weather: weather.into(),
        }
    }

    pub fn from_labels(tool: &str, season: &str, weather: &str) -> Self {
        Self::new(tool_power(tool), season, weather)
    }
}
