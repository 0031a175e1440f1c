use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Ranking category a user orders by importance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preference {
    Environment,
    Societal,
    Animal,
    Health,
}

impl Preference {
    pub const ALL: [Preference; 4] = [
        Preference::Environment,
        Preference::Societal,
        Preference::Animal,
        Preference::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Environment => "environment",
            Preference::Societal => "societal",
            Preference::Animal => "animal",
            Preference::Health => "health",
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A required category was absent from the preference list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("preference '{0}' is missing from the preferences list")]
pub struct MissingPreference(pub Preference);

/// 1-based rank of each category, 1 being the most important
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceRanks {
    pub environment: usize,
    pub societal: usize,
    pub animal: usize,
    pub health: usize,
}

impl PreferenceRanks {
    /// Resolve ranks from an ordered preference list.
    ///
    /// A rank is the position of the first occurrence of the category.
    /// Every category must be present; no rank is ever defaulted.
    pub fn from_preferences(preferences: &[Preference]) -> Result<Self, MissingPreference> {
        let rank_of = |preference: Preference| {
            preferences
                .iter()
                .position(|p| *p == preference)
                .map(|index| index + 1)
                .ok_or(MissingPreference(preference))
        };

        Ok(Self {
            environment: rank_of(Preference::Environment)?,
            societal: rank_of(Preference::Societal)?,
            animal: rank_of(Preference::Animal)?,
            health: rank_of(Preference::Health)?,
        })
    }

    pub fn rank(&self, preference: Preference) -> usize {
        match preference {
            Preference::Environment => self.environment,
            Preference::Societal => self.societal,
            Preference::Animal => self.animal,
            Preference::Health => self.health,
        }
    }
}

impl Default for PreferenceRanks {
    fn default() -> Self {
        Self {
            environment: 1,
            societal: 2,
            animal: 3,
            health: 4,
        }
    }
}

/// Material found on a label with its share of the garment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialShare {
    pub name: String,
    pub percentage: f64,
}

/// Elements the interpreter extracted from label text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelElements {
    pub materials: Vec<MaterialShare>,
    pub country: String,
    pub label: Option<String>,
}

/// Result of running the scoring pipeline over a set of images
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub score: f64,
    pub elements: Option<LabelElements>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_follow_list_order() {
        let ranks = PreferenceRanks::from_preferences(&[
            Preference::Health,
            Preference::Animal,
            Preference::Societal,
            Preference::Environment,
        ])
        .unwrap();

        assert_eq!(ranks.health, 1);
        assert_eq!(ranks.animal, 2);
        assert_eq!(ranks.societal, 3);
        assert_eq!(ranks.environment, 4);
    }

    #[test]
    fn test_missing_preference_is_reported() {
        let err = PreferenceRanks::from_preferences(&[
            Preference::Health,
            Preference::Animal,
            Preference::Environment,
        ])
        .unwrap_err();

        assert_eq!(err, MissingPreference(Preference::Societal));
    }

    #[test]
    fn test_preference_serializes_lowercase() {
        let json = serde_json::to_string(&Preference::Environment).unwrap();
        assert_eq!(json, "\"environment\"");
    }
}
