use crate::models::{LabelElements, Preference, PreferenceRanks};

/// Category scores (0-10) of a material, higher is better
#[derive(Debug, Clone, Copy)]
pub struct MaterialProfile {
    pub environment: f64,
    pub animal: f64,
    pub health: f64,
}

const fn profile(environment: f64, animal: f64, health: f64) -> MaterialProfile {
    MaterialProfile { environment, animal, health }
}

const NEUTRAL_SCORE: f64 = 5.0;

const MATERIAL_PROFILES: &[(&str, MaterialProfile)] = &[
    ("organic cotton", profile(8.0, 10.0, 9.0)),
    ("cotton", profile(4.0, 10.0, 8.0)),
    ("linen", profile(9.0, 10.0, 9.0)),
    ("hemp", profile(9.0, 10.0, 9.0)),
    ("lyocell", profile(8.0, 10.0, 8.0)),
    ("modal", profile(6.0, 10.0, 7.0)),
    ("viscose", profile(4.0, 10.0, 6.0)),
    ("recycled polyester", profile(6.0, 10.0, 5.0)),
    ("polyester", profile(2.0, 10.0, 4.0)),
    ("nylon", profile(2.0, 10.0, 4.0)),
    ("acrylic", profile(1.0, 10.0, 3.0)),
    ("elastane", profile(2.0, 10.0, 4.0)),
    ("polyurethane", profile(1.0, 10.0, 3.0)),
    ("wool", profile(5.0, 4.0, 8.0)),
    ("cashmere", profile(3.0, 3.0, 8.0)),
    ("silk", profile(5.0, 2.0, 8.0)),
    ("leather", profile(2.0, 0.0, 6.0)),
];

/// Societal score (0-10) of the manufacturing country
const COUNTRY_SOCIETAL: &[(&str, f64)] = &[
    ("france", 9.0),
    ("germany", 9.0),
    ("italy", 8.5),
    ("japan", 8.5),
    ("united kingdom", 8.5),
    ("united states", 8.0),
    ("portugal", 8.0),
    ("spain", 8.0),
    ("korea", 7.5),
    ("lithuania", 7.5),
    ("poland", 7.5),
    ("romania", 6.5),
    ("bulgaria", 6.5),
    ("tunisia", 5.5),
    ("morocco", 5.0),
    ("mexico", 5.0),
    ("turkey", 5.0),
    ("peru", 5.0),
    ("thailand", 4.5),
    ("sri lanka", 4.5),
    ("china", 3.5),
    ("vietnam", 3.5),
    ("indonesia", 3.5),
    ("india", 3.0),
    ("ethiopia", 3.0),
    ("cambodia", 2.5),
    ("pakistan", 2.5),
    ("bangladesh", 2.0),
    ("myanmar", 1.5),
];

/// Combines label elements into a 0-10 score weighted by user preferences
///
/// A category ranked `r` weighs `(5 - r) / 10`, so rank 1 counts four
/// times as much as rank 4.
#[derive(Debug, Clone, Default)]
pub struct Scorer;

impl Scorer {
    pub fn new() -> Self {
        Self
    }

    pub fn category_weight(rank: usize) -> f64 {
        5usize.saturating_sub(rank) as f64 / 10.0
    }

    pub fn material_profile(name: &str) -> MaterialProfile {
        MATERIAL_PROFILES
            .iter()
            .find(|(material, _)| *material == name)
            .map(|(_, profile)| *profile)
            .unwrap_or(profile(NEUTRAL_SCORE, NEUTRAL_SCORE, NEUTRAL_SCORE))
    }

    pub fn country_score(country: &str) -> f64 {
        COUNTRY_SOCIETAL
            .iter()
            .find(|(name, _)| *name == country)
            .map(|(_, score)| *score)
            .unwrap_or(NEUTRAL_SCORE)
    }

    /// Score of each category before preference weighting
    pub fn category_scores(&self, elements: &LabelElements) -> [(Preference, f64); 4] {
        let total: f64 = elements.materials.iter().map(|m| m.percentage).sum();

        let (mut environment, mut animal, mut health) = (0.0, 0.0, 0.0);
        if total > 0.0 {
            for material in &elements.materials {
                let share = material.percentage / total;
                let profile = Self::material_profile(&material.name);
                environment += profile.environment * share;
                animal += profile.animal * share;
                health += profile.health * share;
            }
        } else {
            (environment, animal, health) = (NEUTRAL_SCORE, NEUTRAL_SCORE, NEUTRAL_SCORE);
        }

        [
            (Preference::Environment, environment),
            (Preference::Societal, Self::country_score(&elements.country)),
            (Preference::Animal, animal),
            (Preference::Health, health),
        ]
    }

    pub fn score(&self, elements: &LabelElements, ranks: &PreferenceRanks) -> f64 {
        let (weighted, total_weight) = self
            .category_scores(elements)
            .iter()
            .fold((0.0, 0.0), |(weighted, total), (preference, score)| {
                let weight = Self::category_weight(ranks.rank(*preference));
                (weighted + weight * score, total + weight)
            });

        if total_weight <= 0.0 {
            return NEUTRAL_SCORE;
        }

        let score = (weighted / total_weight).clamp(0.0, 10.0);
        (score * 10.0).round() / 10.0
    }
}
