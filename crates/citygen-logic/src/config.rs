//! Construction-time configuration for a generation pass.
//!
//! Everything tunable lives here: grid shape, growth budget, the weighted
//! rule set, building tiers, and the leaf inflation factor. `validate`
//! runs every check up front so a bad configuration fails fast instead of
//! producing a silently degenerate city.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use crate::buildings::BuildingTier;
use crate::grid::EdgeMode;
use crate::roads::Rule;
use crate::weighted::WeightedTable;

/// A configuration rejected before generation starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroGridDimension { width: usize, height: usize },
    NoRules,
    EmptyRule,
    UnknownRuleSymbol(char),
    EmptyWeightTable,
    WeightLengthMismatch { weights: usize, items: usize },
    NonPositiveTotalWeight,
    NoBuildingTiers,
    ZeroFootprint,
    TiersNotDescending,
    ChanceOutOfRange(f32),
    NonPositiveInflation(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroGridDimension { width, height } => {
                write!(f, "grid dimensions must be non-zero, got {}x{}", width, height)
            }
            ConfigError::NoRules => write!(f, "rule set is empty"),
            ConfigError::EmptyRule => write!(f, "a rule has no symbols"),
            ConfigError::UnknownRuleSymbol(c) => {
                write!(f, "unknown rule symbol '{}', expected one of f l r b o", c)
            }
            ConfigError::EmptyWeightTable => write!(f, "weighted table has no items"),
            ConfigError::WeightLengthMismatch { weights, items } => {
                write!(f, "{} weights for {} items", weights, items)
            }
            ConfigError::NonPositiveTotalWeight => {
                write!(f, "weights must be non-negative with a positive total")
            }
            ConfigError::NoBuildingTiers => write!(f, "building tier list is empty"),
            ConfigError::ZeroFootprint => write!(f, "a building tier has footprint 0"),
            ConfigError::TiersNotDescending => {
                write!(f, "building tiers must be ordered largest footprint first")
            }
            ConfigError::ChanceOutOfRange(chance) => {
                write!(f, "acceptance chance {} outside [0, 1]", chance)
            }
            ConfigError::NonPositiveInflation(factor) => {
                write!(f, "leaf inflation factor {} must be positive", factor)
            }
        }
    }
}

impl Error for ConfigError {}

/// One weighted production rule, as configured (unparsed segment strings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub segments: Vec<String>,
    pub weight: f32,
}

/// Configuration for one full generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityConfig {
    pub width: usize,
    pub height: usize,
    pub edge_mode: EdgeMode,
    pub growth_rounds: u32,
    pub rules: Vec<RuleSpec>,
    pub building_tiers: Vec<BuildingTier>,
    /// Leaf bounding-sphere radius as a multiple of the object's largest
    /// size component.
    pub leaf_inflation: f32,
    pub road_colour: [f32; 3],
    pub footpath_colour: [f32; 3],
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 60,
            edge_mode: EdgeMode::Bounded,
            growth_rounds: 5,
            rules: vec![
                RuleSpec {
                    segments: vec!["ffo".into()],
                    weight: 0.7,
                },
                RuleSpec {
                    segments: vec![
                        "llffffrrfo".into(),
                        "llfflo".into(),
                        "rrffro".into(),
                        "rrffffll".into(),
                    ],
                    weight: 0.3,
                },
            ],
            building_tiers: vec![
                BuildingTier { footprint: 3, chance: 0.02 },
                BuildingTier { footprint: 2, chance: 0.10 },
                BuildingTier { footprint: 1, chance: 0.60 },
            ],
            leaf_inflation: 1.8,
            road_colour: [0.4, 0.4, 0.4],
            footpath_colour: [0.78, 0.78, 0.78],
        }
    }
}

impl CityConfig {
    /// Check every construction-time constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroGridDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }
        // Parse failures and degenerate weights surface here, not mid-pass.
        self.rule_table()?;

        if self.building_tiers.is_empty() {
            return Err(ConfigError::NoBuildingTiers);
        }
        for pair in self.building_tiers.windows(2) {
            if pair[0].footprint < pair[1].footprint {
                return Err(ConfigError::TiersNotDescending);
            }
        }
        for tier in &self.building_tiers {
            if tier.footprint == 0 {
                return Err(ConfigError::ZeroFootprint);
            }
            if !(0.0..=1.0).contains(&tier.chance) {
                return Err(ConfigError::ChanceOutOfRange(tier.chance));
            }
        }
        if self.leaf_inflation <= 0.0 {
            return Err(ConfigError::NonPositiveInflation(self.leaf_inflation));
        }
        Ok(())
    }

    /// Compile the rule specs into a weighted draw table.
    pub fn rule_table(&self) -> Result<WeightedTable<Rule>, ConfigError> {
        let weights = self.rules.iter().map(|r| r.weight).collect();
        let rules = self
            .rules
            .iter()
            .map(|r| Rule::parse(&r.segments))
            .collect::<Result<Vec<_>, _>>()?;
        WeightedTable::new(weights, rules)
    }
}
