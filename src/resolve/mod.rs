//! # Resolve Module
//!
//! Turning tile identifiers into collision terrain.
//!
//! Each identifier maps to a [`ResolutionRule`]. Some rules are fixed, others
//! flip a coin: per cell, or once per page for a whole group of identifiers so
//! that related features (a bridge and its supports, a gate and its lever
//! wall) appear or vanish together.

pub mod passability;
pub mod resolver;

pub use passability::*;
pub use resolver::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which side of a complementary pair an identifier is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Solid when the pair's coin lands solid
    Primary,
    /// Open when the pair's coin lands solid
    Secondary,
}

/// How one terrain identifier resolves to passability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ResolutionRule {
    AlwaysSolid,
    AlwaysOpen,
    /// Every cell flips its own coin
    IndependentCoin,
    /// Every identifier in the group follows one coin per resolution
    SharedCoin { group: u32 },
    /// The two sides of a pair follow one coin with opposite outcomes
    ComplementaryCoin { pair: u32, polarity: Polarity },
}

/// Identifier-to-rule lookup for one template vocabulary.
///
/// Identifiers missing from the table resolve open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    rules: BTreeMap<u32, ResolutionRule>,
    /// Identifier that door carving forces open inside its band
    #[serde(default)]
    exit_marker: Option<u32>,
}

/// Identifiers of the built-in vocabulary.
pub mod vocabulary {
    pub const BACKGROUND: u32 = 0;
    pub const WALL: u32 = 1;
    pub const EXIT_MARKER: u32 = 2;
    pub const RUBBLE: u32 = 3;
    pub const BRIDGE: u32 = 4;
    pub const BRIDGE_SUPPORT: u32 = 5;
    pub const VINE: u32 = 6;
    pub const VINE_ROOT: u32 = 7;
    pub const GATE: u32 = 8;
    pub const GATE_SWITCH_WALL: u32 = 9;
}

impl RuleTable {
    /// An empty table: everything resolves open and there is no exit marker.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in vocabulary used when a template set supplies none.
    ///
    /// | id | meaning | rule |
    /// |----|---------|------|
    /// | 0 | background | open |
    /// | 1 | wall | solid |
    /// | 2 | exit marker | solid until carved |
    /// | 3 | rubble | independent coin |
    /// | 4, 5 | bridge, bridge support | shared coin, group 0 |
    /// | 6, 7 | vine, vine root | shared coin, group 1 |
    /// | 8, 9 | gate, gate switch wall | complementary pair 0 |
    pub fn default_vocabulary() -> Self {
        use vocabulary::*;

        Self::new()
            .with_rule(BACKGROUND, ResolutionRule::AlwaysOpen)
            .with_rule(WALL, ResolutionRule::AlwaysSolid)
            .with_rule(EXIT_MARKER, ResolutionRule::AlwaysSolid)
            .with_rule(RUBBLE, ResolutionRule::IndependentCoin)
            .with_rule(BRIDGE, ResolutionRule::SharedCoin { group: 0 })
            .with_rule(BRIDGE_SUPPORT, ResolutionRule::SharedCoin { group: 0 })
            .with_rule(VINE, ResolutionRule::SharedCoin { group: 1 })
            .with_rule(VINE_ROOT, ResolutionRule::SharedCoin { group: 1 })
            .with_rule(
                GATE,
                ResolutionRule::ComplementaryCoin {
                    pair: 0,
                    polarity: Polarity::Primary,
                },
            )
            .with_rule(
                GATE_SWITCH_WALL,
                ResolutionRule::ComplementaryCoin {
                    pair: 0,
                    polarity: Polarity::Secondary,
                },
            )
            .with_exit_marker(EXIT_MARKER)
    }

    /// Builder-style rule insertion.
    pub fn with_rule(mut self, terrain_id: u32, rule: ResolutionRule) -> Self {
        self.rules.insert(terrain_id, rule);
        self
    }

    /// Builder-style exit marker.
    pub fn with_exit_marker(mut self, terrain_id: u32) -> Self {
        self.exit_marker = Some(terrain_id);
        self
    }

    /// Rule for an identifier; unknown identifiers are always open.
    pub fn rule_for(&self, terrain_id: u32) -> ResolutionRule {
        self.rules
            .get(&terrain_id)
            .copied()
            .unwrap_or(ResolutionRule::AlwaysOpen)
    }

    /// The exit marker identifier, if the vocabulary has one.
    pub fn exit_marker(&self) -> Option<u32> {
        self.exit_marker
    }

    /// Distinct shared-coin groups, ascending.
    pub fn shared_groups(&self) -> Vec<u32> {
        let mut groups: Vec<u32> = self
            .rules
            .values()
            .filter_map(|rule| match rule {
                ResolutionRule::SharedCoin { group } => Some(*group),
                _ => None,
            })
            .collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    /// Distinct complementary pairs, ascending.
    pub fn complementary_pairs(&self) -> Vec<u32> {
        let mut pairs: Vec<u32> = self
            .rules
            .values()
            .filter_map(|rule| match rule {
                ResolutionRule::ComplementaryCoin { pair, .. } => Some(*pair),
                _ => None,
            })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_identifier_is_open() {
        let table = RuleTable::default_vocabulary();
        assert_eq!(table.rule_for(4242), ResolutionRule::AlwaysOpen);
        assert_eq!(RuleTable::new().rule_for(1), ResolutionRule::AlwaysOpen);
    }

    #[test]
    fn test_default_vocabulary_groups() {
        let table = RuleTable::default_vocabulary();
        assert_eq!(table.shared_groups(), vec![0, 1]);
        assert_eq!(table.complementary_pairs(), vec![0]);
        assert_eq!(table.exit_marker(), Some(vocabulary::EXIT_MARKER));
        assert_eq!(table.rule_for(vocabulary::WALL), ResolutionRule::AlwaysSolid);
    }

    #[test]
    fn test_rule_table_from_json() {
        let json = r#"{
            "rules": {
                "1": { "rule": "always_solid" },
                "12": { "rule": "shared_coin", "group": 3 },
                "13": { "rule": "complementary_coin", "pair": 1, "polarity": "secondary" }
            },
            "exit_marker": 1
        }"#;
        let table: RuleTable = serde_json::from_str(json).unwrap();

        assert_eq!(table.rule_for(1), ResolutionRule::AlwaysSolid);
        assert_eq!(table.rule_for(12), ResolutionRule::SharedCoin { group: 3 });
        assert_eq!(
            table.rule_for(13),
            ResolutionRule::ComplementaryCoin {
                pair: 1,
                polarity: Polarity::Secondary
            }
        );
        assert_eq!(table.exit_marker(), Some(1));
    }

    #[test]
    fn test_rule_table_json_defaults() {
        let table: RuleTable = serde_json::from_str("{}").unwrap();
        assert_eq!(table, RuleTable::new());
    }
}
