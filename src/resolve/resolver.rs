//! # Page Resolver
//!
//! Derives a [`PassabilityGrid`] from a loaded [`SymmetryGrid`].

use super::{Passability, PassabilityGrid, Polarity, ResolutionRule, RuleTable};
use crate::symmetry::SymmetryGrid;
use log::trace;
use rand::Rng;
use std::collections::HashMap;

/// Coins shared by several cells, drawn once before a grid is scanned.
///
/// `true` means the coin landed solid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoinDraws {
    shared: HashMap<u32, bool>,
    complementary: HashMap<u32, bool>,
}

impl CoinDraws {
    /// Draws one coin per shared group and per complementary pair.
    pub fn draw<R: Rng + ?Sized>(rules: &RuleTable, rng: &mut R) -> Self {
        let mut draws = Self::default();
        for group in rules.shared_groups() {
            let coin = rng.gen_bool(0.5);
            trace!("Shared coin group {} landed {}", group, solid_word(coin));
            draws.shared.insert(group, coin);
        }
        for pair in rules.complementary_pairs() {
            let coin = rng.gen_bool(0.5);
            trace!("Complementary pair {} landed {}", pair, solid_word(coin));
            draws.complementary.insert(pair, coin);
        }
        draws
    }

    /// The coin for a shared group.
    pub fn shared(&self, group: u32) -> Option<bool> {
        self.shared.get(&group).copied()
    }

    /// The coin for a complementary pair.
    pub fn complementary(&self, pair: u32) -> Option<bool> {
        self.complementary.get(&pair).copied()
    }
}

fn solid_word(coin: bool) -> &'static str {
    if coin {
        "solid"
    } else {
        "open"
    }
}

/// Resolves grids against one rule table.
#[derive(Debug, Clone)]
pub struct PageResolver {
    rules: RuleTable,
}

impl PageResolver {
    /// Creates a resolver for the given vocabulary.
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    /// The vocabulary this resolver applies.
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Resolves every cell of `grid` to solid or open.
    ///
    /// Shared and complementary coins are drawn before any cell is visited, so
    /// every cell of a group sees the same outcome. Independent coins are
    /// flipped per cell during the scan.
    pub fn resolve<R: Rng + ?Sized>(&self, grid: &SymmetryGrid, rng: &mut R) -> PassabilityGrid {
        let coins = CoinDraws::draw(&self.rules, rng);
        self.resolve_with(grid, &coins, rng)
    }

    /// Resolves with pre-drawn shared coins.
    pub fn resolve_with<R: Rng + ?Sized>(
        &self,
        grid: &SymmetryGrid,
        coins: &CoinDraws,
        rng: &mut R,
    ) -> PassabilityGrid {
        let terrain: Vec<u32> = grid.cells().iter().map(|cell| cell.terrain_id()).collect();
        let cells = terrain
            .iter()
            .map(|&terrain_id| {
                let solid = match self.rules.rule_for(terrain_id) {
                    ResolutionRule::AlwaysSolid => true,
                    ResolutionRule::AlwaysOpen => false,
                    ResolutionRule::IndependentCoin => rng.gen_bool(0.5),
                    // Groups missing from `coins` come from a foreign draw; treat as open.
                    ResolutionRule::SharedCoin { group } => coins.shared(group).unwrap_or(false),
                    ResolutionRule::ComplementaryCoin { pair, polarity } => {
                        let coin = coins.complementary(pair).unwrap_or(false);
                        match polarity {
                            Polarity::Primary => coin,
                            Polarity::Secondary => !coin,
                        }
                    }
                };
                Passability::from_solid(solid)
            })
            .collect();

        PassabilityGrid::new(grid.size(), cells, terrain, self.rules.exit_marker())
    }
}

impl Default for PageResolver {
    fn default() -> Self {
        Self::new(RuleTable::default_vocabulary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::vocabulary::*;
    use crate::symmetry::SymmetryOp;
    use crate::template::RawTemplate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid_of(size: usize, cells: Vec<u32>) -> SymmetryGrid {
        SymmetryGrid::load_with_op(&RawTemplate::square(size, cells), SymmetryOp::Identity).unwrap()
    }

    fn states_of(grid: &PassabilityGrid, id: u32) -> Vec<Passability> {
        grid.terrain()
            .iter()
            .zip(grid.cells())
            .filter(|(&t, _)| t == id)
            .map(|(_, &p)| p)
            .collect()
    }

    #[test]
    fn test_fixed_rules() {
        let grid = grid_of(2, vec![BACKGROUND, WALL, EXIT_MARKER, 77]);
        let mut rng = StdRng::seed_from_u64(5);
        let passability = PageResolver::default().resolve(&grid, &mut rng);

        assert_eq!(
            passability.cells(),
            &[
                Passability::Open,
                Passability::Solid,
                Passability::Solid,
                Passability::Open
            ]
        );
    }

    #[test]
    fn test_shared_coin_groups_agree() {
        let cells: Vec<u32> = (0..36)
            .map(|i| [BRIDGE, BRIDGE_SUPPORT, VINE, VINE_ROOT][i % 4])
            .collect();
        let grid = grid_of(6, cells);
        let resolver = PageResolver::default();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            let passability = resolver.resolve(&grid, &mut rng);
            let mut bridge = states_of(&passability, BRIDGE);
            bridge.extend(states_of(&passability, BRIDGE_SUPPORT));
            assert!(bridge.windows(2).all(|w| w[0] == w[1]));

            let mut vine = states_of(&passability, VINE);
            vine.extend(states_of(&passability, VINE_ROOT));
            assert!(vine.windows(2).all(|w| w[0] == w[1]));
        }
    }

    #[test]
    fn test_shared_groups_are_independent() {
        let grid = grid_of(2, vec![BRIDGE, VINE, BRIDGE, VINE]);
        let resolver = PageResolver::default();
        let mut rng = StdRng::seed_from_u64(2);

        let disagreements = (0..400)
            .filter(|_| {
                let passability = resolver.resolve(&grid, &mut rng);
                passability.get(0, 0) != passability.get(0, 1)
            })
            .count();
        assert!(disagreements > 100 && disagreements < 300, "{disagreements}");
    }

    #[test]
    fn test_complementary_pair_is_opposite() {
        let cells = vec![GATE, GATE_SWITCH_WALL, GATE, GATE_SWITCH_WALL, GATE, 0, 0, 0, 0];
        let grid = grid_of(3, cells);
        let resolver = PageResolver::default();
        let mut rng = StdRng::seed_from_u64(19);

        let mut gate_solid_count = 0;
        for _ in 0..200 {
            let passability = resolver.resolve(&grid, &mut rng);
            let gates = states_of(&passability, GATE);
            let walls = states_of(&passability, GATE_SWITCH_WALL);
            assert!(gates.iter().all(|&p| p == gates[0]));
            assert!(walls.iter().all(|&p| p != gates[0]));
            if gates[0] == Passability::Solid {
                gate_solid_count += 1;
            }
        }
        assert!(gate_solid_count > 50 && gate_solid_count < 150);
    }

    #[test]
    fn test_independent_coins_vary_per_cell() {
        let grid = grid_of(8, vec![RUBBLE; 64]);
        let mut rng = StdRng::seed_from_u64(23);
        let passability = PageResolver::default().resolve(&grid, &mut rng);

        let solid = passability.solid_count();
        assert!(solid > 10 && solid < 54, "{solid}");
    }

    #[test]
    fn test_resolve_with_fixed_coins() {
        let grid = grid_of(2, vec![BRIDGE, VINE, GATE, GATE_SWITCH_WALL]);
        let mut coins = CoinDraws::default();
        coins.shared.insert(0, true);
        coins.shared.insert(1, false);
        coins.complementary.insert(0, false);

        let mut rng = StdRng::seed_from_u64(0);
        let passability = PageResolver::default().resolve_with(&grid, &coins, &mut rng);
        assert_eq!(
            passability.cells(),
            &[
                Passability::Solid,
                Passability::Open,
                Passability::Open,
                Passability::Solid
            ]
        );
    }

    #[test]
    fn test_draws_cover_every_group() {
        let mut rng = StdRng::seed_from_u64(4);
        let coins = CoinDraws::draw(&RuleTable::default_vocabulary(), &mut rng);
        assert!(coins.shared(0).is_some());
        assert!(coins.shared(1).is_some());
        assert!(coins.complementary(0).is_some());
        assert!(coins.shared(2).is_none());
    }
}
