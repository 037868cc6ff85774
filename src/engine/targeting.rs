//! Target-tile rules for pursuers.
//!
//! Every chase strategy is a `TargetRule` variant carrying its own parameters,
//! and `TargetRule::chase_target` is the only place they are dispatched.

use serde::{Deserialize, Serialize};

use crate::config::GhostConfig;
use crate::constants::{AMBUSH_LOOKAHEAD, FLEE_SCALE, PINCER_PIVOT_AHEAD, SHY_BASE_RADIUS};
use crate::grid::Grid;
use crate::rng::Rng;
use crate::types::{Direction, Position, TargetingStrategy};

/// How SCATTER picks its target tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScatterTargeting {
    /// Head for the pursuer's fixed corner.
    #[default]
    Corner,
    /// Wander between reachable tiles drawn from the world's seeded generator.
    SeededRandom,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetRule {
    Direct,
    Ambush { lookahead: i32 },
    /// Doubles the vector from the lead pursuer through a pivot ahead of the player.
    Pincer { pivot_ahead: i32 },
    /// Chases only while farther than `radius`, otherwise retreats to its corner.
    Shy { radius: f32 },
}

/// What a pursuer can see when picking a chase target.
#[derive(Clone, Copy, Debug)]
pub struct PursuitView {
    pub ghost: Position,
    pub corner: Position,
    pub player: Position,
    pub player_direction: Direction,
    pub lead: Option<Position>,
}

impl TargetRule {
    pub fn from_config(config: &GhostConfig) -> Self {
        match config.targeting_strategy {
            TargetingStrategy::Direct => TargetRule::Direct,
            TargetingStrategy::Ambush => TargetRule::Ambush {
                lookahead: AMBUSH_LOOKAHEAD,
            },
            TargetingStrategy::Proximity => TargetRule::Pincer {
                pivot_ahead: PINCER_PIVOT_AHEAD,
            },
            TargetingStrategy::Random => TargetRule::Shy {
                radius: SHY_BASE_RADIUS - f32::from(config.aggressiveness) / 2.0,
            },
        }
    }

    /// Raw target; may fall outside the grid or on a wall, in which case the
    /// pursuer finds no path and holds its tile.
    pub fn chase_target(&self, view: &PursuitView) -> Position {
        match *self {
            TargetRule::Direct => view.player,
            TargetRule::Ambush { lookahead } => view.player.offset(view.player_direction, lookahead),
            TargetRule::Pincer { pivot_ahead } => match view.lead {
                Some(lead) => {
                    let pivot = view.player.offset(view.player_direction, pivot_ahead);
                    Position::new(2 * pivot.x - lead.x, 2 * pivot.y - lead.y)
                }
                None => view.player,
            },
            TargetRule::Shy { radius } => {
                if view.ghost.distance(view.player) > radius {
                    view.player
                } else {
                    view.corner
                }
            }
        }
    }
}

/// Extrapolates away from the player, then snaps to the nearest walkable tile.
pub fn flee_target(grid: &Grid, ghost: Position, player: Position) -> Position {
    let dx = ghost.x - player.x;
    let dy = ghost.y - player.y;
    let away = Position::new(ghost.x + dx * FLEE_SCALE, ghost.y + dy * FLEE_SCALE);
    grid.nearest_walkable(away).unwrap_or(ghost)
}

/// Scatter target for this tick. `current_target` and `path_len` describe the
/// pursuer's previous choice so a random wanderer keeps its tile until it has
/// arrived or found it unreachable.
pub fn scatter_target(
    mode: ScatterTargeting,
    grid: &Grid,
    ghost: Position,
    corner: Position,
    current_target: Position,
    path_len: usize,
    rng: &mut Rng,
) -> Position {
    match mode {
        ScatterTargeting::Corner => corner,
        ScatterTargeting::SeededRandom => {
            let settled = path_len > 1 && current_target != ghost && grid.is_walkable(current_target);
            if settled {
                return current_target;
            }
            let reachable = grid.reachable_from(ghost);
            let candidates: Vec<Position> = grid
                .walkable_positions()
                .into_iter()
                .filter(|pos| *pos != ghost && reachable.contains(pos))
                .collect();
            if candidates.is_empty() {
                return corner;
            }
            candidates[rng.pick_index(candidates.len())]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::open_grid;
    use crate::types::GhostName;

    fn view(player_direction: Direction, lead: Option<Position>) -> PursuitView {
        PursuitView {
            ghost: Position::new(1, 1),
            corner: Position::new(0, 9),
            player: Position::new(5, 5),
            player_direction,
            lead,
        }
    }

    #[test]
    fn strategies_map_to_rules() {
        let blinky = GhostConfig::default_for(GhostName::Blinky);
        assert_eq!(TargetRule::from_config(&blinky), TargetRule::Direct);
        let clyde = GhostConfig::default_for(GhostName::Clyde);
        assert_eq!(TargetRule::from_config(&clyde), TargetRule::Shy { radius: 6.0 });
    }

    #[test]
    fn ambush_leads_the_player() {
        let rule = TargetRule::Ambush { lookahead: 4 };
        assert_eq!(rule.chase_target(&view(Direction::Left, None)), Position::new(1, 5));
        assert_eq!(rule.chase_target(&view(Direction::None, None)), Position::new(5, 5));
    }

    #[test]
    fn pincer_doubles_through_pivot_or_falls_back() {
        let rule = TargetRule::Pincer { pivot_ahead: 2 };
        let lead = Some(Position::new(3, 7));
        assert_eq!(rule.chase_target(&view(Direction::Up, lead)), Position::new(7, -1));
        assert_eq!(rule.chase_target(&view(Direction::Up, None)), Position::new(5, 5));
    }

    #[test]
    fn shy_pursuer_retreats_when_close() {
        let rule = TargetRule::Shy { radius: 6.0 };
        let mut close = view(Direction::None, None);
        close.ghost = Position::new(4, 4);
        assert_eq!(rule.chase_target(&close), close.corner);
        let mut far = view(Direction::None, None);
        far.ghost = Position::new(0, 0);
        assert_eq!(rule.chase_target(&far), far.player);
    }

    #[test]
    fn flee_target_is_clamped() {
        let grid = open_grid(10, 10, (0, 0), (9, 9), &[], &[]);
        assert_eq!(
            flee_target(&grid, Position::new(7, 5), Position::new(5, 5)),
            Position::new(9, 5)
        );
        assert_eq!(
            flee_target(&grid, Position::new(2, 2), Position::new(4, 3)),
            Position::new(0, 0)
        );
    }

    #[test]
    fn flee_target_snaps_off_walls() {
        let grid = Grid::from_rows(&["#######", "#P...G#", "#.###.#", "#.....#", "#######"])
            .expect("valid layout");
        let target = flee_target(&grid, Position::new(4, 3), Position::new(3, 3));
        assert_eq!(target, Position::new(5, 3));
        assert!(grid.is_walkable(target));
    }

    #[test]
    fn seeded_scatter_targets_are_reachable_and_repeatable() {
        let grid = Grid::from_rows(&["#######", "#P..#.#", "#.G.#.#", "#######"]).expect("valid layout");
        let ghost = Position::new(2, 2);
        let reachable = grid.reachable_from(ghost);
        let mut a = Rng::new(5);
        let mut b = Rng::new(5);
        for _ in 0..20 {
            let ta = scatter_target(ScatterTargeting::SeededRandom, &grid, ghost, ghost, ghost, 0, &mut a);
            let tb = scatter_target(ScatterTargeting::SeededRandom, &grid, ghost, ghost, ghost, 0, &mut b);
            assert_eq!(ta, tb);
            assert!(reachable.contains(&ta));
            assert_ne!(ta, ghost);
        }

        let kept = scatter_target(
            ScatterTargeting::SeededRandom,
            &grid,
            ghost,
            ghost,
            Position::new(1, 1),
            3,
            &mut a,
        );
        assert_eq!(kept, Position::new(1, 1));
    }
}
