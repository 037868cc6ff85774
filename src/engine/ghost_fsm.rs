//! Per-pursuer state machine: transitions, target selection and path following.

use std::collections::{BTreeMap, VecDeque};

use serde::Serialize;

use crate::config::{FsmTimings, GhostConfig};
use crate::constants::MAX_FSM_HISTORY;
use crate::grid::Grid;
use crate::pathfinding::find_path;
use crate::rng::Rng;
use crate::types::{
    AlgorithmKind, AlgorithmMetrics, Direction, FsmEvent, FsmTransition, GhostName, GhostState,
    Position,
};

use super::targeting::{flee_target, scatter_target, PursuitView, ScatterTargeting, TargetRule};
use super::utils::direction_between;

/// Every transition a pursuer may take, with the event that triggers it.
pub const ALLOWED_TRANSITIONS: [FsmTransition; 6] = [
    FsmTransition {
        from: GhostState::Scatter,
        to: GhostState::Chase,
        event: FsmEvent::Timeout,
    },
    FsmTransition {
        from: GhostState::Chase,
        to: GhostState::Frightened,
        event: FsmEvent::PowerPellet,
    },
    FsmTransition {
        from: GhostState::Scatter,
        to: GhostState::Frightened,
        event: FsmEvent::PowerPellet,
    },
    FsmTransition {
        from: GhostState::Frightened,
        to: GhostState::Chase,
        event: FsmEvent::Timeout,
    },
    FsmTransition {
        from: GhostState::Frightened,
        to: GhostState::Dead,
        event: FsmEvent::Eaten,
    },
    FsmTransition {
        from: GhostState::Dead,
        to: GhostState::Chase,
        event: FsmEvent::Revive,
    },
];

pub fn is_allowed(from: GhostState, to: GhostState) -> bool {
    ALLOWED_TRANSITIONS
        .iter()
        .any(|t| t.from == from && t.to == to)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FsmTraceEntry {
    pub state: GhostState,
    pub tick: u64,
    #[serde(rename = "clockMs")]
    pub clock_ms: u64,
}

/// State history of one pursuer for visualisation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FsmTrace {
    #[serde(rename = "currentState")]
    pub current_state: GhostState,
    pub history: VecDeque<FsmTraceEntry>,
    /// Entries into each state through a transition.
    #[serde(rename = "transitionCounts")]
    pub transition_counts: BTreeMap<GhostState, u32>,
}

impl FsmTrace {
    pub fn new(initial: GhostState) -> Self {
        Self {
            current_state: initial,
            history: VecDeque::from([FsmTraceEntry {
                state: initial,
                tick: 0,
                clock_ms: 0,
            }]),
            transition_counts: GhostState::ALL.iter().map(|s| (*s, 0)).collect(),
        }
    }

    pub fn record(&mut self, state: GhostState, tick: u64, clock_ms: u64) {
        self.current_state = state;
        self.history.push_back(FsmTraceEntry {
            state,
            tick,
            clock_ms,
        });
        while self.history.len() > MAX_FSM_HISTORY {
            self.history.pop_front();
        }
        *self.transition_counts.entry(state).or_insert(0) += 1;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ghost {
    pub name: GhostName,
    pub position: Position,
    pub direction: Direction,
    pub state: GhostState,
    pub target: Position,
    pub path: Vec<Position>,
    pub home: Position,
    #[serde(rename = "scatterCorner")]
    pub scatter_corner: Position,
    pub config: GhostConfig,
    /// Simulation-clock reading when the current state was entered.
    #[serde(rename = "stateStartedMs")]
    pub state_started_ms: u64,
    pub trace: FsmTrace,
}

impl Ghost {
    pub fn new(name: GhostName, home: Position, scatter_corner: Position, config: GhostConfig) -> Self {
        Self {
            name,
            position: home,
            direction: Direction::Up,
            state: GhostState::Scatter,
            target: scatter_corner,
            path: Vec::new(),
            home,
            scatter_corner,
            config,
            state_started_ms: 0,
            trace: FsmTrace::new(GhostState::Scatter),
        }
    }

    fn enter(&mut self, to: GhostState, event: FsmEvent, clock_ms: u64) -> FsmTransition {
        let transition = FsmTransition {
            from: self.state,
            to,
            event,
        };
        self.state = to;
        self.state_started_ms = clock_ms;
        transition
    }
}

/// World facts one controller update reads.
#[derive(Clone, Copy, Debug)]
pub struct FsmContext<'a> {
    pub grid: &'a Grid,
    pub player_position: Position,
    pub player_direction: Direction,
    pub power_pellet_eaten: bool,
    pub clock_ms: u64,
    pub timings: FsmTimings,
    pub algorithm: AlgorithmKind,
    /// Current tile of the pincer lead pursuer, if one is on the board.
    pub lead_position: Option<Position>,
    pub scatter_targeting: ScatterTargeting,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GhostUpdate {
    pub transition: Option<FsmTransition>,
    pub metrics: AlgorithmMetrics,
}

/// Runs one controller step: transition, target, path. Does not move the pursuer.
pub fn update_ghost(ghost: &mut Ghost, ctx: &FsmContext<'_>, rng: &mut Rng) -> GhostUpdate {
    let transition = next_transition(ghost, ctx);

    ghost.target = match ghost.state {
        GhostState::Chase => TargetRule::from_config(&ghost.config).chase_target(&PursuitView {
            ghost: ghost.position,
            corner: ghost.scatter_corner,
            player: ctx.player_position,
            player_direction: ctx.player_direction,
            lead: ctx.lead_position,
        }),
        GhostState::Scatter => scatter_target(
            ctx.scatter_targeting,
            ctx.grid,
            ghost.position,
            ghost.scatter_corner,
            ghost.target,
            ghost.path.len(),
            rng,
        ),
        GhostState::Frightened => flee_target(ctx.grid, ghost.position, ctx.player_position),
        GhostState::Dead => ghost.home,
    };

    let result = find_path(ctx.algorithm, ctx.grid, ghost.position, ghost.target);
    ghost.path = result.path;

    GhostUpdate {
        transition,
        metrics: result.metrics,
    }
}

fn next_transition(ghost: &mut Ghost, ctx: &FsmContext<'_>) -> Option<FsmTransition> {
    if ctx.power_pellet_eaten && ghost.state != GhostState::Dead {
        if ghost.state == GhostState::Frightened {
            // A fresh power pellet only restarts the frightened timer.
            ghost.state_started_ms = ctx.clock_ms;
            return None;
        }
        return Some(ghost.enter(GhostState::Frightened, FsmEvent::PowerPellet, ctx.clock_ms));
    }

    let in_state_ms = ctx.clock_ms.saturating_sub(ghost.state_started_ms);
    match ghost.state {
        GhostState::Scatter if in_state_ms >= ctx.timings.scatter_ms => {
            Some(ghost.enter(GhostState::Chase, FsmEvent::Timeout, ctx.clock_ms))
        }
        GhostState::Frightened if in_state_ms >= ctx.timings.frightened_ms => {
            Some(ghost.enter(GhostState::Chase, FsmEvent::Timeout, ctx.clock_ms))
        }
        GhostState::Dead if ghost.position == ghost.home => {
            Some(ghost.enter(GhostState::Chase, FsmEvent::Revive, ctx.clock_ms))
        }
        _ => None,
    }
}

/// Steps one tile toward `path[1]` and drops the tile just left.
pub fn move_along_path(ghost: &mut Ghost) {
    if ghost.path.len() <= 1 {
        return;
    }
    let next = ghost.path[1];
    if let Some(dir) = direction_between(ghost.position, next) {
        ghost.direction = dir;
    }
    ghost.position = next;
    ghost.path.remove(0);
}

/// FRIGHTENED to DEAD. Any other state is left alone.
pub fn kill_ghost(ghost: &mut Ghost, clock_ms: u64) -> Option<FsmTransition> {
    if ghost.state != GhostState::Frightened {
        return None;
    }
    Some(ghost.enter(GhostState::Dead, FsmEvent::Eaten, clock_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalAiConfig;
    use crate::grid::tests::open_grid;

    fn ghost_at(name: GhostName, pos: Position) -> Ghost {
        Ghost::new(name, pos, Position::new(0, 0), GhostConfig::default_for(name))
    }

    fn context(grid: &Grid, player: Position, clock_ms: u64) -> FsmContext<'_> {
        FsmContext {
            grid,
            player_position: player,
            player_direction: Direction::None,
            power_pellet_eaten: false,
            clock_ms,
            timings: GlobalAiConfig::default().timings(),
            algorithm: AlgorithmKind::AStar,
            lead_position: None,
            scatter_targeting: ScatterTargeting::Corner,
        }
    }

    #[test]
    fn frightened_never_leads_to_scatter() {
        for from in GhostState::ALL {
            for to in GhostState::ALL {
                if from == GhostState::Frightened && to == GhostState::Scatter {
                    assert!(!is_allowed(from, to));
                }
                if from == GhostState::Dead {
                    assert_eq!(is_allowed(from, to), to == GhostState::Chase);
                }
            }
        }
    }

    #[test]
    fn scatter_times_out_into_chase_at_the_configured_duration() {
        let grid = open_grid(10, 10, (0, 0), (9, 9), &[], &[]);
        let mut rng = Rng::new(1);
        let mut ghost = ghost_at(GhostName::Blinky, Position::new(9, 9));

        let update = update_ghost(&mut ghost, &context(&grid, Position::new(0, 0), 4_999), &mut rng);
        assert_eq!(update.transition, None);
        assert_eq!(ghost.target, Position::new(0, 0));

        let update = update_ghost(&mut ghost, &context(&grid, Position::new(1, 0), 5_000), &mut rng);
        assert_eq!(
            update.transition,
            Some(FsmTransition {
                from: GhostState::Scatter,
                to: GhostState::Chase,
                event: FsmEvent::Timeout,
            })
        );
        assert_eq!(ghost.state_started_ms, 5_000);
        assert_eq!(ghost.target, Position::new(1, 0));
        // Eleven steps: two through the side tunnel, nine up.
        assert_eq!(ghost.path.len(), 12);
        assert_eq!(update.metrics.path_length, 12);
    }

    #[test]
    fn power_pellet_beats_a_due_timeout() {
        let grid = open_grid(10, 10, (0, 0), (9, 9), &[], &[]);
        let mut rng = Rng::new(1);
        let mut ghost = ghost_at(GhostName::Pinky, Position::new(5, 5));
        let mut ctx = context(&grid, Position::new(0, 0), 9_000);
        ctx.power_pellet_eaten = true;

        let update = update_ghost(&mut ghost, &ctx, &mut rng);
        assert_eq!(ghost.state, GhostState::Frightened);
        assert_eq!(update.transition.map(|t| t.event), Some(FsmEvent::PowerPellet));
        assert_eq!(ghost.state_started_ms, 9_000);
        assert_eq!(ghost.target, Position::new(9, 9));

        ctx.clock_ms = 12_000;
        let update = update_ghost(&mut ghost, &ctx, &mut rng);
        assert_eq!(update.transition, None);
        assert_eq!(ghost.state_started_ms, 12_000);
    }

    #[test]
    fn dead_pursuer_ignores_power_and_revives_only_at_home() {
        let grid = open_grid(10, 10, (0, 0), (9, 9), &[], &[]);
        let mut rng = Rng::new(1);
        let mut ghost = ghost_at(GhostName::Inky, Position::new(4, 4));
        ghost.state = GhostState::Frightened;
        assert!(kill_ghost(&mut ghost, 100).is_some());
        assert_eq!(ghost.state, GhostState::Dead);
        assert!(kill_ghost(&mut ghost, 100).is_none());

        ghost.position = Position::new(6, 4);
        let mut ctx = context(&grid, Position::new(0, 0), 20_000);
        ctx.power_pellet_eaten = true;
        for _ in 0..2 {
            let update = update_ghost(&mut ghost, &ctx, &mut rng);
            assert_eq!(update.transition, None);
            assert_eq!(ghost.state, GhostState::Dead);
            assert_eq!(ghost.target, ghost.home);
            move_along_path(&mut ghost);
        }
        assert_eq!(ghost.position, ghost.home);

        let update = update_ghost(&mut ghost, &ctx, &mut rng);
        assert_eq!(ghost.state, GhostState::Chase);
        assert_eq!(
            update.transition,
            Some(FsmTransition {
                from: GhostState::Dead,
                to: GhostState::Chase,
                event: FsmEvent::Revive,
            })
        );
    }

    #[test]
    fn unreachable_target_holds_position() {
        let grid = Grid::from_rows(&["#######", "#P.#.G#", "#######"]).expect("valid layout");
        let mut rng = Rng::new(1);
        let mut ghost = ghost_at(GhostName::Blinky, Position::new(5, 1));
        ghost.state = GhostState::Chase;

        let update = update_ghost(&mut ghost, &context(&grid, Position::new(1, 1), 0), &mut rng);
        assert!(ghost.path.is_empty());
        assert!(update.metrics.nodes_expanded > 0);
        move_along_path(&mut ghost);
        assert_eq!(ghost.position, Position::new(5, 1));
    }

    #[test]
    fn moving_consumes_the_path_and_sets_facing() {
        let mut ghost = ghost_at(GhostName::Clyde, Position::new(1, 1));
        ghost.path = vec![Position::new(1, 1), Position::new(1, 2), Position::new(2, 2)];
        move_along_path(&mut ghost);
        assert_eq!(ghost.position, Position::new(1, 2));
        assert_eq!(ghost.direction, Direction::Down);
        move_along_path(&mut ghost);
        assert_eq!(ghost.direction, Direction::Right);
        assert_eq!(ghost.path, vec![Position::new(2, 2)]);
        move_along_path(&mut ghost);
        assert_eq!(ghost.position, Position::new(2, 2));
    }

    #[test]
    fn trace_counts_entries_and_stays_bounded() {
        let mut trace = FsmTrace::new(GhostState::Scatter);
        for tick in 1..=(MAX_FSM_HISTORY as u64 + 10) {
            let state = if tick % 2 == 0 { GhostState::Chase } else { GhostState::Frightened };
            trace.record(state, tick, tick * 100);
        }
        assert_eq!(trace.history.len(), MAX_FSM_HISTORY);
        assert_eq!(trace.transition_counts[&GhostState::Chase], 505);
        assert_eq!(trace.transition_counts[&GhostState::Scatter], 0);
        assert_eq!(trace.current_state, GhostState::Chase);
    }
}
