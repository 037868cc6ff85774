use tracing::{debug, info};

use crate::config::GameConfig;
use crate::constants::{get_scatter_corner, get_spawn_offset, COLLISION_DISTANCE, MAX_FRAME_HISTORY};
use crate::error::LevelError;
use crate::grid::Grid;
use crate::levels::load_level;
use crate::metrics::MetricsLog;
use crate::replay::FrameHistory;
use crate::rng::Rng;
use crate::types::{
    Consumable, Direction, Frame, FsmTransition, GameEvent, GameSession, GameStatus, GhostFrame,
    GhostName, GhostState, Position,
};

pub mod ghost_fsm;
pub mod player;
pub mod targeting;
mod utils;

pub use self::ghost_fsm::{
    is_allowed, kill_ghost, move_along_path, update_ghost, FsmContext, FsmTrace, FsmTraceEntry,
    Ghost, GhostUpdate, ALLOWED_TRANSITIONS,
};
pub use self::player::Player;
pub use self::targeting::{ScatterTargeting, TargetRule};

use self::utils::{ghost_points, SimulationClock};

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub seed: u32,
    pub frame_capacity: usize,
    pub scatter_targeting: ScatterTargeting,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            frame_capacity: MAX_FRAME_HISTORY,
            scatter_targeting: ScatterTargeting::Corner,
        }
    }
}

/// Outcome a tick would end the episode with, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Loss,
    Win,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: GameConfig,
    options: GameEngineOptions,
    level: u32,
    initial_grid: Grid,
    grid: Grid,
    status: GameStatus,
    player: Player,
    ghosts: Vec<Ghost>,
    rng: Rng,
    clock: SimulationClock,
    tick_counter: u64,
    elapsed_ms: u64,
    frames: FrameHistory,
    last_transitions: Vec<(GhostName, FsmTransition)>,
    path_overlay: Vec<Position>,
    metrics: MetricsLog,
    session: GameSession,
}

impl GameEngine {
    pub fn new(grid: Grid, level: u32, config: GameConfig, options: GameEngineOptions) -> Self {
        let player = Player::new(grid.player_start());
        let ghosts = spawn_ghosts(&grid, &config);
        let session = GameSession {
            score: 0,
            lives: player.lives,
            level,
            pellets_remaining: grid.total_pellets(),
            total_pellets: grid.total_pellets(),
            elapsed_ms: 0,
        };

        Self {
            config,
            rng: Rng::new(options.seed),
            frames: FrameHistory::with_capacity(options.frame_capacity),
            options,
            level,
            initial_grid: grid.clone(),
            grid,
            status: GameStatus::Menu,
            player,
            ghosts,
            clock: SimulationClock::default(),
            tick_counter: 0,
            elapsed_ms: 0,
            last_transitions: Vec::new(),
            path_overlay: Vec::new(),
            metrics: MetricsLog::default(),
            session,
        }
    }

    pub fn for_level(
        level: u32,
        config: GameConfig,
        options: GameEngineOptions,
    ) -> Result<Self, LevelError> {
        let grid = load_level(level)?;
        Ok(Self::new(grid, level, config, options))
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_ended(&self) -> bool {
        self.status.is_finished()
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn options(&self) -> &GameEngineOptions {
        &self.options
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn frames(&self) -> &FrameHistory {
        &self.frames
    }

    pub fn metrics(&self) -> &MetricsLog {
        &self.metrics
    }

    /// Transitions fired during the most recent tick.
    pub fn last_transitions(&self) -> &[(GhostName, FsmTransition)] {
        &self.last_transitions
    }

    /// The first pursuer's current route, for path overlays.
    pub fn path_overlay(&self) -> &[Position] {
        &self.path_overlay
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn start(&mut self) {
        if self.status != GameStatus::Menu {
            return;
        }
        self.status = GameStatus::Playing;
        info!(
            level = self.level,
            seed = self.options.seed,
            pellets = self.grid.total_pellets(),
            "episode started"
        );
    }

    /// Toggles between playing and paused. Paused ticks do not run, so the
    /// simulation clock does not see paused time.
    pub fn pause(&mut self) {
        self.status = match self.status {
            GameStatus::Playing => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Playing,
            _ => return,
        };
        info!(status = ?self.status, tick = self.tick_counter, "pause toggled");
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.player.queued_direction = direction;
    }

    /// Fresh episode on the same level, config and seed, back in the menu.
    pub fn reset(&mut self) {
        let grid = self.initial_grid.clone();
        *self = Self::new(grid, self.level, self.config.clone(), self.options.clone());
    }

    /// Runs one tick. Does nothing unless the episode is playing.
    pub fn advance(&mut self, dt_ms: u64) {
        if self.status != GameStatus::Playing {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        self.last_transitions.clear();
        let mut events = Vec::new();

        let moved = self.player.try_move(&self.grid);
        if self.clock.is_running() {
            self.clock.advance(dt_ms);
        } else if moved {
            self.clock.latch();
            debug!(tick = self.tick_counter, "simulation clock latched");
        }
        let now_ms = self.clock.now_ms();

        let at = self.player.position;
        let power_pellet_eaten = match self.player.eat(&mut self.grid) {
            Some(Consumable::Pellet) => {
                events.push(GameEvent::PelletEaten { at });
                false
            }
            Some(Consumable::PowerPellet) => {
                events.push(GameEvent::PowerPellet { at });
                true
            }
            None => false,
        };

        if self.player.tick_power() {
            debug!(tick = self.tick_counter, "empowerment expired");
        }

        self.update_ghosts(power_pellet_eaten, now_ms, &mut events);
        self.resolve_ghost_collisions(now_ms, &mut events);
        self.refresh_session();

        let outcome = self.outcome();
        match outcome {
            Some(Outcome::Loss) => events.push(GameEvent::GameOver),
            Some(Outcome::Win) => events.push(GameEvent::LevelComplete),
            None => {}
        }
        let frame = self.build_frame(events);
        self.frames.push(frame);

        if let Some(outcome) = outcome {
            self.status = match outcome {
                Outcome::Loss => GameStatus::GameOver,
                Outcome::Win => GameStatus::Victory,
            };
            info!(
                status = ?self.status,
                tick = self.tick_counter,
                score = self.session.score,
                "episode ended"
            );
        }
    }

    fn update_ghosts(&mut self, power_pellet_eaten: bool, now_ms: u64, events: &mut Vec<GameEvent>) {
        let timings = self.config.global_ai.timings();
        for idx in 0..self.ghosts.len() {
            let name = self.ghosts[idx].name;
            let lead_position = self
                .ghosts
                .iter()
                .find(|ghost| ghost.name == GhostName::Blinky)
                .map(|ghost| ghost.position);
            let ctx = FsmContext {
                grid: &self.grid,
                player_position: self.player.position,
                player_direction: self.player.direction,
                power_pellet_eaten,
                clock_ms: now_ms,
                timings,
                algorithm: self.config.algorithm_for(name),
                lead_position,
                scatter_targeting: self.options.scatter_targeting,
            };
            let update = update_ghost(&mut self.ghosts[idx], &ctx, &mut self.rng);
            self.metrics.record(update.metrics);
            if let Some(transition) = update.transition {
                self.note_transition(idx, transition, now_ms, events);
            }
            move_along_path(&mut self.ghosts[idx]);
        }
    }

    /// Checked one pursuer at a time, so a respawn moves the player before the
    /// next pursuer is tested.
    fn resolve_ghost_collisions(&mut self, now_ms: u64, events: &mut Vec<GameEvent>) {
        for idx in 0..self.ghosts.len() {
            if self.player.lives == 0 {
                break;
            }
            let distance = self.player.position.distance(self.ghosts[idx].position);
            if distance >= COLLISION_DISTANCE {
                continue;
            }

            match self.ghosts[idx].state {
                GhostState::Frightened => {
                    let points = ghost_points(self.player.combo);
                    self.player.score = self.player.score.saturating_add(points);
                    self.player.combo += 1;
                    if let Some(transition) = kill_ghost(&mut self.ghosts[idx], now_ms) {
                        self.note_transition(idx, transition, now_ms, events);
                    }
                    events.push(GameEvent::GhostEaten {
                        ghost: self.ghosts[idx].name,
                        points,
                        combo: self.player.combo,
                    });
                }
                GhostState::Chase | GhostState::Scatter => {
                    self.player.lose_life(self.grid.player_start());
                    info!(
                        ghost = %self.ghosts[idx].name,
                        lives = self.player.lives,
                        tick = self.tick_counter,
                        "player caught"
                    );
                    events.push(GameEvent::PacmanDeath {
                        lives_left: self.player.lives,
                    });
                }
                GhostState::Dead => {}
            }
        }
    }

    fn note_transition(
        &mut self,
        idx: usize,
        transition: FsmTransition,
        now_ms: u64,
        events: &mut Vec<GameEvent>,
    ) {
        let ghost = &mut self.ghosts[idx];
        debug!(
            ghost = %ghost.name,
            from = ?transition.from,
            to = ?transition.to,
            event = ?transition.event,
            tick = self.tick_counter,
            "fsm transition"
        );
        ghost.trace.record(transition.to, self.tick_counter, now_ms);
        self.last_transitions.push((ghost.name, transition));
        events.push(GameEvent::FsmChange {
            ghost: ghost.name,
            from: transition.from,
            to: transition.to,
            event: transition.event,
        });
    }

    fn refresh_session(&mut self) {
        self.session.score = self.player.score;
        self.session.lives = self.player.lives;
        self.session.pellets_remaining = self
            .grid
            .total_pellets()
            .saturating_sub(self.player.pellets_eaten);
        self.session.elapsed_ms = self.elapsed_ms;
        self.path_overlay = self
            .ghosts
            .first()
            .map(|ghost| ghost.path.clone())
            .unwrap_or_default();
    }

    fn outcome(&self) -> Option<Outcome> {
        if self.player.lives == 0 {
            Some(Outcome::Loss)
        } else if self.player.pellets_eaten >= self.grid.total_pellets() {
            Some(Outcome::Win)
        } else {
            None
        }
    }

    fn build_frame(&self, events: Vec<GameEvent>) -> Frame {
        Frame {
            tick: self.tick_counter,
            clock_ms: self.clock.now_ms(),
            pacman_position: self.player.position,
            pacman_direction: self.player.direction,
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| GhostFrame {
                    name: ghost.name,
                    position: ghost.position,
                    state: ghost.state,
                    target: ghost.target,
                    path: ghost.path.clone(),
                })
                .collect(),
            score: self.session.score,
            lives: self.session.lives,
            pellets_remaining: self.session.pellets_remaining,
            events,
        }
    }
}

fn spawn_ghosts(grid: &Grid, config: &GameConfig) -> Vec<Ghost> {
    let home = grid.ghost_home();
    GhostName::ALL
        .iter()
        .map(|name| {
            let (dx, dy) = get_spawn_offset(*name);
            let spawn = grid
                .nearest_walkable(Position::new(home.x + dx, home.y + dy))
                .unwrap_or(home);
            let corner = grid
                .nearest_walkable(get_scatter_corner(*name, grid.width(), grid.height()))
                .unwrap_or(spawn);
            Ghost::new(*name, spawn, corner, config.ghost_configs.get(*name).clone())
        })
        .collect()
}
