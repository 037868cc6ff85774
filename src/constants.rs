use crate::config::GlobalAiConfig;
use crate::types::{DifficultyPreset, GhostName, Position};

pub const POINTS_PELLET: u32 = 10;
pub const POINTS_POWER_PELLET: u32 = 50;
pub const POINTS_GHOST_BASE: u32 = 200;

pub const STARTING_LIVES: u32 = 3;
/// Empowerment length in ticks (6 seconds at 60 ticks per second).
pub const POWER_DURATION_TICKS: u32 = 6 * 60;
/// Euclidean distance, in tiles, under which a player and a pursuer collide.
pub const COLLISION_DISTANCE: f32 = 0.6;

pub const MAX_FRAME_HISTORY: usize = 1000;
pub const MAX_METRICS_HISTORY: usize = 100;
pub const MAX_FSM_HISTORY: usize = 1000;

pub const AMBUSH_LOOKAHEAD: i32 = 4;
pub const PINCER_PIVOT_AHEAD: i32 = 2;
pub const SHY_BASE_RADIUS: f32 = 8.0;
pub const FLEE_SCALE: i32 = 2;

pub const BASE_TICKS_PER_SECOND: f32 = 10.0;
pub const REPLAY_BASE_INTERVAL_MS: f32 = 100.0;
pub const MIN_PLAYBACK_SPEED: f32 = 0.25;
pub const MAX_PLAYBACK_SPEED: f32 = 4.0;

pub fn get_spawn_offset(name: GhostName) -> (i32, i32) {
    match name {
        GhostName::Blinky => (0, -3),
        GhostName::Pinky => (-2, 0),
        GhostName::Inky => (2, 0),
        GhostName::Clyde => (0, 0),
    }
}

/// Raw corner for a pursuer on a `width` x `height` board. May land on a wall;
/// callers snap it onto the walkable set.
pub fn get_scatter_corner(name: GhostName, width: i32, height: i32) -> Position {
    let right = (width - 1).max(0);
    let bottom = (height - 1).max(0);
    match name {
        GhostName::Blinky => Position::new((width - 3).max(0), 0),
        GhostName::Pinky => Position::new(2.min(right), 0),
        GhostName::Inky => Position::new(right, bottom),
        GhostName::Clyde => Position::new(0, bottom),
    }
}

/// Difficulty number and AI timing for a preset. `Custom` leaves the current
/// values untouched.
pub fn get_difficulty_preset(preset: DifficultyPreset) -> Option<(u8, GlobalAiConfig)> {
    match preset {
        DifficultyPreset::Easy => Some((
            1,
            GlobalAiConfig {
                agent_speed: 0.7,
                scatter_time: 10.0,
                chase_time: 15.0,
                frightened_duration: 8.0,
            },
        )),
        DifficultyPreset::Medium => Some((3, GlobalAiConfig::default())),
        DifficultyPreset::Hard => Some((
            5,
            GlobalAiConfig {
                agent_speed: 1.3,
                scatter_time: 5.0,
                chase_time: 25.0,
                frightened_duration: 4.0,
            },
        )),
        DifficultyPreset::Custom => None,
    }
}
