use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{get_difficulty_preset, BASE_TICKS_PER_SECOND};
use crate::error::ConfigError;
use crate::types::{AlgorithmKind, DifficultyPreset, GhostName, Personality, TargetingStrategy};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostConfig {
    #[serde(rename = "targetingStrategy")]
    pub targeting_strategy: TargetingStrategy,
    /// 1 (timid) to 10 (relentless).
    pub aggressiveness: u8,
    #[serde(rename = "relativeSpeed")]
    pub relative_speed: f32,
    pub algorithm: Option<AlgorithmKind>,
    pub personality: Vec<Personality>,
}

impl GhostConfig {
    pub fn default_for(name: GhostName) -> Self {
        match name {
            GhostName::Blinky => Self {
                targeting_strategy: TargetingStrategy::Direct,
                aggressiveness: 8,
                relative_speed: 1.0,
                algorithm: Some(AlgorithmKind::AStar),
                personality: vec![Personality::Brave],
            },
            GhostName::Pinky => Self {
                targeting_strategy: TargetingStrategy::Ambush,
                aggressiveness: 6,
                relative_speed: 0.95,
                algorithm: Some(AlgorithmKind::AStar),
                personality: vec![Personality::Cautious],
            },
            GhostName::Inky => Self {
                targeting_strategy: TargetingStrategy::Proximity,
                aggressiveness: 5,
                relative_speed: 0.9,
                algorithm: Some(AlgorithmKind::Bfs),
                personality: vec![Personality::Unpredictable],
            },
            GhostName::Clyde => Self {
                targeting_strategy: TargetingStrategy::Random,
                aggressiveness: 4,
                relative_speed: 0.85,
                algorithm: Some(AlgorithmKind::Dijkstra),
                personality: vec![Personality::Evasive],
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostConfigs {
    pub blinky: GhostConfig,
    pub pinky: GhostConfig,
    pub inky: GhostConfig,
    pub clyde: GhostConfig,
}

impl Default for GhostConfigs {
    fn default() -> Self {
        Self {
            blinky: GhostConfig::default_for(GhostName::Blinky),
            pinky: GhostConfig::default_for(GhostName::Pinky),
            inky: GhostConfig::default_for(GhostName::Inky),
            clyde: GhostConfig::default_for(GhostName::Clyde),
        }
    }
}

impl GhostConfigs {
    pub fn get(&self, name: GhostName) -> &GhostConfig {
        match name {
            GhostName::Blinky => &self.blinky,
            GhostName::Pinky => &self.pinky,
            GhostName::Inky => &self.inky,
            GhostName::Clyde => &self.clyde,
        }
    }

    pub fn get_mut(&mut self, name: GhostName) -> &mut GhostConfig {
        match name {
            GhostName::Blinky => &mut self.blinky,
            GhostName::Pinky => &mut self.pinky,
            GhostName::Inky => &mut self.inky,
            GhostName::Clyde => &mut self.clyde,
        }
    }
}

/// AI timing shared by every pursuer. Durations are in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalAiConfig {
    #[serde(rename = "agentSpeed")]
    pub agent_speed: f32,
    #[serde(rename = "scatterTime")]
    pub scatter_time: f32,
    #[serde(rename = "chaseTime")]
    pub chase_time: f32,
    #[serde(rename = "frightenedDuration")]
    pub frightened_duration: f32,
}

impl Default for GlobalAiConfig {
    fn default() -> Self {
        Self {
            agent_speed: 1.0,
            scatter_time: 5.0,
            chase_time: 20.0,
            frightened_duration: 6.0,
        }
    }
}

/// State timeouts in simulation-clock milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FsmTimings {
    pub scatter_ms: u64,
    pub frightened_ms: u64,
}

impl GlobalAiConfig {
    pub fn timings(&self) -> FsmTimings {
        FsmTimings {
            scatter_ms: seconds_to_ms(self.scatter_time),
            frightened_ms: seconds_to_ms(self.frightened_duration),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub difficulty: u8,
    #[serde(rename = "difficultyPreset")]
    pub difficulty_preset: DifficultyPreset,
    #[serde(rename = "defaultAlgorithm")]
    pub default_algorithm: AlgorithmKind,
    #[serde(rename = "gameSpeed")]
    pub game_speed: f32,
    #[serde(rename = "globalAI")]
    pub global_ai: GlobalAiConfig,
    #[serde(rename = "ghostConfigs")]
    pub ghost_configs: GhostConfigs,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: 3,
            difficulty_preset: DifficultyPreset::Medium,
            default_algorithm: AlgorithmKind::AStar,
            game_speed: 1.0,
            global_ai: GlobalAiConfig::default(),
            ghost_configs: GhostConfigs::default(),
        }
    }
}

impl GameConfig {
    /// Decodes a possibly partial document. Missing fields, including fields of
    /// individual ghosts, fall back to the defaults before decoding.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let patch: Value = serde_json::from_str(raw)?;
        let mut merged = serde_json::to_value(Self::default())?;
        merge_json(&mut merged, patch);
        let config: Self = serde_json::from_value(merged)?;
        Ok(config.normalized())
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_preset(mut self, preset: DifficultyPreset) -> Self {
        self.difficulty_preset = preset;
        if let Some((difficulty, global_ai)) = get_difficulty_preset(preset) {
            self.difficulty = difficulty;
            self.global_ai = global_ai;
        }
        self
    }

    /// Clamps every numeric field into the range the engine expects.
    pub fn normalized(mut self) -> Self {
        self.game_speed = positive_or(self.game_speed, 1.0).clamp(0.1, 10.0);
        self.global_ai.agent_speed = positive_or(self.global_ai.agent_speed, 1.0).clamp(0.5, 2.0);
        self.global_ai.scatter_time = non_negative(self.global_ai.scatter_time);
        self.global_ai.chase_time = non_negative(self.global_ai.chase_time);
        self.global_ai.frightened_duration = non_negative(self.global_ai.frightened_duration);
        for name in GhostName::ALL {
            let ghost = self.ghost_configs.get_mut(name);
            ghost.aggressiveness = ghost.aggressiveness.clamp(1, 10);
            ghost.relative_speed = positive_or(ghost.relative_speed, 1.0).clamp(0.5, 1.5);
        }
        self
    }

    pub fn algorithm_for(&self, name: GhostName) -> AlgorithmKind {
        self.ghost_configs
            .get(name)
            .algorithm
            .unwrap_or(self.default_algorithm)
    }

    /// Ticks per second the host should drive `advance` at.
    pub fn tick_rate_hz(&self) -> f32 {
        BASE_TICKS_PER_SECOND * self.game_speed * self.global_ai.agent_speed
    }

    pub fn tick_interval_ms(&self) -> u64 {
        let rate = self.tick_rate_hz();
        if rate <= 0.0 || !rate.is_finite() {
            return (1000.0 / BASE_TICKS_PER_SECOND) as u64;
        }
        (1000.0 / rate).round().max(1.0) as u64
    }
}

fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                if value.is_null() {
                    continue;
                }
                match base_map.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            if !value.is_null() {
                *slot = value;
            }
        }
    }
}

fn seconds_to_ms(seconds: f32) -> u64 {
    (non_negative(seconds) * 1000.0).round() as u64
}

fn non_negative(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
