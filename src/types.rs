use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn distance(self, other: Position) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Moves `steps` tiles along `dir` without any bounds or wrap handling.
    pub fn offset(self, dir: Direction, steps: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx * steps,
            y: self.y + dy * steps,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    Wall,
    Path,
    Empty,
    GhostHouse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GhostState {
    Chase,
    Scatter,
    Frightened,
    Dead,
}

impl GhostState {
    pub const ALL: [GhostState; 4] = [
        GhostState::Chase,
        GhostState::Scatter,
        GhostState::Frightened,
        GhostState::Dead,
    ];

    /// Whether touching the player in this state costs the player a life.
    pub fn is_dangerous(self) -> bool {
        matches!(self, GhostState::Chase | GhostState::Scatter)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostName {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl GhostName {
    pub const ALL: [GhostName; 4] = [
        GhostName::Blinky,
        GhostName::Pinky,
        GhostName::Inky,
        GhostName::Clyde,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GhostName::Blinky => "blinky",
            GhostName::Pinky => "pinky",
            GhostName::Inky => "inky",
            GhostName::Clyde => "clyde",
        }
    }
}

impl fmt::Display for GhostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmKind {
    #[default]
    AStar,
    Dijkstra,
    Bfs,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 3] = [
        AlgorithmKind::AStar,
        AlgorithmKind::Dijkstra,
        AlgorithmKind::Bfs,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "astar" => Some(Self::AStar),
            "dijkstra" => Some(Self::Dijkstra),
            "bfs" => Some(Self::Bfs),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AlgorithmKind::AStar => "astar",
            AlgorithmKind::Dijkstra => "dijkstra",
            AlgorithmKind::Bfs => "bfs",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingStrategy {
    Direct,
    Ambush,
    Proximity,
    Random,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Cautious,
    Brave,
    Unpredictable,
    Evasive,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyPreset {
    Easy,
    #[default]
    Medium,
    Hard,
    Custom,
}

impl DifficultyPreset {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    GameOver,
    Victory,
}

impl GameStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Victory)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsmEvent {
    Timeout,
    PowerPellet,
    Eaten,
    Revive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsmTransition {
    pub from: GhostState,
    pub to: GhostState,
    pub event: FsmEvent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consumable {
    Pellet,
    PowerPellet,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PelletEaten {
        at: Position,
    },
    PowerPellet {
        at: Position,
    },
    FsmChange {
        ghost: GhostName,
        from: GhostState,
        to: GhostState,
        event: FsmEvent,
    },
    GhostEaten {
        ghost: GhostName,
        points: u32,
        combo: u32,
    },
    PacmanDeath {
        #[serde(rename = "livesLeft")]
        lives_left: u32,
    },
    LevelComplete,
    GameOver,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhostFrame {
    pub name: GhostName,
    pub position: Position,
    pub state: GhostState,
    pub target: Position,
    pub path: Vec<Position>,
}

/// One executed tick, captured after every step of the tick has been applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    #[serde(rename = "clockMs")]
    pub clock_ms: u64,
    #[serde(rename = "pacmanPosition")]
    pub pacman_position: Position,
    #[serde(rename = "pacmanDirection")]
    pub pacman_direction: Direction,
    pub ghosts: Vec<GhostFrame>,
    pub score: u32,
    pub lives: u32,
    #[serde(rename = "pelletsRemaining")]
    pub pellets_remaining: u32,
    pub events: Vec<GameEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmMetrics {
    pub algorithm: AlgorithmKind,
    #[serde(rename = "nodesExpanded")]
    pub nodes_expanded: usize,
    #[serde(rename = "executionTimeMs")]
    pub execution_time_ms: f64,
    #[serde(rename = "pathLength")]
    pub path_length: usize,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    #[serde(rename = "pelletsRemaining")]
    pub pellets_remaining: u32,
    #[serde(rename = "totalPellets")]
    pub total_pellets: u32,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
}
