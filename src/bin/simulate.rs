use clap::Parser;
use pacman_lab::config::GameConfig;
use pacman_lab::engine::{GameEngine, GameEngineOptions, ScatterTargeting};
use pacman_lab::error::{ConfigError, LevelError};
use pacman_lab::grid::Grid;
use pacman_lab::levels::load_level;
use pacman_lab::metrics::AlgorithmSummary;
use pacman_lab::pathfinding::compare_algorithms;
use pacman_lab::replay::FrameHistory;
use pacman_lab::types::{
    AlgorithmKind, DifficultyPreset, Direction, GameEvent, GameStatus, Position,
};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Manhattan radius inside which the scripted player stops foraging and flees.
const DANGER_RADIUS: i32 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value_t = 1)]
    level: u32,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = 5_000)]
    max_ticks: u64,
    /// JSON game configuration; missing fields fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    preset: Option<String>,
    #[arg(long)]
    algorithm: Option<String>,
    #[arg(long, default_value = "corner")]
    scatter: String,
    #[arg(long)]
    frames_out: Option<PathBuf>,
    /// Compare every search algorithm from player start to ghost home and exit.
    #[arg(long)]
    compare: bool,
    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
    #[arg(long)]
    log_json: bool,
}

#[derive(Debug, thiserror::Error)]
enum SetupError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("unknown difficulty preset: {0}")]
    UnknownPreset(String),
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("unknown scatter mode: {0}")]
    UnknownScatter(String),
}

#[derive(Clone, Debug, Serialize)]
struct EpisodeResult {
    level: u32,
    seed: u32,
    status: GameStatus,
    ticks: u64,
    score: u32,
    lives: u32,
    #[serde(rename = "pelletsRemaining")]
    pellets_remaining: u32,
    #[serde(rename = "totalPellets")]
    total_pellets: u32,
    #[serde(rename = "clockMs")]
    clock_ms: u64,
    #[serde(rename = "elapsedMs")]
    elapsed_ms: u64,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    deaths: u32,
    #[serde(rename = "fsmTransitions")]
    fsm_transitions: u32,
    #[serde(rename = "algorithmStats")]
    algorithm_stats: Vec<AlgorithmSummary>,
}

#[derive(Clone, Debug, Serialize)]
struct ComparisonLine {
    level: u32,
    from: Position,
    to: Position,
    algorithm: AlgorithmKind,
    #[serde(rename = "nodesExpanded")]
    nodes_expanded: usize,
    #[serde(rename = "pathLength")]
    path_length: usize,
    #[serde(rename = "executionTimeMs")]
    execution_time_ms: f64,
}

#[derive(Clone, Copy, Debug, Default)]
struct EventTally {
    ghosts_eaten: u32,
    deaths: u32,
    fsm_transitions: u32,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    if let Err(error) = run(&cli) {
        error!(error = %error, "simulation failed");
        std::process::exit(2);
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,pacman_lab=info,simulate=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: &Cli) -> Result<(), SetupError> {
    let config = resolve_config(cli)?;

    if cli.print_config {
        println!("{}", config.to_json_string()?);
        return Ok(());
    }

    if cli.compare {
        let grid = load_level(cli.level)?;
        for line in compare_lines(cli.level, &grid) {
            print_json(&line);
        }
        return Ok(());
    }

    let options = GameEngineOptions {
        seed: cli.seed.unwrap_or_else(rand::random::<u32>),
        scatter_targeting: parse_scatter(&cli.scatter)?,
        ..GameEngineOptions::default()
    };
    info!(
        level = cli.level,
        seed = options.seed,
        max_ticks = cli.max_ticks,
        "episode requested"
    );

    let (result, engine) = run_episode(cli.level, config, options, cli.max_ticks)?;
    info!(
        status = ?result.status,
        ticks = result.ticks,
        score = result.score,
        "episode finished"
    );
    print_json(&result);

    if let Some(path) = cli.frames_out.as_ref() {
        write_frames(path, engine.frames()).map_err(|source| SetupError::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), frames = engine.frames().len(), "frames written");
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<GameConfig, SetupError> {
    let mut config = match cli.config.as_ref() {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| SetupError::Read {
                path: path.clone(),
                source,
            })?;
            GameConfig::from_json_str(&raw)?
        }
        None => GameConfig::default(),
    };

    if let Some(preset) = cli.preset.as_deref() {
        let preset = DifficultyPreset::parse(preset)
            .ok_or_else(|| SetupError::UnknownPreset(preset.to_string()))?;
        config = config.with_preset(preset);
    }
    if let Some(algorithm) = cli.algorithm.as_deref() {
        config.default_algorithm = AlgorithmKind::parse(algorithm)
            .ok_or_else(|| SetupError::UnknownAlgorithm(algorithm.to_string()))?;
    }
    Ok(config.normalized())
}

fn parse_scatter(value: &str) -> Result<ScatterTargeting, SetupError> {
    match value {
        "corner" => Ok(ScatterTargeting::Corner),
        "random" => Ok(ScatterTargeting::SeededRandom),
        other => Err(SetupError::UnknownScatter(other.to_string())),
    }
}

fn run_episode(
    level: u32,
    config: GameConfig,
    options: GameEngineOptions,
    max_ticks: u64,
) -> Result<(EpisodeResult, GameEngine), LevelError> {
    let dt_ms = config.tick_interval_ms();
    let seed = options.seed;
    let mut engine = GameEngine::for_level(level, config, options)?;
    engine.start();

    let mut tally = EventTally::default();
    while !engine.is_ended() && engine.tick() < max_ticks {
        let threats: Vec<Position> = engine
            .ghosts()
            .iter()
            .filter(|ghost| ghost.state.is_dangerous())
            .map(|ghost| ghost.position)
            .collect();
        let dir = choose_direction(engine.grid(), engine.player().position, &threats);
        engine.set_direction(dir);
        engine.advance(dt_ms);

        if let Some(frame) = engine.frames().last() {
            tally_events(&mut tally, &frame.events);
        }
    }

    let session = engine.session();
    let result = EpisodeResult {
        level,
        seed,
        status: engine.status(),
        ticks: engine.tick(),
        score: session.score,
        lives: session.lives,
        pellets_remaining: session.pellets_remaining,
        total_pellets: session.total_pellets,
        clock_ms: engine.clock_ms(),
        elapsed_ms: session.elapsed_ms,
        ghosts_eaten: tally.ghosts_eaten,
        deaths: tally.deaths,
        fsm_transitions: tally.fsm_transitions,
        algorithm_stats: engine.metrics().summary(),
    };
    Ok((result, engine))
}

fn tally_events(tally: &mut EventTally, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::GhostEaten { .. } => tally.ghosts_eaten += 1,
            GameEvent::PacmanDeath { .. } => tally.deaths += 1,
            GameEvent::FsmChange { .. } => tally.fsm_transitions += 1,
            _ => {}
        }
    }
}

/// Scripted player: step away from nearby threats, otherwise walk toward the
/// closest consumable.
fn choose_direction(grid: &Grid, at: Position, threats: &[Position]) -> Direction {
    let near: Vec<Position> = threats
        .iter()
        .copied()
        .filter(|threat| grid.wrapped_manhattan(at, *threat) <= DANGER_RADIUS)
        .collect();
    if !near.is_empty() {
        // min_by_key keeps the first of equally safe tiles.
        let safest = grid.neighbors(at).into_iter().min_by_key(|next| {
            let closest = near
                .iter()
                .map(|threat| grid.wrapped_manhattan(*next, *threat))
                .min()
                .unwrap_or(i32::MAX);
            Reverse(closest)
        });
        if let Some(next) = safest {
            return step_direction(grid, at, next);
        }
    }

    let blocked: HashSet<Position> = threats.iter().copied().collect();
    match first_step_to_consumable(grid, at, &blocked) {
        Some(next) => step_direction(grid, at, next),
        None => Direction::None,
    }
}

fn first_step_to_consumable(
    grid: &Grid,
    start: Position,
    blocked: &HashSet<Position>,
) -> Option<Position> {
    let mut parents: HashMap<Position, Position> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    parents.insert(start, start);

    while let Some(pos) = queue.pop_front() {
        let has_food = grid
            .cell(pos)
            .is_some_and(|cell| cell.has_pellet || cell.has_power_pellet);
        if pos != start && has_food {
            let mut step = pos;
            while let Some(&parent) = parents.get(&step) {
                if parent == start {
                    return Some(step);
                }
                step = parent;
            }
            return None;
        }
        for next in grid.neighbors(pos) {
            if blocked.contains(&next) || parents.contains_key(&next) {
                continue;
            }
            parents.insert(next, pos);
            queue.push_back(next);
        }
    }
    None
}

fn step_direction(grid: &Grid, from: Position, to: Position) -> Direction {
    Direction::CARDINALS
        .into_iter()
        .find(|dir| grid.wrap(from.offset(*dir, 1)) == Some(to))
        .unwrap_or(Direction::None)
}

fn compare_lines(level: u32, grid: &Grid) -> Vec<ComparisonLine> {
    let from = grid.player_start();
    let to = grid.ghost_home();
    compare_algorithms(grid, from, to, &AlgorithmKind::ALL)
        .into_iter()
        .map(|result| ComparisonLine {
            level,
            from,
            to,
            algorithm: result.metrics.algorithm,
            nodes_expanded: result.metrics.nodes_expanded,
            path_length: result.metrics.path_length,
            execution_time_ms: result.metrics.execution_time_ms,
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(error) => error!(error = %error, "result did not serialize"),
    }
}

fn write_frames(path: &Path, frames: &FrameHistory) -> io::Result<()> {
    let frames: Vec<_> = frames.iter().collect();
    let text = serde_json::to_string_pretty(&frames).map_err(io::Error::other)?;
    std::fs::write(path, text)
}
