//! Grid search used by the pursuers and exposed for side-by-side comparison.
//!
//! A* and Dijkstra share one best-first search that differs only in the
//! heuristic. A* uses Manhattan distance with the horizontal leg allowed
//! through the side tunnel, which keeps it admissible on wrapping boards.
//! The open list is a plain vector scanned for the lowest `f`; among equal
//! `f` values the node that sits earliest in the list wins, which is its
//! discovery order. Rediscovering an open node with a strictly smaller `g`
//! rewrites that node in place instead of pushing a duplicate.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Instant;

use chrono::Utc;
use tracing::trace;

use crate::grid::Grid;
use crate::types::{AlgorithmKind, AlgorithmMetrics, Position};

#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// Start to goal inclusive; empty when the goal cannot be reached.
    pub path: Vec<Position>,
    pub metrics: AlgorithmMetrics,
}

#[derive(Clone, Copy, Debug)]
struct SearchNode {
    pos: Position,
    g: i32,
    f: i32,
    parent: Option<usize>,
}

pub fn astar(grid: &Grid, start: Position, goal: Position) -> PathResult {
    let (start, goal) = (on_board(grid, start), on_board(grid, goal));
    best_first(grid, start, goal, AlgorithmKind::AStar, |pos| {
        grid.wrapped_manhattan(pos, goal)
    })
}

pub fn dijkstra(grid: &Grid, start: Position, goal: Position) -> PathResult {
    let (start, goal) = (on_board(grid, start), on_board(grid, goal));
    best_first(grid, start, goal, AlgorithmKind::Dijkstra, |_| 0)
}

pub fn bfs(grid: &Grid, start: Position, goal: Position) -> PathResult {
    let (start, goal) = (on_board(grid, start), on_board(grid, goal));
    let started = Instant::now();
    let mut nodes = vec![SearchNode {
        pos: start,
        g: 0,
        f: 0,
        parent: None,
    }];
    let mut queue = VecDeque::from([0usize]);
    let mut visited = HashSet::from([start]);
    let mut nodes_expanded = 0;

    while let Some(current) = queue.pop_front() {
        nodes_expanded += 1;
        let node = nodes[current];
        if node.pos == goal {
            let path = reconstruct_path(&nodes, current);
            return finish(AlgorithmKind::Bfs, path, nodes_expanded, started);
        }

        for next in grid.neighbors(node.pos) {
            if !visited.insert(next) {
                continue;
            }
            nodes.push(SearchNode {
                pos: next,
                g: node.g + 1,
                f: 0,
                parent: Some(current),
            });
            queue.push_back(nodes.len() - 1);
        }
    }

    finish(AlgorithmKind::Bfs, Vec::new(), nodes_expanded, started)
}

pub fn find_path(
    algorithm: AlgorithmKind,
    grid: &Grid,
    start: Position,
    goal: Position,
) -> PathResult {
    match algorithm {
        AlgorithmKind::AStar => astar(grid, start, goal),
        AlgorithmKind::Dijkstra => dijkstra(grid, start, goal),
        AlgorithmKind::Bfs => bfs(grid, start, goal),
    }
}

/// Runs each algorithm independently on the same query.
pub fn compare_algorithms(
    grid: &Grid,
    start: Position,
    goal: Position,
    algorithms: &[AlgorithmKind],
) -> Vec<PathResult> {
    algorithms
        .iter()
        .map(|algorithm| find_path(*algorithm, grid, start, goal))
        .collect()
}

fn best_first(
    grid: &Grid,
    start: Position,
    goal: Position,
    algorithm: AlgorithmKind,
    heuristic: impl Fn(Position) -> i32,
) -> PathResult {
    let started = Instant::now();
    let mut nodes = vec![SearchNode {
        pos: start,
        g: 0,
        f: heuristic(start),
        parent: None,
    }];
    let mut open: Vec<usize> = vec![0];
    let mut open_index: HashMap<Position, usize> = HashMap::from([(start, 0)]);
    let mut closed: HashSet<Position> = HashSet::new();
    let mut nodes_expanded = 0;

    while let Some(slot) = lowest_f_slot(&open, &nodes) {
        let current = open.remove(slot);
        let node = nodes[current];
        open_index.remove(&node.pos);
        nodes_expanded += 1;

        if node.pos == goal {
            let path = reconstruct_path(&nodes, current);
            return finish(algorithm, path, nodes_expanded, started);
        }
        closed.insert(node.pos);

        for next in grid.neighbors(node.pos) {
            if closed.contains(&next) {
                continue;
            }
            let g = node.g + 1;
            let f = g + heuristic(next);
            match open_index.get(&next) {
                None => {
                    nodes.push(SearchNode {
                        pos: next,
                        g,
                        f,
                        parent: Some(current),
                    });
                    let idx = nodes.len() - 1;
                    open.push(idx);
                    open_index.insert(next, idx);
                }
                Some(&idx) if g < nodes[idx].g => {
                    let existing = &mut nodes[idx];
                    existing.g = g;
                    existing.f = f;
                    existing.parent = Some(current);
                }
                Some(_) => {}
            }
        }
    }

    finish(algorithm, Vec::new(), nodes_expanded, started)
}

/// Folds x through the side tunnel so that off-edge targets name the tile a
/// search can actually reach. Rows outside the board are left as given and
/// never match.
fn on_board(grid: &Grid, pos: Position) -> Position {
    grid.wrap(pos).unwrap_or(pos)
}

fn lowest_f_slot(open: &[usize], nodes: &[SearchNode]) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (slot, &idx) in open.iter().enumerate() {
        let f = nodes[idx].f;
        if best.map(|(_, best_f)| f < best_f).unwrap_or(true) {
            best = Some((slot, f));
        }
    }
    best.map(|(slot, _)| slot)
}

fn reconstruct_path(nodes: &[SearchNode], goal_idx: usize) -> Vec<Position> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_idx);
    while let Some(idx) = cursor {
        path.push(nodes[idx].pos);
        cursor = nodes[idx].parent;
    }
    path.reverse();
    path
}

fn finish(
    algorithm: AlgorithmKind,
    path: Vec<Position>,
    nodes_expanded: usize,
    started: Instant,
) -> PathResult {
    let metrics = AlgorithmMetrics {
        algorithm,
        nodes_expanded,
        execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        path_length: path.len(),
        timestamp: Utc::now().timestamp_millis(),
    };
    trace!(
        algorithm = algorithm.as_str(),
        nodes_expanded,
        path_length = metrics.path_length,
        "pathfinding finished"
    );
    PathResult { path, metrics }
}
