use std::collections::{HashSet, VecDeque};

use crate::error::LevelError;
use crate::types::{CellType, Consumable, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub cell_type: CellType,
    pub has_pellet: bool,
    pub has_power_pellet: bool,
}

impl Cell {
    fn new(cell_type: CellType) -> Self {
        Self {
            cell_type,
            has_pellet: false,
            has_power_pellet: false,
        }
    }
}

/// The maze. Cells are stored row-major; only `consume_at` mutates them after
/// construction.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    player_start: Position,
    ghost_home: Position,
    total_pellets: u32,
}

impl Grid {
    /// Parses a layout, one string per row.
    ///
    /// `#` wall, `.` pellet, `o` power pellet, ` ` empty path, `-` ghost house,
    /// `P` player start, `G` ghost home.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let Some(first) = rows.first() else {
            return Err(LevelError::Empty);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(LevelError::Empty);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        let mut player_start = None;
        let mut ghost_home = None;

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(LevelError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                let cell = match ch {
                    '#' => Cell::new(CellType::Wall),
                    ' ' => Cell::new(CellType::Empty),
                    '-' => Cell::new(CellType::GhostHouse),
                    '.' => Cell {
                        has_pellet: true,
                        ..Cell::new(CellType::Path)
                    },
                    'o' => Cell {
                        has_power_pellet: true,
                        ..Cell::new(CellType::Path)
                    },
                    'P' => {
                        player_start = Some(pos);
                        Cell::new(CellType::Path)
                    }
                    'G' => {
                        ghost_home = Some(pos);
                        Cell::new(CellType::GhostHouse)
                    }
                    _ => return Err(LevelError::UnknownCharacter { ch, x, y }),
                };
                cells.push(cell);
            }
        }

        let player_start = player_start.ok_or(LevelError::MissingPlayerStart)?;
        let ghost_home = ghost_home.ok_or(LevelError::MissingGhostHome)?;
        let total_pellets = cells
            .iter()
            .filter(|cell| cell.has_pellet || cell.has_power_pellet)
            .count() as u32;

        Ok(Self {
            width: width as i32,
            height: rows.len() as i32,
            cells,
            player_start,
            ghost_home,
            total_pellets,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn player_start(&self) -> Position {
        self.player_start
    }

    pub fn ghost_home(&self) -> Position {
        self.ghost_home
    }

    /// Consumables placed when the grid was built. Fixed for the grid's lifetime.
    pub fn total_pellets(&self) -> u32 {
        self.total_pellets
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Resolves the horizontal tunnel: x wraps, y does not.
    pub fn wrap(&self, pos: Position) -> Option<Position> {
        if pos.y < 0 || pos.y >= self.height || self.width <= 0 {
            return None;
        }
        Some(Position::new(pos.x.rem_euclid(self.width), pos.y))
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.cells.get(self.index(pos))
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.wrap(pos)
            .and_then(|wrapped| self.cell(wrapped))
            .map(|cell| cell.cell_type != CellType::Wall)
            .unwrap_or(false)
    }

    /// Up to four walkable orthogonal neighbours, in up, left, down, right order.
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        let mut out = Vec::with_capacity(4);
        for (dx, dy) in [(0, -1), (-1, 0), (0, 1), (1, 0)] {
            let Some(next) = self.wrap(Position::new(pos.x + dx, pos.y + dy)) else {
                continue;
            };
            if next != pos && self.is_walkable(next) {
                out.push(next);
            }
        }
        out
    }

    /// Clears one consumable at `pos`, pellet first, and reports which.
    pub fn consume_at(&mut self, pos: Position) -> Option<Consumable> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = self.index(pos);
        let cell = self.cells.get_mut(idx)?;
        if cell.has_pellet {
            cell.has_pellet = false;
            return Some(Consumable::Pellet);
        }
        if cell.has_power_pellet {
            cell.has_power_pellet = false;
            return Some(Consumable::PowerPellet);
        }
        None
    }

    pub fn consumables_on_board(&self) -> u32 {
        self.cells
            .iter()
            .map(|cell| u32::from(cell.has_pellet) + u32::from(cell.has_power_pellet))
            .sum()
    }

    pub fn walkable_positions(&self) -> Vec<Position> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                if self.is_walkable(pos) {
                    out.push(pos);
                }
            }
        }
        out
    }

    pub fn reachable_from(&self, start: Position) -> HashSet<Position> {
        let mut out = HashSet::new();
        if !self.in_bounds(start) || !self.is_walkable(start) {
            return out;
        }

        let mut queue = VecDeque::new();
        out.insert(start);
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for next in self.neighbors(pos) {
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        out
    }

    /// Closest walkable tile to `target` by Manhattan distance, ties broken by
    /// row then column. `target` is clamped into the grid first.
    pub fn nearest_walkable(&self, target: Position) -> Option<Position> {
        let target = self.clamp(target);
        if self.is_walkable(target) {
            return Some(target);
        }
        let mut best: Option<(i32, i32, i32, Position)> = None;
        for pos in self.walkable_positions() {
            let key = (pos.manhattan(target), pos.y, pos.x, pos);
            if best
                .map(|v| (v.0, v.1, v.2) > (key.0, key.1, key.2))
                .unwrap_or(true)
            {
                best = Some(key);
            }
        }
        best.map(|(_, _, _, pos)| pos)
    }

    /// Manhattan distance where the horizontal leg may go through the tunnel.
    /// Never exceeds the true step count, so it is a safe search heuristic.
    pub fn wrapped_manhattan(&self, a: Position, b: Position) -> i32 {
        let dx = (a.x - b.x).abs();
        let dx = if self.width > 0 { dx.min(self.width - dx).max(0) } else { dx };
        dx + (a.y - b.y).abs()
    }

    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(0, (self.width - 1).max(0)),
            pos.y.clamp(0, (self.height - 1).max(0)),
        )
    }

    fn index(&self, pos: Position) -> usize {
        (pos.y * self.width + pos.x) as usize
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// An open `width` x `height` board with the given markers placed on it.
    pub(crate) fn open_grid(
        width: usize,
        height: usize,
        player: (usize, usize),
        home: (usize, usize),
        pellets: &[(usize, usize)],
        power: &[(usize, usize)],
    ) -> Grid {
        let mut rows = vec![vec![' '; width]; height];
        for &(x, y) in pellets {
            rows[y][x] = '.';
        }
        for &(x, y) in power {
            rows[y][x] = 'o';
        }
        rows[player.1][player.0] = 'P';
        rows[home.1][home.0] = 'G';
        let rows: Vec<String> = rows.into_iter().map(|r| r.into_iter().collect()).collect();
        Grid::from_rows(&rows).expect("valid test layout")
    }

    #[test]
    fn parses_markers_and_counts_consumables() {
        let grid = Grid::from_rows(&["#####", "#P.o#", "#.G.#", "#####"]).expect("valid layout");
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.player_start(), Position::new(1, 1));
        assert_eq!(grid.ghost_home(), Position::new(2, 2));
        assert_eq!(grid.total_pellets(), 4);
        assert_eq!(grid.consumables_on_board(), 4);
        assert_eq!(
            grid.cell(Position::new(2, 2)).map(|c| c.cell_type),
            Some(CellType::GhostHouse)
        );
    }

    #[test]
    fn rejects_malformed_layouts() {
        let empty: [&str; 0] = [];
        assert!(matches!(Grid::from_rows(&empty), Err(LevelError::Empty)));
        assert!(matches!(
            Grid::from_rows(&["###", "#P"]),
            Err(LevelError::RaggedRow { row: 1, .. })
        ));
        assert!(matches!(
            Grid::from_rows(&["#P#", "#G?"]),
            Err(LevelError::UnknownCharacter { ch: '?', x: 2, y: 1 })
        ));
        assert!(matches!(
            Grid::from_rows(&["#.#", "#G#"]),
            Err(LevelError::MissingPlayerStart)
        ));
        assert!(matches!(
            Grid::from_rows(&["#P#", "#.#"]),
            Err(LevelError::MissingGhostHome)
        ));
    }

    #[test]
    fn neighbors_exclude_walls() {
        let grid = Grid::from_rows(&["#####", "#P.##", "#.#G#", "#####"]).expect("valid layout");
        let mut neighbors = grid.neighbors(Position::new(1, 1));
        neighbors.sort();
        assert_eq!(neighbors, vec![Position::new(1, 2), Position::new(2, 1)]);
    }

    #[test]
    fn horizontal_edges_wrap_but_vertical_edges_do_not() {
        let grid = Grid::from_rows(&["#####", "P . G", "#####"]).expect("valid layout");
        let neighbors = grid.neighbors(Position::new(0, 1));
        assert!(neighbors.contains(&Position::new(4, 1)));
        assert!(neighbors.contains(&Position::new(1, 1)));
        assert_eq!(neighbors.len(), 2);

        let open = open_grid(4, 4, (0, 0), (3, 3), &[], &[]);
        let top = open.neighbors(Position::new(1, 0));
        assert!(!top.iter().any(|p| p.y == 3));
        assert!(!open.is_walkable(Position::new(1, -1)));
        assert!(open.is_walkable(Position::new(-1, 0)));
    }

    #[test]
    fn consume_at_clears_one_flag_and_reports_it() {
        let mut grid = open_grid(4, 1, (0, 0), (3, 0), &[(1, 0)], &[(2, 0)]);
        assert_eq!(grid.consume_at(Position::new(1, 0)), Some(Consumable::Pellet));
        assert_eq!(grid.consume_at(Position::new(1, 0)), None);
        assert_eq!(grid.consume_at(Position::new(2, 0)), Some(Consumable::PowerPellet));
        assert_eq!(grid.consume_at(Position::new(0, 0)), None);
        assert_eq!(grid.consume_at(Position::new(9, 9)), None);
        assert_eq!(grid.consumables_on_board(), 0);
        assert_eq!(grid.total_pellets(), 2);
    }

    #[test]
    fn nearest_walkable_snaps_out_of_walls() {
        let grid = Grid::from_rows(&["#####", "#P..#", "#..G#", "#####"]).expect("valid layout");
        assert_eq!(grid.nearest_walkable(Position::new(0, 0)), Some(Position::new(1, 1)));
        assert_eq!(grid.nearest_walkable(Position::new(40, 40)), Some(Position::new(3, 2)));
        assert_eq!(grid.nearest_walkable(Position::new(2, 2)), Some(Position::new(2, 2)));
    }

    #[test]
    fn wrapped_manhattan_takes_the_shorter_horizontal_leg() {
        let grid = open_grid(10, 10, (0, 0), (9, 9), &[], &[]);
        assert_eq!(grid.wrapped_manhattan(Position::new(9, 9), Position::new(1, 0)), 11);
        assert_eq!(grid.wrapped_manhattan(Position::new(3, 2), Position::new(5, 4)), 4);
    }

    #[test]
    fn reachable_region_stops_at_walls() {
        let grid = Grid::from_rows(&["#######", "#P.#.G#", "#######"]).expect("valid layout");
        let reachable = grid.reachable_from(Position::new(1, 1));
        assert_eq!(reachable.len(), 2);
        assert!(!reachable.contains(&Position::new(5, 1)));
    }
}
