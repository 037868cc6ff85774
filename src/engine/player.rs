use serde::Serialize;

use crate::constants::{POINTS_PELLET, POINTS_POWER_PELLET, POWER_DURATION_TICKS, STARTING_LIVES};
use crate::grid::Grid;
use crate::types::{Consumable, Direction, Position};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Player {
    pub position: Position,
    pub direction: Direction,
    #[serde(rename = "queuedDirection")]
    pub queued_direction: Direction,
    pub lives: u32,
    pub score: u32,
    #[serde(rename = "pelletsEaten")]
    pub pellets_eaten: u32,
    #[serde(rename = "powerActive")]
    pub power_active: bool,
    #[serde(rename = "powerTicksLeft")]
    pub power_ticks_left: u32,
    /// Pursuers eaten during the current empowerment window.
    pub combo: u32,
}

impl Player {
    pub fn new(start: Position) -> Self {
        Self {
            position: start,
            direction: Direction::None,
            queued_direction: Direction::None,
            lives: STARTING_LIVES,
            score: 0,
            pellets_eaten: 0,
            power_active: false,
            power_ticks_left: 0,
            combo: 0,
        }
    }

    /// One tile along the queued direction, else along the current one.
    /// Returns whether the player changed tile.
    pub fn try_move(&mut self, grid: &Grid) -> bool {
        for dir in [self.queued_direction, self.direction] {
            if dir == Direction::None {
                continue;
            }
            let Some(next) = grid.wrap(self.position.offset(dir, 1)) else {
                continue;
            };
            if !grid.is_walkable(next) {
                continue;
            }
            self.direction = dir;
            let moved = next != self.position;
            self.position = next;
            return moved;
        }
        false
    }

    pub fn eat(&mut self, grid: &mut Grid) -> Option<Consumable> {
        let eaten = grid.consume_at(self.position)?;
        self.pellets_eaten += 1;
        match eaten {
            Consumable::Pellet => self.score += POINTS_PELLET,
            Consumable::PowerPellet => {
                self.score += POINTS_POWER_PELLET;
                self.power_active = true;
                self.power_ticks_left = POWER_DURATION_TICKS;
                self.combo = 0;
            }
        }
        Some(eaten)
    }

    /// Counts one tick of empowerment down. Returns true on the tick it expires.
    pub fn tick_power(&mut self) -> bool {
        if !self.power_active {
            return false;
        }
        self.power_ticks_left = self.power_ticks_left.saturating_sub(1);
        if self.power_ticks_left == 0 {
            self.power_active = false;
            self.combo = 0;
            return true;
        }
        false
    }

    pub fn lose_life(&mut self, start: Position) {
        self.lives = self.lives.saturating_sub(1);
        self.position = start;
        self.direction = Direction::None;
        self.queued_direction = Direction::None;
        self.combo = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::open_grid;

    #[test]
    fn blocked_queued_direction_falls_back_to_current() {
        let grid = Grid::from_rows(&["#####", "#P..#", "#.#G#", "#####"]).expect("valid layout");
        let mut player = Player::new(grid.player_start());
        player.direction = Direction::Right;
        player.queued_direction = Direction::Up;
        assert!(player.try_move(&grid));
        assert_eq!(player.position, Position::new(2, 1));
        assert_eq!(player.direction, Direction::Right);

        player.queued_direction = Direction::Down;
        assert!(player.try_move(&grid));
        assert_eq!(player.position, Position::new(3, 1));
        assert_eq!(player.direction, Direction::Right);

        player.queued_direction = Direction::Up;
        assert!(!player.try_move(&grid));
        assert_eq!(player.position, Position::new(3, 1));
    }

    #[test]
    fn movement_wraps_through_the_tunnel() {
        let grid = Grid::from_rows(&["#####", "P . G", "#####"]).expect("valid layout");
        let mut player = Player::new(grid.player_start());
        player.queued_direction = Direction::Left;
        assert!(player.try_move(&grid));
        assert_eq!(player.position, Position::new(4, 1));
    }

    #[test]
    fn power_pellet_starts_countdown_and_resets_combo() {
        let mut grid = open_grid(3, 1, (0, 0), (2, 0), &[], &[(1, 0)]);
        let mut player = Player::new(grid.player_start());
        player.combo = 3;
        player.position = Position::new(1, 0);
        assert_eq!(player.eat(&mut grid), Some(Consumable::PowerPellet));
        assert_eq!(player.score, POINTS_POWER_PELLET);
        assert_eq!(player.pellets_eaten, 1);
        assert!(player.power_active);
        assert_eq!(player.combo, 0);
        assert_eq!(player.eat(&mut grid), None);

        player.combo = 2;
        player.power_ticks_left = 2;
        assert!(!player.tick_power());
        assert!(player.tick_power());
        assert!(!player.power_active);
        assert_eq!(player.combo, 0);
        assert!(!player.tick_power());
    }

    #[test]
    fn losing_a_life_respawns_at_start() {
        let mut player = Player::new(Position::new(1, 1));
        player.position = Position::new(6, 2);
        player.direction = Direction::Left;
        player.combo = 2;
        player.power_active = true;
        player.lose_life(Position::new(1, 1));
        assert_eq!(player.lives, STARTING_LIVES - 1);
        assert_eq!(player.position, Position::new(1, 1));
        assert_eq!(player.direction, Direction::None);
        assert_eq!(player.combo, 0);
        assert!(player.power_active);
    }
}
