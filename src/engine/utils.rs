use crate::constants::POINTS_GHOST_BASE;
use crate::types::{Direction, Position};

/// Milliseconds of executed ticks since the player's first successful move.
/// Drives FSM timeouts; the empowerment countdown runs on ticks instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct SimulationClock {
    running: bool,
    elapsed_ms: u64,
}

impl SimulationClock {
    pub(super) fn is_running(&self) -> bool {
        self.running
    }

    /// Zero point. Later calls are ignored.
    pub(super) fn latch(&mut self) {
        self.running = true;
    }

    pub(super) fn advance(&mut self, dt_ms: u64) {
        if self.running {
            self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        }
    }

    pub(super) fn now_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

/// Facing after a one-tile step; a jump wider than one column is a tunnel wrap.
pub(super) fn direction_between(from: Position, to: Position) -> Option<Direction> {
    let mut dx = to.x - from.x;
    if dx.abs() > 1 {
        dx = -dx.signum();
    }
    let dy = to.y - from.y;
    if dx > 0 {
        Some(Direction::Right)
    } else if dx < 0 {
        Some(Direction::Left)
    } else if dy > 0 {
        Some(Direction::Down)
    } else if dy < 0 {
        Some(Direction::Up)
    } else {
        None
    }
}

/// 200, 400, 800, ... for the n-th pursuer eaten in one empowerment window.
pub(super) fn ghost_points(combo: u32) -> u32 {
    POINTS_GHOST_BASE.saturating_mul(2u32.saturating_pow(combo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_only_counts_after_latch() {
        let mut clock = SimulationClock::default();
        clock.advance(100);
        assert_eq!(clock.now_ms(), 0);
        assert!(!clock.is_running());
        clock.latch();
        clock.advance(100);
        clock.latch();
        clock.advance(50);
        assert_eq!(clock.now_ms(), 150);
    }

    #[test]
    fn wrapped_steps_keep_their_travel_direction() {
        assert_eq!(
            direction_between(Position::new(0, 3), Position::new(27, 3)),
            Some(Direction::Left)
        );
        assert_eq!(
            direction_between(Position::new(27, 3), Position::new(0, 3)),
            Some(Direction::Right)
        );
        assert_eq!(
            direction_between(Position::new(4, 3), Position::new(4, 2)),
            Some(Direction::Up)
        );
        assert_eq!(direction_between(Position::new(4, 3), Position::new(4, 3)), None);
    }

    #[test]
    fn ghost_points_double_per_combo() {
        let points: Vec<u32> = (0..4).map(ghost_points).collect();
        assert_eq!(points, vec![200, 400, 800, 1600]);
        assert_eq!(ghost_points(40), u32::MAX);
    }
}
