//! Frame history and the read-only cursor used for step-by-step playback.

use std::collections::VecDeque;

use crate::constants::{
    MAX_FRAME_HISTORY, MAX_PLAYBACK_SPEED, MIN_PLAYBACK_SPEED, REPLAY_BASE_INTERVAL_MS,
};
use crate::types::Frame;

/// Append-only log of executed ticks. Beyond `capacity` the oldest frame is
/// dropped; stored frames are never modified.
#[derive(Clone, Debug)]
pub struct FrameHistory {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl Default for FrameHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_FRAME_HISTORY)
    }
}

impl FrameHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity.min(MAX_FRAME_HISTORY)),
            capacity,
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push_back(frame);
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn first(&self) -> Option<&Frame> {
        self.frames.front()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn cursor(&self) -> ReplayCursor<'_> {
        ReplayCursor::new(self)
    }
}

/// Borrowing the history keeps the engine from producing ticks while a
/// replay is open.
#[derive(Clone, Debug)]
pub struct ReplayCursor<'a> {
    history: &'a FrameHistory,
    index: usize,
    playing: bool,
    speed: f32,
}

impl<'a> ReplayCursor<'a> {
    pub fn new(history: &'a FrameHistory) -> Self {
        Self {
            history,
            index: 0,
            playing: false,
            speed: 1.0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&'a Frame> {
        self.history.get(self.index)
    }

    pub fn is_at_start(&self) -> bool {
        self.index == 0
    }

    pub fn is_at_end(&self) -> bool {
        self.index + 1 >= self.history.len()
    }

    /// Returns false when already on the last frame.
    pub fn step_forward(&mut self) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn step_back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn go_to_start(&mut self) {
        self.index = 0;
    }

    pub fn go_to_end(&mut self) {
        self.index = self.history.len().saturating_sub(1);
    }

    /// Jumps to `index`, clamped to the last frame.
    pub fn seek(&mut self, index: usize) {
        self.index = index.min(self.history.len().saturating_sub(1));
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = !self.history.is_empty();
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_playback_speed(&mut self, speed: f32) {
        self.speed = if speed.is_finite() {
            speed.clamp(MIN_PLAYBACK_SPEED, MAX_PLAYBACK_SPEED)
        } else {
            1.0
        };
    }

    /// Delay the host should wait between automatic steps.
    pub fn frame_interval_ms(&self) -> f32 {
        REPLAY_BASE_INTERVAL_MS / self.speed
    }

    /// One automatic playback step. Reaching the last frame pauses playback.
    pub fn tick_playback(&mut self) -> Option<&'a Frame> {
        if !self.playing {
            return None;
        }
        if !self.step_forward() {
            self.playing = false;
            return None;
        }
        if self.is_at_end() {
            self.playing = false;
        }
        self.current()
    }
}
