//! Ghost replay
//!
//! Earlier runs are replayed frame by frame next to the live bird. A run
//! whose trace is shorter than the current frame simply drops out.

use glam::Vec2;

use crate::consts::TICK_RATE_MS;
use crate::sim::{GameHistory, State};

/// Replay frame for a run time
#[inline]
pub fn frame_index(game_time: u64) -> usize {
    (game_time / TICK_RATE_MS) as usize
}

/// Position of every archived run at `frame`, skipping exhausted traces
pub fn calculate_ghost_positions(history: &[GameHistory], frame: usize) -> Vec<Vec2> {
    history
        .iter()
        .filter_map(|run| run.bird_positions.get(frame).copied())
        .collect()
}

/// Inputs the ghost list depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GhostKey {
    history_len: usize,
    frame: usize,
    started: bool,
}

/// Recomputes ghost positions only when history, frame or run start changes
#[derive(Debug, Clone)]
pub struct GhostTracker {
    enabled: bool,
    key: Option<GhostKey>,
    ghosts: Vec<Vec2>,
}

impl GhostTracker {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            key: None,
            ghosts: Vec::new(),
        }
    }

    /// Latest ghost positions for `state`
    pub fn observe(&mut self, state: &State) -> &[Vec2] {
        let key = GhostKey {
            history_len: state.game_history.len(),
            frame: frame_index(state.game_time),
            started: state.game_started,
        };
        if self.key != Some(key) {
            self.key = Some(key);
            self.ghosts = if self.enabled && key.started && key.history_len > 0 {
                calculate_ghost_positions(&state.game_history, key.frame)
            } else {
                Vec::new()
            };
        }
        &self.ghosts
    }
}
