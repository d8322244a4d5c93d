//! Spawn feedback
//!
//! Watches folded states and turns schedule entries that have come due into
//! `SpawnPipe` actions. Those actions are fed back into the same fold that
//! produced the state being watched.

use std::collections::BTreeSet;

use crate::sim::{Action, State};

#[derive(Debug, Clone, Default)]
pub struct Spawner {
    /// `(game_time, pipe_spawn_index)` at the last check
    last_seen: Option<(u64, u32)>,
    /// Session the emitted set belongs to
    session: u32,
    /// Schedule indices already turned into spawn actions this session
    emitted: BTreeSet<u32>,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn actions for every due schedule entry not emitted yet
    ///
    /// Entries are checked individually, so an entry that is not due (or has
    /// a NaN spawn time) does not hold back later ones. Does nothing when
    /// neither the run time nor the spawn index moved since the previous call.
    pub fn observe(&mut self, state: &State) -> Vec<Action> {
        let key = (state.game_time, state.pipe_spawn_index);
        if self.last_seen == Some(key) {
            return Vec::new();
        }
        let first = self.last_seen.is_none();
        let index_rewound = self
            .last_seen
            .is_some_and(|(_, index)| state.pipe_spawn_index < index);
        self.last_seen = Some(key);

        if first || index_rewound || state.game_count != self.session {
            // Pipes already counted by the state are taken as the leading entries
            self.session = state.game_count;
            self.emitted = (0..state.pipe_spawn_index).collect();
        }

        let actions: Vec<Action> = state
            .pipe_spawn_queue
            .iter()
            .enumerate()
            .map(|(i, data)| (i as u32, data))
            .filter(|(i, data)| !self.emitted.contains(i) && data.is_due(state.game_time))
            .map(|(i, data)| Action::SpawnPipe {
                id: state.pipe_id(i),
                data: *data,
            })
            .collect();

        for action in &actions {
            if let Action::SpawnPipe { id, .. } = action {
                self.emitted.insert(id.index);
            }
        }
        if !actions.is_empty() {
            log::debug!(
                "Spawning {} pipe(s) at game time {} (session {})",
                actions.len(),
                state.game_time,
                state.game_count
            );
        }
        actions
    }
}
