//! Game state and core simulation types
//!
//! `State` is a complete snapshot of one frame. Transitions consume a state
//! and return its replacement; nothing here is shared or mutated in place.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The player's bird
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Collision radius (reduced while shrink is active)
    pub radius: f32,
}

impl Bird {
    pub const fn new() -> Self {
        Self {
            pos: Vec2::new(BIRD_X, BIRD_START_Y),
            vel: Vec2::ZERO,
            radius: BIRD_RADIUS,
        }
    }

    /// Integrate one tick of gravity at the given radius
    ///
    /// Horizontal position and velocity are untouched; the new height is
    /// clamped so the bird never leaves the canvas.
    pub fn apply_gravity(self, radius: f32) -> Self {
        let vel = Vec2::new(self.vel.x, self.vel.y + GRAVITY);
        let y = (self.pos.y + vel.y).clamp(radius, CANVAS_HEIGHT - radius);
        Self {
            pos: Vec2::new(self.pos.x, y),
            vel,
            radius,
        }
    }

    /// Set upward velocity
    pub fn flap(self) -> Self {
        Self {
            vel: Vec2::new(self.vel.x, FLAP_VELOCITY),
            ..self
        }
    }

    /// Replace vertical velocity with a bounce
    pub fn bounce(self, vel_y: f32) -> Self {
        Self {
            vel: Vec2::new(self.vel.x, vel_y),
            ..self
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x - self.radius
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.radius
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.radius
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.radius
    }
}

impl Default for Bird {
    fn default() -> Self {
        Self::new()
    }
}

/// Pipe identity, unique across restarts within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PipeId {
    /// Session count at spawn time
    pub session: u32,
    /// Index into the schedule
    pub index: u32,
}

impl fmt::Display for PipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pipe-{}-{}", self.session, self.index)
    }
}

/// A pipe pair with a gap the bird must fly through
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    pub id: PipeId,
    /// Left edge
    pub x: f32,
    /// Gap center (canvas units)
    pub gap_y: f32,
    /// Gap height (canvas units)
    pub gap_height: f32,
    pub width: f32,
    /// Bird has fully cleared this pipe (scored once)
    pub passed: bool,
}

impl Pipe {
    /// Build a pipe at the right edge from a normalized descriptor
    pub fn spawn(id: PipeId, data: &PipeData) -> Self {
        Self {
            id,
            x: CANVAS_WIDTH,
            gap_y: data.gap_y * CANVAS_HEIGHT,
            gap_height: data.gap_height * CANVAS_HEIGHT,
            width: PIPE_WIDTH,
            passed: false,
        }
    }

    #[inline]
    pub fn gap_top(&self) -> f32 {
        self.gap_y - self.gap_height / 2.0
    }

    #[inline]
    pub fn gap_bottom(&self) -> f32 {
        self.gap_y + self.gap_height / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn is_offscreen(&self) -> bool {
        self.right() <= OFFSCREEN_THRESHOLD
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shrink,
    SlowDown,
}

/// A collectible power-up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    /// Center of the square footprint
    pub pos: Vec2,
    /// Set on the tick it is touched; it leaves the state that same tick
    pub collected: bool,
}

impl PowerUp {
    /// Build a power-up at the right edge at the given height
    pub fn spawn(id: u32, kind: PowerUpKind, y: f32) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::new(CANVAS_WIDTH, y),
            collected: false,
        }
    }

    pub fn is_offscreen(&self) -> bool {
        self.pos.x + POWER_UP_SIZE / 2.0 <= 0.0
    }
}

/// Normalized obstacle descriptor from the schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipeData {
    /// Gap center, 0-1 of canvas height
    pub gap_y: f32,
    /// Gap height, 0-1 of canvas height
    pub gap_height: f32,
    /// Absolute spawn time (ms of run time); NaN when malformed
    pub spawn_time: f64,
}

impl PipeData {
    /// Ready to spawn at the given run time (never true for NaN)
    pub fn is_due(&self, game_time: u64) -> bool {
        self.spawn_time <= game_time as f64
    }
}

/// Position trace of one completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameHistory {
    pub bird_positions: Vec<Vec2>,
    /// `State::time` when the run was archived
    pub timestamp: u64,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    // Entities
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub power_ups: Vec<PowerUp>,

    // Flow
    pub game_end: bool,
    pub game_won: bool,
    pub game_started: bool,
    pub is_paused: bool,

    // Timers (ms)
    /// Ticks since process start, advanced whenever the run is live
    pub time: u64,
    /// Simulated time of the current run
    pub game_time: u64,
    /// Remaining resume countdown (0 = none)
    pub countdown: u32,
    /// `time` at which the countdown started
    pub countdown_time: u64,

    // Scoring
    pub score: u32,
    pub lives: u32,

    // Obstacles
    pub pipe_spawn_queue: Vec<PipeData>,
    pub original_pipe_spawn_queue: Vec<PipeData>,
    pub pipe_spawn_index: u32,

    // Replay
    pub game_history: Vec<GameHistory>,
    pub current_run: Vec<Vec2>,
    /// Presentation-only; filled by the stream layer
    pub ghost_birds: Vec<Vec2>,
    /// Sessions started in this process
    pub game_count: u32,

    // Determinism
    pub rng_seed: u32,
    /// Seed every run starts from
    pub session_seed: u32,

    // Power-up effects
    pub shrink_active: bool,
    pub shrink_end_time: u64,
    pub slow_down_active: bool,
    pub slow_down_end_time: u64,
    pub slow_down_multiplier: f32,
    pub power_ups_spawned: u32,
    pub power_ups_collected: u32,

    // Damage cooldown
    pub last_collision_time: Option<u64>,
    /// `None` for boundary hits
    pub last_collision_pipe_id: Option<PipeId>,
}

/// Pipe speed multiplier for a slow-down effect ending at `end_time`
pub fn slow_down_multiplier_at(active: bool, end_time: u64, now: u64) -> f32 {
    if !active || now >= end_time {
        return 1.0;
    }
    let remaining = (end_time - now) as f32 / SLOW_DOWN_DURATION_MS as f32;
    (1.0 - (1.0 - SLOW_DOWN_MIN_MULTIPLIER) * remaining).clamp(SLOW_DOWN_MIN_MULTIPLIER, 1.0)
}

/// The state every session starts from
pub const INITIAL_STATE: State = State {
    bird: Bird::new(),
    pipes: Vec::new(),
    power_ups: Vec::new(),
    game_end: false,
    game_won: false,
    game_started: false,
    is_paused: false,
    time: 0,
    game_time: 0,
    countdown: 0,
    countdown_time: 0,
    score: 0,
    lives: INITIAL_LIVES,
    pipe_spawn_queue: Vec::new(),
    original_pipe_spawn_queue: Vec::new(),
    pipe_spawn_index: 0,
    game_history: Vec::new(),
    current_run: Vec::new(),
    ghost_birds: Vec::new(),
    game_count: 0,
    rng_seed: INITIAL_SEED,
    session_seed: INITIAL_SEED,
    shrink_active: false,
    shrink_end_time: 0,
    slow_down_active: false,
    slow_down_end_time: 0,
    slow_down_multiplier: 1.0,
    power_ups_spawned: 0,
    power_ups_collected: 0,
    last_collision_time: None,
    last_collision_pipe_id: None,
};

impl Default for State {
    fn default() -> Self {
        INITIAL_STATE
    }
}

impl State {
    /// Initial state carrying an obstacle schedule
    pub fn with_schedule(schedule: Vec<PipeData>) -> Self {
        Self {
            pipe_spawn_queue: schedule.clone(),
            original_pipe_spawn_queue: schedule,
            ..INITIAL_STATE
        }
    }

    /// Use a different session seed
    pub fn seeded(self, seed: u32) -> Self {
        Self {
            rng_seed: seed,
            session_seed: seed,
            ..self
        }
    }

    /// Carry history loaded from a previous process
    pub fn with_history(self, game_history: Vec<GameHistory>) -> Self {
        Self {
            game_history,
            ..self
        }
    }

    /// Every scheduled pipe has been spawned
    pub fn schedule_exhausted(&self) -> bool {
        self.pipe_spawn_index as usize >= self.pipe_spawn_queue.len()
    }

    /// Id for the schedule entry at `index` in the current session
    pub fn pipe_id(&self, index: u32) -> PipeId {
        PipeId {
            session: self.game_count,
            index,
        }
    }

    /// Speed multiplier from the slow-down effect at `now`
    ///
    /// Decays linearly from `SLOW_DOWN_MIN_MULTIPLIER` at activation back to
    /// 1.0 at the end time.
    pub fn speed_multiplier_at(&self, now: u64) -> f32 {
        slow_down_multiplier_at(self.slow_down_active, self.slow_down_end_time, now)
    }

    /// Bird radius with the shrink effect at `now`
    pub fn bird_radius_at(&self, now: u64) -> f32 {
        if self.shrink_active && now < self.shrink_end_time {
            BIRD_RADIUS * SHRINK_SCALE
        } else {
            BIRD_RADIUS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravity_from_rest() {
        let bird = Bird::new();
        let next = bird.apply_gravity(BIRD_RADIUS);
        assert_eq!(next.vel.y, GRAVITY);
        assert_eq!(next.pos.y, BIRD_START_Y + GRAVITY);
        assert_eq!(next.pos.x, bird.pos.x);
    }

    #[test]
    fn test_gravity_clamps_to_canvas() {
        let falling = Bird {
            pos: Vec2::new(BIRD_X, CANVAS_HEIGHT - 16.0),
            vel: Vec2::new(0.0, 20.0),
            radius: BIRD_RADIUS,
        };
        assert_eq!(falling.apply_gravity(BIRD_RADIUS).pos.y, CANVAS_HEIGHT - BIRD_RADIUS);

        let rising = Bird {
            pos: Vec2::new(BIRD_X, 16.0),
            vel: Vec2::new(0.0, -20.0),
            radius: BIRD_RADIUS,
        };
        let small = BIRD_RADIUS * SHRINK_SCALE;
        let next = rising.apply_gravity(small);
        assert_eq!(next.pos.y, small);
        assert_eq!(next.radius, small);
    }

    #[test]
    fn test_flap_only_touches_vertical_velocity() {
        let bird = Bird {
            pos: Vec2::new(10.0, 20.0),
            vel: Vec2::new(1.5, 3.0),
            radius: BIRD_RADIUS,
        };
        let flapped = bird.flap();
        assert_eq!(flapped.vel, Vec2::new(1.5, FLAP_VELOCITY));
        assert_eq!(flapped.pos, bird.pos);
    }

    #[test]
    fn test_pipe_spawn_scales_to_canvas() {
        let data = PipeData {
            gap_y: 0.5,
            gap_height: 0.25,
            spawn_time: 0.0,
        };
        let pipe = Pipe::spawn(PipeId { session: 2, index: 7 }, &data);
        assert_eq!(pipe.x, CANVAS_WIDTH);
        assert_eq!(pipe.gap_y, 200.0);
        assert_eq!(pipe.gap_height, 100.0);
        assert_eq!(pipe.gap_top(), 150.0);
        assert_eq!(pipe.gap_bottom(), 250.0);
        assert!(!pipe.passed);
        assert_eq!(pipe.id.to_string(), "pipe-2-7");
    }

    #[test]
    fn test_nan_spawn_time_never_due() {
        let data = PipeData {
            gap_y: 0.5,
            gap_height: 0.3,
            spawn_time: f64::NAN,
        };
        assert!(!data.is_due(u64::MAX));
    }

    #[test]
    fn test_speed_multiplier_decay() {
        let state = State {
            slow_down_active: true,
            slow_down_end_time: 10_000,
            ..INITIAL_STATE
        };
        let start = 10_000 - SLOW_DOWN_DURATION_MS;
        assert!((state.speed_multiplier_at(start) - SLOW_DOWN_MIN_MULTIPLIER).abs() < 1e-6);
        let mid = state.speed_multiplier_at(start + SLOW_DOWN_DURATION_MS / 2);
        assert!(mid > SLOW_DOWN_MIN_MULTIPLIER && mid < 1.0);
        assert_eq!(state.speed_multiplier_at(10_000), 1.0);
        assert_eq!(INITIAL_STATE.speed_multiplier_at(0), 1.0);
    }

    #[test]
    fn test_with_schedule_keeps_copy() {
        let schedule = vec![PipeData {
            gap_y: 0.4,
            gap_height: 0.3,
            spawn_time: 1000.0,
        }];
        let state = State::with_schedule(schedule.clone()).seeded(7);
        assert_eq!(state.pipe_spawn_queue, schedule);
        assert_eq!(state.original_pipe_spawn_queue, schedule);
        assert_eq!(state.rng_seed, 7);
        assert_eq!(state.session_seed, 7);
        assert!(!state.schedule_exhausted());
    }
}
