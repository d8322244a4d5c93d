//! Ghost Flap - A side-scrolling pipe dodger with replay ghosts
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state, actions)
//! - `stream`: Composition of timer/keyboard/spawn inputs into the state stream
//! - `schedule`: Obstacle schedule parsing and generation
//! - `renderer`: Presentation adapter (entity reconciliation over a surface)
//! - `platform`: Real input sources (interval timer)
//! - `persistence`: Save/load of run history for ghosts

pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod schedule;
pub mod settings;
pub mod sim;
pub mod stream;

pub use schedule::{ScheduleError, generate_schedule, load_schedule, parse_schedule};
pub use settings::{KeyBindings, Settings, SettingsError};
pub use sim::{Action, INITIAL_STATE, State};
pub use stream::{GameStream, InputEvent, Subscription};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick (ms); shared by the engine and the timer source
    pub const TICK_RATE_MS: u64 = 20;

    /// Canvas dimensions (y grows downward)
    pub const CANVAS_WIDTH: f32 = 600.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;

    /// Bird defaults
    pub const BIRD_X: f32 = CANVAS_WIDTH * 0.3;
    pub const BIRD_START_Y: f32 = CANVAS_HEIGHT / 2.0;
    pub const BIRD_RADIUS: f32 = 15.0;
    /// Downward acceleration per tick
    pub const GRAVITY: f32 = 0.5;
    /// Vertical velocity set by a flap (negative = up)
    pub const FLAP_VELOCITY: f32 = -7.0;

    /// Pipe defaults
    pub const PIPE_WIDTH: f32 = 50.0;
    /// Leftward pipe movement per tick at full speed
    pub const PIPE_SPEED: f32 = 3.0;
    /// Pipes whose right edge reaches this x are dropped
    pub const OFFSCREEN_THRESHOLD: f32 = 0.0;

    /// Power-up footprint (square side) and leftward speed per tick
    pub const POWER_UP_SIZE: f32 = 24.0;
    pub const POWER_UP_SPEED: f32 = 2.0;

    /// Shrink effect
    pub const SHRINK_SCALE: f32 = 0.6;
    pub const SHRINK_DURATION_MS: u64 = 5000;
    pub const SHRINK_SPAWN_TIME_MS: u64 = 10_000;

    /// Slow-down effect
    pub const SLOW_DOWN_MIN_MULTIPLIER: f32 = 0.5;
    pub const SLOW_DOWN_DURATION_MS: u64 = 5000;
    pub const SLOW_DOWN_SPAWN_TIME_MS: u64 = 20_000;

    /// Minimum gap between two damaging hits on the same obstacle
    pub const COLLISION_COOLDOWN_MS: u64 = 500;
    /// Bounce speed range drawn from the RNG on physical contact
    pub const BOUNCE_MIN: f32 = 4.0;
    pub const BOUNCE_MAX: f32 = 8.0;

    pub const INITIAL_LIVES: u32 = 3;

    /// Resume countdown
    pub const COUNTDOWN_START: u32 = 3;
    pub const COUNTDOWN_DURATION_MS: u64 = 1000;

    /// Default seed for the in-state RNG
    pub const INITIAL_SEED: u32 = 42;
}
