//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick only
//! - In-state seeded RNG only
//! - Stable iteration order (spawn order)
//! - No I/O, logging, rendering or platform dependencies

pub mod collision;
pub mod rng;
pub mod state;
pub mod tick;

pub use collision::{Contact, bird_pipe_collision, bird_power_up_collision, boundary_collision, detect_contact};
pub use rng::{Draw, random_between};
pub use state::{
    Bird, GameHistory, INITIAL_STATE, Pipe, PipeData, PipeId, PowerUp, PowerUpKind, State,
};
pub use tick::{Action, flap, pause, restart, spawn_pipe, tick};
