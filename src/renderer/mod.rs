//! Presentation adapter
//!
//! Reads a published `State` and reconciles it onto a drawing surface. The
//! surface owns whatever handles it needs; entities are matched across
//! frames by stable key.

pub mod hud;
pub mod scene;

pub use hud::{Hud, Status};
pub use scene::{EntityKey, Scene, Sprite, SpriteKind, Surface, sprites};
