//! Collision detection and bounce classification
//!
//! Everything is axis-aligned: the bird is treated as its bounding box
//! against pipes and power-ups, and as a center point against the canvas
//! edges.

use super::state::{Bird, Pipe, PipeId, PowerUp};
use crate::consts::{CANVAS_HEIGHT, POWER_UP_SIZE};

/// What the bird physically struck this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Top canvas edge
    Ceiling,
    /// Bottom canvas edge
    Floor,
    /// Pipe above the gap center
    PipeUpper(PipeId),
    /// Pipe below the gap center
    PipeLower(PipeId),
}

impl Contact {
    /// Direction of the bounce: +1 pushes down, -1 pushes up
    pub fn bounce_sign(&self) -> f32 {
        match self {
            Contact::Ceiling | Contact::PipeUpper(_) => 1.0,
            Contact::Floor | Contact::PipeLower(_) => -1.0,
        }
    }

    /// Pipe involved, if any (boundary hits have none)
    pub fn pipe_id(&self) -> Option<PipeId> {
        match self {
            Contact::PipeUpper(id) | Contact::PipeLower(id) => Some(*id),
            Contact::Ceiling | Contact::Floor => None,
        }
    }
}

/// Bird overlaps the pipe's column and leaves its gap
pub fn bird_pipe_collision(bird: &Bird, pipe: &Pipe) -> bool {
    let overlaps_column = bird.right() > pipe.x && bird.left() < pipe.right();
    overlaps_column && (bird.top() < pipe.gap_top() || bird.bottom() > pipe.gap_bottom())
}

/// Bird's box overlaps the power-up's square
pub fn bird_power_up_collision(bird: &Bird, power_up: &PowerUp) -> bool {
    let half = POWER_UP_SIZE / 2.0;
    bird.right() > power_up.pos.x - half
        && bird.left() < power_up.pos.x + half
        && bird.bottom() > power_up.pos.y - half
        && bird.top() < power_up.pos.y + half
}

/// Bird center within one radius of the top edge
pub fn hits_ceiling(bird: &Bird) -> bool {
    bird.pos.y <= bird.radius
}

/// Bird center within one radius of the bottom edge
pub fn hits_floor(bird: &Bird) -> bool {
    bird.pos.y >= CANVAS_HEIGHT - bird.radius
}

/// Bird touching either canvas edge
pub fn boundary_collision(bird: &Bird) -> bool {
    hits_ceiling(bird) || hits_floor(bird)
}

/// First physical contact this tick
///
/// Pipes are checked in order before the canvas edges, so a bird wedged
/// between a pipe and the floor reports the pipe.
pub fn detect_contact(bird: &Bird, pipes: &[Pipe]) -> Option<Contact> {
    if let Some(pipe) = pipes.iter().find(|p| bird_pipe_collision(bird, p)) {
        return Some(if bird.pos.y < pipe.gap_y {
            Contact::PipeUpper(pipe.id)
        } else {
            Contact::PipeLower(pipe.id)
        });
    }
    if hits_ceiling(bird) {
        Some(Contact::Ceiling)
    } else if hits_floor(bird) {
        Some(Contact::Floor)
    } else {
        None
    }
}
