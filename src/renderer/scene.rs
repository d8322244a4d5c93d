//! Entity reconciliation

use std::collections::BTreeMap;

use glam::Vec2;

use crate::consts::{CANVAS_HEIGHT, POWER_UP_SIZE};
use crate::sim::{PipeId, PowerUpKind, State};

/// Stable identity of something on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Bird,
    Pipe(PipeId),
    PowerUp(u32),
    /// Ghost slot (order within the ghost list)
    Ghost(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteKind {
    Bird,
    /// Solid part of a pipe above the gap
    PipeTop,
    /// Solid part of a pipe below the gap
    PipeBottom,
    PowerUp(PowerUpKind),
    Ghost,
}

/// Axis-aligned drawable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    /// Top-left corner
    pub origin: Vec2,
    pub size: Vec2,
}

/// A drawing target holding one handle per live sprite
pub trait Surface {
    type Handle;

    fn create(&mut self, sprite: &Sprite) -> Self::Handle;
    fn update(&mut self, handle: &mut Self::Handle, sprite: &Sprite);
    fn destroy(&mut self, handle: Self::Handle);
}

/// Sprites for one frame, keyed by entity
///
/// A pipe yields two sprites (above and below its gap) under the same key.
pub fn sprites(state: &State) -> Vec<(EntityKey, Sprite)> {
    let bird = state.bird;
    let mut out = vec![(
        EntityKey::Bird,
        Sprite {
            kind: SpriteKind::Bird,
            origin: bird.pos - Vec2::splat(bird.radius),
            size: Vec2::splat(bird.radius * 2.0),
        },
    )];

    for pipe in &state.pipes {
        let key = EntityKey::Pipe(pipe.id);
        out.push((
            key,
            Sprite {
                kind: SpriteKind::PipeTop,
                origin: Vec2::new(pipe.x, 0.0),
                size: Vec2::new(pipe.width, pipe.gap_top().max(0.0)),
            },
        ));
        out.push((
            key,
            Sprite {
                kind: SpriteKind::PipeBottom,
                origin: Vec2::new(pipe.x, pipe.gap_bottom()),
                size: Vec2::new(pipe.width, (CANVAS_HEIGHT - pipe.gap_bottom()).max(0.0)),
            },
        ));
    }

    for power_up in &state.power_ups {
        out.push((
            EntityKey::PowerUp(power_up.id),
            Sprite {
                kind: SpriteKind::PowerUp(power_up.kind),
                origin: power_up.pos - Vec2::splat(POWER_UP_SIZE / 2.0),
                size: Vec2::splat(POWER_UP_SIZE),
            },
        ));
    }

    for (slot, ghost) in state.ghost_birds.iter().enumerate() {
        out.push((
            EntityKey::Ghost(slot),
            Sprite {
                kind: SpriteKind::Ghost,
                origin: *ghost - Vec2::splat(bird.radius),
                size: Vec2::splat(bird.radius * 2.0),
            },
        ));
    }

    out
}

/// Owns surface handles across frames
///
/// Handles are created the first time a sprite appears, updated while it
/// stays, and destroyed the first frame it is gone.
pub struct Scene<S: Surface> {
    surface: S,
    handles: BTreeMap<(EntityKey, u8), S::Handle>,
}

impl<S: Surface> Scene<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            handles: BTreeMap::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Bring the surface in line with `state`
    pub fn reconcile(&mut self, state: &State) {
        let mut next = BTreeMap::new();
        let mut part = BTreeMap::<EntityKey, u8>::new();

        for (key, sprite) in sprites(state) {
            let n = part.entry(key).or_insert(0);
            let slot = (key, *n);
            *n += 1;

            let handle = match self.handles.remove(&slot) {
                Some(mut handle) => {
                    self.surface.update(&mut handle, &sprite);
                    handle
                }
                None => self.surface.create(&sprite),
            };
            next.insert(slot, handle);
        }

        for (_, handle) in std::mem::replace(&mut self.handles, next) {
            self.surface.destroy(handle);
        }
    }

    /// Destroy every handle
    pub fn clear(&mut self) {
        for (_, handle) in std::mem::take(&mut self.handles) {
            self.surface.destroy(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Pipe, PowerUp};

    #[derive(Default)]
    struct Counting {
        created: usize,
        updated: usize,
        destroyed: usize,
        next: u32,
    }

    impl Surface for Counting {
        type Handle = u32;

        fn create(&mut self, _sprite: &Sprite) -> u32 {
            self.created += 1;
            self.next += 1;
            self.next
        }

        fn update(&mut self, _handle: &mut u32, _sprite: &Sprite) {
            self.updated += 1;
        }

        fn destroy(&mut self, _handle: u32) {
            self.destroyed += 1;
        }
    }

    fn pipe(index: u32) -> Pipe {
        Pipe::spawn(
            PipeId { session: 0, index },
            &crate::sim::PipeData {
                gap_y: 0.5,
                gap_height: 0.3,
                spawn_time: 0.0,
            },
        )
    }

    #[test]
    fn test_pipe_sprites_frame_gap() {
        let state = State {
            pipes: vec![pipe(0)],
            ..State::default()
        };
        let sprites = sprites(&state);
        assert_eq!(sprites.len(), 3);
        let (_, top) = sprites[1];
        let (_, bottom) = sprites[2];
        assert_eq!(top.size.y, 140.0);
        assert_eq!(bottom.origin.y, 260.0);
        assert_eq!(bottom.size.y, 140.0);
    }

    #[test]
    fn test_create_update_destroy() {
        let mut scene = Scene::new(Counting::default());
        let first = State {
            pipes: vec![pipe(0)],
            power_ups: vec![PowerUp::spawn(0, PowerUpKind::Shrink, 200.0)],
            ..State::default()
        };
        scene.reconcile(&first);
        assert_eq!(scene.surface().created, 4);
        assert_eq!(scene.len(), 4);

        let second = State {
            pipes: vec![pipe(0), pipe(1)],
            ..State::default()
        };
        scene.reconcile(&second);
        let surface = scene.surface();
        assert_eq!(surface.created, 6);
        assert_eq!(surface.updated, 3);
        assert_eq!(surface.destroyed, 1);
        assert_eq!(scene.len(), 5);

        scene.clear();
        assert!(scene.is_empty());
        assert_eq!(scene.surface().destroyed, 6);
    }
}
