//! Action-stream composition
//!
//! Timer ticks, filtered key presses and spawn feedback are merged into one
//! ordered action sequence and folded into `State`. Every folded state is
//! published to subscribers with the ghost positions of earlier runs filled in.
//!
//! Processing is single-threaded: one event is handled to completion,
//! including any spawn actions it triggers, before the next is looked at.

pub mod ghost;
pub mod keys;
pub mod spawner;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::mpsc::Receiver;

pub use ghost::{GhostTracker, calculate_ghost_positions, frame_index};
pub use keys::KeyFilter;
pub use spawner::Spawner;

use crate::settings::Settings;
use crate::sim::{Action, State};

/// Raw input from the outside world
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Fixed-rate timer fired
    Tick,
    KeyDown { code: String, repeat: bool },
    KeyUp { code: String },
}

/// Something feeding events into the stream that must stop on disconnect
pub trait Source {
    fn disconnect(&mut self);
}

type Subscriber = Box<dyn FnMut(&State)>;

struct Inner {
    /// Latest published state (ghosts filled in)
    state: State,
    keys: KeyFilter,
    spawner: Spawner,
    ghosts: GhostTracker,
    /// Spawn actions waiting to be folded
    feedback: VecDeque<Action>,
    subscribers: Vec<(u64, Subscriber)>,
    next_subscriber: u64,
    sources: Vec<Box<dyn Source>>,
    torn_down: bool,
}

impl Inner {
    /// Fold one action and everything it feeds back
    fn process(&mut self, action: Action) {
        self.feedback.push_back(action);
        while let Some(action) = self.feedback.pop_front() {
            self.fold(action);
        }
    }

    fn fold(&mut self, action: Action) {
        let prev = std::mem::take(&mut self.state);
        let (was_end, prev_count) = (prev.game_end, prev.game_count);
        let mut next = prev.apply(action);
        log::trace!("{:?} -> t={} game_t={}", action, next.time, next.game_time);

        if next.game_end && !was_end {
            log::info!(
                "Run {} {} with score {}",
                next.game_count,
                if next.game_won { "won" } else { "lost" },
                next.score
            );
        }
        if next.game_count != prev_count {
            log::debug!(
                "Session {} started ({} runs in history)",
                next.game_count,
                next.game_history.len()
            );
        }

        self.feedback.extend(self.spawner.observe(&next));
        next.ghost_birds = self.ghosts.observe(&next).to_vec();
        self.state = next;
        self.publish();
    }

    fn publish(&mut self) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.state);
        }
    }

    fn tear_down(&mut self) {
        for source in self.sources.iter_mut() {
            source.disconnect();
        }
        self.sources.clear();
        self.feedback.clear();
        self.keys.release_all();
        self.torn_down = true;
        log::debug!("State stream disconnected");
    }
}

/// Multicast stream of folded game states
///
/// Subscribers receive the latest state as soon as they subscribe and then
/// every state folded after that. When the last subscription is dropped,
/// attached sources are disconnected.
#[derive(Clone)]
pub struct GameStream {
    inner: Rc<RefCell<Inner>>,
}

impl GameStream {
    /// Start a stream from `initial`, applying spawns already due
    pub fn new(initial: State, settings: &Settings) -> Self {
        let mut inner = Inner {
            state: State::default(),
            keys: KeyFilter::new(settings.key_bindings.clone()),
            spawner: Spawner::new(),
            ghosts: GhostTracker::new(settings.ghosts),
            feedback: VecDeque::new(),
            subscribers: Vec::new(),
            next_subscriber: 0,
            sources: Vec::new(),
            torn_down: false,
        };
        let mut state = initial;
        inner.feedback.extend(inner.spawner.observe(&state));
        state.ghost_birds = inner.ghosts.observe(&state).to_vec();
        inner.state = state;
        while let Some(action) = inner.feedback.pop_front() {
            inner.fold(action);
        }
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Tie a source's lifetime to this stream
    pub fn attach(&self, source: impl Source + 'static) {
        let mut inner = self.inner.borrow_mut();
        if inner.torn_down {
            let mut source = source;
            source.disconnect();
            return;
        }
        inner.sources.push(Box::new(source));
    }

    /// Subscribe to folded states
    ///
    /// The callback runs immediately with the latest state; that first call
    /// may read the stream. Later calls happen while a fold is in progress and
    /// must not call back into the stream; feed input through the event
    /// channel instead.
    pub fn subscribe(&self, mut subscriber: impl FnMut(&State) + 'static) -> Subscription {
        let latest = self.latest();
        subscriber(&latest);
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_subscriber;
        inner.next_subscriber += 1;
        inner.subscribers.push((id, Box::new(subscriber)));
        Subscription {
            inner: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Clone of the latest published state
    pub fn latest(&self) -> State {
        self.inner.borrow().state.clone()
    }

    /// Run `f` against the latest state without cloning it
    pub fn with_latest<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.inner.borrow().state)
    }

    /// Stream was disconnected by its last subscriber
    pub fn is_torn_down(&self) -> bool {
        self.inner.borrow().torn_down
    }

    /// Fold an action (and any spawns it triggers)
    pub fn dispatch(&self, action: Action) {
        let mut inner = self.inner.borrow_mut();
        if inner.torn_down {
            return;
        }
        inner.process(action);
    }

    /// Handle a raw input event
    pub fn handle(&self, event: InputEvent) {
        let action = match event {
            InputEvent::Tick => Some(Action::Tick),
            ref key => self.inner.borrow_mut().keys.filter(key),
        };
        if let Some(action) = action {
            self.dispatch(action);
        }
    }

    /// Drain the merged event channel in arrival order
    ///
    /// Returns when every sender is gone, the stream is torn down, or `stop`
    /// holds for a published state.
    pub fn run(&self, events: &Receiver<InputEvent>, stop: impl Fn(&State) -> bool) {
        if self.with_latest(&stop) {
            return;
        }
        while let Ok(event) = events.recv() {
            self.handle(event);
            if self.is_torn_down() || self.with_latest(&stop) {
                break;
            }
        }
    }

    /// Drive the stream without a clock
    ///
    /// Each step handles every queued event, then one tick. `stop` is checked
    /// after every handled event, so inputs queued behind a stopping state are
    /// left unprocessed. Returns `true` once `stop` holds and `false` if the
    /// stream is torn down or `max_ticks` runs out first.
    pub fn run_unclocked(
        &self,
        events: &Receiver<InputEvent>,
        stop: impl Fn(&State) -> bool,
        max_ticks: u64,
    ) -> bool {
        let step = |event: InputEvent| -> Option<bool> {
            self.handle(event);
            if self.is_torn_down() {
                Some(false)
            } else if self.with_latest(&stop) {
                Some(true)
            } else {
                None
            }
        };

        if self.with_latest(&stop) {
            return true;
        }
        for _ in 0..max_ticks {
            while let Ok(event) = events.try_recv() {
                if let Some(done) = step(event) {
                    return done;
                }
            }
            if let Some(done) = step(InputEvent::Tick) {
                return done;
            }
        }
        log::warn!("Stopped after {} ticks without finishing", max_ticks);
        false
    }
}

/// Keeps a subscriber attached; dropping it unsubscribes
pub struct Subscription {
    inner: Weak<RefCell<Inner>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut inner = inner.borrow_mut();
        inner.subscribers.retain(|(id, _)| *id != self.id);
        if inner.subscribers.is_empty() {
            inner.tear_down();
        }
    }
}
