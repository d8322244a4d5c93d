//! Keyboard filtering
//!
//! Only the first press of a bound key produces an action. Auto-repeat events
//! and presses of a key that is already held are dropped until it is released.

use std::collections::HashSet;

use super::InputEvent;
use crate::settings::KeyBindings;
use crate::sim::Action;

#[derive(Debug, Clone, Default)]
pub struct KeyFilter {
    bindings: KeyBindings,
    held: HashSet<String>,
}

impl KeyFilter {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
        }
    }

    /// Map a keyboard event to an action, if it is a first press of a bound key
    pub fn filter(&mut self, event: &InputEvent) -> Option<Action> {
        match event {
            InputEvent::KeyDown { code, repeat } => {
                if *repeat || !self.held.insert(code.clone()) {
                    return None;
                }
                self.bindings.action_for(code)
            }
            InputEvent::KeyUp { code } => {
                self.held.remove(code);
                None
            }
            InputEvent::Tick => None,
        }
    }

    /// Forget held keys (e.g. after focus loss)
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(code: &str, repeat: bool) -> InputEvent {
        InputEvent::KeyDown {
            code: code.into(),
            repeat,
        }
    }

    fn up(code: &str) -> InputEvent {
        InputEvent::KeyUp { code: code.into() }
    }

    #[test]
    fn test_first_press_only() {
        let mut keys = KeyFilter::default();
        assert_eq!(keys.filter(&down("Space", false)), Some(Action::Flap));
        assert_eq!(keys.filter(&down("Space", true)), None);
        // Held without a repeat flag still counts as held
        assert_eq!(keys.filter(&down("Space", false)), None);
        assert_eq!(keys.filter(&up("Space")), None);
        assert_eq!(keys.filter(&down("Space", false)), Some(Action::Flap));
    }

    #[test]
    fn test_unbound_keys_ignored() {
        let mut keys = KeyFilter::default();
        assert_eq!(keys.filter(&down("KeyZ", false)), None);
        assert_eq!(keys.filter(&InputEvent::Tick), None);
    }

    #[test]
    fn test_release_all() {
        let mut keys = KeyFilter::default();
        assert_eq!(keys.filter(&down("KeyP", false)), Some(Action::Pause));
        keys.release_all();
        assert_eq!(keys.filter(&down("KeyP", false)), Some(Action::Pause));
    }
}
