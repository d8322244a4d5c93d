//! Heads-up display values

use crate::sim::State;

/// What the overlay message should say
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Waiting for the first flap
    Ready,
    Playing,
    Paused,
    /// Resume countdown showing this number
    Countdown(u32),
    Won,
    GameOver,
}

/// HUD snapshot derived from a published state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub lives: u32,
    pub status: Status,
    pub ghosts: usize,
    /// Run number, counting from 1
    pub run: u32,
}

impl Hud {
    pub fn from_state(state: &State) -> Self {
        let status = if state.game_end {
            if state.game_won { Status::Won } else { Status::GameOver }
        } else if !state.game_started {
            Status::Ready
        } else if state.is_paused {
            Status::Paused
        } else if state.countdown > 0 {
            Status::Countdown(state.countdown)
        } else {
            Status::Playing
        };
        Self {
            score: state.score,
            lives: state.lives,
            status,
            ghosts: state.ghost_birds.len(),
            run: state.game_count + 1,
        }
    }

    pub fn message(&self) -> String {
        match self.status {
            Status::Ready => "Press Space to flap".to_string(),
            Status::Playing => format!("Score {}  Lives {}", self.score, self.lives),
            Status::Paused => "Paused".to_string(),
            Status::Countdown(n) => n.to_string(),
            Status::Won => format!("You won! Score {}", self.score),
            Status::GameOver => format!("Game over - score {}", self.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::INITIAL_STATE;

    #[test]
    fn test_status() {
        assert_eq!(Hud::from_state(&INITIAL_STATE).status, Status::Ready);
        let counting = State {
            game_started: true,
            countdown: 2,
            ..INITIAL_STATE
        };
        assert_eq!(Hud::from_state(&counting).status, Status::Countdown(2));
        assert_eq!(Hud::from_state(&counting).message(), "2");
        let over = State {
            game_started: true,
            game_end: true,
            score: 7,
            ..INITIAL_STATE
        };
        assert_eq!(Hud::from_state(&over).message(), "Game over - score 7");
    }
}
