//! State transitions
//!
//! Every action is a pure `State -> State` function. The old state is
//! consumed and a complete replacement is returned; stages build fresh
//! vectors instead of editing entities in place.

use glam::Vec2;

use super::collision::{Contact, bird_power_up_collision, detect_contact};
use super::rng;
use super::state::{
    Bird, GameHistory, INITIAL_STATE, Pipe, PipeData, PipeId, PowerUp, PowerUpKind, State,
    slow_down_multiplier_at,
};
use crate::consts::*;

/// Discrete inputs to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Advance the simulation one fixed step
    Tick,
    /// Flap (also starts and restarts runs)
    Flap,
    /// Toggle pause; resuming goes through a countdown
    Pause,
    /// Archive the run and start over
    Restart,
    /// Bring the next scheduled pipe on screen
    SpawnPipe { id: PipeId, data: PipeData },
}

impl Action {
    /// Apply this action to `state`
    pub fn apply(self, state: State) -> State {
        match self {
            Action::Tick => tick(state),
            Action::Flap => flap(state),
            Action::Pause => pause(state),
            Action::Restart => restart(state),
            Action::SpawnPipe { id, data } => spawn_pipe(state, id, &data),
        }
    }
}

impl State {
    /// Apply an action, returning the next state
    pub fn apply(self, action: Action) -> State {
        action.apply(self)
    }
}

/// Pipes after one tick of movement and scoring
struct PipeStage {
    pipes: Vec<Pipe>,
    newly_passed: u32,
}

fn move_pipes(pipes: &[Pipe], bird: &Bird, speed_multiplier: f32) -> PipeStage {
    let moved: Vec<Pipe> = pipes
        .iter()
        .map(|p| Pipe {
            x: p.x - PIPE_SPEED * speed_multiplier,
            ..*p
        })
        .filter(|p| !p.is_offscreen())
        .collect();

    let newly_passed = moved
        .iter()
        .filter(|p| !p.passed && bird.pos.x > p.right())
        .count() as u32;

    let pipes = moved
        .into_iter()
        .map(|p| Pipe {
            passed: p.passed || bird.pos.x > p.right(),
            ..p
        })
        .collect();

    PipeStage {
        pipes,
        newly_passed,
    }
}

/// Power-ups after one tick of movement and collection
struct PowerUpStage {
    power_ups: Vec<PowerUp>,
    collected: Vec<PowerUpKind>,
}

fn move_power_ups(power_ups: &[PowerUp], bird: &Bird) -> PowerUpStage {
    let touched: Vec<PowerUp> = power_ups
        .iter()
        .map(|p| PowerUp {
            pos: Vec2::new(p.pos.x - POWER_UP_SPEED, p.pos.y),
            ..*p
        })
        .filter(|p| !p.is_offscreen())
        .map(|p| PowerUp {
            collected: p.collected || bird_power_up_collision(bird, &p),
            ..p
        })
        .collect();

    let collected = touched
        .iter()
        .filter(|p| p.collected)
        .map(|p| p.kind)
        .collect();

    PowerUpStage {
        power_ups: touched.into_iter().filter(|p| !p.collected).collect(),
        collected,
    }
}

/// One timed effect after this tick's collections
#[derive(Debug, Clone, Copy)]
struct Effect {
    active: bool,
    end_time: u64,
}

fn refresh_effect(was_active: bool, end_time: u64, collected: bool, now: u64, duration: u64) -> Effect {
    if collected {
        Effect {
            active: true,
            end_time: now + duration,
        }
    } else {
        Effect {
            active: was_active && now < end_time,
            end_time,
        }
    }
}

/// Spawn a power-up at a random mid-canvas height unless one of that kind is out
fn spawn_power_up(power_ups: Vec<PowerUp>, kind: PowerUpKind, seed: u32, id: u32) -> (Vec<PowerUp>, u32, u32) {
    if power_ups.iter().any(|p| p.kind == kind) {
        return (power_ups, seed, id);
    }
    let draw = rng::random_between(seed, CANVAS_HEIGHT / 3.0, CANVAS_HEIGHT * 2.0 / 3.0);
    let power_ups = power_ups
        .into_iter()
        .chain(std::iter::once(PowerUp::spawn(id, kind, draw.value)))
        .collect();
    (power_ups, draw.next_seed, id + 1)
}

/// Damage passes the cooldown gate
fn is_damage(state: &State, contact: &Contact, now: u64) -> bool {
    match state.last_collision_time {
        None => true,
        Some(last) => {
            now.saturating_sub(last) >= COLLISION_COOLDOWN_MS
                || contact.pipe_id() != state.last_collision_pipe_id
        }
    }
}

/// Advance one fixed step
pub fn tick(state: State) -> State {
    if state.game_end || !state.game_started || state.is_paused {
        return state;
    }

    let time = state.time + TICK_RATE_MS;

    if state.countdown > 0 {
        let elapsed_steps = (time.saturating_sub(state.countdown_time) / COUNTDOWN_DURATION_MS) as u32;
        return State {
            time,
            countdown: COUNTDOWN_START.saturating_sub(elapsed_steps),
            ..state
        };
    }

    let prev_game_time = state.game_time;
    let game_time = prev_game_time + TICK_RATE_MS;

    // Physics
    let speed_multiplier = state.speed_multiplier_at(game_time);
    let radius = state.bird_radius_at(game_time);
    let bird = state.bird.apply_gravity(radius);

    // Obstacles and scoring
    let PipeStage {
        pipes,
        newly_passed,
    } = move_pipes(&state.pipes, &bird, speed_multiplier);
    let score = state.score + newly_passed;

    // Power-ups
    let PowerUpStage {
        power_ups,
        collected,
    } = move_power_ups(&state.power_ups, &bird);
    let got_shrink = collected.contains(&PowerUpKind::Shrink);
    let got_slow_down = collected.contains(&PowerUpKind::SlowDown);

    // Effects
    let shrink = refresh_effect(
        state.shrink_active,
        state.shrink_end_time,
        got_shrink,
        game_time,
        SHRINK_DURATION_MS,
    );
    let slow_down = refresh_effect(
        state.slow_down_active,
        state.slow_down_end_time,
        got_slow_down,
        game_time,
        SLOW_DOWN_DURATION_MS,
    );
    let slow_down_multiplier = slow_down_multiplier_at(slow_down.active, slow_down.end_time, game_time);

    // Collisions
    let contact = detect_contact(&bird, &pipes);
    let damage = contact.is_some_and(|c| is_damage(&state, &c, game_time));

    // Replay trace
    let mut current_run = state.current_run;
    current_run.push(bird.pos);

    // Victory
    let won = state.pipe_spawn_index as usize >= state.pipe_spawn_queue.len() && pipes.is_empty();

    // Power-up spawns
    let crossed = |mark: u64| prev_game_time < mark && game_time >= mark;
    let (power_ups, seed, spawned) = (power_ups, state.rng_seed, state.power_ups_spawned);
    let (power_ups, seed, spawned) = if crossed(SHRINK_SPAWN_TIME_MS) {
        spawn_power_up(power_ups, PowerUpKind::Shrink, seed, spawned)
    } else {
        (power_ups, seed, spawned)
    };
    let (power_ups, seed, spawned) = if crossed(SLOW_DOWN_SPAWN_TIME_MS) {
        spawn_power_up(power_ups, PowerUpKind::SlowDown, seed, spawned)
    } else {
        (power_ups, seed, spawned)
    };

    let base = State {
        bird,
        pipes,
        power_ups,
        time,
        game_time,
        score,
        current_run,
        game_end: won,
        game_won: won,
        rng_seed: seed,
        shrink_active: shrink.active,
        shrink_end_time: shrink.end_time,
        slow_down_active: slow_down.active,
        slow_down_end_time: slow_down.end_time,
        slow_down_multiplier,
        power_ups_spawned: spawned,
        power_ups_collected: state.power_ups_collected + collected.len() as u32,
        ..state
    };

    let Some(contact) = contact else {
        return base;
    };

    let draw = rng::random_between(base.rng_seed, BOUNCE_MIN, BOUNCE_MAX);
    let bird = base.bird.bounce(draw.value * contact.bounce_sign());

    if !damage {
        return State {
            bird,
            rng_seed: draw.next_seed,
            ..base
        };
    }

    let lives = base.lives.saturating_sub(1);
    let lost = lives == 0;
    State {
        bird,
        rng_seed: draw.next_seed,
        lives,
        game_end: base.game_end || lost,
        game_won: base.game_won && !lost,
        last_collision_time: Some(game_time),
        last_collision_pipe_id: contact.pipe_id(),
        ..base
    }
}

/// Flap; starts a fresh run or restarts an ended one
pub fn flap(state: State) -> State {
    if state.game_end {
        return restart(state);
    }
    if state.is_paused {
        return state;
    }
    if !state.game_started {
        return State {
            game_started: true,
            game_time: 0,
            bird: state.bird.flap(),
            ..state
        };
    }
    State {
        bird: state.bird.flap(),
        ..state
    }
}

/// Toggle pause; unpausing arms the resume countdown
pub fn pause(state: State) -> State {
    if !state.game_started || state.game_end {
        return state;
    }
    if state.is_paused {
        State {
            is_paused: false,
            countdown: COUNTDOWN_START,
            countdown_time: state.time,
            ..state
        }
    } else {
        State {
            is_paused: true,
            countdown: 0,
            ..state
        }
    }
}

/// Archive the run and reset to the initial shape
///
/// The schedule, history, session seed and session count carry over.
pub fn restart(state: State) -> State {
    let mut game_history = state.game_history;
    if !state.current_run.is_empty() {
        game_history.push(GameHistory {
            bird_positions: state.current_run,
            timestamp: state.time,
        });
    }
    State {
        pipe_spawn_queue: state.original_pipe_spawn_queue.clone(),
        original_pipe_spawn_queue: state.original_pipe_spawn_queue,
        game_history,
        game_count: state.game_count + 1,
        rng_seed: state.session_seed,
        session_seed: state.session_seed,
        ..INITIAL_STATE
    }
}

/// Append one pipe at the right edge and consume a schedule slot
pub fn spawn_pipe(state: State, id: PipeId, data: &PipeData) -> State {
    let pipes = state
        .pipes
        .iter()
        .copied()
        .chain(std::iter::once(Pipe::spawn(id, data)))
        .collect();
    State {
        pipes,
        pipe_spawn_index: state.pipe_spawn_index + 1,
        ..state
    }
}
