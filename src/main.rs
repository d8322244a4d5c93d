//! Ghost Flap entry point
//!
//! Headless bootstrap: loads settings, the obstacle schedule and run history,
//! then drives the state stream with an autopilot at full speed or in real
//! time. Presentation goes to the log.

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::mpsc::{self, Sender};

use clap::Parser;

use ghost_flap::consts::*;
use ghost_flap::persistence;
use ghost_flap::platform::IntervalTimer;
use ghost_flap::renderer::{Hud, Scene, Sprite, Surface};
use ghost_flap::sim::{self, State};
use ghost_flap::{GameStream, InputEvent, Settings, generate_schedule, load_schedule};

/// Ticks a headless session may take (ten minutes of game time)
const MAX_HEADLESS_TICKS: u64 = 10 * 60 * 1000 / TICK_RATE_MS;

/// Headless Ghost Flap driven by an autopilot
#[derive(Parser, Debug)]
#[command(name = "ghost-flap")]
struct Cli {
    /// Settings file (defaults are used if it is missing)
    #[arg(long, default_value = "ghost-flap.json")]
    settings: PathBuf,
    /// Obstacle schedule CSV, overriding the settings file
    #[arg(long)]
    schedule: Option<PathBuf>,
    /// Runs to play before exiting
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    runs: u32,
    /// Tick at the real simulation rate instead of as fast as possible
    #[arg(long)]
    realtime: bool,
}

/// Surface that only counts handles and traces changes
#[derive(Default)]
struct LogSurface {
    live: usize,
}

impl Surface for LogSurface {
    type Handle = Sprite;

    fn create(&mut self, sprite: &Sprite) -> Sprite {
        self.live += 1;
        log::trace!("+ {:?} at {} ({} live)", sprite.kind, sprite.origin, self.live);
        *sprite
    }

    fn update(&mut self, handle: &mut Sprite, sprite: &Sprite) {
        *handle = *sprite;
    }

    fn destroy(&mut self, handle: Sprite) {
        self.live -= 1;
        log::trace!("- {:?} ({} live)", handle.kind, self.live);
    }
}

/// Flaps toward the next gap; starts and restarts runs
struct Autopilot {
    events: Sender<InputEvent>,
}

impl Autopilot {
    fn press(&self, code: &str) {
        let _ = self.events.send(InputEvent::KeyDown {
            code: code.to_string(),
            repeat: false,
        });
        let _ = self.events.send(InputEvent::KeyUp {
            code: code.to_string(),
        });
    }

    fn observe(&self, state: &State) {
        if state.game_end || !state.game_started {
            self.press("Space");
            return;
        }
        if state.is_paused || state.countdown > 0 {
            return;
        }
        let target = state
            .pipes
            .iter()
            .find(|p| p.right() + state.bird.radius > state.bird.pos.x)
            .map(|p| p.gap_y + p.gap_height * 0.15)
            .unwrap_or(CANVAS_HEIGHT / 2.0);
        if state.bird.pos.y > target && state.bird.vel.y >= 0.0 {
            self.press("Space");
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Ghost Flap (headless) starting...");

    let cli = Cli::parse();
    let settings = Settings::load_or_default(&cli.settings);

    let schedule = match cli.schedule.as_ref().or(settings.schedule_path.as_ref()) {
        Some(path) => match load_schedule(path) {
            Ok(schedule) => schedule,
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            log::info!("No schedule file; generating one from seed {}", settings.seed);
            generate_schedule(settings.seed as u64, 30, 1.6)
        }
    };

    let history = settings
        .history_path
        .as_ref()
        .map(persistence::load_history_or_empty)
        .unwrap_or_default();

    let initial = State::with_schedule(schedule)
        .seeded(settings.seed)
        .with_history(history);
    let stream = GameStream::new(initial, &settings);
    let (tx, rx) = mpsc::channel();

    let pilot = Autopilot { events: tx.clone() };
    let pilot_sub = stream.subscribe(move |state| pilot.observe(state));

    let mut scene = Scene::new(LogSurface::default());
    let last_hud = Rc::new(RefCell::new(None::<Hud>));
    let hud_seen = last_hud.clone();
    let scene_sub = stream.subscribe(move |state| {
        scene.reconcile(state);
        let hud = Hud::from_state(state);
        let mut last = hud_seen.borrow_mut();
        if last.map(|h| h.status) != Some(hud.status) {
            log::info!("[run {}] {} ({} ghosts)", hud.run, hud.message(), hud.ghosts);
        }
        *last = Some(hud);
    });

    let runs = cli.runs;
    let done = move |state: &State| state.game_end && state.game_count + 1 >= runs;

    if cli.realtime {
        stream.attach(IntervalTimer::start(tx));
        stream.run(&rx, done);
    } else {
        drop(tx);
        stream.run_unclocked(&rx, done, MAX_HEADLESS_TICKS);
    }

    let final_state = sim::restart(stream.latest());
    drop(pilot_sub);
    drop(scene_sub);

    if let Some(hud) = *last_hud.borrow() {
        log::info!("Finished after {} run(s), last score {}", hud.run, hud.score);
    }

    if let Some(path) = &settings.history_path {
        if let Err(e) = persistence::save_history(path, &final_state.game_history) {
            log::warn!("Could not save history: {}", e);
        }
    }

    ExitCode::SUCCESS
}
