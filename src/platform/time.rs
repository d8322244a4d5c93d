//! Fixed-rate tick source

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::consts::TICK_RATE_MS;
use crate::stream::{InputEvent, Source};

/// Emits `InputEvent::Tick` at a fixed period on a background thread
///
/// Ticks are scheduled against absolute deadlines so a late wake-up does not
/// shift every following tick.
pub struct IntervalTimer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl IntervalTimer {
    /// Start ticking at the simulation rate
    pub fn start(events: Sender<InputEvent>) -> Self {
        Self::with_period(Duration::from_millis(TICK_RATE_MS), events)
    }

    pub fn with_period(period: Duration, events: Sender<InputEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = std::thread::spawn(move || {
            let mut deadline = Instant::now() + period;
            while !flag.load(Ordering::Relaxed) {
                let now = Instant::now();
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
                if flag.load(Ordering::Relaxed) || events.send(InputEvent::Tick).is_err() {
                    break;
                }
                deadline += period;
            }
            log::debug!("Interval timer stopped");
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Source for IntervalTimer {
    fn disconnect(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            join_logged(handle);
        }
    }
}

/// Join a timer thread, reporting whether it exited cleanly
fn join_logged(handle: JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            log::warn!("Interval timer thread panicked");
            false
        }
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_timer_ticks_then_stops() {
        let (tx, rx) = channel();
        let mut timer = IntervalTimer::with_period(Duration::from_millis(1), tx);
        for _ in 0..3 {
            assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(InputEvent::Tick));
        }
        timer.disconnect();
        assert!(!timer.is_running());
        // Drain anything sent before the stop flag was seen; then the channel closes
        while rx.recv_timeout(Duration::from_secs(5)).is_ok() {}
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_panicked_thread_is_reported() {
        let handle = std::thread::spawn(|| panic!("tick source failed"));
        assert!(!join_logged(handle));
        assert!(join_logged(std::thread::spawn(|| {})));
    }

    #[test]
    fn test_disconnect_survives_dead_receiver() {
        let (tx, rx) = channel();
        let mut timer = IntervalTimer::with_period(Duration::from_millis(1), tx);
        drop(rx);
        // Thread exits on the failed send; joining it must not panic here
        timer.disconnect();
        assert!(!timer.is_running());
        timer.disconnect();
    }
}
