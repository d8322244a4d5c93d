//! Obstacle schedule
//!
//! A schedule is a comma-separated table with a header row and rows of
//! `gap_center, gap_height, spawn_time_seconds`. Gap values stay normalized
//! (0-1) and are scaled to canvas units when a pipe spawns.

use std::path::Path;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::sim::PipeData;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to read schedule {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Parse one numeric field; anything unparsable becomes NaN
fn field<T: FromStr + Float>(value: Option<&str>) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or_else(T::nan)
}

/// Float types a schedule field can parse into
trait Float {
    fn nan() -> Self;
}

impl Float for f32 {
    fn nan() -> Self {
        f32::NAN
    }
}

impl Float for f64 {
    fn nan() -> Self {
        f64::NAN
    }
}

/// Parse schedule text into spawn descriptors
///
/// The first line is a header and is skipped, as are blank lines. Malformed
/// numbers are not rejected: they come through as NaN, and a NaN spawn time
/// is never due.
pub fn parse_schedule(text: &str) -> Vec<PipeData> {
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut cols = line.split(',');
            let gap_y = field::<f32>(cols.next());
            let gap_height = field::<f32>(cols.next());
            let spawn_secs = field::<f64>(cols.next());
            PipeData {
                gap_y,
                gap_height,
                spawn_time: spawn_secs * 1000.0,
            }
        })
        .collect()
}

/// Read and parse a schedule file
pub fn load_schedule(path: impl AsRef<Path>) -> Result<Vec<PipeData>, ScheduleError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ScheduleError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let schedule = parse_schedule(&text);
    log::info!("Loaded {} pipes from {}", schedule.len(), path.display());
    if schedule.iter().any(|p| p.spawn_time.is_nan()) {
        log::warn!("Schedule {} has malformed spawn times; those pipes never spawn", path.display());
    }
    Ok(schedule)
}

/// Build a synthetic schedule for runs without a schedule file
///
/// Pipes are `spacing_secs` apart starting at `spacing_secs`; gaps shrink
/// slightly as the run progresses.
pub fn generate_schedule(seed: u64, count: usize, spacing_secs: f64) -> Vec<PipeData> {
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let progress = i as f32 / count.max(1) as f32;
            let gap_height = rng.random_range(0.28..0.38) - 0.06 * progress;
            let half = gap_height / 2.0;
            let gap_y = rng.random_range((0.1 + half)..(0.9 - half));
            PipeData {
                gap_y,
                gap_height,
                spawn_time: (i + 1) as f64 * spacing_secs * 1000.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schedule() {
        let parsed = parse_schedule("gapY,gapHeight,time\n0.5,0.3,2\n0.6,0.25,4");
        assert_eq!(
            parsed,
            vec![
                PipeData {
                    gap_y: 0.5,
                    gap_height: 0.3,
                    spawn_time: 2000.0,
                },
                PipeData {
                    gap_y: 0.6,
                    gap_height: 0.25,
                    spawn_time: 4000.0,
                },
            ]
        );
    }

    #[test]
    fn test_parse_skips_blank_lines_and_trims() {
        let parsed = parse_schedule("gapY,gapHeight,time\r\n 0.4 , 0.2 , 1.5 \r\n\r\n");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].gap_y, 0.4);
        assert_eq!(parsed[0].spawn_time, 1500.0);
    }

    #[test]
    fn test_malformed_fields_become_nan() {
        let parsed = parse_schedule("gapY,gapHeight,time\nabc,0.3\n");
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].gap_y.is_nan());
        assert_eq!(parsed[0].gap_height, 0.3);
        assert!(parsed[0].spawn_time.is_nan());
        assert!(!parsed[0].is_due(u64::MAX));
    }

    #[test]
    fn test_header_only() {
        assert!(parse_schedule("gapY,gapHeight,time").is_empty());
        assert!(parse_schedule("").is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_schedule("/nonexistent/schedule.csv").unwrap_err();
        assert!(matches!(err, ScheduleError::Io { .. }));
    }

    #[test]
    fn test_generate_schedule_deterministic() {
        let a = generate_schedule(7, 20, 1.5);
        let b = generate_schedule(7, 20, 1.5);
        assert_eq!(a, b);
        assert_eq!(a.len(), 20);
        assert_eq!(a[0].spawn_time, 1500.0);
        for (prev, next) in a.iter().zip(a.iter().skip(1)) {
            assert!(next.spawn_time > prev.spawn_time);
        }
        for pipe in &a {
            assert!(pipe.gap_y - pipe.gap_height / 2.0 >= 0.09);
            assert!(pipe.gap_y + pipe.gap_height / 2.0 <= 0.91);
        }
    }
}
