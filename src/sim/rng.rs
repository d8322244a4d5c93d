//! Deterministic linear-congruential RNG
//!
//! The seed lives inside `State` and is threaded through every draw, so a
//! whole run can be reproduced from the seed it started with.

/// LCG modulus (2^31)
const MODULUS: u64 = 0x8000_0000;
const MULTIPLIER: u64 = 1_103_515_245;
const INCREMENT: u64 = 12_345;
/// Largest f32 below 1.0
const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Advance the seed one step
#[inline]
pub fn next(seed: u32) -> u32 {
    ((MULTIPLIER * seed as u64 + INCREMENT) % MODULUS) as u32
}

/// Map a raw seed into [0, 1)
///
/// Seeds close to the modulus would round up to 1.0 in f32; they are pinned
/// to the largest value below it.
#[inline]
pub fn scale(seed: u32) -> f32 {
    ((seed as f64 / MODULUS as f64) as f32).min(BELOW_ONE)
}

/// Next f32 toward negative infinity
fn step_down(x: f32) -> f32 {
    if x > 0.0 {
        f32::from_bits(x.to_bits() - 1)
    } else if x == 0.0 {
        -f32::from_bits(1)
    } else {
        f32::from_bits(x.to_bits() + 1)
    }
}

/// `min + t * (max - min)`, kept below `max` when the product rounds up
fn lerp_below(min: f32, max: f32, t: f32) -> f32 {
    let value = min + t * (max - min);
    if value < max || max <= min {
        value
    } else {
        step_down(max).max(min)
    }
}

/// A value drawn from the RNG plus the seed to use for the next draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub value: f32,
    pub next_seed: u32,
}

/// Draw a value in [min, max) and advance the seed
pub fn random_between(seed: u32, min: f32, max: f32) -> Draw {
    let next_seed = next(seed);
    Draw {
        value: lerp_below(min, max, scale(next_seed)),
        next_seed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_next_is_fixed_recurrence() {
        assert_eq!(next(0), 12_345);
        assert_eq!(next(1), 1_103_527_590);
        // Stays within 31 bits
        assert!(next(u32::MAX) < 0x8000_0000);
    }

    #[test]
    fn test_same_seed_same_draw() {
        let a = random_between(1234, 4.0, 8.0);
        let b = random_between(1234, 4.0, 8.0);
        assert_eq!(a, b);
        assert_ne!(a.next_seed, 1234);
    }

    #[test]
    fn test_scale_top_seeds_below_one() {
        for seed in 0x7FFF_FF00u32..=0x7FFF_FFFF {
            assert!(scale(seed) < 1.0, "seed {seed:#x}");
        }
        assert_eq!(scale(0x7FFF_FFFF), BELOW_ONE);
        assert_eq!(scale(0), 0.0);
    }

    #[test]
    fn test_draw_at_top_of_range_stays_below_max() {
        for (min, max) in [(4.0, 8.0), (-100.0, 0.1), (-8.0, -4.0), (0.3, 100.7)] {
            let value = lerp_below(min, max, BELOW_ONE);
            assert!(value < max, "{min}..{max} gave {value}");
            assert!(value >= min);
        }
        assert_eq!(step_down(0.0), -f32::from_bits(1));
        assert!(step_down(-1.0) < -1.0);
    }

    proptest! {
        #[test]
        fn prop_draw_in_range(seed in 0u32..0x8000_0000, min in -100.0f32..100.0, span in 0.1f32..100.0) {
            let draw = random_between(seed, min, min + span);
            prop_assert!(draw.value >= min);
            prop_assert!(draw.value < min + span);
            prop_assert!(draw.next_seed < 0x8000_0000);
        }

        #[test]
        fn prop_scale_unit_interval(seed in 0u32..0x8000_0000) {
            let s = scale(seed);
            prop_assert!((0.0..1.0).contains(&s));
        }
    }
}
