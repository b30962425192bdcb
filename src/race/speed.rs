//! Injectable per-tick speed sources
//!
//! The race never calls an ambient RNG. Every stride comes from a
//! [`SpeedSource`], so a seeded generator or a scripted sequence pins the
//! whole race.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::race::constants::{HORSE_COUNT, MAX_SPEED, MIN_SPEED};

/// Produces the distance one horse covers in one tick
pub trait SpeedSource {
    /// Next stride, in `[MIN_SPEED, MAX_SPEED)`
    fn next_speed(&mut self) -> f64;
}

impl<S: SpeedSource + ?Sized> SpeedSource for &mut S {
    fn next_speed(&mut self) -> f64 {
        (**self).next_speed()
    }
}

impl<S: SpeedSource + ?Sized> SpeedSource for Box<S> {
    fn next_speed(&mut self) -> f64 {
        (**self).next_speed()
    }
}

/// Map a uniform sample in `[0, 1)` onto the stride range
pub fn speed_from_unit(unit: f64) -> f64 {
    let speed = MIN_SPEED + unit.clamp(0.0, 1.0) * (MAX_SPEED - MIN_SPEED);
    if speed >= MAX_SPEED {
        // largest f64 below MAX_SPEED
        MAX_SPEED - f64::EPSILON
    } else {
        speed
    }
}

/// Strides drawn from any `rand` generator
#[derive(Debug, Clone)]
pub struct RngSpeeds<R> {
    rng: R,
}

impl<R: Rng> RngSpeeds<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSpeeds<ChaCha8Rng> {
    /// Deterministic strides from a seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Strides seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<R: Rng> SpeedSource for RngSpeeds<R> {
    fn next_speed(&mut self) -> f64 {
        self.rng.gen_range(MIN_SPEED..MAX_SPEED)
    }
}

/// Strides derived from an external uniform `[0, 1)` function
pub struct UnitSpeeds<F> {
    unit: F,
}

impl<F: FnMut() -> f64> UnitSpeeds<F> {
    pub fn new(unit: F) -> Self {
        Self { unit }
    }
}

impl<F: FnMut() -> f64> SpeedSource for UnitSpeeds<F> {
    fn next_speed(&mut self) -> f64 {
        speed_from_unit((self.unit)())
    }
}

/// Replays fixed per-tick stride rows, cycling when exhausted
///
/// Each row holds one stride per horse in lane order.
#[derive(Debug, Clone)]
pub struct ScriptedSpeeds {
    rows: Vec<[f64; HORSE_COUNT]>,
    cursor: usize,
}

impl ScriptedSpeeds {
    /// # Panics
    ///
    /// Panics if `rows` is empty or any stride lies outside
    /// `[MIN_SPEED, MAX_SPEED)`.
    pub fn new(rows: Vec<[f64; HORSE_COUNT]>) -> Self {
        assert!(!rows.is_empty(), "scripted speeds need at least one row");
        assert!(
            rows.iter()
                .flatten()
                .all(|s| (MIN_SPEED..MAX_SPEED).contains(s)),
            "scripted stride outside [{MIN_SPEED}, {MAX_SPEED})"
        );
        Self { rows, cursor: 0 }
    }

    /// Every horse moves `speed` every tick
    pub fn constant(speed: f64) -> Self {
        Self::new(vec![[speed; HORSE_COUNT]])
    }

    /// The same row of strides every tick
    pub fn repeating(row: [f64; HORSE_COUNT]) -> Self {
        Self::new(vec![row])
    }
}

impl SpeedSource for ScriptedSpeeds {
    fn next_speed(&mut self) -> f64 {
        let row = (self.cursor / HORSE_COUNT) % self.rows.len();
        let lane = self.cursor % HORSE_COUNT;
        self.cursor = self.cursor.wrapping_add(1);
        self.rows[row][lane]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_speeds_are_deterministic() {
        let mut a = RngSpeeds::seeded(42);
        let mut b = RngSpeeds::seeded(42);
        for _ in 0..100 {
            assert_eq!(a.next_speed(), b.next_speed());
        }
    }

    #[test]
    fn test_rng_speeds_in_range() {
        let mut speeds = RngSpeeds::seeded(7);
        for _ in 0..10_000 {
            let s = speeds.next_speed();
            assert!((MIN_SPEED..MAX_SPEED).contains(&s), "stride {s} out of range");
        }
    }

    #[test]
    fn test_unit_mapping_endpoints() {
        assert_eq!(speed_from_unit(0.0), MIN_SPEED);
        assert_eq!(speed_from_unit(0.5), 1.25);
        assert!(speed_from_unit(0.999_999_999_999_999_9) < MAX_SPEED);
        assert!(speed_from_unit(1.0) < MAX_SPEED);
    }

    #[test]
    fn test_unit_speeds_use_closure() {
        let mut calls = 0;
        let mut speeds = UnitSpeeds::new(|| {
            calls += 1;
            0.0
        });
        assert_eq!(speeds.next_speed(), MIN_SPEED);
        assert_eq!(speeds.next_speed(), MIN_SPEED);
        drop(speeds);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_scripted_rows_cycle_per_tick() {
        let mut speeds = ScriptedSpeeds::new(vec![
            [1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            [0.5, 0.5, 0.5, 0.5, 0.5, 1.5],
        ]);
        let first: Vec<f64> = (0..HORSE_COUNT).map(|_| speeds.next_speed()).collect();
        let second: Vec<f64> = (0..HORSE_COUNT).map(|_| speeds.next_speed()).collect();
        let third: Vec<f64> = (0..HORSE_COUNT).map(|_| speeds.next_speed()).collect();
        assert_eq!(first, vec![1.0; HORSE_COUNT]);
        assert_eq!(second[5], 1.5);
        assert_eq!(third, first);
    }

    #[test]
    #[should_panic]
    fn test_scripted_rejects_out_of_range() {
        ScriptedSpeeds::constant(2.0);
    }
}
