//! Randomness service.
//!
//! Every probabilistic rule in the engine (turn order, critical hits,
//! evasion, heavy attacks, damage variance, loot, exploration events) draws
//! from an explicit `&mut R: Rng` passed in by the caller. Nothing reads
//! ambient randomness, so a battle is replayable from a seed plus the
//! sequence of player choices.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The concrete generator owned by a [`GameSession`](crate::session::GameSession).
pub type GameRng = ChaCha8Rng;

/// Create a deterministic generator from a seed.
pub fn seeded(seed: u64) -> GameRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Create a generator seeded from OS entropy.
pub fn from_entropy() -> GameRng {
    ChaCha8Rng::from_entropy()
}

/// Bernoulli roll: draws a uniform value in `[0, 1)` and succeeds when it is
/// below `probability`.
///
/// A probability of `0.0` never succeeds and `1.0` always does.
pub fn chance<R: Rng>(rng: &mut R, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

/// Percentage variant of [`chance`]; `0` never succeeds, `100` always does.
pub fn percent<R: Rng>(rng: &mut R, percent: u32) -> bool {
    chance(rng, f64::from(percent) / 100.0)
}

/// Uniform integer in `[0, max]` (inclusive). Non-positive `max` yields 0.
pub fn up_to<R: Rng>(rng: &mut R, max: i32) -> i32 {
    rng.gen_range(0..=max.max(0))
}

/// Uniform integer in `[low, low + span)`.
pub fn offset<R: Rng>(rng: &mut R, low: i32, span: i32) -> i32 {
    if span <= 0 {
        return low;
    }
    low + rng.gen_range(0..span)
}

/// Uniform index into a collection of `len` elements.
pub fn index<R: Rng>(rng: &mut R, len: usize) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(rng.gen_range(0..len))
    }
}

/// Pick an index with probability proportional to its weight.
///
/// Returns `None` when the slice is empty or every weight is zero.
pub fn weighted_index<R: Rng>(rng: &mut R, weights: &[u32]) -> Option<usize> {
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total == 0 {
        return None;
    }

    let mut target = rng.gen_range(0..total);
    for (i, &weight) in weights.iter().enumerate() {
        let weight = u64::from(weight);
        if target < weight {
            return Some(i);
        }
        target -= weight;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..50 {
            assert_eq!(up_to(&mut a, 100), up_to(&mut b, 100));
        }
    }

    #[test]
    fn test_chance_bounds() {
        let mut rng = seeded(7);
        for _ in 0..200 {
            assert!(!chance(&mut rng, 0.0));
            assert!(chance(&mut rng, 1.0));
            assert!(!percent(&mut rng, 0));
            assert!(percent(&mut rng, 100));
        }
    }

    #[test]
    fn test_up_to_range() {
        let mut rng = seeded(1);
        for _ in 0..200 {
            let v = up_to(&mut rng, 4);
            assert!((0..=4).contains(&v));
        }
        assert_eq!(up_to(&mut rng, 0), 0);
        assert_eq!(up_to(&mut rng, -3), 0);
    }

    #[test]
    fn test_offset_range() {
        let mut rng = seeded(3);
        for _ in 0..200 {
            let v = offset(&mut rng, 50, 100);
            assert!((50..150).contains(&v));
        }
        assert_eq!(offset(&mut rng, 10, 0), 10);
    }

    #[test]
    fn test_weighted_index_skips_zero_weights() {
        let mut rng = seeded(9);
        for _ in 0..200 {
            assert_eq!(weighted_index(&mut rng, &[0, 3, 0]), Some(1));
        }
        assert_eq!(weighted_index(&mut rng, &[]), None);
        assert_eq!(weighted_index(&mut rng, &[0, 0]), None);
    }

    #[test]
    fn test_index_empty() {
        let mut rng = seeded(11);
        assert_eq!(index(&mut rng, 0), None);
        assert!(index(&mut rng, 3).is_some_and(|i| i < 3));
    }
}
