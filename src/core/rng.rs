//! Deterministic random streams
//!
//! Every random decision in the simulation core flows through a [`RandomSource`]
//! built from an explicit seed. There is no ambient generator: the same seed and
//! the same number of prior draws always produce the same next value.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed accepted by the generators: either a raw integer or a string folded
/// through [`hash_string`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed(pub u32);

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Seed(value)
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Seed(hash_string(value))
    }
}

impl From<&String> for Seed {
    fn from(value: &String) -> Self {
        Seed(hash_string(value))
    }
}

/// Polynomial rolling hash (base 31) over UTF-16 code units, wrapped to u32.
///
/// Code units rather than chars so ids hash identically to a `charCodeAt` fold.
pub fn hash_string(s: &str) -> u32 {
    s.encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as u32))
}

/// Reference derivation: `fract(sin(seed) * 10000)`, always in [0, 1)
pub fn sine_random(seed: u32) -> f64 {
    let x = (seed as f64).sin() * 10000.0;
    let f = x - x.floor();
    if f >= 1.0 {
        0.0
    } else {
        f
    }
}

/// A seed-pure stream of floats in [0, 1)
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform float in [min, max)
    fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform integer in [min, max], one draw
    fn range_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            // Still consume the draw so call counts stay fixed
            self.next_f64();
            return min;
        }
        let span = (max - min + 1) as f64;
        let offset = (self.next_f64() * span).floor() as i64;
        min + offset.min(max - min)
    }

    /// Bernoulli trial, one draw
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniformly pick one element; still consumes a draw for an empty slice
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        let roll = self.next_f64();
        if items.is_empty() {
            return None;
        }
        let idx = ((roll * items.len() as f64).floor() as usize).min(items.len() - 1);
        items.get(idx)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Reference generator: each draw is `sine_random(seed)` followed by `seed += 1`
#[derive(Debug, Clone)]
pub struct SineRng {
    seed: u32,
}

impl SineRng {
    pub fn new(seed: impl Into<Seed>) -> Self {
        Self { seed: seed.into().0 }
    }

    /// Seed that the next draw will use
    pub fn position(&self) -> u32 {
        self.seed
    }
}

impl RandomSource for SineRng {
    fn next_f64(&mut self) -> f64 {
        let value = sine_random(self.seed);
        self.seed = self.seed.wrapping_add(1);
        value
    }
}

/// Default simulation generator: a ChaCha8 stream keyed by a u32 seed
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    seed: u32,
    inner: ChaCha8Rng,
}

impl DeterministicRng {
    pub fn new(seed: impl Into<Seed>) -> Self {
        let seed = seed.into().0;
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed as u64),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Independent stream derived from this stream's seed, not its position
    pub fn fork(&self, offset: u32) -> Self {
        Self::new(self.seed.wrapping_add(offset.wrapping_mul(0x9e37_79b9)))
    }
}

impl RandomSource for DeterministicRng {
    fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}
