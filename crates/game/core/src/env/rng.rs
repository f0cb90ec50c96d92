//! Injected randomness for combat rolls.
//!
//! Every random decision in a session (initiative jitter, damage variance,
//! critical hits, dodges, AI choice, flee) draws from a [`RandomSource`]
//! passed in by the caller. The engine never touches an ambient generator,
//! so a fixed source replays a fight exactly.
//!
//! # Determinism
//!
//! Implementations must produce the same sequence for the same seed.
//! [`SequenceRng`] goes further and replays a scripted list of rolls, which
//! is what scenario tests use to force criticals, misses and AI choices.

/// Source of randomness consumed by the combat engine.
pub trait RandomSource {
    /// Generate the next raw 32-bit value.
    fn next_u32(&mut self) -> u32;

    /// Uniform value in `[0.0, 1.0)`.
    fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Returns `true` with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p.clamp(0.0, 1.0)
    }

    /// Uniform value in `[min, max)`.
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "index() over an empty range");
        ((self.next_f64() * len as f64) as usize).min(len.saturating_sub(1))
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 32-bit output from 64-bit state.
///
/// # Properties
///
/// - **Deterministic**: same seed, same sequence
/// - **Fast**: single multiply + xorshift + rotate
/// - **Small state**: only 64 bits
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a generator from a seed.
    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.state = Self::pcg_step(rng.state.wrapping_add(seed));
        rng
    }

    /// `state' = state × multiplier + increment (mod 2^64)`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RandomSource for PcgRng {
    fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::pcg_step(old);
        Self::pcg_output(old)
    }
}

/// Replays a scripted list of unit rolls, cycling when exhausted.
///
/// Each call to [`RandomSource::next_f64`] returns the next value in order.
/// Values should lie in `[0.0, 1.0)`; they are clamped into that range.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceRng {
    rolls: Vec<f64>,
    cursor: usize,
    draws: usize,
}

impl SequenceRng {
    /// Upper bound used when a script asks for 1.0 ("always fails").
    const JUST_BELOW_ONE: f64 = 1.0 - f64::EPSILON;

    pub fn new(rolls: impl IntoIterator<Item = f64>) -> Self {
        let rolls: Vec<f64> = rolls.into_iter().collect();
        debug_assert!(!rolls.is_empty(), "SequenceRng needs at least one roll");
        Self {
            rolls,
            cursor: 0,
            draws: 0,
        }
    }

    /// Source that always rolls the same value.
    pub fn constant(roll: f64) -> Self {
        Self::new([roll])
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for SequenceRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_f64() * (f64::from(u32::MAX) + 1.0)) as u32
    }

    fn next_f64(&mut self) -> f64 {
        let roll = self
            .rolls
            .get(self.cursor)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, Self::JUST_BELOW_ONE);
        self.cursor = (self.cursor + 1) % self.rolls.len().max(1);
        self.draws += 1;
        roll
    }
}
