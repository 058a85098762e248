//! xorshift64* random number generator with the samplers used by the clinic
//!
//! # Determinism
//!
//! Same seed → same sequence of draws → same event trace and report.
//! The samplers below are written directly on top of the raw generator
//! so that results never depend on the version of an external crate.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use clinic_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let gap = rng.exponential(6.0);
/// assert!(gap >= 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with the given seed (zero is mapped to 1)
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate the next raw 64-bit value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Current internal state (for replay diagnostics)
    pub fn get_state(&self) -> u64 {
        self.state
    }

    /// Uniform f64 in [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        (self.next() >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform index in [0, len)
    ///
    /// # Panics
    /// Panics if `len == 0`
    pub fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "cannot draw an index from an empty range");
        (self.next() % len as u64) as usize
    }

    /// Uniform f64 in [low, high)
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Exponential draw with the given mean (inverse-CDF method)
    ///
    /// # Example
    /// ```
    /// use clinic_simulator_core_rs::RngManager;
    ///
    /// let mut rng = RngManager::new(7);
    /// let minutes = rng.exponential(15.0);
    /// assert!(minutes.is_finite() && minutes >= 0.0);
    /// ```
    pub fn exponential(&mut self, mean: f64) -> f64 {
        // 1 - u lies in (0, 1], so ln never sees zero
        let u = 1.0 - self.next_f64();
        -mean * u.ln()
    }

    /// Standard normal draw using the Box-Muller transform
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Normal draw with given mean and standard deviation
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        mean + std_dev * self.standard_normal()
    }

    /// Pick one element uniformly, `None` for an empty slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.index(items.len());
        items.get(idx)
    }

    /// Categorical draw: index `i` is returned with probability
    /// `weights[i] / sum(weights)`. Returns `None` when no weight is positive.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }

        let mut target = self.next_f64() * total;
        let mut last_positive = None;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            last_positive = Some(i);
            if target < *w {
                return Some(i);
            }
            target -= w;
        }

        // Floating-point residue lands on the last positive weight
        last_positive
    }

    /// In-place Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}
