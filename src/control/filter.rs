//! Fixed-capacity moving-average filter.
//!
//! Smooths raw pH probe samples.  The ring keeps a running sum that is
//! updated incrementally (subtract the outgoing slot, add the incoming
//! one), so both `push` and `average` are O(1) amortised and nothing
//! allocates.  The sum is rebuilt from the ring once per lap, and on every
//! push while it is non-finite, so rounding drift stays bounded and a
//! NaN sample stops affecting the output once it has left the window.

/// Number of samples averaged for the pH probe.
pub const PH_FILTER_SAMPLES: usize = 10;

/// Moving-average filter used for the pH probe.
pub type PhFilter = MovingAverage<PH_FILTER_SAMPLES>;

#[derive(Debug, Clone)]
pub struct MovingAverage<const N: usize> {
    ring: [f32; N],
    head: usize,
    count: usize,
    sum: f32,
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MovingAverage<N> {
    pub const fn new() -> Self {
        Self {
            ring: [0.0; N],
            head: 0,
            count: 0,
            sum: 0.0,
        }
    }

    /// Insert a raw sample, overwriting the oldest once full, and return
    /// the new average.
    pub fn push(&mut self, raw: f32) -> f32 {
        if N == 0 {
            return raw;
        }
        self.sum -= self.ring[self.head];
        self.ring[self.head] = raw;
        self.sum += raw;
        self.head = (self.head + 1) % N;
        if self.count < N {
            self.count += 1;
        }
        if self.head == 0 || !self.sum.is_finite() {
            // Unfilled slots are still 0.0.
            self.sum = self.ring.iter().sum();
        }
        self.sum / self.count as f32
    }

    /// Current average, `None` before the first sample.
    pub fn average(&self) -> Option<f32> {
        (self.count > 0).then(|| self.sum / self.count as f32)
    }

    /// Samples currently held (saturates at `N`).
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
