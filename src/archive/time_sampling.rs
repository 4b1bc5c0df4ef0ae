//! Sample timing for archive properties.
//!
//! Properties are sampled over time; the sampling describes when each sample
//! was recorded. Requested times outside the recorded span resolve to the
//! nearest recorded sample, they are never rejected.

use crate::util::{Chrono, TimeRange};

/// Describes when each sample of a property was recorded.
#[derive(Clone, Debug, PartialEq)]
pub enum TimeSampling {
    /// Single static sample at time 0 (identity sampling).
    Identity,

    /// Uniform sampling: start + index * step.
    Uniform { start: Chrono, step: Chrono },

    /// Acyclic sampling: explicit time for each sample, strictly increasing.
    Acyclic { times: Vec<Chrono> },
}

impl TimeSampling {
    /// Check if this is identity (static) sampling.
    #[inline]
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Create uniform time sampling.
    pub fn uniform(start: Chrono, step: Chrono) -> Self {
        Self::Uniform { start, step }
    }

    /// Create acyclic time sampling from explicit times.
    pub fn acyclic(times: Vec<Chrono>) -> Self {
        Self::Acyclic { times }
    }

    /// Get the time for a specific sample index.
    pub fn sample_time(&self, index: usize) -> Chrono {
        match self {
            Self::Identity => 0.0,
            Self::Uniform { start, step } => *start + (index as Chrono) * *step,
            Self::Acyclic { times } => times.get(index).copied().unwrap_or(0.0),
        }
    }

    /// Find the floor index (largest index with time <= given time).
    pub fn floor_index(&self, time: Chrono, num_samples: usize) -> (usize, Chrono) {
        if num_samples == 0 {
            return (0, 0.0);
        }

        match self {
            Self::Identity => (0, 0.0),
            Self::Uniform { start, step } => {
                if time <= *start || *step <= 0.0 {
                    return (0, *start);
                }
                let idx = ((time - start) / step).floor() as usize;
                let idx = idx.min(num_samples - 1);
                (idx, self.sample_time(idx))
            }
            Self::Acyclic { .. } => {
                // Binary search for floor
                let mut lo = 0;
                let mut hi = num_samples;
                while lo < hi {
                    let mid = lo + (hi - lo) / 2;
                    if self.sample_time(mid) <= time {
                        lo = mid + 1;
                    } else {
                        hi = mid;
                    }
                }
                let idx = if lo > 0 { lo - 1 } else { 0 };
                (idx, self.sample_time(idx))
            }
        }
    }

    /// Find the ceiling index (smallest index with time >= given time).
    pub fn ceil_index(&self, time: Chrono, num_samples: usize) -> (usize, Chrono) {
        if num_samples == 0 {
            return (0, 0.0);
        }

        let (floor_idx, floor_time) = self.floor_index(time, num_samples);
        if floor_time >= time {
            return (floor_idx, floor_time);
        }

        let ceil_idx = (floor_idx + 1).min(num_samples - 1);
        (ceil_idx, self.sample_time(ceil_idx))
    }

    /// Find the nearest index to the given time.
    pub fn near_index(&self, time: Chrono, num_samples: usize) -> (usize, Chrono) {
        if num_samples == 0 {
            return (0, 0.0);
        }

        let (floor_idx, floor_time) = self.floor_index(time, num_samples);
        if floor_idx >= num_samples - 1 {
            return (floor_idx, floor_time);
        }

        let ceil_idx = floor_idx + 1;
        let ceil_time = self.sample_time(ceil_idx);

        if (time - floor_time).abs() <= (ceil_time - time).abs() {
            (floor_idx, floor_time)
        } else {
            (ceil_idx, ceil_time)
        }
    }

    /// Time range spanned by the samples.
    ///
    /// A property with fewer than two samples is static and contributes no
    /// range (the result is empty).
    pub fn range(&self, num_samples: usize) -> TimeRange {
        if num_samples < 2 || self.is_identity() {
            return TimeRange::EMPTY;
        }
        TimeRange::new(self.sample_time(0), self.sample_time(num_samples - 1))
    }
}

impl Default for TimeSampling {
    fn default() -> Self {
        Self::Identity
    }
}
