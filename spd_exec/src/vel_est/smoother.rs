//! Median smoothing filter for the raw speed stream

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;

// Internal
use util::maths::lower_median;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A bounded-history median filter.
///
/// Holds at most `capacity` samples in arrival order, evicting the oldest
/// when full. The smoothed value is the median of the current window by the
/// sorted-index `n / 2` convention (no averaging of the two central elements
/// for even-sized windows).
#[derive(Debug, Clone)]
pub struct MedianSmoother {
    window: VecDeque<f64>,
    capacity: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MedianSmoother {
    /// Create a new smoother holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a sample and return the smoothed value for the updated window.
    pub fn push(&mut self, sample_ms: f64) -> f64 {
        self.window.push_back(sample_ms);

        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        // The window is never empty here so the median always exists
        let (head, tail) = self.window.as_slices();
        match tail.is_empty() {
            true => lower_median(head),
            false => {
                let mut joined = Vec::with_capacity(self.window.len());
                joined.extend_from_slice(head);
                joined.extend_from_slice(tail);
                lower_median(&joined)
            }
        }
        .unwrap_or(sample_ms)
    }

    /// Get the number of samples currently held by the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Return true if the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prefix_medians() {
        let mut smoother = MedianSmoother::new(10);

        // Each returned value is the sorted-index n/2 element of the samples
        // seen so far
        let samples = [5f64, 1f64, 4f64, 2f64, 3f64];
        let expected = [5f64, 5f64, 4f64, 4f64, 3f64];

        for (s, e) in samples.iter().zip(expected.iter()) {
            assert_eq!(smoother.push(*s), *e);
        }

        assert_eq!(smoother.len(), 5);
    }

    #[test]
    fn test_window_bounded_fifo() {
        let mut smoother = MedianSmoother::new(10);

        // Push well past capacity
        for i in 0..25 {
            smoother.push(i as f64);
            assert!(smoother.len() <= 10);
        }

        // Only the most recent 10 samples (15..=24) remain, in arrival order
        assert_eq!(smoother.len(), 10);
        let held: Vec<f64> = smoother.window.iter().copied().collect();
        let expected: Vec<f64> = (15..25).map(|i| i as f64).collect();
        assert_eq!(held, expected);

        // One more push evicts 15, leaving [16..=24, 24] whose sorted
        // index-5 element is 21
        assert_eq!(smoother.push(24.0), 21.0);
    }

    #[test]
    fn test_single_sample_passthrough() {
        let mut smoother = MedianSmoother::new(10);
        assert_eq!(smoother.push(-2.5), -2.5);
    }
}
