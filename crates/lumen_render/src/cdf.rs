//! Piecewise-constant discrete distribution.
//!
//! Used twice by the scene: once to pick an emitter, once per emitter to pick
//! one of its triangles proportionally to area.

/// Cumulative distribution over a finite set of weighted entries.
///
/// Entries are appended one at a time, then [`normalize`](Self::normalize)
/// rescales the running sums so the last one is exactly 1.
#[derive(Debug, Clone)]
pub struct DiscreteCdf {
    cdf: Vec<f32>,
    normalization: f32,
}

impl DiscreteCdf {
    /// Sums below this are treated as an all-zero distribution.
    const MIN_TOTAL: f32 = 1e-6;

    pub fn with_capacity(count: usize) -> Self {
        let mut cdf = Vec::with_capacity(count + 1);
        cdf.push(0.0);
        Self {
            cdf,
            normalization: 0.0,
        }
    }

    /// Build and normalize a distribution in one go.
    pub fn from_weights(weights: impl IntoIterator<Item = f32>) -> Self {
        let weights = weights.into_iter();
        let mut cdf = Self::with_capacity(weights.size_hint().0);
        for w in weights {
            cdf.append(w);
        }
        cdf.normalize();
        cdf
    }

    /// Append an entry. Negative or non-finite weights count as zero.
    pub fn append(&mut self, weight: f32) {
        let weight = if weight.is_finite() && weight > 0.0 {
            weight
        } else {
            0.0
        };
        let last = self.cdf[self.cdf.len() - 1];
        self.cdf.push(last + weight);
    }

    /// Normalize so that the total is 1. Returns the sum before normalizing.
    ///
    /// A (near) zero sum leaves the table untouched and sets the
    /// normalization factor to 0.
    pub fn normalize(&mut self) -> f32 {
        let sum = self.cdf[self.cdf.len() - 1];
        if sum > Self::MIN_TOTAL {
            self.normalization = 1.0 / sum;
            for c in self.cdf.iter_mut().skip(1) {
                *c *= self.normalization;
            }
            let last = self.cdf.len() - 1;
            self.cdf[last] = 1.0;
        } else {
            self.normalization = 0.0;
        }
        sum
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.cdf.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// False for an empty or all-zero distribution; sampling one is meaningless.
    pub fn is_valid(&self) -> bool {
        self.normalization > 0.0
    }

    /// Probability of a single entry (after normalization).
    pub fn pdf(&self, entry: usize) -> f32 {
        self.cdf[entry + 1] - self.cdf[entry]
    }

    /// `1 / sum` of the unnormalized weights, or 0 for a degenerate distribution.
    pub fn normalization(&self) -> f32 {
        self.normalization
    }

    /// Last cumulative value; 1.0 once normalized.
    pub fn total(&self) -> f32 {
        self.cdf[self.cdf.len() - 1]
    }

    /// Map a uniform variate in `[0, 1)` to an entry index.
    ///
    /// Zero-probability entries are skipped: they are returned only if no
    /// entry with positive weight follows.
    ///
    /// # Panics
    /// Panics if the distribution is empty.
    pub fn sample(&self, u: f32) -> usize {
        let count = self.len();
        assert!(count > 0, "sampling an empty distribution");

        // First cumulative value >= u, then step back to the entry it closes.
        let upper = self.cdf.partition_point(|&c| c < u);
        let mut index = upper.saturating_sub(1).min(count - 1);

        while self.pdf(index) == 0.0 && index + 1 < count {
            index += 1;
        }
        index
    }

    /// Sample an entry and return it with its probability.
    pub fn sample_with_pdf(&self, u: f32) -> (usize, f32) {
        let index = self.sample(u);
        (index, self.pdf(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> DiscreteCdf {
        DiscreteCdf::from_weights([1.0, 3.0, 0.0, 6.0])
    }

    #[test]
    fn test_normalized_total_is_one() {
        let cdf = example();
        assert_eq!(cdf.total(), 1.0);
        assert_eq!(cdf.len(), 4);
        assert!((cdf.normalization() - 0.1).abs() < 1e-6);
        assert!((cdf.pdf(0) - 0.1).abs() < 1e-6);
        assert!((cdf.pdf(1) - 0.3).abs() < 1e-6);
        assert_eq!(cdf.pdf(2), 0.0);
        assert!((cdf.pdf(3) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_sample_endpoints() {
        let cdf = example();
        assert_eq!(cdf.sample(0.0), 0);
        assert_eq!(cdf.sample(0.05), 0);
        assert_eq!(cdf.sample(0.2), 1);
        assert_eq!(cdf.sample(0.99), 3);
        assert_eq!(cdf.sample(1.0), 3);
    }

    #[test]
    fn test_zero_weight_entry_never_sampled() {
        let cdf = example();
        for i in 0..=1000 {
            let u = i as f32 / 1000.0;
            assert_ne!(cdf.sample(u), 2, "u = {u}");
        }
        // Exactly on the boundary shared by entries 1 and 2
        assert_ne!(cdf.sample(0.4), 2);
    }

    #[test]
    fn test_leading_zero_weight_skipped() {
        let cdf = DiscreteCdf::from_weights([0.0, 0.0, 2.0]);
        assert_eq!(cdf.sample(0.0), 2);
        let (index, pdf) = cdf.sample_with_pdf(0.5);
        assert_eq!(index, 2);
        assert_eq!(pdf, 1.0);
    }

    #[test]
    fn test_all_zero_distribution_is_invalid() {
        let mut cdf = DiscreteCdf::with_capacity(2);
        cdf.append(0.0);
        cdf.append(-3.0);
        assert_eq!(cdf.normalize(), 0.0);
        assert!(!cdf.is_valid());
        assert_eq!(cdf.normalization(), 0.0);
        // Only remaining option
        assert_eq!(cdf.sample(0.3), 1);
    }

    #[test]
    fn test_empty_distribution() {
        let cdf = DiscreteCdf::from_weights(std::iter::empty());
        assert!(cdf.is_empty());
        assert!(!cdf.is_valid());
    }
}
