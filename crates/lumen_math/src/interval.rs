/// A closed parametric range `[min, max]` along a ray.
///
/// Traversal code narrows these as it goes: box tests clip them against slabs
/// and nearest-hit searches pull `max` in to the closest accepted hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Interval starting at `min` and running to infinity.
    pub const fn from_min(min: f32) -> Self {
        Self::new(min, f32::INFINITY)
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// True when no value lies inside (`max < min`, or a NaN bound).
    pub fn is_empty(&self) -> bool {
        !(self.min <= self.max)
    }

    /// Returns true if x is within `[min, max]`. NaN is never contained.
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Same interval with its upper bound replaced.
    #[inline]
    pub fn with_max(self, max: f32) -> Self {
        Self::new(self.min, max)
    }

    /// Creates an interval that surrounds two other intervals.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// An empty interval (min > max, contains nothing).
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// A universe interval (contains everything).
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_contains_is_inclusive() {
        let interval = Interval::new(0.0, 10.0);
        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0));
        assert!(!interval.contains(-0.1));
        assert!(!interval.contains(f32::NAN));
    }

    #[test]
    fn test_interval_empty() {
        assert!(Interval::EMPTY.is_empty());
        assert!(!Interval::EMPTY.contains(0.0));
        assert!(!Interval::new(1.0, 1.0).is_empty());
        assert!(Interval::new(f32::NAN, 1.0).is_empty());
    }

    #[test]
    fn test_interval_with_max() {
        let t = Interval::from_min(0.001).with_max(5.0);
        assert_eq!(t, Interval::new(0.001, 5.0));
        assert_eq!(t.size(), 5.0 - 0.001);
    }

    #[test]
    fn test_interval_surrounding_empty_is_identity() {
        let a = Interval::new(-2.0, 3.0);
        assert_eq!(Interval::surrounding(&Interval::EMPTY, &a), a);
        assert_eq!(Interval::UNIVERSE.size(), f32::INFINITY);
    }
}
