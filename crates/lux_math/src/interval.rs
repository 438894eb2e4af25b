/// A closed range of ray parameters or coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Length; negative for empty intervals.
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive membership test.
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// True when `min > max`.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Widen by `delta` in total, split evenly between both ends.
    pub fn expand(&self, delta: f32) -> Interval {
        let half = delta * 0.5;
        Self::new(self.min - half, self.max + half)
    }

    /// Smallest interval covering both `self` and `x`.
    pub fn include(&self, x: f32) -> Interval {
        Self::new(self.min.min(x), self.max.max(x))
    }

    /// Midpoint of the interval.
    pub fn center(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    /// Contains nothing; the identity for `include`.
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// Ray parameters accepted by box traversal: strictly in front of the origin.
    pub const FORWARD: Interval = Interval {
        min: f32::MIN_POSITIVE,
        max: f32::MAX,
    };
}
