/// A closed range of reals, used for per-axis bounds and color clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Clamps x to be within the interval [min, max]. NaN maps to min.
    pub fn clamp(&self, x: f64) -> f64 {
        if x.is_nan() {
            return self.min;
        }
        x.clamp(self.min, self.max)
    }

    /// Grow the interval so that it contains x.
    pub fn include(&self, x: f64) -> Interval {
        Interval::new(self.min.min(x), self.max.max(x))
    }

    /// An empty interval (min > max, contains nothing).
    pub const EMPTY: Interval = Interval {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// The unit interval, the displayable range of a color channel.
    pub const UNIT: Interval = Interval { min: 0.0, max: 1.0 };
}
