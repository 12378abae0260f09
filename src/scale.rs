//! Linear scales.

/// Maps a continuous domain onto a continuous range.
///
/// Values outside the domain extrapolate. A degenerate domain (both ends
/// equal) maps every input to the start of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    /// Passenger count to node radius: `[0, max] -> range`.
    pub fn passengers(max_passengers: f64, range: [f32; 2]) -> Self {
        Self::new(
            [0.0, max_passengers.max(0.0)],
            [f64::from(range[0]), f64::from(range[1])],
        )
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    pub fn apply(&self, value: f64) -> f64 {
        let span = self.domain[1] - self.domain[0];
        if span == 0.0 || !span.is_finite() {
            return self.range[0];
        }
        let t = (value - self.domain[0]) / span;
        self.range[0] + t * (self.range[1] - self.range[0])
    }
}
