/// Instantaneous processing rate from consecutive cycle timestamps
#[derive(Debug, Clone, Copy, Default)]
pub struct RateMeter {
    last: Option<f64>,
    rate: f64,
}

impl RateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cycle at `now` seconds and return the rounded cycles per second.
    ///
    /// The first tick reports 0. A non-increasing timestamp keeps the previous
    /// reading.
    pub fn tick(&mut self, now: f64) -> f64 {
        if let Some(last) = self.last {
            let dt = now - last;
            if dt > 0.0 && dt.is_finite() {
                self.rate = (1.0 / dt).round();
            }
        }
        self.last = Some(now);
        self.rate
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
