/// Per-bar exponential low-pass filter.
///
/// `out[b] = s * prev[b] + (1 - s) * max(gain * raw[b], 0)`. Gain is applied
/// before filtering so a gain change takes full effect on the next frame.
#[derive(Debug, Clone)]
pub struct Smoother {
    values: Vec<f32>,
}

impl Smoother {
    /// Creates a filter for `bars` bars with room for up to `capacity`.
    pub fn new(bars: usize, capacity: usize) -> Self {
        let mut values = Vec::with_capacity(capacity.max(bars));
        values.resize(bars, 0.0);
        Self { values }
    }

    pub fn apply(&mut self, raw: &[f32], gain: f32, smoothing: f32) {
        debug_assert_eq!(raw.len(), self.values.len());

        let fresh = 1.0 - smoothing;
        for (value, &magnitude) in self.values.iter_mut().zip(raw) {
            let scaled = (gain * magnitude).max(0.0);
            *value = smoothing * *value + fresh * scaled;
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Changes the bar count and clears history. Never reallocates within
    /// the capacity given at construction.
    pub fn resize(&mut self, bars: usize) {
        self.values.clear();
        self.values.resize(bars, 0.0);
    }

    pub fn reset(&mut self) {
        self.values.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_smoothing_passes_scaled_input_through() {
        let mut smoother = Smoother::new(3, 3);
        smoother.apply(&[0.5, 1.0, 0.25], 4.0, 0.0);
        assert_eq!(smoother.values(), &[2.0, 4.0, 1.0]);

        smoother.apply(&[0.0, 0.1, 0.2], 4.0, 0.0);
        assert_eq!(smoother.values(), &[0.0, 0.4, 0.8]);
    }

    #[test]
    fn blends_with_previous_output() {
        let mut smoother = Smoother::new(1, 1);
        smoother.apply(&[1.0], 1.0, 0.5);
        assert_eq!(smoother.values(), &[0.5]);
        smoother.apply(&[1.0], 1.0, 0.5);
        assert_eq!(smoother.values(), &[0.75]);
    }

    #[test]
    fn converges_to_zero_on_silence() {
        let mut smoother = Smoother::new(2, 2);
        smoother.apply(&[1.0, 1.0], 10.0, 0.7);
        for _ in 0..400 {
            smoother.apply(&[0.0, 0.0], 10.0, 0.7);
        }
        assert!(smoother.values().iter().all(|&v| v < 1e-6));
    }

    #[test]
    fn negative_gain_never_produces_negative_output() {
        let mut smoother = Smoother::new(2, 2);
        smoother.apply(&[1.0, 0.5], -3.0, 0.2);
        assert_eq!(smoother.values(), &[0.0, 0.0]);
    }

    #[test]
    fn resize_resets_history() {
        let mut smoother = Smoother::new(2, 8);
        smoother.apply(&[1.0, 1.0], 1.0, 0.0);
        smoother.resize(5);
        assert_eq!(smoother.values(), &[0.0; 5]);
        assert!(smoother.values.capacity() >= 8);
    }
}
