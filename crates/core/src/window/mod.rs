use std::f32::consts::PI;

/// Precomputed Hann window used to suppress spectral leakage at frame edges.
#[derive(Debug, Clone)]
pub struct WindowTable {
    coefficients: Box<[f32]>,
}

impl WindowTable {
    pub fn hann(len: usize) -> Self {
        let coefficients = (0..len).map(|index| hann_value(index, len)).collect();
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Writes `frame[i] * w[i]` into `out`. All three lengths must match.
    pub fn apply(&self, frame: &[f32], out: &mut [f32]) {
        debug_assert_eq!(frame.len(), self.coefficients.len());
        debug_assert_eq!(out.len(), self.coefficients.len());

        for ((slot, sample), weight) in out.iter_mut().zip(frame).zip(self.coefficients.iter()) {
            *slot = sample * weight;
        }
    }
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}
