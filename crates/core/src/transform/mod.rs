use std::{fmt, sync::Arc};

use realfft::{num_complex::Complex32, RealFftPlanner, RealToComplex};

use crate::{Result, SpectrumError};

/// Smallest transform length the engine accepts.
pub const MIN_FFT_SIZE: usize = 4;

/// Forward real FFT with its plan and every buffer it touches.
///
/// All memory is acquired in [`SpectralTransform::new`] and released on drop.
/// The type is deliberately not `Clone`; it can only be moved.
pub struct SpectralTransform {
    size: usize,
    log2n: u32,
    scale: f32,
    plan: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
    magnitudes: Vec<f32>,
}

impl SpectralTransform {
    pub fn new(size: usize) -> Result<Self> {
        if size < MIN_FFT_SIZE || !size.is_power_of_two() {
            return Err(SpectrumError::InvalidFftSize {
                size,
                min: MIN_FFT_SIZE,
            });
        }

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(size);
        if plan.len() != size {
            return Err(SpectrumError::Transform(format!(
                "planner returned a transform of length {} for {size}",
                plan.len()
            )));
        }

        Ok(Self {
            size,
            log2n: size.trailing_zeros(),
            scale: 2.0 / size as f32,
            input: plan.make_input_vec(),
            spectrum: plan.make_output_vec(),
            scratch: plan.make_scratch_vec(),
            magnitudes: vec![0.0; size / 2],
            plan,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn log2n(&self) -> u32 {
        self.log2n
    }

    /// Number of magnitude bins produced per call (`size / 2`).
    pub fn bins(&self) -> usize {
        self.magnitudes.len()
    }

    /// Time-domain buffer to fill with the windowed frame before [`compute`].
    ///
    /// [`compute`]: SpectralTransform::compute
    pub fn input_mut(&mut self) -> &mut [f32] {
        &mut self.input
    }

    /// Transforms the current input and returns `(2 / size) * |X[k]|` for
    /// `k < size / 2`. The input buffer is clobbered.
    pub fn compute(&mut self) -> &[f32] {
        let result =
            self.plan
                .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch);
        if let Err(err) = result {
            debug_assert!(false, "forward transform rejected its own buffers: {err}");
            self.magnitudes.fill(0.0);
            return &self.magnitudes;
        }

        let scale = self.scale;
        for (magnitude, bin) in self.magnitudes.iter_mut().zip(&self.spectrum) {
            *magnitude = bin.norm() * scale;
        }

        &self.magnitudes
    }

    /// Magnitudes from the most recent [`compute`](SpectralTransform::compute).
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }
}

impl fmt::Debug for SpectralTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectralTransform")
            .field("size", &self.size)
            .field("log2n", &self.log2n)
            .finish()
    }
}
