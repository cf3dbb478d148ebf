/// Result alias that carries the custom [`SpectrumError`] type.
pub type Result<T> = std::result::Result<T, SpectrumError>;

/// Common error type for the core crate.
///
/// Only construction and configuration can fail. Once an engine exists,
/// processing has no error path and out-of-range parameters are clamped.
#[derive(Debug, thiserror::Error)]
pub enum SpectrumError {
    /// The requested transform length is not a power of two or is too small
    /// to produce a usable spectrum.
    #[error("fft size {size} must be a power of two no smaller than {min}")]
    InvalidFftSize { size: usize, min: usize },
    /// The FFT library could not set up a plan for the requested size.
    #[error("failed to set up forward transform: {0}")]
    Transform(String),
    /// Configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl From<realfft::FftError> for SpectrumError {
    fn from(value: realfft::FftError) -> Self {
        Self::Transform(value.to_string())
    }
}
