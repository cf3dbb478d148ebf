//! Real-time spectrum core for bar visualizers.
//!
//! Raw audio samples go in; a small array of per-bar magnitudes and decaying
//! peak markers comes out. Each module owns one stage of the pipeline
//! (windowing, transform, bar mapping, smoothing, peak tracking) and
//! [`SpectrumEngine`] ties them together so that processing can run on an
//! audio thread while knobs are turned from a UI thread and results are read
//! from a render thread.

pub mod bars;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod output;
pub mod params;
pub mod peaks;
pub mod smoothing;
pub mod transform;
pub mod window;

pub use bars::BarLayout;
pub use config::EngineConfig;
pub use engine::SpectrumEngine;
pub use error::{Result, SpectrumError};
pub use frame::FrameAccumulator;
pub use output::{BarFrame, SpectrumReader};
pub use params::{ParameterSnapshot, ParameterStore, MAX_SMOOTHING};
pub use peaks::{GravityModel, PeakState, PeakTracker};
pub use smoothing::Smoother;
pub use transform::{SpectralTransform, MIN_FFT_SIZE};
pub use window::WindowTable;
