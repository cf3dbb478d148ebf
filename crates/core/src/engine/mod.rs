use std::{fmt, ops::Range, sync::Arc};

use crate::{
    output::FramePublisher, BarLayout, EngineConfig, FrameAccumulator, GravityModel,
    ParameterStore, PeakTracker, Result, Smoother, SpectralTransform, SpectrumReader, WindowTable,
};

/// Real-time spectrum engine: audio samples in, bar magnitudes and falling
/// peak markers out.
///
/// Every buffer is allocated in the constructor. [`process`] runs on the audio
/// thread and never allocates, locks or blocks. Knobs live in a shared
/// [`ParameterStore`] that other threads mutate through [`parameters`], and
/// results are published to a [`SpectrumReader`] obtained once from
/// [`take_reader`].
///
/// [`process`]: SpectrumEngine::process
/// [`parameters`]: SpectrumEngine::parameters
/// [`take_reader`]: SpectrumEngine::take_reader
pub struct SpectrumEngine {
    window: WindowTable,
    frame: FrameAccumulator,
    transform: SpectralTransform,
    layout: BarLayout,
    raw_bars: Vec<f32>,
    smoother: Smoother,
    peaks: PeakTracker,
    params: Arc<ParameterStore>,
    publisher: FramePublisher,
    reader: Option<SpectrumReader>,
    reset_epoch: u64,
    frames_processed: u64,
}

impl SpectrumEngine {
    /// Creates an engine with default settings and the given transform length.
    pub fn new(fft_size: usize) -> Result<Self> {
        Self::from_config(&EngineConfig::with_fft_size(fft_size))
    }

    /// Creates an engine from a full configuration. Fails when `fft_size` is
    /// not a power of two or the transform cannot be set up.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let transform = SpectralTransform::new(config.fft_size)?;
        let fft_size = transform.size();
        let max_bars = transform.bins();

        let params = Arc::new(ParameterStore::new(config, max_bars));
        let bars = params.num_bars();
        let layout = BarLayout::new(
            max_bars,
            config.bin_width_hz(),
            config.min_frequency_hz,
            bars,
        );
        let (publisher, reader) = FramePublisher::channel(max_bars);

        let mut raw_bars = Vec::with_capacity(max_bars);
        raw_bars.resize(bars, 0.0);

        tracing::debug!(
            fft_size,
            log2n = transform.log2n(),
            bins = max_bars,
            bars,
            "spectrum engine ready"
        );

        Ok(Self {
            window: WindowTable::hann(fft_size),
            frame: FrameAccumulator::new(fft_size),
            transform,
            layout,
            raw_bars,
            smoother: Smoother::new(bars, max_bars),
            peaks: PeakTracker::new(bars, max_bars),
            reset_epoch: params.reset_epoch(),
            params,
            publisher,
            reader: Some(reader),
            frames_processed: 0,
        })
    }

    /// Feeds a chunk of mono samples and runs one analysis pass.
    ///
    /// An empty chunk is a no-op: no frame is produced and peak timers do not
    /// advance.
    pub fn process(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        let params = self.params.snapshot();
        let reset_epoch = self.params.reset_epoch();
        if reset_epoch != self.reset_epoch {
            self.reset_epoch = reset_epoch;
            self.reset_history();
        }
        if params.num_bars != self.layout.len() {
            self.apply_bar_count(params.num_bars);
        }

        self.frame.ingest(samples);
        self.window.apply(self.frame.samples(), self.transform.input_mut());
        let magnitudes = self.transform.compute();

        self.layout.aggregate(magnitudes, &mut self.raw_bars);
        self.smoother.apply(&self.raw_bars, params.gain, params.smoothing);
        self.peaks.update(
            self.smoother.values(),
            params.hold_frames,
            params.gravity,
            params.gravity_model,
        );

        self.frames_processed += 1;
        self.publisher.publish(
            self.smoother.values(),
            self.peaks.values(),
            self.frames_processed,
        );
    }

    /// Shared handle for mutating knobs from another thread.
    pub fn parameters(&self) -> Arc<ParameterStore> {
        Arc::clone(&self.params)
    }

    /// Hands out the render-side reader. Returns `None` after the first call.
    pub fn take_reader(&mut self) -> Option<SpectrumReader> {
        self.reader.take()
    }

    /// Smoothed magnitudes from the last call, one per bar.
    pub fn frequencies(&self) -> &[f32] {
        self.smoother.values()
    }

    /// Peak markers from the last call, one per bar.
    pub fn peaks(&self) -> &[f32] {
        self.peaks.values()
    }

    /// Unsmoothed, unscaled bar magnitudes from the last call.
    pub fn raw_bars(&self) -> &[f32] {
        &self.raw_bars
    }

    /// Bar count currently applied by the engine. A pending change made via
    /// [`set_num_bars`](SpectrumEngine::set_num_bars) shows up after the next
    /// [`process`](SpectrumEngine::process).
    pub fn num_bars(&self) -> usize {
        self.layout.len()
    }

    pub fn bar_ranges(&self) -> &[Range<usize>] {
        self.layout.bin_ranges()
    }

    pub fn layout(&self) -> &BarLayout {
        &self.layout
    }

    pub fn fft_size(&self) -> usize {
        self.transform.size()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn set_gain(&self, gain: f32) {
        self.params.set_gain(gain);
    }

    pub fn set_smoothing(&self, smoothing: f32) {
        self.params.set_smoothing(smoothing);
    }

    pub fn set_gravity(&self, gravity: f32) {
        self.params.set_gravity(gravity);
    }

    pub fn set_num_bars(&self, bars: i32) {
        self.params.set_num_bars(bars);
    }

    pub fn set_hold_time(&self, frames: i32) {
        self.params.set_hold_time(frames);
    }

    pub fn set_gravity_model(&self, model: GravityModel) {
        self.params.set_gravity_model(model);
    }

    /// Clears the analysis frame and all per-bar history. Parameters and the
    /// bar layout are kept.
    pub fn reset(&mut self) {
        self.frame.clear();
        self.reset_history();
    }

    fn reset_history(&mut self) {
        self.raw_bars.fill(0.0);
        self.smoother.reset();
        self.peaks.reset();
    }

    fn apply_bar_count(&mut self, bars: usize) {
        self.layout.rebuild(bars);
        let bars = self.layout.len();
        self.raw_bars.clear();
        self.raw_bars.resize(bars, 0.0);
        self.smoother.resize(bars);
        self.peaks.resize(bars);
    }
}

impl fmt::Debug for SpectrumEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumEngine")
            .field("fft_size", &self.transform.size())
            .field("bars", &self.layout.len())
            .field("params", &self.params.snapshot())
            .field("frames_processed", &self.frames_processed)
            .finish()
    }
}
