use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::{EngineConfig, GravityModel};

/// Upper bound for the smoothing factor. A factor of exactly 1 would freeze
/// the output forever, so the open interval `[0, 1)` is closed just below 1.
pub const MAX_SMOOTHING: f32 = 1.0 - f32::EPSILON;

/// `f32` stored as raw bits so it can be shared without a lock.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Plain copy of every knob, read once at the start of a processing call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterSnapshot {
    pub gain: f32,
    pub smoothing: f32,
    pub gravity: f32,
    pub hold_frames: u32,
    pub num_bars: usize,
    pub gravity_model: GravityModel,
}

/// User-tunable knobs shared between the control thread and the audio thread.
///
/// Every knob is an independent atomic. Setters never block and never fail:
/// out-of-range input is clamped to the nearest valid value. The audio thread
/// observes changes at the start of its next processing call.
#[derive(Debug)]
pub struct ParameterStore {
    gain: AtomicF32,
    smoothing: AtomicF32,
    gravity: AtomicF32,
    hold_frames: AtomicU32,
    num_bars: AtomicUsize,
    gravity_model: AtomicU8,
    reset_epoch: AtomicU64,
    max_bars: usize,
}

impl ParameterStore {
    /// Creates a store whose bar count is bounded by `max_bars` (the number
    /// of magnitude bins). Initial values come from `config` and are clamped.
    pub fn new(config: &EngineConfig, max_bars: usize) -> Self {
        let store = Self {
            gain: AtomicF32::new(0.0),
            smoothing: AtomicF32::new(0.0),
            gravity: AtomicF32::new(0.0),
            hold_frames: AtomicU32::new(config.peak_hold_frames),
            num_bars: AtomicUsize::new(config.num_bars.clamp(1, max_bars.max(1))),
            gravity_model: AtomicU8::new(config.gravity_model.to_raw()),
            reset_epoch: AtomicU64::new(0),
            max_bars: max_bars.max(1),
        };
        store.set_gain(config.gain);
        store.set_smoothing(config.smoothing);
        store.set_gravity(config.gravity);
        store
    }

    pub fn gain(&self) -> f32 {
        self.gain.load()
    }

    /// Sets the linear gain. Any finite value is accepted.
    pub fn set_gain(&self, gain: f32) {
        if !gain.is_finite() {
            tracing::warn!(gain, "ignoring non-finite gain");
            return;
        }
        self.gain.store(gain);
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing.load()
    }

    /// Sets the smoothing factor, clamped to `[0, MAX_SMOOTHING]`.
    pub fn set_smoothing(&self, smoothing: f32) {
        if smoothing.is_nan() {
            tracing::warn!("ignoring NaN smoothing factor");
            return;
        }
        self.smoothing.store(smoothing.clamp(0.0, MAX_SMOOTHING));
    }

    pub fn gravity(&self) -> f32 {
        self.gravity.load()
    }

    /// Sets the peak fall rate, clamped to `[0, f32::MAX]`.
    pub fn set_gravity(&self, gravity: f32) {
        if gravity.is_nan() {
            tracing::warn!("ignoring NaN gravity");
            return;
        }
        self.gravity.store(gravity.clamp(0.0, f32::MAX));
    }

    pub fn hold_frames(&self) -> u32 {
        self.hold_frames.load(Ordering::Relaxed)
    }

    /// Sets how many calls a peak stays fixed. Negative values become 0.
    pub fn set_hold_time(&self, frames: i32) {
        self.hold_frames.store(frames.max(0) as u32, Ordering::Relaxed);
    }

    pub fn num_bars(&self) -> usize {
        self.num_bars.load(Ordering::Relaxed)
    }

    pub fn max_bars(&self) -> usize {
        self.max_bars
    }

    /// Requests a new bar count, clamped to `[1, max_bars]`.
    ///
    /// The audio thread rebuilds the bar layout at its next call and resets
    /// the smoothed and peak history of every bar.
    pub fn set_num_bars(&self, bars: i32) {
        let clamped = (bars.max(1) as usize).min(self.max_bars);
        let previous = self.num_bars.swap(clamped, Ordering::Relaxed);
        if previous != clamped {
            tracing::debug!(previous, bars = clamped, "bar count change requested");
        }
    }

    pub fn gravity_model(&self) -> GravityModel {
        GravityModel::from_raw(self.gravity_model.load(Ordering::Relaxed))
    }

    pub fn set_gravity_model(&self, model: GravityModel) {
        self.gravity_model.store(model.to_raw(), Ordering::Relaxed);
    }

    /// Asks the audio thread to clear all per-bar history at its next call.
    pub fn request_reset(&self) {
        self.reset_epoch.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn reset_epoch(&self) -> u64 {
        self.reset_epoch.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            gain: self.gain(),
            smoothing: self.smoothing(),
            gravity: self.gravity(),
            hold_frames: self.hold_frames(),
            num_bars: self.num_bars(),
            gravity_model: self.gravity_model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    fn store() -> ParameterStore {
        ParameterStore::new(&EngineConfig::default(), 512)
    }

    #[test]
    fn starts_from_config_values() {
        let snapshot = store().snapshot();

        assert_eq!(snapshot.gain, 20.0);
        assert_eq!(snapshot.smoothing, 0.70);
        assert_eq!(snapshot.gravity, 0.005);
        assert_eq!(snapshot.hold_frames, 30);
        assert_eq!(snapshot.num_bars, 32);
        assert_eq!(snapshot.gravity_model, GravityModel::Linear);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let params = store();

        params.set_smoothing(1.5);
        assert_eq!(params.smoothing(), MAX_SMOOTHING);
        assert!(params.smoothing() < 1.0);
        params.set_smoothing(-0.2);
        assert_eq!(params.smoothing(), 0.0);

        params.set_gravity(-3.0);
        assert_eq!(params.gravity(), 0.0);
        params.set_gravity(f32::INFINITY);
        assert_eq!(params.gravity(), f32::MAX);

        params.set_hold_time(-7);
        assert_eq!(params.hold_frames(), 0);

        params.set_num_bars(0);
        assert_eq!(params.num_bars(), 1);
        params.set_num_bars(-4);
        assert_eq!(params.num_bars(), 1);
        params.set_num_bars(10_000);
        assert_eq!(params.num_bars(), 512);
    }

    #[test]
    fn ignores_non_finite_input() {
        let params = store();

        params.set_gain(f32::NAN);
        params.set_gain(f32::INFINITY);
        params.set_smoothing(f32::NAN);
        params.set_gravity(f32::NAN);

        assert_eq!(params.gain(), 20.0);
        assert_eq!(params.smoothing(), 0.70);
        assert_eq!(params.gravity(), 0.005);
    }

    #[test]
    fn negative_gain_is_stored_as_given() {
        let params = store();
        params.set_gain(-2.0);
        assert_eq!(params.gain(), -2.0);
    }

    #[test]
    fn config_values_are_clamped_on_construction() {
        let config = EngineConfig {
            smoothing: 4.0,
            gravity: -1.0,
            num_bars: 0,
            ..Default::default()
        };
        let params = ParameterStore::new(&config, 16);

        assert_eq!(params.smoothing(), MAX_SMOOTHING);
        assert_eq!(params.gravity(), 0.0);
        assert_eq!(params.num_bars(), 1);
    }

    #[test]
    fn updates_are_visible_across_threads() {
        let params = Arc::new(store());
        let writer = Arc::clone(&params);

        thread::spawn(move || {
            writer.set_gain(3.5);
            writer.set_num_bars(8);
            writer.set_gravity_model(GravityModel::Accelerating);
            writer.request_reset();
        })
        .join()
        .unwrap();

        assert_eq!(params.gain(), 3.5);
        assert_eq!(params.num_bars(), 8);
        assert_eq!(params.gravity_model(), GravityModel::Accelerating);
        assert_eq!(params.reset_epoch(), 1);
    }
}
