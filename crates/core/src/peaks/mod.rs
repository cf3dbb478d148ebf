use serde::{Deserialize, Serialize};

/// How a released peak marker falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GravityModel {
    /// Falls by `gravity` every call.
    #[default]
    Linear,
    /// Falls by `gravity * n` on the n-th call since the hold expired.
    Accelerating,
}

impl GravityModel {
    pub(crate) fn to_raw(self) -> u8 {
        match self {
            GravityModel::Linear => 0,
            GravityModel::Accelerating => 1,
        }
    }

    pub(crate) fn from_raw(raw: u8) -> Self {
        match raw {
            1 => GravityModel::Accelerating,
            _ => GravityModel::Linear,
        }
    }

    fn drop_for(self, gravity: f32, frames_falling: u32) -> f32 {
        match self {
            GravityModel::Linear => gravity,
            GravityModel::Accelerating => gravity * frames_falling as f32,
        }
    }
}

/// Observable state of one bar's peak marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakState {
    /// The hold timer is still running and the marker is fixed.
    Holding,
    /// The timer expired; the marker falls toward the current value.
    Falling,
}

#[derive(Debug, Clone, Copy, Default)]
struct PeakCell {
    value: f32,
    hold_remaining: u32,
    frames_falling: u32,
}

/// Falling-cap markers: each bar's peak holds for a number of calls after it
/// is set, then falls under gravity but never below the bar's current value.
#[derive(Debug, Clone)]
pub struct PeakTracker {
    cells: Vec<PeakCell>,
    values: Vec<f32>,
}

impl PeakTracker {
    pub fn new(bars: usize, capacity: usize) -> Self {
        let capacity = capacity.max(bars);
        let mut tracker = Self {
            cells: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        };
        tracker.resize(bars);
        tracker
    }

    /// Advances every marker by one call given the bars' current values.
    pub fn update(&mut self, current: &[f32], hold_frames: u32, gravity: f32, model: GravityModel) {
        debug_assert_eq!(current.len(), self.cells.len());

        for ((cell, out), &value) in self.cells.iter_mut().zip(&mut self.values).zip(current) {
            if value > cell.value {
                cell.value = value;
                cell.hold_remaining = hold_frames;
                cell.frames_falling = 0;
            } else if cell.hold_remaining > 0 {
                cell.hold_remaining -= 1;
            } else {
                cell.frames_falling = cell.frames_falling.saturating_add(1);
                let fallen = cell.value - model.drop_for(gravity, cell.frames_falling);
                if fallen <= value {
                    cell.value = value;
                    cell.frames_falling = 0;
                } else {
                    cell.value = fallen;
                }
            }
            *out = cell.value;
        }
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn state(&self, bar: usize) -> Option<PeakState> {
        self.cells.get(bar).map(|cell| {
            if cell.hold_remaining > 0 {
                PeakState::Holding
            } else {
                PeakState::Falling
            }
        })
    }

    pub fn resize(&mut self, bars: usize) {
        self.cells.clear();
        self.cells.resize(bars, PeakCell::default());
        self.values.clear();
        self.values.resize(bars, 0.0);
    }

    pub fn reset(&mut self) {
        self.cells.fill(PeakCell::default());
        self.values.fill(0.0);
    }
}
