use std::ops::Range;

/// Logarithmic assignment of visual bars to linear transform bins.
///
/// Bar edges are interpolated exponentially between a low bound bin (the bin
/// holding the configured minimum frequency) and the Nyquist bin, so low
/// frequencies receive more bars. The first bar always starts at bin 0 and the
/// last ends at `bins`, and every bar owns at least one bin: the ranges form a
/// contiguous, non-overlapping partition of `[0, bins)`.
#[derive(Debug, Clone)]
pub struct BarLayout {
    bins: usize,
    low_bin: f32,
    bin_width_hz: f32,
    ranges: Vec<Range<usize>>,
}

impl BarLayout {
    /// Creates a layout over `bins` magnitude bins. Storage for the maximum
    /// bar count (`bins`) is reserved up front so [`rebuild`] never allocates.
    ///
    /// [`rebuild`]: BarLayout::rebuild
    pub fn new(bins: usize, bin_width_hz: f32, min_frequency_hz: f32, num_bars: usize) -> Self {
        let bins = bins.max(1);
        let low_bin = if bin_width_hz > 0.0 {
            (min_frequency_hz / bin_width_hz).clamp(1.0, bins as f32)
        } else {
            1.0
        };

        let mut layout = Self {
            bins,
            low_bin,
            bin_width_hz,
            ranges: Vec::with_capacity(bins),
        };
        layout.rebuild(num_bars);
        layout
    }

    /// Recomputes the bin ranges for `num_bars` bars, clamped to `[1, bins]`.
    pub fn rebuild(&mut self, num_bars: usize) {
        let count = num_bars.clamp(1, self.bins);
        let ratio = self.bins as f32 / self.low_bin;

        self.ranges.clear();
        let mut start = 0;
        for bar in 0..count {
            let remaining = count - bar - 1;
            let end = if remaining == 0 {
                self.bins
            } else {
                let exponent = (bar + 1) as f32 / count as f32;
                let edge = (self.low_bin * ratio.powf(exponent)).round() as usize;
                // Collapsed bars take the next bin; later bars keep room for one bin each.
                edge.max(start + 1).min(self.bins - remaining)
            };
            self.ranges.push(start..end);
            start = end;
        }

        debug_assert_eq!(self.ranges.len(), count);
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    pub fn bin_ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Frequency span `[low, high)` in Hz covered by `bar`.
    pub fn frequency_range_hz(&self, bar: usize) -> Option<(f32, f32)> {
        self.ranges.get(bar).map(|range| {
            (
                range.start as f32 * self.bin_width_hz,
                range.end as f32 * self.bin_width_hz,
            )
        })
    }

    /// Index of the bar whose range contains `bin`.
    pub fn bar_for_bin(&self, bin: usize) -> Option<usize> {
        self.ranges.iter().position(|range| range.contains(&bin))
    }

    /// Writes the maximum magnitude of each bar's bins into `out`.
    pub fn aggregate(&self, magnitudes: &[f32], out: &mut [f32]) {
        debug_assert_eq!(magnitudes.len(), self.bins);
        debug_assert_eq!(out.len(), self.ranges.len());

        for (slot, range) in out.iter_mut().zip(&self.ranges) {
            *slot = magnitudes[range.clone()]
                .iter()
                .copied()
                .fold(0.0, f32::max);
        }
    }
}
