use std::fmt;

use triple_buffer::{Input, Output, TripleBuffer};

/// One published result: smoothed bar magnitudes and their peak markers.
///
/// Both slices always have the bar count that was active when the frame was
/// produced.
#[derive(Debug, Default, PartialEq)]
pub struct BarFrame {
    magnitudes: Vec<f32>,
    peaks: Vec<f32>,
    frame_index: u64,
}

impl BarFrame {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            magnitudes: Vec::with_capacity(capacity),
            peaks: Vec::with_capacity(capacity),
            frame_index: 0,
        }
    }

    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    pub fn peaks(&self) -> &[f32] {
        &self.peaks
    }

    pub fn num_bars(&self) -> usize {
        self.magnitudes.len()
    }

    /// Number of processing calls that preceded this frame, starting at 1.
    /// Zero means nothing has been published yet.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    fn fill(&mut self, magnitudes: &[f32], peaks: &[f32], frame_index: u64) {
        self.magnitudes.clear();
        self.magnitudes.extend_from_slice(magnitudes);
        self.peaks.clear();
        self.peaks.extend_from_slice(peaks);
        self.frame_index = frame_index;
    }
}

// The triple buffer clones its seed into every slot; keeping the capacity lets
// the publisher resize slots in place later.
impl Clone for BarFrame {
    fn clone(&self) -> Self {
        let mut frame = Self::with_capacity(self.magnitudes.capacity());
        frame.fill(&self.magnitudes, &self.peaks, self.frame_index);
        frame
    }
}

/// Audio-side half of the output channel.
pub(crate) struct FramePublisher {
    input: Input<BarFrame>,
}

impl FramePublisher {
    /// Creates a connected publisher/reader pair whose frames can hold up to
    /// `max_bars` bars without reallocating.
    pub(crate) fn channel(max_bars: usize) -> (Self, SpectrumReader) {
        let (input, output) = TripleBuffer::new(&BarFrame::with_capacity(max_bars)).split();
        (Self { input }, SpectrumReader { output })
    }

    pub(crate) fn publish(&mut self, magnitudes: &[f32], peaks: &[f32], frame_index: u64) {
        debug_assert_eq!(magnitudes.len(), peaks.len());
        self.input
            .input_buffer_mut()
            .fill(magnitudes, peaks, frame_index);
        self.input.publish();
    }
}

impl fmt::Debug for FramePublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FramePublisher").finish()
    }
}

/// Render-side handle that always observes a complete [`BarFrame`].
///
/// Reading never blocks the audio thread. A read returns the most recently
/// published frame, or the previous one again if nothing new arrived.
pub struct SpectrumReader {
    output: Output<BarFrame>,
}

impl SpectrumReader {
    pub fn read(&mut self) -> &BarFrame {
        self.output.read()
    }

    /// Copies the latest frame's bars into caller-owned buffers and returns
    /// its frame index.
    pub fn copy_into(&mut self, magnitudes: &mut Vec<f32>, peaks: &mut Vec<f32>) -> u64 {
        let frame = self.output.read();
        magnitudes.clear();
        magnitudes.extend_from_slice(frame.magnitudes());
        peaks.clear();
        peaks.extend_from_slice(frame.peaks());
        frame.frame_index()
    }
}

impl fmt::Debug for SpectrumReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumReader").finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn clone_preserves_capacity() {
        let frame = BarFrame::with_capacity(64);
        let copy = frame.clone();
        assert!(copy.magnitudes.capacity() >= 64);
        assert!(copy.peaks.capacity() >= 64);
    }

    #[test]
    fn reader_starts_empty() {
        let (_publisher, mut reader) = FramePublisher::channel(8);
        let frame = reader.read();
        assert_eq!(frame.num_bars(), 0);
        assert_eq!(frame.frame_index(), 0);
    }

    #[test]
    fn reader_sees_latest_frame() {
        let (mut publisher, mut reader) = FramePublisher::channel(8);
        publisher.publish(&[1.0, 2.0], &[3.0, 4.0], 1);
        publisher.publish(&[5.0, 6.0, 7.0], &[8.0, 9.0, 10.0], 2);

        let frame = reader.read();
        assert_eq!(frame.magnitudes(), &[5.0, 6.0, 7.0]);
        assert_eq!(frame.peaks(), &[8.0, 9.0, 10.0]);
        assert_eq!(frame.frame_index(), 2);
    }

    #[test]
    fn copy_into_replaces_caller_buffers() {
        let (mut publisher, mut reader) = FramePublisher::channel(4);
        publisher.publish(&[0.5], &[0.75], 7);

        let mut magnitudes = vec![9.0; 3];
        let mut peaks = Vec::new();
        let index = reader.copy_into(&mut magnitudes, &mut peaks);

        assert_eq!(index, 7);
        assert_eq!(magnitudes, vec![0.5]);
        assert_eq!(peaks, vec![0.75]);
    }

    #[test]
    fn frames_are_never_torn_across_threads() {
        let (mut publisher, mut reader) = FramePublisher::channel(16);

        let producer = thread::spawn(move || {
            for index in 1..=2_000_u64 {
                let bars = 1 + (index as usize % 16);
                let value = index as f32;
                let magnitudes = vec![value; bars];
                let peaks = vec![value + 0.5; bars];
                publisher.publish(&magnitudes, &peaks, index);
            }
        });

        let mut last_index = 0;
        for _ in 0..2_000 {
            let frame = reader.read();
            let index = frame.frame_index();
            assert!(index >= last_index);
            if index > 0 {
                let value = index as f32;
                assert_eq!(frame.num_bars(), 1 + (index as usize % 16));
                assert!(frame.magnitudes().iter().all(|&m| m == value));
                assert!(frame.peaks().iter().all(|&p| p == value + 0.5));
            }
            last_index = index;
        }

        producer.join().unwrap();
        assert_eq!(reader.read().frame_index(), 2_000);
    }
}
