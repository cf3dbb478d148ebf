/// Folds variable-length sample chunks into a fixed-size analysis frame.
///
/// The frame is a sliding window over the most recent `len` samples. A chunk
/// at least as long as the frame replaces it outright with its tail; a shorter
/// chunk shifts the existing samples left and is appended at the end. The
/// frame starts zeroed and never reallocates.
#[derive(Debug, Clone)]
pub struct FrameAccumulator {
    samples: Box<[f32]>,
}

impl FrameAccumulator {
    pub fn new(len: usize) -> Self {
        Self {
            samples: vec![0.0; len].into_boxed_slice(),
        }
    }

    pub fn ingest(&mut self, incoming: &[f32]) {
        let len = self.samples.len();
        let count = incoming.len();
        if count == 0 || len == 0 {
            return;
        }

        if count >= len {
            self.samples.copy_from_slice(&incoming[count - len..]);
        } else {
            self.samples.copy_within(count.., 0);
            self.samples[len - count..].copy_from_slice(incoming);
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let frame = FrameAccumulator::new(8);
        assert_eq!(frame.samples(), &[0.0; 8]);
    }

    #[test]
    fn short_chunks_slide_in_at_the_tail() {
        let mut frame = FrameAccumulator::new(4);
        frame.ingest(&[1.0, 2.0]);
        assert_eq!(frame.samples(), &[0.0, 0.0, 1.0, 2.0]);

        frame.ingest(&[3.0]);
        assert_eq!(frame.samples(), &[0.0, 1.0, 2.0, 3.0]);

        frame.ingest(&[4.0, 5.0, 6.0]);
        assert_eq!(frame.samples(), &[3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn long_chunks_keep_only_the_most_recent_samples() {
        let mut frame = FrameAccumulator::new(4);
        frame.ingest(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(frame.samples(), &[3.0, 4.0, 5.0, 6.0]);

        frame.ingest(&[7.0, 8.0, 9.0, 10.0]);
        assert_eq!(frame.samples(), &[7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn empty_chunk_is_a_no_op() {
        let mut frame = FrameAccumulator::new(3);
        frame.ingest(&[1.0, 2.0, 3.0]);
        frame.ingest(&[]);
        assert_eq!(frame.samples(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn clear_zeroes_the_frame() {
        let mut frame = FrameAccumulator::new(3);
        frame.ingest(&[1.0, 2.0, 3.0]);
        frame.clear();
        assert_eq!(frame.samples(), &[0.0; 3]);
    }
}
