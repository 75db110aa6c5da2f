// Page buffer - Fixed-size page cursor over the decoded samples
//
// Pages are the unit of playback and parameter cadence. The cursor loops back
// to page 0 once the next page would start past the end of the buffer.
//
// next_page() is called from the render callback: index arithmetic and a
// slice only, no allocation.

use std::sync::{Arc, Mutex};

use crate::audio::sample_buffer::SampleBuffer;

pub const DEFAULT_PAGE_SIZE: usize = 1024;

/// Page buffer shared between the controller and the render callback.
///
/// The render side only ever calls `try_lock` on it.
pub type SharedPageBuffer = Arc<Mutex<PageBuffer>>;

#[derive(Debug)]
pub struct PageBuffer {
    samples: SampleBuffer,
    page_size: usize,
    cursor: usize,
}

impl PageBuffer {
    /// Create an empty page buffer (a page size of 0 is treated as 1)
    pub fn new(page_size: usize) -> Self {
        Self {
            samples: SampleBuffer::empty(),
            page_size: page_size.max(1),
            cursor: 0,
        }
    }

    pub fn with_samples(samples: SampleBuffer, page_size: usize) -> Self {
        let mut buffer = Self::new(page_size);
        buffer.samples = samples;
        buffer
    }

    pub fn shared(page_size: usize) -> SharedPageBuffer {
        Arc::new(Mutex::new(Self::new(page_size)))
    }

    /// Return the current page and advance the cursor
    #[inline]
    pub fn next_page(&mut self) -> &[f32] {
        let len = self.samples.len();
        if len == 0 {
            self.cursor = 0;
            return &[];
        }

        let start = self.cursor * self.page_size;
        let end = (start + self.page_size).min(len);

        self.cursor += 1;
        if self.cursor * self.page_size >= len {
            self.cursor = 0;
        }

        &self.samples.as_slice()[start..end]
    }

    /// Install a new buffer and rewind. The previous buffer is returned so it
    /// can be dropped after the lock is released.
    pub fn replace(&mut self, samples: SampleBuffer) -> SampleBuffer {
        self.cursor = 0;
        std::mem::replace(&mut self.samples, samples)
    }

    /// Rewind and clear, handing back the previous buffer
    pub fn reset(&mut self) -> SampleBuffer {
        self.replace(SampleBuffer::empty())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages in one loop, the last one possibly partial
    pub fn page_count(&self) -> usize {
        self.samples.len().div_ceil(self.page_size)
    }

    pub fn samples(&self) -> &SampleBuffer {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> SampleBuffer {
        let samples = (0..len).map(|i| i as f32 / len.max(1) as f32).collect();
        SampleBuffer::new(samples, 48000).unwrap()
    }

    #[test]
    fn test_two_full_pages_then_wrap() {
        let mut pages = PageBuffer::with_samples(ramp(2048), 1024);

        let first = pages.next_page().to_vec();
        let second = pages.next_page().to_vec();
        let third = pages.next_page().to_vec();

        assert_eq!(first.len(), 1024);
        assert_eq!(second.len(), 1024);
        assert_eq!(first[0], 0.0);
        assert_eq!(second[0], 1024.0 / 2048.0);
        assert_eq!(first, third);
    }

    #[test]
    fn test_partial_last_page() {
        let mut pages = PageBuffer::with_samples(ramp(2500), 1024);

        assert_eq!(pages.page_count(), 3);
        assert_eq!(pages.next_page().len(), 1024);
        assert_eq!(pages.next_page().len(), 1024);
        assert_eq!(pages.next_page().len(), 452);
        assert_eq!(pages.cursor(), 0);
        assert_eq!(pages.next_page().len(), 1024);
    }

    #[test]
    fn test_empty_buffer_returns_empty_page() {
        let mut pages = PageBuffer::new(1024);
        for _ in 0..10 {
            assert!(pages.next_page().is_empty());
            assert_eq!(pages.cursor(), 0);
        }
    }

    #[test]
    fn test_short_buffer_repeats_single_page() {
        let mut pages = PageBuffer::with_samples(ramp(100), 1024);
        let first = pages.next_page().to_vec();
        assert_eq!(first.len(), 100);
        for _ in 0..5 {
            assert_eq!(pages.next_page(), first.as_slice());
        }
    }

    #[test]
    fn test_replace_rewinds_and_returns_old() {
        let mut pages = PageBuffer::with_samples(ramp(4096), 1024);
        pages.next_page();
        pages.next_page();
        assert_eq!(pages.cursor(), 2);

        let old = pages.replace(ramp(10));
        assert_eq!(old.len(), 4096);
        assert_eq!(pages.cursor(), 0);
        assert_eq!(pages.next_page().len(), 10);
    }

    #[test]
    fn test_reset_clears() {
        let mut pages = PageBuffer::with_samples(ramp(3000), 1024);
        pages.next_page();
        let old = pages.reset();
        assert_eq!(old.len(), 3000);
        assert!(pages.is_empty());
        assert_eq!(pages.cursor(), 0);
        assert!(pages.next_page().is_empty());
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let pages = PageBuffer::new(0);
        assert_eq!(pages.page_size(), 1);
    }
}
