// Page renderer - Render callback bridge between pages and an audio output
//
// Each time the output asks for audio, the renderer copies out of its current
// page and pulls the next page when that one is exhausted. Pulling a page
// also derives its haptic parameters and publishes them for the dispatcher.
//
// Everything here runs on the real-time thread: the page scratch buffer is
// allocated up front, the page buffer is only try_lock'ed, and contention or
// an empty buffer produce silence.

use std::sync::Arc;

use crate::analysis::DerivationStrategy;
use crate::audio::page::SharedPageBuffer;
use crate::haptics::ParameterSlot;

pub struct PageRenderer {
    pages: SharedPageBuffer,
    parameters: Arc<ParameterSlot>,
    strategy: DerivationStrategy,
    scratch: Vec<f32>,
    filled: usize,
    read: usize,
}

impl PageRenderer {
    pub fn new(
        pages: SharedPageBuffer,
        parameters: Arc<ParameterSlot>,
        strategy: DerivationStrategy,
        page_size: usize,
    ) -> Self {
        Self {
            pages,
            parameters,
            strategy,
            scratch: vec![0.0; page_size.max(1)],
            filled: 0,
            read: 0,
        }
    }

    /// Fill `out` with page audio, pulling pages as needed
    pub fn render(&mut self, out: &mut [f32]) {
        let mut written = 0;
        while written < out.len() {
            if self.read == self.filled && !self.pull_page() {
                out[written..].fill(0.0);
                return;
            }

            let n = (out.len() - written).min(self.filled - self.read);
            out[written..written + n].copy_from_slice(&self.scratch[self.read..self.read + n]);
            written += n;
            self.read += n;
        }
    }

    /// Copy the next page into scratch and publish its parameters.
    /// Returns false when no page is available right now.
    fn pull_page(&mut self) -> bool {
        let Ok(mut pages) = self.pages.try_lock() else {
            return false;
        };

        let page = pages.next_page();
        if page.is_empty() {
            return false;
        }

        // A page never exceeds the page size the scratch was built with,
        // unless the buffer was rebuilt with a bigger one
        let len = page.len().min(self.scratch.len());
        self.scratch[..len].copy_from_slice(&page[..len]);
        drop(pages);

        self.filled = len;
        self.read = 0;
        self.parameters
            .publish(self.strategy.derive(&self.scratch[..len]));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::HapticParameters;
    use crate::audio::page::PageBuffer;
    use crate::audio::sample_buffer::SampleBuffer;
    use std::sync::Mutex;

    fn shared(samples: Vec<f32>, page_size: usize) -> SharedPageBuffer {
        let buffer = SampleBuffer::new(samples, 48000).unwrap();
        Arc::new(Mutex::new(PageBuffer::with_samples(buffer, page_size)))
    }

    #[test]
    fn test_renders_pages_across_callback_boundaries() {
        let samples: Vec<f32> = (0..8).map(|i| i as f32 / 10.0).collect();
        let slot = Arc::new(ParameterSlot::new());
        let mut renderer = PageRenderer::new(
            shared(samples.clone(), 4),
            Arc::clone(&slot),
            DerivationStrategy::PagePick,
            4,
        );

        let mut out = [0.0f32; 3];
        renderer.render(&mut out);
        assert_eq!(out, [0.0, 0.1, 0.2]);
        renderer.render(&mut out);
        assert_eq!(out, [0.3, 0.4, 0.5]);
        renderer.render(&mut out);
        // Wraps back to the first page
        assert_eq!(out, [0.6, 0.7, 0.0]);

        assert_eq!(slot.sequence(), 3);
    }

    #[test]
    fn test_empty_buffer_renders_silence() {
        let slot = Arc::new(ParameterSlot::new());
        let pages = Arc::new(Mutex::new(PageBuffer::new(1024)));
        let mut renderer =
            PageRenderer::new(pages, Arc::clone(&slot), DerivationStrategy::PagePick, 1024);

        let mut out = [1.0f32; 256];
        renderer.render(&mut out);
        assert!(out.iter().all(|s| *s == 0.0));
        assert_eq!(slot.sequence(), 0);
    }

    #[test]
    fn test_contention_renders_silence() {
        let slot = Arc::new(ParameterSlot::new());
        let pages = shared(vec![0.5; 64], 16);
        let mut renderer =
            PageRenderer::new(Arc::clone(&pages), slot, DerivationStrategy::PagePick, 16);

        let guard = pages.lock().unwrap();
        let mut out = [1.0f32; 8];
        renderer.render(&mut out);
        assert!(out.iter().all(|s| *s == 0.0));
        drop(guard);

        renderer.render(&mut out);
        assert!(out.iter().all(|s| *s == 0.5));
    }

    #[test]
    fn test_publishes_page_parameters() {
        let slot = Arc::new(ParameterSlot::new());
        let mut renderer = PageRenderer::new(
            shared(vec![1.0, -1.0, 1.0, -1.0], 4),
            Arc::clone(&slot),
            DerivationStrategy::WholeBuffer,
            4,
        );

        let mut out = [0.0f32; 4];
        renderer.render(&mut out);
        assert_eq!(slot.latest(), HapticParameters::new(1.0, 0.5));
    }
}
