//! Rolling median filter.

/// Median of `samples`.
///
/// Odd lengths take the middle element; even lengths the mean of the two
/// central ones. An empty slice has median 0.
pub fn median(samples: &mut [u32]) -> u32 {
    let len = samples.len();
    if len == 0 {
        return 0;
    }
    samples.sort_unstable();
    if len % 2 == 1 {
        samples[len / 2]
    } else {
        let sum = u64::from(samples[len / 2 - 1]) + u64::from(samples[len / 2]);
        (sum / 2) as u32
    }
}

/// Fixed window of the last `N` raw samples.
///
/// Samples are written at the write index, which always stays in `0..N`.
/// Each time the window fills, the median of its `N` samples is produced and
/// writing restarts at index 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleWindow<const N: usize> {
    samples: [u32; N],
    index: usize,
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleWindow<N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "a sample window needs at least one slot") };
        Self {
            samples: [0; N],
            index: 0,
        }
    }

    /// Store a sample; returns the window median when this sample completes it.
    pub fn push(&mut self, sample: u32) -> Option<u32> {
        self.samples[self.index] = sample;
        self.index += 1;
        if self.index < N {
            return None;
        }
        self.index = 0;
        let mut sorted = self.samples;
        Some(median(&mut sorted))
    }

    /// Next write position.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn samples(&self) -> &[u32; N] {
        &self.samples
    }

    pub fn reset(&mut self) {
        self.samples = [0; N];
        self.index = 0;
    }

    /// Rebuild a window from checkpointed parts. `None` if they do not fit.
    pub fn from_parts(samples: &[u32], index: usize) -> Option<Self> {
        let samples: [u32; N] = samples.try_into().ok()?;
        (index < N).then_some(Self { samples, index })
    }
}
