//! Stream Module
//!
//! Pass-through iterator adapters that observe a stream while it is consumed:
//! counting items and keeping head or uniform random samples.

mod counter;
mod sample;

pub use counter::StreamCounter;
pub use sample::{HeadSample, ReservoirSample};

/// Adapter constructors for any iterator.
pub trait StreamSampleExt: Iterator + Sized {
    /// Counts items as they pass.
    fn counted(self) -> StreamCounter<Self> {
        StreamCounter::new(self)
    }

    /// Keeps clones of the first `sample_size` items.
    fn head_sample(self, sample_size: usize) -> HeadSample<Self>
    where
        Self::Item: Clone,
    {
        HeadSample::new(sample_size, self)
    }

    /// Keeps a uniform random sample of `sample_size` items.
    fn reservoir_sample(self, sample_size: usize) -> ReservoirSample<Self>
    where
        Self::Item: Clone,
    {
        ReservoirSample::new(sample_size, self)
    }
}

impl<I: Iterator> StreamSampleExt for I {}
