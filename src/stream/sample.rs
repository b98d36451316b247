//! Head and reservoir samplers.

use rand::rngs::ThreadRng;
use rand::Rng;

// == Head Sample ==
/// Iterator pass-through keeping clones of the first `sample_size` items.
#[derive(Debug, Clone)]
pub struct HeadSample<I: Iterator> {
    inner: I,
    sample_size: usize,
    sample: Vec<I::Item>,
}

impl<I> HeadSample<I>
where
    I: Iterator,
    I::Item: Clone,
{
    pub fn new(sample_size: usize, inner: I) -> Self {
        Self {
            inner,
            sample_size,
            sample: Vec::with_capacity(sample_size),
        }
    }

    pub fn sample(&self) -> &[I::Item] {
        &self.sample
    }

    pub fn into_sample(self) -> Vec<I::Item> {
        self.sample
    }
}

impl<I> Iterator for HeadSample<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        if self.sample.len() < self.sample_size {
            self.sample.push(item.clone());
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

// == Reservoir Sample ==
/// Iterator pass-through keeping a uniform random sample of `sample_size`
/// items (Algorithm R).
///
/// The first `sample_size` items fill the reservoir. After that the n-th item
/// (1-based) replaces slot `j`, drawn uniformly from `0..n`, when
/// `j < sample_size`, so every item seen so far is retained with equal
/// probability `sample_size / n`.
#[derive(Debug, Clone)]
pub struct ReservoirSample<I: Iterator, R = ThreadRng> {
    inner: I,
    sample_size: usize,
    seen: usize,
    sample: Vec<I::Item>,
    rng: R,
}

impl<I> ReservoirSample<I, ThreadRng>
where
    I: Iterator,
    I::Item: Clone,
{
    pub fn new(sample_size: usize, inner: I) -> Self {
        Self::with_rng(sample_size, inner, rand::rng())
    }
}

impl<I, R> ReservoirSample<I, R>
where
    I: Iterator,
    I::Item: Clone,
    R: Rng,
{
    pub fn with_rng(sample_size: usize, inner: I, rng: R) -> Self {
        Self {
            inner,
            sample_size,
            seen: 0,
            sample: Vec::with_capacity(sample_size),
            rng,
        }
    }

    pub fn sample(&self) -> &[I::Item] {
        &self.sample
    }

    pub fn into_sample(self) -> Vec<I::Item> {
        self.sample
    }

    /// Items yielded so far.
    pub fn seen(&self) -> usize {
        self.seen
    }
}

impl<I, R> Iterator for ReservoirSample<I, R>
where
    I: Iterator,
    I::Item: Clone,
    R: Rng,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        self.seen += 1;
        if self.sample.len() < self.sample_size {
            self.sample.push(item.clone());
        } else {
            let slot = self.rng.random_range(0..self.seen);
            if slot < self.sample_size {
                self.sample[slot] = item.clone();
            }
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_head_sample_keeps_first_items() {
        let mut head = HeadSample::new(3, 0..10);
        let passed: Vec<i32> = head.by_ref().collect();

        assert_eq!(passed, (0..10).collect::<Vec<_>>());
        assert_eq!(head.sample(), &[0, 1, 2]);
    }

    #[test]
    fn test_head_sample_short_stream() {
        let mut head = HeadSample::new(5, 0..2);
        head.by_ref().for_each(drop);
        assert_eq!(head.into_sample(), vec![0, 1]);
    }

    #[test]
    fn test_reservoir_short_stream_keeps_everything() {
        let mut reservoir = ReservoirSample::new(10, 0..4);
        reservoir.by_ref().for_each(drop);

        assert_eq!(reservoir.seen(), 4);
        assert_eq!(reservoir.sample(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_reservoir_bounded_and_drawn_from_stream() {
        let rng = StdRng::seed_from_u64(7);
        let mut reservoir = ReservoirSample::with_rng(5, 0..1000, rng);
        let passed = reservoir.by_ref().count();

        assert_eq!(passed, 1000);
        assert_eq!(reservoir.sample().len(), 5);
        assert!(reservoir.sample().iter().all(|item| (0..1000).contains(item)));
    }

    #[test]
    fn test_reservoir_zero_size() {
        let mut reservoir = ReservoirSample::new(0, 0..100);
        reservoir.by_ref().for_each(drop);
        assert!(reservoir.sample().is_empty());
    }

    #[test]
    fn test_reservoir_is_roughly_uniform() {
        // Each of 10 items should land in a 1-slot reservoir about 10% of the time
        let mut hits = [0u32; 10];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let mut reservoir = ReservoirSample::with_rng(1, 0..10usize, &mut rng);
            reservoir.by_ref().for_each(drop);
            hits[reservoir.sample()[0]] += 1;
        }
        for count in hits {
            assert!((800..1200).contains(&count), "skewed count {}", count);
        }
    }
}
