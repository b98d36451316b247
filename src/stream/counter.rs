//! Stream Counter Module
//!
//! Counts the items of a stream as they are consumed.

/// Iterator pass-through counting consumed items.
#[derive(Debug, Clone)]
pub struct StreamCounter<I> {
    inner: I,
    count: usize,
}

impl<I> StreamCounter<I> {
    pub fn new(inner: I) -> Self {
        Self { inner, count: 0 }
    }

    /// Items yielded so far.
    pub fn consumed(&self) -> usize {
        self.count
    }

    pub fn get_ref(&self) -> &I {
        &self.inner
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Iterator> Iterator for StreamCounter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        self.count += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_consumed_items() {
        let mut counter = StreamCounter::new(vec!["a", "b", "c"].into_iter());
        assert_eq!(counter.consumed(), 0);

        assert_eq!(counter.next(), Some("a"));
        assert_eq!(counter.consumed(), 1);

        let rest: Vec<_> = counter.by_ref().collect();
        assert_eq!(rest, vec!["b", "c"]);
        assert_eq!(counter.consumed(), 3);

        // Exhausted: further calls do not count
        assert_eq!(counter.next(), None);
        assert_eq!(counter.consumed(), 3);
    }
}
