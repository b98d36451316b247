//! Single-Layer Cache Module
//!
//! Read-through composition of a base store and a cache layer.

use std::collections::HashSet;
use std::hash::Hash;

use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::{ReadStore, ReadWriteStore};

// == Single Layer Cache ==
/// A read store that serves keys from `layer` first and falls back to `base`.
///
/// Values found in the base are written back to the layer. Each `mget` makes at
/// most one batched call to `layer.mget`, one to `base.mget` and one to
/// `layer.mset`, whatever the number of keys.
///
/// Failures of either store propagate; an unavailable layer is never bypassed.
#[derive(Debug, Clone)]
pub struct SingleLayerCache<B, L> {
    base: B,
    layer: L,
}

impl<B, L> SingleLayerCache<B, L> {
    pub fn new(base: B, layer: L) -> Self {
        Self { base, layer }
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn layer(&self) -> &L {
        &self.layer
    }

    pub fn into_parts(self) -> (B, L) {
        (self.base, self.layer)
    }
}

impl<K, V, B, L> ReadStore<K, V> for SingleLayerCache<B, L>
where
    K: Clone + Eq + Hash,
    V: Clone,
    B: ReadStore<K, V>,
    L: ReadWriteStore<K, V>,
{
    fn mget(&self, keys: &[Option<K>]) -> Result<Vec<Option<V>>> {
        let mut results: Vec<Option<V>> = keys.iter().map(|_| None).collect();

        // Positions with an actual key; None keys stay None and are never looked up
        let valid: Vec<usize> = keys
            .iter()
            .enumerate()
            .filter_map(|(idx, key)| key.as_ref().map(|_| idx))
            .collect();
        if valid.is_empty() {
            return Ok(results);
        }

        let valid_keys: Vec<Option<K>> = valid.iter().map(|&idx| keys[idx].clone()).collect();
        let layer_hits = self.layer.mget(&valid_keys)?;
        CacheError::check_len(valid_keys.len(), layer_hits.len())?;

        let mut missed = Vec::new();
        for (&idx, hit) in valid.iter().zip(layer_hits) {
            match hit {
                Some(value) => results[idx] = Some(value),
                None => missed.push(idx),
            }
        }

        if missed.is_empty() {
            debug!(requested = keys.len(), layer_hits = valid.len(), "cache mget served by layer");
            return Ok(results);
        }

        let missed_keys: Vec<Option<K>> = missed.iter().map(|&idx| keys[idx].clone()).collect();
        let base_hits = self.base.mget(&missed_keys)?;
        CacheError::check_len(missed_keys.len(), base_hits.len())?;

        let mut seen = HashSet::new();
        let mut write_back = Vec::new();
        for (&idx, hit) in missed.iter().zip(base_hits) {
            let (Some(value), Some(key)) = (hit, keys[idx].as_ref()) else {
                continue;
            };
            if seen.insert(key) {
                write_back.push((key.clone(), value.clone()));
            }
            results[idx] = Some(value);
        }

        debug!(
            requested = keys.len(),
            layer_hits = valid.len() - missed.len(),
            base_hits = write_back.len(),
            "cache mget fell through to base"
        );

        if !write_back.is_empty() {
            self.layer.mset(&write_back)?;
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FunctionStore, MemoryStore, WriteStore};
    use std::cell::RefCell;

    /// Base that records every batch it is asked for.
    struct RecordingBase {
        calls: RefCell<Vec<Vec<Option<u32>>>>,
    }

    impl RecordingBase {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ReadStore<u32, String> for RecordingBase {
        fn mget(&self, keys: &[Option<u32>]) -> Result<Vec<Option<String>>> {
            self.calls.borrow_mut().push(keys.to_vec());
            Ok(keys
                .iter()
                .map(|k| k.filter(|k| k % 2 == 1).map(|k| format!("v{}", k)))
                .collect())
        }
    }

    /// Layer whose every call fails.
    struct BrokenLayer;

    impl ReadStore<u32, String> for BrokenLayer {
        fn mget(&self, _keys: &[Option<u32>]) -> Result<Vec<Option<String>>> {
            Err(CacheError::Decode("layer down".to_string()))
        }
    }

    impl WriteStore<u32, String> for BrokenLayer {
        fn mset(&self, _kvs: &[(u32, String)]) -> Result<Vec<bool>> {
            Err(CacheError::Decode("layer down".to_string()))
        }

        fn delete(&self, _keys: &[u32]) -> Result<Vec<bool>> {
            Err(CacheError::Decode("layer down".to_string()))
        }

        fn clear(&self) -> Result<bool> {
            Err(CacheError::Decode("layer down".to_string()))
        }
    }

    /// Layer that answers with too few results.
    struct ShortLayer;

    impl ReadStore<u32, String> for ShortLayer {
        fn mget(&self, _keys: &[Option<u32>]) -> Result<Vec<Option<String>>> {
            Ok(Vec::new())
        }
    }

    impl WriteStore<u32, String> for ShortLayer {
        fn mset(&self, kvs: &[(u32, String)]) -> Result<Vec<bool>> {
            Ok(vec![true; kvs.len()])
        }

        fn delete(&self, keys: &[u32]) -> Result<Vec<bool>> {
            Ok(vec![false; keys.len()])
        }

        fn clear(&self) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_function_base_scenario() {
        let layer: MemoryStore<i64, i64> = MemoryStore::new();
        let cache = SingleLayerCache::new(FunctionStore::new(|k: &i64| Some(k * 2)), &layer);

        let values = cache.mget(&[Some(1), Some(2), None, Some(3)]).unwrap();
        assert_eq!(values, vec![Some(2), Some(4), None, Some(6)]);

        assert_eq!(layer.len(), 3);
        assert_eq!(
            layer.mget(&[Some(1), Some(2), Some(3)]).unwrap(),
            vec![Some(2), Some(4), Some(6)]
        );
    }

    #[test]
    fn test_only_misses_reach_base() {
        let base = RecordingBase::new();
        let layer: MemoryStore<u32, String> = MemoryStore::new();
        layer.mset(&[(1, "cached".to_string())]).unwrap();

        let cache = SingleLayerCache::new(&base, &layer);
        let values = cache.mget(&[Some(1), Some(3), Some(4)]).unwrap();

        assert_eq!(
            values,
            vec![Some("cached".to_string()), Some("v3".to_string()), None]
        );
        assert_eq!(*base.calls.borrow(), vec![vec![Some(3), Some(4)]]);
        // 4 is absent in the base and must not be written back
        assert_eq!(layer.get(&4).unwrap(), None);
        assert_eq!(layer.get(&3).unwrap(), Some("v3".to_string()));
    }

    #[test]
    fn test_second_read_is_served_by_layer() {
        let base = RecordingBase::new();
        let layer: MemoryStore<u32, String> = MemoryStore::new();
        let cache = SingleLayerCache::new(&base, &layer);

        assert_eq!(cache.get(&5).unwrap(), Some("v5".to_string()));
        assert_eq!(cache.get(&5).unwrap(), Some("v5".to_string()));
        assert_eq!(base.calls.borrow().len(), 1);
    }

    #[test]
    fn test_all_sentinels_query_nothing() {
        let base = RecordingBase::new();
        let cache = SingleLayerCache::new(&base, BrokenLayer);

        let values = cache.mget(&[None::<u32>, None]).unwrap();
        assert_eq!(values, vec![None, None]);
        let empty: &[Option<u32>] = &[];
        assert!(cache.mget(empty).unwrap().is_empty());
        assert!(base.calls.borrow().is_empty());
    }

    #[test]
    fn test_duplicate_keys_written_back_once() {
        let base = RecordingBase::new();
        let layer: MemoryStore<u32, String> = MemoryStore::new();
        let cache = SingleLayerCache::new(&base, &layer);

        let values = cache.mget(&[Some(7), Some(7)]).unwrap();
        assert_eq!(values, vec![Some("v7".to_string()), Some("v7".to_string())]);
        assert_eq!(layer.len(), 1);
    }

    #[test]
    fn test_layer_failure_propagates() {
        let base = RecordingBase::new();
        let cache = SingleLayerCache::new(&base, BrokenLayer);

        let result = cache.mget(&[Some(1)]);
        assert!(matches!(result, Err(CacheError::Decode(_))));
        assert!(base.calls.borrow().is_empty(), "base must not be used as fallback");
    }

    #[test]
    fn test_short_layer_answer_is_rejected() {
        let base = RecordingBase::new();
        let cache = SingleLayerCache::new(&base, ShortLayer);

        let result = cache.mget(&[Some(1), Some(2)]);
        assert!(matches!(
            result,
            Err(CacheError::LengthMismatch {
                expected: 2,
                actual: 0
            })
        ));
    }
}
