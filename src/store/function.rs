//! Function-backed read store.

use std::fmt;

use crate::error::Result;
use crate::store::ReadStore;

/// Read store that turns each key into a value with a plain function.
///
/// The function is called once per requested key, in order; nothing is batched.
/// Useful as the base of a [`SingleLayerCache`](crate::store::SingleLayerCache)
/// when the "slow source" is a computation.
pub struct FunctionStore<F> {
    func: F,
}

impl<F> FunctionStore<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> fmt::Debug for FunctionStore<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionStore").finish_non_exhaustive()
    }
}

impl<K, V, F> ReadStore<K, V> for FunctionStore<F>
where
    F: Fn(&K) -> Option<V>,
{
    fn mget(&self, keys: &[Option<K>]) -> Result<Vec<Option<V>>> {
        Ok(keys
            .iter()
            .map(|key| key.as_ref().and_then(&self.func))
            .collect())
    }

    fn get(&self, key: &K) -> Result<Option<V>>
    where
        K: Clone,
    {
        Ok((self.func)(key))
    }
}
