use std::{
    collections::HashMap,
    convert::Infallible,
    hash::Hash,
    sync::{
        PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

/// Enable flag and invalidation counter shared by the memos of one tier.
#[derive(Debug, Default)]
pub(crate) struct Tier {
    enabled: AtomicBool,
    generation: AtomicU64,
}

impl Tier {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Flip the flag, returning the previous value.
    pub(crate) fn set_enabled(&self, enabled: bool) -> bool {
        self.enabled.swap(enabled, Ordering::AcqRel)
    }

    /// Number of invalidations the tier went through.
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub(crate) fn bump(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

#[derive(Debug)]
struct MemoState<K, V> {
    generation: u64,
    entries: HashMap<K, V>,
}

/// One memoized relation.
///
/// Values are computed without holding the lock. A computed value is only
/// stored if no clear happened while it was being computed, so a reader racing
/// an invalidation never re-inserts a stale entry.
#[derive(Debug)]
pub(crate) struct Memo<K, V> {
    state: RwLock<MemoState<K, V>>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            state: RwLock::new(MemoState {
                generation: 0,
                entries: HashMap::new(),
            }),
        }
    }
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Copy,
    V: Clone,
{
    pub(crate) fn get_or_compute(&self, tier: &Tier, key: K, compute: impl FnOnce() -> V) -> V {
        match self.get_or_try_compute(tier, key, || Ok::<_, Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`Memo::get_or_compute`], only successful results are stored.
    pub(crate) fn get_or_try_compute<E>(
        &self,
        tier: &Tier,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if !tier.is_enabled() {
            return compute();
        }

        let generation = {
            let state = self.read();
            if let Some(value) = state.entries.get(&key) {
                return Ok(value.clone());
            }
            state.generation
        };

        let value = compute()?;

        if tier.is_enabled() {
            let mut state = self.write();
            if state.generation == generation {
                state.entries.entry(key).or_insert_with(|| value.clone());
            }
        }
        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: K) -> bool {
        self.read().entries.contains_key(&key)
    }

    pub(crate) fn remove(&self, key: K) {
        let mut state = self.write();
        state.generation += 1;
        state.entries.remove(&key);
    }

    pub(crate) fn clear(&self) {
        let mut state = self.write();
        state.generation += 1;
        state.entries.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.read().entries.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoState<K, V>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoState<K, V>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_disabled_tier_always_recomputes() {
        let tier = Tier::new(false);
        let memo = Memo::<u32, u32>::default();
        let calls = Cell::new(0);

        for _ in 0..3 {
            let value = memo.get_or_compute(&tier, 1, || {
                calls.set(calls.get() + 1);
                7
            });
            assert_eq!(value, 7);
        }

        assert_eq!(calls.get(), 3);
        assert_eq!(memo.len(), 0);
    }

    #[test]
    fn test_enabled_tier_computes_once() {
        let tier = Tier::new(true);
        let memo = Memo::<u32, u32>::default();
        let calls = Cell::new(0);

        for _ in 0..3 {
            memo.get_or_compute(&tier, 1, || {
                calls.set(calls.get() + 1);
                7
            });
        }

        assert_eq!(calls.get(), 1);
        assert!(memo.contains(1));
    }

    #[test]
    fn test_errors_are_not_stored() {
        let tier = Tier::new(true);
        let memo = Memo::<u32, u32>::default();

        let result: Result<u32, &str> = memo.get_or_try_compute(&tier, 1, || Err("nope"));
        assert!(result.is_err());
        assert!(!memo.contains(1));

        let result: Result<u32, &str> = memo.get_or_try_compute(&tier, 1, || Ok(3));
        assert_eq!(result, Ok(3));
        assert!(memo.contains(1));
    }

    #[test]
    fn test_clear_during_compute_drops_result() {
        let tier = Tier::new(true);
        let memo = Memo::<u32, u32>::default();

        let value = memo.get_or_compute(&tier, 1, || {
            memo.clear();
            5
        });

        assert_eq!(value, 5);
        assert!(!memo.contains(1));
    }

    #[test]
    fn test_disable_during_compute_drops_result() {
        let tier = Tier::new(true);
        let memo = Memo::<u32, u32>::default();

        memo.get_or_compute(&tier, 1, || {
            tier.set_enabled(false);
            5
        });

        assert!(!memo.contains(1));
    }

    #[test]
    fn test_remove_and_clear_on_empty_memo() {
        let memo = Memo::<u32, u32>::default();
        memo.remove(4);
        memo.clear();
        memo.clear();
        assert_eq!(memo.len(), 0);
    }

    #[test]
    fn test_tier_toggle_reports_previous_state() {
        let tier = Tier::default();
        assert!(!tier.set_enabled(true));
        assert!(tier.set_enabled(true));
        assert!(tier.is_enabled());

        tier.bump();
        tier.bump();
        assert_eq!(tier.generation(), 2);
    }
}
