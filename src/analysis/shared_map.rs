//! Concurrent upsert-and-merge map
//!
//! One mutex guards both the map and an accumulator of aggregate totals, so
//! an insert and the totals update it triggers are a single critical
//! section. The first writer for a key wins; later inserts for the same key
//! leave the map and the accumulator untouched.

use gix::ObjectId;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

struct Inner<V, A> {
    entries: FxHashMap<ObjectId, V>,
    totals: A,
}

pub struct SharedMap<V, A> {
    inner: Mutex<Inner<V, A>>,
}

impl<V, A: Default> Default for SharedMap<V, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, A: Default> SharedMap<V, A> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: FxHashMap::default(),
                totals: A::default(),
            }),
        }
    }
}

impl<V, A> SharedMap<V, A> {
    /// Insert `value` under `id` unless the key is already present.
    ///
    /// `on_first` runs inside the same critical section, only when the value
    /// was actually inserted. Returns whether the insert happened.
    pub fn upsert_with(&self, id: ObjectId, value: V, on_first: impl FnOnce(&V, &mut A)) -> bool {
        let mut inner = self.inner.lock();
        let Inner { entries, totals } = &mut *inner;
        match entries.entry(id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                let value = slot.insert(value);
                on_first(value, totals);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release the lock for good and hand back the collected entries
    pub fn into_parts(self) -> (FxHashMap<ObjectId, V>, A) {
        let inner = self.inner.into_inner();
        (inner.entries, inner.totals)
    }
}
