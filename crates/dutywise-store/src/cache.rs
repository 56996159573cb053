//! Read-through cache in front of a reference store
//!
//! Only exact-code lookups are cached. The reference data is read-only during
//! resolution, so a cached answer is always the answer the store would give.

use dutywise_domain::traits::{RateAverage, RecordQuery, ReferenceStore, RulesStore};
use dutywise_domain::{ClassificationCode, QualificationRule, TariffRecord};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

/// Bounded read-through cache for [`ReferenceStore::get_record`]
///
/// Evicts in insertion order once `capacity` entries are held. Misses are
/// cached too, so a repeated lookup of an absent code does not hit the store.
#[derive(Debug)]
pub struct CachedStore<S> {
    inner: S,
    capacity: usize,
    entries: RefCell<HashMap<ClassificationCode, Option<TariffRecord>>>,
    order: RefCell<VecDeque<ClassificationCode>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl<S> CachedStore<S> {
    /// Wrap a store with a cache of the given capacity (0 disables caching)
    pub fn new(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            entries: RefCell::new(HashMap::new()),
            order: RefCell::new(VecDeque::new()),
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the store, dropping the cache
    pub fn into_inner(self) -> S {
        self.inner
    }

    /// `(hits, misses)` since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.get(), self.misses.get())
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn insert(&self, code: ClassificationCode, record: Option<TariffRecord>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.borrow_mut();
        let mut order = self.order.borrow_mut();
        while entries.len() >= self.capacity {
            match order.pop_front() {
                Some(oldest) => {
                    entries.remove(&oldest);
                }
                None => break,
            }
        }
        if entries.insert(code.clone(), record).is_none() {
            order.push_back(code);
        }
    }
}

impl<S: ReferenceStore> ReferenceStore for CachedStore<S> {
    type Error = S::Error;

    fn get_record(&self, code: &ClassificationCode) -> Result<Option<TariffRecord>, Self::Error> {
        if let Some(cached) = self.entries.borrow().get(code) {
            self.hits.set(self.hits.get() + 1);
            return Ok(cached.clone());
        }

        self.misses.set(self.misses.get() + 1);
        let record = self.inner.get_record(code)?;
        self.insert(code.clone(), record.clone());
        Ok(record)
    }

    fn query_records(&self, query: &RecordQuery) -> Result<Vec<TariffRecord>, Self::Error> {
        self.inner.query_records(query)
    }

    fn average_rates(&self, query: &RecordQuery) -> Result<RateAverage, Self::Error> {
        self.inner.average_rates(query)
    }
}

impl<S: RulesStore> RulesStore for CachedStore<S> {
    type Error = S::Error;

    fn rules_for(
        &self,
        code: Option<&ClassificationCode>,
        category: Option<&str>,
    ) -> Result<Vec<QualificationRule>, Self::Error> {
        self.inner.rules_for(code, category)
    }
}
