//! A minimal metric [`Registry`] and counter type.
//!
//! This is a deliberately small subset of the real metric ecosystem crate it
//! is modeled on: enough to register a named, attribute-keyed counter and
//! increment it, which is all `rds_catalog` needs to report cache hit/build
//! counts.
#![deny(rustdoc::broken_intra_doc_links, rustdoc::bare_urls, rust_2018_idioms)]
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    clippy::explicit_iter_loop,
    clippy::use_self
)]

use parking_lot::Mutex;
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// A single named counter, shared between every caller that registered the
/// same `(name, attributes)` pair.
#[derive(Debug, Clone, Default)]
pub struct U64Counter(Arc<AtomicU64>);

impl U64Counter {
    /// Increment the counter by `delta`.
    pub fn inc(&self, delta: u64) {
        self.0.fetch_add(delta, Ordering::Relaxed);
    }

    /// Current value of the counter.
    pub fn fetch(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A registered metric that hands out per-attribute-set recorders.
#[derive(Debug)]
pub struct Metric<T> {
    name: &'static str,
    recorders: Arc<Mutex<BTreeMap<Vec<(&'static str, String)>, T>>>,
}

impl<T> Metric<T>
where
    T: Clone + Default,
{
    /// Return (creating if necessary) the recorder for this attribute set.
    ///
    /// Attributes are compared by value, not by insertion order.
    pub fn recorder(&self, attributes: &[(&'static str, &str)]) -> T {
        let mut key: Vec<(&'static str, String)> = attributes
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect();
        key.sort();

        let mut recorders = self.recorders.lock();
        recorders.entry(key).or_default().clone()
    }

    /// The name this metric was registered under.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// A collection of registered metrics, keyed by name.
///
/// Mirrors the teacher's `metric::Registry`: cheaply cloneable, intended to be
/// threaded through constructors as an `Arc<Registry>`.
#[derive(Debug, Default)]
pub struct Registry {
    counters: Mutex<BTreeMap<&'static str, Arc<Mutex<BTreeMap<Vec<(&'static str, String)>, U64Counter>>>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or fetch the existing registration for) a named counter.
    ///
    /// `description` is accepted for API parity with the teacher's registry
    /// (which surfaces it to exporters); this minimal registry does not
    /// expose it anywhere.
    pub fn register_metric(&self, name: &'static str, _description: &str) -> Metric<U64Counter> {
        let mut counters = self.counters.lock();
        let recorders = counters
            .entry(name)
            .or_insert_with(|| Arc::new(Mutex::new(BTreeMap::new())))
            .clone();

        Metric {
            name,
            recorders,
        }
    }
}
