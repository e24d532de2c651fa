//! Result caching for `&self` members

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use veneer::{forward, Arguments, Handler, Interface, MemberDescriptor, ProxyResult, Receiver, Target, Value};

/// Caches results of `&self` members keyed by member index and the rendered
/// arguments. Any `&mut self` call clears the cache, since it may change
/// what the target would answer.
///
/// Opaque arguments render only as their type name, so calls carrying one
/// always reach the target.
#[derive(Debug, Default)]
pub struct Memoize {
    cache: Mutex<FxHashMap<(usize, String), Value>>,
    hits: AtomicU64,
    misses: AtomicU64,
    bypassed: AtomicU64,
}

impl Memoize {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls answered from the cache
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Calls that reached the target
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Calls not cached because an argument is opaque
    pub fn bypassed(&self) -> u64 {
        self.bypassed.load(Ordering::Relaxed)
    }

    /// Drop every cached result
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Number of cached results
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl<I: ?Sized + Interface> Handler<I> for Memoize {
    fn on_call(&self, target: Target<'_, I>, member: &MemberDescriptor, args: &Arguments) -> ProxyResult<Value> {
        if member.receiver() == Receiver::Exclusive {
            self.clear();
            return forward(target, member, args);
        }

        if args.iter().any(carries_opaque) {
            self.bypassed.fetch_add(1, Ordering::Relaxed);
            return forward(target, member, args);
        }

        let key = (member.index(), format!("{:?}", args));
        if let Some(hit) = self.cache.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit.clone());
        }

        // Lock released while the target runs
        self.misses.fetch_add(1, Ordering::Relaxed);
        let result = forward(target, member, args)?;
        self.cache.lock().insert(key, result.clone());
        Ok(result)
    }
}

fn carries_opaque(value: &Value) -> bool {
    match value {
        Value::Opaque(_) => true,
        Value::Some(inner) => carries_opaque(inner),
        Value::List(items) => items.iter().any(carries_opaque),
        Value::Result(Ok(inner)) | Value::Result(Err(inner)) => carries_opaque(inner),
        _ => false,
    }
}
