//! Optional persistence seam for computed charts.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use crate::ephemeris::types::{GeoLocation, HouseSystem};

/// Coordinate granularity of cache keys, in degrees.
pub const COORD_STEP: f64 = 0.05;

/// Entries kept by [`MemoryCache::new`] before the oldest is evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Key/value storage for serialized results. Implementations may drop entries at will.
pub trait ChartCache {
    fn get(&self, key: &str) -> Option<serde_json::Value>;
    fn put(&self, key: &str, value: serde_json::Value);
}

/// Stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl ChartCache for NoCache {
    fn get(&self, _key: &str) -> Option<serde_json::Value> {
        None
    }

    fn put(&self, _key: &str, _value: serde_json::Value) {}
}

#[derive(Debug, Default)]
struct Entries {
    values: BTreeMap<String, serde_json::Value>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
}

/// In-process cache holding at most `capacity` entries; the oldest insert goes first.
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.values.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ChartCache for MemoryCache {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.entries.lock().ok()?.values.get(key).cloned()
    }

    fn put(&self, key: &str, value: serde_json::Value) {
        // A poisoned lock only costs us the entry.
        if let Ok(mut entries) = self.entries.lock() {
            if entries.values.insert(key.to_string(), value).is_some() {
                return;
            }
            entries.order.push_back(key.to_string());
            while entries.order.len() > self.capacity {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.values.remove(&oldest);
                    log::debug!("Evicted cache entry {}", oldest);
                }
            }
        }
    }
}

pub fn round_coord(value: f64) -> f64 {
    (value / COORD_STEP).round() * COORD_STEP
}

/// Key for a natal chart: instant to the second, coordinates on the 0.05° grid.
pub fn chart_key(instant: DateTime<Utc>, location: GeoLocation, house_system: HouseSystem) -> String {
    format!(
        "chart:{}:{:.2}:{:.2}:{}",
        instant.format("%Y-%m-%dT%H:%M:%SZ"),
        round_coord(location.lat),
        round_coord(location.lon),
        house_system.code() as char
    )
}
