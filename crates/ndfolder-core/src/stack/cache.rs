use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use ndarray::Array2;

use crate::acquisition::NativePlane;
use crate::error::Result;

/// Identifies a decoded plane: which source of the folder, and where in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaneKey {
    pub source: usize,
    pub plane: NativePlane,
}

/// Hit/miss counters and current fill level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub planes: usize,
    pub used_bytes: u64,
}

/// Bounded store of realized planes with least-recently-used eviction.
///
/// Shared by all stacks of a folder; stacks hold it through an `Arc`.
pub struct PlaneCache {
    capacity_bytes: u64,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    planes: HashMap<PlaneKey, Arc<Array2<u16>>>,
    /// Least recently used first.
    order: VecDeque<PlaneKey>,
    stats: CacheStats,
}

fn plane_bytes(plane: &Array2<u16>) -> u64 {
    (plane.len() * std::mem::size_of::<u16>()) as u64
}

impl PlaneCache {
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            capacity_bytes,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    pub fn get(&self, key: &PlaneKey) -> Option<Arc<Array2<u16>>> {
        let mut state = self.lock();
        let plane = state.planes.get(key).cloned()?;
        state.order.retain(|k| k != key);
        state.order.push_back(*key);
        state.stats.hits += 1;
        Some(plane)
    }

    /// Insert a plane, evicting the least recently used ones to make room.
    /// Planes larger than the whole capacity are not stored.
    pub fn insert(&self, key: PlaneKey, plane: Arc<Array2<u16>>) {
        let size = plane_bytes(&plane);
        if size > self.capacity_bytes {
            return;
        }
        let mut state = self.lock();
        if let Some(old) = state.planes.remove(&key) {
            state.stats.used_bytes -= plane_bytes(&old);
            state.order.retain(|k| k != &key);
        }
        while state.stats.used_bytes + size > self.capacity_bytes {
            let Some(evicted) = state.order.pop_front() else {
                break;
            };
            if let Some(old) = state.planes.remove(&evicted) {
                state.stats.used_bytes -= plane_bytes(&old);
            }
        }
        state.planes.insert(key, plane);
        state.order.push_back(key);
        state.stats.used_bytes += size;
        state.stats.planes = state.planes.len();
    }

    /// Return the cached plane or decode it with `load` and remember it.
    /// The lock is not held while `load` runs.
    pub fn get_or_load<F>(&self, key: PlaneKey, load: F) -> Result<Arc<Array2<u16>>>
    where
        F: FnOnce() -> Result<Array2<u16>>,
    {
        if let Some(plane) = self.get(&key) {
            return Ok(plane);
        }
        self.lock().stats.misses += 1;
        let plane = Arc::new(load()?);
        self.insert(key, Arc::clone(&plane));
        Ok(plane)
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.planes.clear();
        state.order.clear();
        state.stats.used_bytes = 0;
        state.stats.planes = 0;
    }
}

impl std::fmt::Debug for PlaneCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaneCache")
            .field("capacity_bytes", &self.capacity_bytes)
            .field("stats", &self.stats())
            .finish()
    }
}
