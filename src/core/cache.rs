//! Bounded pairwise screen-distance cache
//!
//! Keyed by an unordered point-id pair. When full, the next insert clears
//! the whole map rather than evicting individual entries.

use std::collections::HashMap;

use tracing::debug;

use super::geometry::ScreenPos;
use super::point::PointId;

/// Maximum number of cached pairs
pub const DISTANCE_CACHE_CAPACITY: usize = 10_000;

#[derive(Clone, Copy, Debug)]
struct CachedDistance {
    /// Screen positions of the (ordered) key pair when the distance was computed
    from: ScreenPos,
    to: ScreenPos,
    distance: f64,
}

#[derive(Debug)]
pub struct DistanceCache {
    entries: HashMap<(PointId, PointId), CachedDistance>,
    capacity: usize,
    hits: u64,
    misses: u64,
    clears: u64,
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self::new(DISTANCE_CACHE_CAPACITY)
    }
}

impl DistanceCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(DISTANCE_CACHE_CAPACITY)),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
            clears: 0,
        }
    }

    /// Screen distance between two points, served from cache when both
    /// points still project to the positions the entry was computed from.
    pub fn distance(&mut self, a: (&PointId, ScreenPos), b: (&PointId, ScreenPos)) -> f64 {
        let ((id_a, pos_a), (id_b, pos_b)) = if a.0 <= b.0 { (a, b) } else { (b, a) };
        let key = (id_a.clone(), id_b.clone());

        if let Some(entry) = self.entries.get(&key) {
            if entry.from == pos_a && entry.to == pos_b {
                self.hits += 1;
                return entry.distance;
            }
        }

        self.misses += 1;
        let distance = pos_a.distance(pos_b);

        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            debug!(size = self.entries.len(), "Distance cache full, clearing");
            self.entries.clear();
            self.clears += 1;
        }
        self.entries.insert(
            key,
            CachedDistance {
                from: pos_a,
                to: pos_b,
                distance,
            },
        );
        distance
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Number of wholesale clears since creation
    pub fn clears(&self) -> u64 {
        self.clears
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
