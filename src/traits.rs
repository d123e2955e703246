//! Common interface for all cache eviction engines.
//!
//! Implementations: [`crate::lever::LeverEngine`], [`crate::shift::ShiftEngine`],
//! [`crate::shiftsieve::ShiftSieveEngine`]. The original source expresses this
//! as a function table (`cache_t` holding `find`/`insert`/`evict`/`remove`
//! function pointers, with a shared `cache_get_base` calling through them);
//! here the table becomes a trait, and `cache_get_base` becomes the trait's
//! default [`CacheEngine::get`] method.
use crate::request::{CacheStats, ObjectView, Request};

pub trait CacheEngine {
    /// Human-readable name of the eviction policy.
    fn name(&self) -> &'static str;

    /// Capacity in bytes, as configured at construction.
    fn capacity_bytes(&self) -> u64;

    /// Per-object metadata overhead charged against capacity.
    fn obj_md_size(&self) -> u64;

    /// Number of objects currently resident.
    fn n_obj(&self) -> u64;

    /// Number of bytes currently occupied, including metadata overhead.
    fn occupied_byte(&self) -> u64;

    /// Look up `obj_id`. If `update_metadata` is set and the object is
    /// resident, the engine applies whatever promotion/frequency update
    /// its policy prescribes on a hit.
    fn find(&mut self, obj_id: u64, update_metadata: bool) -> bool;

    /// Insert a new object. The caller must have already made room (via
    /// repeated `evict`) for `req.obj_size + obj_md_size()` bytes —
    /// inserting into a full engine is a logic error.
    fn insert(&mut self, req: &Request);

    /// Evict one object, freeing its bytes. No-op if already empty.
    fn evict(&mut self);

    /// The object `evict` would remove next, without removing it. Some
    /// engines (Shift) do not support this and panic instead; callers
    /// that need portability across all three engines should not call
    /// this without first checking `name()`.
    fn to_evict(&mut self) -> Option<ObjectView>;

    /// Remove `obj_id` explicitly, independent of the eviction policy.
    /// Returns whether it was present.
    fn remove(&mut self, obj_id: u64) -> bool;

    /// Record a hit or miss against the engine's running statistics.
    /// Called internally by the default [`CacheEngine::get`]; exposed so
    /// an engine's own `find`/`insert` implementations can also use it.
    fn note_access(&mut self, hit: bool);

    /// Snapshot of hits/misses/evictions/size/capacity.
    fn stats(&self) -> CacheStats;

    /// Whether the engine currently holds no objects.
    fn is_empty(&self) -> bool {
        self.n_obj() == 0
    }

    /// `cache_get_base`: look the object up with promotion side effects
    /// applied; on a miss, evict until there is room and insert it.
    /// Returns whether the access was a hit.
    fn get(&mut self, req: &Request) -> bool {
        let hit = self.find(req.obj_id, true);
        self.note_access(hit);
        if hit {
            return true;
        }

        let needed = req.obj_size + self.obj_md_size();
        if needed > self.capacity_bytes() {
            tracing::warn!(
                engine = self.name(),
                obj_id = req.obj_id,
                obj_size = req.obj_size,
                capacity_bytes = self.capacity_bytes(),
                "object larger than capacity; skipping insert"
            );
            return false;
        }
        while !self.is_empty() && self.occupied_byte() + needed > self.capacity_bytes() {
            self.evict();
        }
        self.insert(req);
        false
    }
}
