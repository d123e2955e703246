//! Shared engine-interface services.
//!
//! The hash index and the bookkeeping hooks (`cache_insert_base`,
//! `cache_evict_base`, `cache_remove_obj_base`) are genuinely shared
//! across all three engines, unlike the eviction policy itself. This
//! module bundles them with the intrusive [`Arena`] into [`CacheCore`],
//! the piece of state every engine owns (Lever and ShiftSieve own one
//! directly; Shift owns two, one per FIFO sub-cache).

use ahash::RandomState;
use std::collections::HashMap;

use crate::arena::{Arena, Node, NIL};
use crate::error::VerifyError;
use crate::request::{CacheStats, CommonCacheParams, Request};

/// Worst-case resident-object count for a byte budget: every object is as
/// small as it can possibly be (1 byte) plus the per-object metadata
/// overhead. Sizing the arena to anything smaller risks exhausting it on a
/// legitimate workload of small objects while `occupied_byte` is still well
/// under `capacity_bytes`.
pub(crate) fn capacity_hint_for(capacity_bytes: u64, obj_md_size: u64) -> usize {
    (capacity_bytes / (1 + obj_md_size)).max(1) as usize
}

/// Maps an object identifier to its resident node index. In scope here
/// only as the bookkeeping the base hooks maintain, not as a
/// general-purpose index implementation.
#[derive(Default)]
pub(crate) struct HashIndex {
    map: HashMap<u64, u32, RandomState>,
}

impl HashIndex {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    pub(crate) fn get(&self, obj_id: u64) -> Option<u32> {
        self.map.get(&obj_id).copied()
    }

    fn insert(&mut self, obj_id: u64, index: u32) {
        self.map.insert(obj_id, index);
    }

    fn remove(&mut self, obj_id: u64) -> Option<u32> {
        self.map.remove(&obj_id)
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// The state every engine's base services operate on: the intrusive list,
/// the hash index, capacity/metadata-size parameters, and the counters
/// (`n_obj`, `occupied_byte`) carried on the original `cache_t`.
pub(crate) struct CacheCore<M> {
    pub(crate) name: &'static str,
    pub(crate) arena: Arena<M>,
    index: HashIndex,
    capacity_bytes: u64,
    obj_md_size: u64,
    n_obj: u64,
    occupied_byte: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<M> CacheCore<M> {
    pub(crate) fn new(name: &'static str, params: &CommonCacheParams, capacity_hint: usize) -> Self {
        tracing::debug!(
            engine = name,
            capacity_bytes = params.capacity_bytes,
            consider_obj_metadata = params.consider_obj_metadata,
            "cache engine initialized"
        );
        Self {
            name,
            arena: Arena::new(capacity_hint),
            index: HashIndex::with_capacity(capacity_hint),
            capacity_bytes: params.capacity_bytes,
            obj_md_size: params.obj_md_size(),
            n_obj: 0,
            occupied_byte: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub(crate) fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    pub(crate) fn obj_md_size(&self) -> u64 {
        self.obj_md_size
    }

    pub(crate) fn n_obj(&self) -> u64 {
        self.n_obj
    }

    pub(crate) fn occupied_byte(&self) -> u64 {
        self.occupied_byte
    }

    pub(crate) fn find_by_id(&self, obj_id: u64) -> Option<u32> {
        self.index.get(obj_id)
    }

    pub(crate) fn note_access(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            current_size: self.n_obj,
            capacity_bytes: self.capacity_bytes,
        }
    }

    /// `cache_insert_base` fused with the head placement every engine here
    /// uses: allocate the node, link it at the head of the list, index it,
    /// and update the byte/count totals.
    pub(crate) fn insert_at_head(&mut self, req: &Request, meta: M) -> u32 {
        debug_assert!(
            self.occupied_byte + req.obj_size + self.obj_md_size <= self.capacity_bytes,
            "insert_at_head called without first evicting down to capacity: {} + {} > {}",
            self.occupied_byte,
            req.obj_size + self.obj_md_size,
            self.capacity_bytes
        );
        let node = Node::new(req.obj_id, req.obj_size, meta);
        let index = self
            .arena
            .prepend_to_head(node)
            .expect("insert called without making space first");
        self.index.insert(req.obj_id, index);
        self.n_obj += 1;
        self.occupied_byte += req.obj_size + self.obj_md_size;
        index
    }

    /// `cache_evict_base`: the node must already be unlinked from the
    /// list (here, unlinking and removal from the arena happen together,
    /// since nothing observes the gap). Removes the hash index entry,
    /// decrements counters, and counts the eviction.
    pub(crate) fn evict_node(&mut self, index: u32) -> Node<M> {
        let node = self
            .arena
            .remove(index)
            .expect("evict_node called with an index not present in the arena");
        self.index.remove(node.obj_id);
        self.n_obj -= 1;
        self.occupied_byte -= node.obj_size + self.obj_md_size;
        self.evictions += 1;
        node
    }

    /// `cache_remove_obj_base`: same bookkeeping as [`Self::evict_node`]
    /// but triggered by a user-initiated `remove`, so it does not count
    /// toward the eviction statistic.
    pub(crate) fn remove_node(&mut self, index: u32) -> Node<M> {
        let node = self
            .arena
            .remove(index)
            .expect("remove_node called with an index not present in the arena");
        self.index.remove(node.obj_id);
        self.n_obj -= 1;
        self.occupied_byte -= node.obj_size + self.obj_md_size;
        node
    }

    /// Walk the list in both directions and cross-check against the
    /// counters and hash index, the same shape as the original source's
    /// `*_verify` routines.
    pub(crate) fn verify(&self) -> Result<(), VerifyError> {
        let head_is_nil = self.arena.head == NIL;
        let tail_is_nil = self.arena.tail == NIL;
        if head_is_nil != tail_is_nil {
            return Err(VerifyError::HeadTailNullityMismatch {
                head_is_nil,
                tail_is_nil,
            });
        }

        let mut forward = 0u64;
        let mut summed_bytes = 0u64;
        let mut cursor = self.arena.head;
        while cursor != NIL {
            let node = self.arena.get(cursor).expect("dangling forward cursor");
            match self.index.get(node.obj_id) {
                None => return Err(VerifyError::IndexMissingEntry { obj_id: node.obj_id }),
                Some(indexed) if indexed != cursor => {
                    return Err(VerifyError::IndexPointsElsewhere { obj_id: node.obj_id })
                }
                _ => {}
            }
            summed_bytes += node.obj_size + self.obj_md_size;
            forward += 1;
            cursor = node.next;
        }
        if forward != self.n_obj {
            return Err(VerifyError::ForwardCountMismatch {
                observed: forward,
                expected: self.n_obj,
            });
        }

        let mut backward = 0u64;
        let mut cursor = self.arena.tail;
        while cursor != NIL {
            let node = self.arena.get(cursor).expect("dangling backward cursor");
            backward += 1;
            cursor = node.prev;
        }
        if backward != self.n_obj {
            return Err(VerifyError::BackwardCountMismatch {
                observed: backward,
                expected: self.n_obj,
            });
        }

        if self.index.len() as u64 != self.n_obj {
            return Err(VerifyError::IndexCountMismatch {
                indexed: self.index.len() as u64,
                listed: self.n_obj,
            });
        }

        if summed_bytes != self.occupied_byte {
            return Err(VerifyError::ByteAccountingMismatch {
                recorded: self.occupied_byte,
                summed: summed_bytes,
            });
        }

        Ok(())
    }
}
