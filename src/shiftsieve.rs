//! Single-sweep eviction with hot-bit survivorship (`ShiftSieve.c` in the
//! original source).
//!
//! A single scan pointer walks the FIFO list from the tail toward the
//! head. Every object carries two bits: `visited` (set on every access
//! since the pointer last passed it) and `survived` (set the first time
//! the sweep passes it while `visited` is set, granting it one reprieve).
//! The sweep clears `visited` as it goes; an object it finds already
//! `visited` with `survived` already set is the eviction victim. If the
//! sweep has walked more than half the list's hot fraction without
//! finding a victim, it restarts from the tail — the "shift" in the
//! name, distinguishing this from a plain SIEVE's single pass.

use crate::arena::NIL;
use crate::base::{capacity_hint_for, CacheCore};
use crate::request::{CacheStats, CommonCacheParams, ObjectView, Request};
use crate::traits::CacheEngine;

#[derive(Default)]
pub struct SieveMeta {
    visited: bool,
    survived: bool,
}

pub struct ShiftSieveEngine {
    core: CacheCore<SieveMeta>,
    pointer: u32,
    /// Nodes visited by the current sweep since its last restart.
    right: i64,
    /// Nodes that earned survivorship during the current sweep.
    hot: i64,
}

impl ShiftSieveEngine {
    pub fn new(params: &CommonCacheParams) -> Self {
        let capacity_hint = capacity_hint_for(params.capacity_bytes, params.obj_md_size());
        Self {
            core: CacheCore::new("ShiftSieve", params, capacity_hint),
            pointer: NIL,
            right: 0,
            hot: 0,
        }
    }

    fn restart_sweep(&mut self) -> u32 {
        self.right = 0;
        self.hot = 0;
        self.core.arena.tail
    }

    /// The victim-selection loop shared by `to_evict` and `evict`: advance
    /// `obj` backward over every already-visited node, clearing `visited`
    /// and granting first-time survivorship, restarting from the tail
    /// whenever the unvisited remainder can no longer contain a full hot
    /// fraction. Leaves `pointer` parked one step behind the result and
    /// returns the index the sweep stopped on.
    fn sweep(&mut self) -> u32 {
        let mut obj = if self.pointer == NIL {
            self.restart_sweep()
        } else {
            self.pointer
        };

        while self.core.arena.get(obj).map(|n| n.meta.visited).unwrap_or(false) {
            let meta = &mut self.core.arena.get_mut(obj).unwrap().meta;
            meta.visited = false;
            if !meta.survived {
                meta.survived = true;
                self.hot += 1;
            }
            obj = self.core.arena.prev_of(obj);
            self.right += 1;

            if self.core.n_obj() as i64 - self.right <= self.hot / 2 {
                obj = self.restart_sweep();
            }
        }

        self.pointer = self.core.arena.prev_of(obj);
        obj
    }
}

impl CacheEngine for ShiftSieveEngine {
    fn name(&self) -> &'static str {
        self.core.name
    }

    fn capacity_bytes(&self) -> u64 {
        self.core.capacity_bytes()
    }

    fn obj_md_size(&self) -> u64 {
        self.core.obj_md_size()
    }

    fn n_obj(&self) -> u64 {
        self.core.n_obj()
    }

    fn occupied_byte(&self) -> u64 {
        self.core.occupied_byte()
    }

    fn find(&mut self, obj_id: u64, update_metadata: bool) -> bool {
        match self.core.find_by_id(obj_id) {
            Some(index) => {
                if update_metadata {
                    let survived = self.core.arena.get(index).unwrap().meta.survived;
                    if !survived {
                        if self.pointer == index {
                            self.pointer = self.core.arena.prev_of(index);
                        }
                        self.core.arena.move_to_head(index);
                    }
                    self.core.arena.get_mut(index).unwrap().meta.visited = true;
                }
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, req: &Request) {
        self.core.insert_at_head(req, SieveMeta::default());
    }

    fn evict(&mut self) {
        if self.core.arena.is_empty() {
            return;
        }
        let victim = self.sweep();
        if self.pointer == victim {
            self.pointer = self.core.arena.prev_of(victim);
        }
        self.core.evict_node(victim);
    }

    fn to_evict(&mut self) -> Option<ObjectView> {
        if self.core.arena.is_empty() {
            return None;
        }
        let index = self.sweep();
        self.core.arena.get(index).map(|n| ObjectView {
            obj_id: n.obj_id,
            obj_size: n.obj_size,
        })
    }

    fn remove(&mut self, obj_id: u64) -> bool {
        match self.core.find_by_id(obj_id) {
            Some(index) => {
                if self.pointer == index {
                    self.pointer = self.core.arena.prev_of(index);
                }
                self.core.remove_node(index);
                true
            }
            None => false,
        }
    }

    fn note_access(&mut self, hit: bool) {
        self.core.note_access(hit);
    }

    fn stats(&self) -> CacheStats {
        self.core.stats()
    }
}
