//! Two-pointer FIFO with quick-demotion (`Lever.c` in the original source).
//!
//! A single FIFO list carries two markers over it: `fast` sweeps ahead on
//! every eviction, promoting any object it passes that was accessed since
//! insertion (`freq == true`) to sit just behind `slow`; `slow` trails one
//! step behind and is itself the demotion candidate once `fast` catches up.
//! The quick-demotion branch removes `slow` directly instead of falling
//! back to the literal tail, which is what gives Lever its name over a
//! plain two-handed CLOCK.

use crate::arena::NIL;
use crate::base::{capacity_hint_for, CacheCore};
use crate::request::{CacheStats, CommonCacheParams, ObjectView, Request};
use crate::traits::CacheEngine;

#[derive(Default)]
pub struct LeverMeta {
    freq: bool,
}

pub struct LeverEngine {
    core: CacheCore<LeverMeta>,
    fast: u32,
    slow: u32,
}

impl LeverEngine {
    pub fn new(params: &CommonCacheParams) -> Self {
        let capacity_hint = capacity_hint_for(params.capacity_bytes, params.obj_md_size());
        Self {
            core: CacheCore::new("Lever", params, capacity_hint),
            fast: NIL,
            slow: NIL,
        }
    }

    fn lazy_init_markers(&mut self) {
        if self.slow == NIL {
            self.slow = self.core.arena.tail;
        }
        if self.fast == NIL {
            self.fast = self.core.arena.tail;
        }
    }

    /// Advance `fast` one step, promoting the node it passed over behind
    /// `slow` if it was accessed since insertion (clearing the bit so it
    /// is only promoted once per lap).
    fn fast_step(&mut self) {
        let obj = self.fast;
        self.fast = self.core.arena.prev_of(obj);

        let accessed = self.core.arena.get(obj).map(|n| n.meta.freq).unwrap_or(false);
        if accessed {
            self.core.arena.get_mut(obj).unwrap().meta.freq = false;
            if self.slow != NIL {
                self.core.arena.move_after_mark(self.slow, obj);
            }
        }
    }
}

impl CacheEngine for LeverEngine {
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
                    self.core.arena.get_mut(index).unwrap().meta.freq = true;
                }
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, req: &Request) {
        self.core.insert_at_head(req, LeverMeta::default());
    }

    fn evict(&mut self) {
        if self.core.arena.is_empty() {
            return;
        }
        self.lazy_init_markers();

        for _ in 0..2 {
            self.fast_step();
            if self.fast == NIL {
                break;
            }
        }

        let obj = self.slow;
        self.slow = self.core.arena.prev_of(obj);
        let accessed = self.core.arena.get(obj).map(|n| n.meta.freq).unwrap_or(false);

        if accessed {
            self.core.arena.get_mut(obj).unwrap().meta.freq = false;
            // FIFO demotion: `obj` (old slow) survives; the true victim
            // is whatever sits at the literal tail.
            let victim = self.core.arena.tail;
            if victim == self.fast {
                self.fast = self.core.arena.prev_of(victim);
            }
            if victim == self.slow {
                self.slow = self.core.arena.prev_of(victim);
            }
            self.core.evict_node(victim);
        } else {
            // Quick demotion: evict `obj` (old slow) itself.
            if self.fast == obj {
                self.fast = self.core.arena.prev_of(obj);
            }
            self.core.evict_node(obj);
        }
    }

    fn to_evict(&mut self) -> Option<ObjectView> {
        if self.core.arena.is_empty() {
            return None;
        }
        // Raw read of `slow`, matching `Lever_to_evict`: unlike `evict`, this
        // never lazily initializes the markers — a peek must not mutate.
        let accessed = self
            .core
            .arena
            .get(self.slow)
            .map(|n| n.meta.freq)
            .unwrap_or(false);
        let index = if self.slow != NIL && !accessed {
            self.slow
        } else {
            self.core.arena.tail
        };
        self.core.arena.get(index).map(|n| ObjectView {
            obj_id: n.obj_id,
            obj_size: n.obj_size,
        })
    }

    fn remove(&mut self, obj_id: u64) -> bool {
        match self.core.find_by_id(obj_id) {
            Some(index) => {
                if self.fast == index {
                    self.fast = self.core.arena.prev_of(index);
                }
                if self.slow == index {
                    self.slow = self.core.arena.prev_of(index);
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
