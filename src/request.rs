//! Request and parameter records consumed by the cache engines.
//!
//! These are the interface-only types a caller threads a trace through:
//! the request shape, an object's identity view, construction parameters,
//! and a stats snapshot. Generating or replaying a trace is the caller's
//! job, not this crate's.

/// A single access record fed to an engine's `get`/`find`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Request {
    pub obj_id: u64,
    pub obj_size: u64,
    pub clock_time: Option<u64>,
    pub ttl: Option<u64>,
    /// Threaded back into copied-out requests (e.g. Shift's `req_local`
    /// shuttle); unused by the three engines here but carried for
    /// interface parity with the original trace format.
    pub next_access_vtime: Option<i64>,
}

impl Request {
    pub fn new(obj_id: u64, obj_size: u64) -> Self {
        Self {
            obj_id,
            obj_size,
            ..Default::default()
        }
    }
}

/// A read-only view of a resident object, returned by `to_evict` and used
/// internally when an engine needs to copy an object's identity without
/// holding a live reference across a structural mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectView {
    pub obj_id: u64,
    pub obj_size: u64,
}

/// Common parameters shared by every engine's `init`.
#[derive(Debug, Clone)]
pub struct CommonCacheParams {
    pub capacity_bytes: u64,
    pub consider_obj_metadata: bool,
    /// Per-policy parameter string. Accepted for interface parity with
    /// the original `cache_specific_params` argument; none of the three
    /// engines here interpret it.
    pub cache_specific_params: Option<String>,
}

impl CommonCacheParams {
    pub fn new(capacity_bytes: u64) -> Self {
        Self {
            capacity_bytes,
            consider_obj_metadata: false,
            cache_specific_params: None,
        }
    }

    pub fn obj_md_size(&self) -> u64 {
        if self.consider_obj_metadata {
            1
        } else {
            0
        }
    }
}

/// Snapshot of engine statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub current_size: u64,
    pub capacity_bytes: u64,
}
