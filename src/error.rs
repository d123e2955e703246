//! Structural diagnostics.
//!
//! These surface invariant violations from [`crate::base::CacheCore::verify`],
//! the same invariants checked by the `Lever_verify`/`ShiftSieve_verify`
//! routines in the original source. `verify` is meant for tests and
//! debug builds, not the hot path.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("forward traversal visited {observed} nodes but n_obj is {expected}")]
    ForwardCountMismatch { observed: u64, expected: u64 },

    #[error("backward traversal visited {observed} nodes but n_obj is {expected}")]
    BackwardCountMismatch { observed: u64, expected: u64 },

    #[error("object {obj_id} is present in the list but missing from the hash index")]
    IndexMissingEntry { obj_id: u64 },

    #[error("hash index maps obj_id {obj_id} to a different node than the list holds")]
    IndexPointsElsewhere { obj_id: u64 },

    #[error("hash index has {indexed} entries but the list has {listed}")]
    IndexCountMismatch { indexed: u64, listed: u64 },

    #[error("occupied_byte is {recorded} but summing resident objects gives {summed}")]
    ByteAccountingMismatch { recorded: u64, summed: u64 },

    #[error("head/tail nullity disagree: head_is_nil={head_is_nil} tail_is_nil={tail_is_nil}")]
    HeadTailNullityMismatch { head_is_nil: bool, tail_is_nil: bool },
}
