//! Human-readable code allocation.
//!
//! Students get enrollment codes (`2025M0001`) and teachers get registry
//! codes (`COMP-0001`). Both are a partition prefix followed by a 4-digit
//! sequence that grows by one per partition. See [`CodeAllocator`] for the
//! concurrency contract.

mod allocator;
mod partition;

pub use allocator::{CodeAllocator, current_year};
pub use partition::{CodeKind, MAX_SEQUENCE, Partition, SEQUENCE_WIDTH, registry_prefix};
