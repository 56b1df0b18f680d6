//! Error types for allocator and arena operations.

use thiserror::Error;

/// Errors reported by an [`Arena`](crate::Arena) when it cannot grow.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArenaError {
  /// The arena has no room left for the requested extension.
  #[error("arena exhausted: requested {requested} bytes, {available} bytes available")]
  Exhausted {
    /// Number of bytes requested.
    requested: usize,
    /// Bytes still available before the arena limit.
    available: usize,
  },

  /// The underlying region was extended by someone else, so the fresh
  /// extension does not follow the bytes already managed.
  #[error("arena is no longer contiguous: expected extension at {expected:#x}, got {actual:#x}")]
  NotContiguous {
    /// Address the extension should have started at.
    expected: usize,
    /// Address the extension actually started at.
    actual: usize,
  },
}

/// Errors returned by [`FirstFitAllocator`](crate::FirstFitAllocator).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AllocError {
  /// Allocation requests must be for at least one byte.
  #[error("allocation size must be greater than zero")]
  ZeroSize,

  /// `HEADER_SIZE + size` does not fit in a `usize`.
  #[error("allocation size {size} overflows when the header is added")]
  SizeOverflow {
    /// Requested payload size.
    size: usize,
  },

  /// The arena could not be expanded. Allocator state is unchanged.
  #[error("cannot expand arena: {0}")]
  ArenaExhausted(#[from] ArenaError),

  /// The handle does not name a live allocation.
  #[error("invalid free: offset {offset} is not a live allocation")]
  InvalidFree {
    /// Payload offset carried by the handle.
    offset: usize,
  },

  /// The handle named an allocation that has already been released.
  #[error("double free: allocation at offset {offset} was already released")]
  DoubleFree {
    /// Payload offset carried by the handle.
    offset: usize,
  },
}

impl AllocError {
  /// True for every kind of rejected release, double frees included.
  pub fn is_invalid_free(&self) -> bool {
    matches!(self, Self::InvalidFree { .. } | Self::DoubleFree { .. })
  }
}

/// A broken free-list invariant found by [`FirstFitAllocator::validate`].
///
/// [`FirstFitAllocator::validate`]: crate::FirstFitAllocator::validate
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HeapCorruption {
  #[error("free block at {offset} extends past the arena end ({arena_len})")]
  OutOfBounds { offset: usize, arena_len: usize },

  #[error("free block at {offset} has prev link {found:?}, expected {expected:?}")]
  BrokenBackLink {
    offset: usize,
    expected: Option<usize>,
    found: Option<usize>,
  },

  #[error("free list out of address order: {next} follows {prev}")]
  OutOfOrder { prev: usize, next: usize },

  #[error("free blocks at {first} and {second} are adjacent but not merged")]
  Unmerged { first: usize, second: usize },

  #[error("free block at {offset} has zero length")]
  EmptyBlock { offset: usize },

  #[error("free block at {offset} overlaps a live allocation")]
  OverlapsLive { offset: usize },
}
