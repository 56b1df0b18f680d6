//! The growable memory region blocks are carved from.

use crate::error::ArenaError;

/// A contiguous byte region that only ever grows.
///
/// Positions inside the region are offsets from its base. An extension
/// always starts where the previous one ended, so offsets handed out
/// earlier stay valid forever.
pub trait Arena {
  /// Extends the region by `increment` bytes and returns the offset of
  /// the first new byte.
  ///
  /// On error the region is left exactly as it was.
  fn grow(
    &mut self,
    increment: usize,
  ) -> Result<usize, ArenaError>;

  /// Number of bytes currently managed.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn as_bytes(&self) -> &[u8];

  fn as_bytes_mut(&mut self) -> &mut [u8];
}

/// Arena backed by an ordinary heap buffer with a fixed byte limit.
#[derive(Debug)]
pub struct BufferArena {
  bytes: Vec<u8>,
  limit: usize,
}

impl BufferArena {
  pub fn with_capacity(limit: usize) -> Self {
    Self {
      bytes: Vec::new(),
      limit,
    }
  }

  pub fn limit(&self) -> usize {
    self.limit
  }
}

impl Arena for BufferArena {
  fn grow(
    &mut self,
    increment: usize,
  ) -> Result<usize, ArenaError> {
    let start = self.bytes.len();
    let available = self.limit - start;

    if increment > available {
      return Err(ArenaError::Exhausted {
        requested: increment,
        available,
      });
    }

    // The host may refuse an extension the limit allows.
    if self.bytes.try_reserve_exact(increment).is_err() {
      return Err(ArenaError::Exhausted {
        requested: increment,
        available,
      });
    }

    self.bytes.resize(start + increment, 0);
    Ok(start)
  }

  fn len(&self) -> usize {
    self.bytes.len()
  }

  fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  fn as_bytes_mut(&mut self) -> &mut [u8] {
    &mut self.bytes
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_grow_is_monotonic() {
    let mut arena = BufferArena::with_capacity(256);
    assert!(arena.is_empty());

    assert_eq!(arena.grow(100), Ok(0));
    assert_eq!(arena.grow(50), Ok(100));
    assert_eq!(arena.len(), 150);
  }

  #[test]
  fn test_grow_past_limit_leaves_arena_unchanged() {
    let mut arena = BufferArena::with_capacity(64);
    arena.grow(40).unwrap();
    arena.as_bytes_mut()[0] = 7;

    assert_eq!(
      arena.grow(25),
      Err(ArenaError::Exhausted {
        requested: 25,
        available: 24,
      })
    );
    assert_eq!(arena.len(), 40);
    assert_eq!(arena.as_bytes()[0], 7);

    assert_eq!(arena.grow(24), Ok(40));
    assert_eq!(arena.len(), arena.limit());
  }

  #[test]
  fn test_grow_beyond_host_memory_is_exhausted() {
    let mut arena = BufferArena::with_capacity(usize::MAX);
    arena.grow(16).unwrap();

    let requested = usize::MAX / 2 + 1;
    assert_eq!(
      arena.grow(requested),
      Err(ArenaError::Exhausted {
        requested,
        available: usize::MAX - 16,
      })
    );
    assert_eq!(arena.len(), 16);
  }
}
