use crate::block::HEADER_SIZE;

/// Handle to an allocated block, naming the arena offset of its payload.
///
/// Handles are plain values: copying one does not duplicate the block, and
/// releasing a copy after the original has been released is reported as a
/// double free rather than corrupting the heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Allocation {
  offset: usize,
}

impl Allocation {
  pub(crate) fn new(offset: usize) -> Self {
    debug_assert!(offset >= HEADER_SIZE);
    Self { offset }
  }

  /// Rebuilds a handle from a payload offset, e.g. one stored elsewhere.
  ///
  /// Nothing is checked here; the allocator rejects offsets that are not
  /// live when the handle is used.
  pub fn from_offset(offset: usize) -> Self {
    Self { offset }
  }

  /// Offset of the first payload byte from the arena base.
  pub fn offset(&self) -> usize {
    self.offset
  }
}
