/// Point-in-time view of allocator state.
///
/// All byte counts except `live_payload_bytes` include block headers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
  /// Bytes ever obtained from the arena.
  pub heap_bytes_total: usize,
  /// Bytes currently on the free list.
  pub heap_bytes_free: usize,
  /// Number of live allocations.
  pub live_allocations: usize,
  /// Payload bytes held by live allocations.
  pub live_payload_bytes: usize,
  pub free_blocks: usize,
  /// Payload length of the largest free block, zero when none are free.
  pub largest_free_block: usize,
}

impl HeapStats {
  /// Bytes held by live allocations, headers included.
  pub fn heap_bytes_live(&self) -> usize {
    self.heap_bytes_total - self.heap_bytes_free
  }
}
