use std::sync::{Mutex, MutexGuard};

use crate::{
  arena::Arena, error::AllocError, first_fit::FirstFitAllocator, handle::Allocation,
  stats::HeapStats,
};

/// A [`FirstFitAllocator`] behind a single mutex.
///
/// Every call holds the lock for the whole operation, so splitting and
/// coalescing always run with exclusive access to the free list.
pub struct LockedAllocator<A: Arena> {
  inner: Mutex<FirstFitAllocator<A>>,
}

impl<A: Arena> LockedAllocator<A> {
  pub fn new(allocator: FirstFitAllocator<A>) -> Self {
    Self {
      inner: Mutex::new(allocator),
    }
  }

  pub fn allocate(
    &self,
    size: usize,
  ) -> Result<Allocation, AllocError> {
    self.lock().allocate(size)
  }

  pub fn release(
    &self,
    allocation: Allocation,
  ) -> Result<(), AllocError> {
    self.lock().release(allocation)
  }

  pub fn heap_bytes_total(&self) -> usize {
    self.lock().heap_bytes_total()
  }

  pub fn heap_bytes_free(&self) -> usize {
    self.lock().heap_bytes_free()
  }

  pub fn stats(&self) -> HeapStats {
    self.lock().stats()
  }

  /// Runs `f` with exclusive access to the allocator.
  pub fn with<R>(
    &self,
    f: impl FnOnce(&mut FirstFitAllocator<A>) -> R,
  ) -> R {
    f(&mut self.lock())
  }

  pub fn into_inner(self) -> FirstFitAllocator<A> {
    self
      .inner
      .into_inner()
      .unwrap_or_else(|_| panic!("allocator lock poisoned by a corrupted heap"))
  }

  // A poisoned lock means an earlier call panicked on a corrupted heap.
  fn lock(&self) -> MutexGuard<'_, FirstFitAllocator<A>> {
    self
      .inner
      .lock()
      .unwrap_or_else(|_| panic!("allocator lock poisoned by a corrupted heap"))
  }
}
