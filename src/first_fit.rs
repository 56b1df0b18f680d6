use std::collections::{BTreeSet, HashSet};

use tracing::{debug, error, trace, warn};

use crate::{
  align,
  arena::{Arena, BufferArena},
  block::{self, BlockHeader, HEADER_SIZE, header_of, payload_of},
  config::AllocatorConfig,
  error::{AllocError, HeapCorruption},
  free_list::FreeList,
  handle::Allocation,
  stats::HeapStats,
};

/// Largest request accepted, leaving room for the header and word rounding.
const MAX_REQUEST: usize = usize::MAX - HEADER_SIZE - std::mem::size_of::<usize>();

/// First-fit allocator over an address-ordered free list.
///
/// Blocks are carved from an [`Arena`]. Released blocks go back on the free
/// list in address order and are merged with any free neighbour they touch,
/// so the list never holds two physically adjacent blocks.
pub struct FirstFitAllocator<A: Arena> {
  arena: A,
  free: FreeList,
  heap_bytes_total: usize,
  /// Payload offsets of live allocations.
  live: BTreeSet<usize>,
  /// Payload offsets that were allocated and have since been released.
  released: HashSet<usize>,
  config: AllocatorConfig,
}

impl FirstFitAllocator<BufferArena> {
  /// Allocator over a fresh [`BufferArena`] of `config.arena_capacity` bytes.
  pub fn from_config(config: AllocatorConfig) -> Self {
    let arena = BufferArena::with_capacity(config.arena_capacity);
    Self::with_config(arena, config)
  }

  pub fn with_capacity(limit: usize) -> Self {
    Self::from_config(AllocatorConfig {
      arena_capacity: limit,
      ..AllocatorConfig::default()
    })
  }
}

impl<A: Arena> FirstFitAllocator<A> {
  pub fn new(arena: A) -> Self {
    Self::with_config(arena, AllocatorConfig::default())
  }

  pub fn with_config(
    arena: A,
    config: AllocatorConfig,
  ) -> Self {
    Self {
      arena,
      free: FreeList::new(),
      heap_bytes_total: 0,
      live: BTreeSet::new(),
      released: HashSet::new(),
      config,
    }
  }

  pub fn config(&self) -> &AllocatorConfig {
    &self.config
  }

  pub fn arena(&self) -> &A {
    &self.arena
  }

  /// Allocates a block of at least `size` bytes.
  ///
  /// The first free block in address order that is large enough is used,
  /// split when the leftover can hold a header plus at least one byte. If no
  /// free block fits, the arena is grown by exactly one header plus `size`.
  /// On error nothing about the allocator changes.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<Allocation, AllocError> {
    let size = self.request_size(size)?;

    let payload = match self.take_first_fit(size) {
      Some(header) => payload_of(header),
      None => self.expand(size)?,
    };

    self.live.insert(payload);
    self.released.remove(&payload);
    self.verify("allocate");

    Ok(Allocation::new(payload))
  }

  /// Returns a block to the free list and merges it with free neighbours.
  ///
  /// Handles that are not live are rejected with
  /// [`AllocError::DoubleFree`] or [`AllocError::InvalidFree`] and leave the
  /// heap untouched.
  pub fn release(
    &mut self,
    allocation: Allocation,
  ) -> Result<(), AllocError> {
    let payload = allocation.offset();

    if !self.live.remove(&payload) {
      if self.released.contains(&payload) {
        warn!(offset = payload, "rejecting double free");
        return Err(AllocError::DoubleFree { offset: payload });
      }
      warn!(offset = payload, "rejecting free of unknown allocation");
      return Err(AllocError::InvalidFree { offset: payload });
    }
    self.released.insert(payload);

    let header = header_of(payload);
    let mem = self.arena.as_bytes_mut();

    self.free.insert(mem, header);
    trace!(offset = header, "released block");

    if let Some(prev) = BlockHeader::read(mem, header).prev {
      coalesce(&mut self.free, mem, prev);
    }
    coalesce(&mut self.free, mem, header);

    self.verify("release");
    Ok(())
  }

  /// Bytes ever obtained from the arena, headers included.
  pub fn heap_bytes_total(&self) -> usize {
    self.heap_bytes_total
  }

  /// Bytes currently on the free list, headers included.
  ///
  /// Recomputed by walking the list on every call.
  pub fn heap_bytes_free(&self) -> usize {
    self
      .free
      .iter(self.arena.as_bytes())
      .map(|(_, header)| HEADER_SIZE + header.length)
      .sum()
  }

  pub fn stats(&self) -> HeapStats {
    let mem = self.arena.as_bytes();

    let mut stats = HeapStats {
      heap_bytes_total: self.heap_bytes_total,
      live_allocations: self.live.len(),
      ..HeapStats::default()
    };

    for (_, header) in self.free.iter(mem) {
      stats.heap_bytes_free += HEADER_SIZE + header.length;
      stats.free_blocks += 1;
      stats.largest_free_block = stats.largest_free_block.max(header.length);
    }

    stats.live_payload_bytes = self
      .live
      .iter()
      .map(|&payload| BlockHeader::read(mem, header_of(payload)).length)
      .sum();

    stats
  }

  pub fn is_live(
    &self,
    allocation: &Allocation,
  ) -> bool {
    self.live.contains(&allocation.offset())
  }

  /// Usable payload length of a live allocation.
  pub fn usable_size(
    &self,
    allocation: &Allocation,
  ) -> Option<usize> {
    self.is_live(allocation).then(|| {
      BlockHeader::read(self.arena.as_bytes(), header_of(allocation.offset())).length
    })
  }

  pub fn payload(
    &self,
    allocation: &Allocation,
  ) -> Option<&[u8]> {
    let length = self.usable_size(allocation)?;
    let start = allocation.offset();
    Some(&self.arena.as_bytes()[start..start + length])
  }

  pub fn payload_mut(
    &mut self,
    allocation: &Allocation,
  ) -> Option<&mut [u8]> {
    let length = self.usable_size(allocation)?;
    let start = allocation.offset();
    Some(&mut self.arena.as_bytes_mut()[start..start + length])
  }

  /// Live allocations in address order.
  pub fn live_allocations(&self) -> impl Iterator<Item = Allocation> + '_ {
    self.live.iter().map(|&payload| Allocation::new(payload))
  }

  /// `(header offset, payload length)` of every free block, in address order.
  pub fn free_blocks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
    self
      .free
      .iter(self.arena.as_bytes())
      .map(|(offset, header)| (offset, header.length))
  }

  /// Scans the whole free list and checks its invariants.
  ///
  /// Every node must lie inside the arena, have a positive length and a
  /// back link to its predecessor, sit at a higher offset than the node
  /// before it without touching or overlapping it, and not overlap a live
  /// allocation.
  pub fn validate(&self) -> Result<(), HeapCorruption> {
    let mem = self.arena.as_bytes();
    let arena_len = mem.len();

    let mut previous: Option<(usize, usize)> = None;
    let mut cursor = self.free.head();

    while let Some(offset) = cursor {
      let out_of_bounds = HeapCorruption::OutOfBounds { offset, arena_len };

      if offset.checked_add(HEADER_SIZE).is_none_or(|end| end > arena_len) {
        return Err(out_of_bounds);
      }
      let header = BlockHeader::read(mem, offset);
      let end = match payload_of(offset).checked_add(header.length) {
        Some(end) if end <= arena_len => end,
        _ => return Err(out_of_bounds),
      };

      if header.length == 0 {
        return Err(HeapCorruption::EmptyBlock { offset });
      }

      let expected = previous.map(|(prev, _)| prev);
      if header.prev != expected {
        return Err(HeapCorruption::BrokenBackLink {
          offset,
          expected,
          found: header.prev,
        });
      }

      if let Some((prev, prev_end)) = previous {
        if offset <= prev || prev_end > offset {
          return Err(HeapCorruption::OutOfOrder { prev, next: offset });
        }
        if prev_end == offset {
          return Err(HeapCorruption::Unmerged {
            first: prev,
            second: offset,
          });
        }
      }

      if self.overlaps_live(offset, end) {
        return Err(HeapCorruption::OverlapsLive { offset });
      }

      previous = Some((offset, end));
      cursor = header.next;
    }

    Ok(())
  }

  fn request_size(
    &self,
    size: usize,
  ) -> Result<usize, AllocError> {
    if size == 0 {
      return Err(AllocError::ZeroSize);
    }
    if size > MAX_REQUEST {
      return Err(AllocError::SizeOverflow { size });
    }

    Ok(if self.config.word_align { align!(size) } else { size })
  }

  /// Unlinks the first free block that can hold `size` bytes, splitting off
  /// the tail when it is large enough to stand as a block of its own.
  fn take_first_fit(
    &mut self,
    size: usize,
  ) -> Option<usize> {
    let mem = self.arena.as_bytes_mut();
    let (offset, header) = self.free.iter(mem).find(|(_, header)| header.length >= size)?;

    let extra = header.length - size;
    if extra > HEADER_SIZE {
      let residual = payload_of(offset) + size;
      BlockHeader::new(extra - HEADER_SIZE).write(mem, residual);
      self.free.insert_after(mem, offset, residual);
      block::set_length(mem, offset, size);

      trace!(
        offset,
        size,
        residual,
        residual_len = extra - HEADER_SIZE,
        "split free block"
      );
    } else {
      trace!(offset, size, length = header.length, "took whole free block");
    }

    self.free.remove(mem, offset);
    Some(offset)
  }

  /// Grows the arena by one fresh block of `size` payload bytes.
  fn expand(
    &mut self,
    size: usize,
  ) -> Result<usize, AllocError> {
    let increment = HEADER_SIZE + size;

    let header = self.arena.grow(increment).inspect_err(|err| {
      warn!(size, %err, "arena expansion failed");
    })?;

    BlockHeader::new(size).write(self.arena.as_bytes_mut(), header);
    self.heap_bytes_total += increment;

    debug!(
      offset = header,
      increment,
      heap_bytes_total = self.heap_bytes_total,
      "expanded arena"
    );

    Ok(payload_of(header))
  }

  /// True if any live block intersects `offset..end`.
  fn overlaps_live(
    &self,
    offset: usize,
    end: usize,
  ) -> bool {
    // A live header starting inside the range.
    if self.live.range(payload_of(offset)..payload_of(end)).next().is_some() {
      return true;
    }

    // The closest live block below the range running into it.
    match self.live.range(..payload_of(offset)).next_back() {
      Some(&payload) => {
        let length = BlockHeader::read(self.arena.as_bytes(), header_of(payload)).length;
        payload + length > offset
      }
      None => false,
    }
  }

  fn verify(
    &self,
    operation: &str,
  ) {
    if !self.config.verify_after_each_op {
      return;
    }

    if let Err(corruption) = self.validate() {
      error!(operation, %corruption, "heap corrupted");
      panic!("heap corrupted after {operation}: {corruption}");
    }
  }
}

/// Absorbs every free block that physically follows `start` into it.
fn coalesce(
  free: &mut FreeList,
  mem: &mut [u8],
  start: usize,
) {
  loop {
    let header = BlockHeader::read(mem, start);
    let Some(next) = header.next else {
      break;
    };
    if header.end(start) != next {
      break;
    }

    let absorbed = BlockHeader::read(mem, next);
    free.remove(mem, next);
    block::set_length(mem, start, header.length + HEADER_SIZE + absorbed.length);
    BlockHeader::dead().write(mem, next);

    trace!(offset = start, absorbed = next, "coalesced free blocks");
  }
}
