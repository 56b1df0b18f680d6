//! # ffalloc - A First-Fit Heap Allocator
//!
//! This crate provides a **first-fit allocator** that carves blocks out of a
//! growable arena and recycles them through an **address-ordered free list**
//! with block splitting and neighbour coalescing.
//!
//! ## Overview
//!
//! ```text
//!   Arena (grows to the right only):
//!
//!   ┌────────┬──────────┬────────┬──────────┬────────┬──────────┐
//!   │ header │ payload  │ header │ payload  │ header │ payload  │
//!   │  (A)   │  live    │  (B)   │  free    │  (C)   │  free    │ ...
//!   └────────┴──────────┴────────┴──────────┴────────┴──────────┘
//!   0                   ▲                   ▲
//!                       │                   │
//!              free list head ──────► next free block
//! ```
//!
//! Every position is an *offset* from the arena base. A block is a header
//! of three words (`length`, `prev`, `next`) followed by `length` payload
//! bytes; `prev`/`next` are only used while the block is free.
//!
//! ## Crate Structure
//!
//! ```text
//!   ffalloc
//!   ├── align      - Word rounding macro (align!)
//!   ├── arena      - Arena trait and BufferArena
//!   ├── sbrk       - SbrkArena over the program break (Unix)
//!   ├── block      - Block header encoding (internal)
//!   ├── free_list  - Address-ordered intrusive free list (internal)
//!   ├── first_fit  - FirstFitAllocator
//!   ├── locked     - LockedAllocator, a mutex around the allocator
//!   ├── config     - AllocatorConfig
//!   ├── stats      - HeapStats
//!   └── error      - AllocError, ArenaError, HeapCorruption
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use ffalloc::FirstFitAllocator;
//!
//! let mut allocator = FirstFitAllocator::with_capacity(4096);
//!
//! let block = allocator.allocate(100).unwrap();
//! allocator.payload_mut(&block).unwrap().fill(42);
//! assert_eq!(allocator.payload(&block).unwrap()[99], 42);
//!
//! allocator.release(block).unwrap();
//! assert_eq!(allocator.heap_bytes_free(), allocator.heap_bytes_total());
//! ```
//!
//! ## How It Works
//!
//! Allocation walks the free list from the lowest address and takes the
//! first block that is large enough. If the leftover space can hold another
//! header plus at least one byte, the block is split:
//!
//! ```text
//!   before:  ┌────────┬──────────────────────────────────┐
//!            │ len: L │                                  │
//!            └────────┴──────────────────────────────────┘
//!
//!   after:   ┌────────┬────────────┬────────┬────────────┐
//!            │ len: S │  returned  │ len: R │    free    │
//!            └────────┴────────────┴────────┴────────────┘
//!                                  R = L - S - header
//! ```
//!
//! When nothing fits, the arena grows by exactly one header plus the
//! requested size.
//!
//! Releasing a block puts it back in its address-ordered slot and merges it
//! with the free block before it and every free block directly after it, so
//! no two free blocks ever touch.
//!
//! ## Limitations
//!
//! - **Single-threaded core**: wrap it in [`LockedAllocator`] to share it
//! - **No alignment guarantee**: unless `word_align` is enabled
//! - **Memory is never returned** to the arena's source
//!
//! ## Safety
//!
//! Blocks are addressed by offset and their bytes reached through safe
//! slices. The only `unsafe` code is in [`SbrkArena`], which turns the
//! program-break region into a slice.

pub mod align;
mod arena;
mod block;
mod config;
mod error;
mod first_fit;
mod free_list;
mod handle;
mod locked;
#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos", target_os = "freebsd"))]
mod sbrk;
mod stats;

pub use arena::{Arena, BufferArena};
pub use block::HEADER_SIZE;
pub use config::{AllocatorConfig, DEFAULT_ARENA_CAPACITY};
pub use error::{AllocError, ArenaError, HeapCorruption};
pub use first_fit::FirstFitAllocator;
pub use handle::Allocation;
pub use locked::LockedAllocator;
#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos", target_os = "freebsd"))]
pub use sbrk::{SbrkArena, program_break};
pub use stats::HeapStats;
