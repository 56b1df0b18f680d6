//! Walkthrough of the first-fit allocator on top of the program break.
//!
//! Run with `--step` to pause between stages, which leaves time to inspect
//! the process with `pmap`, `gdb` and friends. Set `RUST_LOG` to change
//! how much of the allocator's tracing output is shown.

use std::io::Read;

use ffalloc::{Allocation, Arena, FirstFitAllocator, SbrkArena, program_break};
use tracing_subscriber::EnvFilter;

struct Demo {
  allocator: FirstFitAllocator<SbrkArena>,
  step: bool,
}

impl Demo {
  fn pause(&self) {
    if self.step {
      println!("\n>>> Press ENTER to continue...");
      let _ = std::io::stdin().bytes().next();
    }
  }

  fn allocate(
    &mut self,
    label: &str,
    size: usize,
  ) -> Option<Allocation> {
    match self.allocator.allocate(size) {
      Ok(allocation) => {
        println!(
          "\n[{label}] allocate({size}) -> offset {}, program break = {:#x}",
          allocation.offset(),
          program_break(),
        );
        Some(allocation)
      }
      // Anything else in the process moving the break ends the walkthrough.
      Err(err) => {
        println!("\n[{label}] allocate({size}) failed: {err}");
        None
      }
    }
  }

  fn release(
    &mut self,
    label: &str,
    allocation: Allocation,
  ) {
    match self.allocator.release(allocation) {
      Ok(()) => println!("\n[{label}] release(offset {})", allocation.offset()),
      Err(err) => println!("\n[{label}] release rejected: {err}"),
    }
  }

  fn show(&self) {
    let stats = self.allocator.stats();
    println!(
      "    total = {} bytes, free = {} bytes, live allocations = {}",
      stats.heap_bytes_total, stats.heap_bytes_free, stats.live_allocations
    );
    for (offset, length) in self.allocator.free_blocks() {
      println!("    free block at offset {offset:>6}, {length} payload bytes");
    }
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ffalloc=trace")),
    )
    .init();

  let mut demo = Demo {
    allocator: FirstFitAllocator::new(SbrkArena::new()),
    step: std::env::args().any(|arg| arg == "--step"),
  };

  println!(
    "[start] PID = {}, program break = {:#x}",
    std::process::id(),
    program_break()
  );
  demo.pause();

  // 1) Two fresh blocks, carved one after the other.
  let Some(first) = demo.allocate("1", 100) else {
    return;
  };
  demo
    .allocator
    .payload_mut(&first)
    .expect("first block is live")
    .fill(0xAB);
  let Some(second) = demo.allocate("1", 50) else {
    return;
  };
  if let Some(base) = demo.allocator.arena().base_address() {
    println!("    arena base = {base:#x}, arena length = {}", demo.allocator.arena().len());
  }
  demo.show();
  demo.pause();

  // 2) Releasing both merges them into one free block.
  demo.release("2", first);
  demo.show();
  demo.release("2", second);
  demo.show();
  demo.pause();

  // 3) A small request reuses the free block by splitting it.
  let Some(small) = demo.allocate("3", 40) else {
    return;
  };
  demo.show();
  demo.pause();

  // 4) Something larger than any free block grows the arena.
  let Some(big) = demo.allocate("4", 64 * 1024) else {
    return;
  };
  demo.show();
  demo.pause();

  // 5) Mistakes are reported instead of corrupting the free list.
  demo.release("5", small);
  demo.release("5", small);
  demo.release("5", Allocation::from_offset(small.offset() + 1));
  demo.show();

  demo.release("6", big);
  demo.show();

  println!("\n[end] The arena is never handed back; the OS reclaims it at exit.");
}
