use std::{ptr::NonNull, slice};

use libc::{c_void, intptr_t, sbrk};

use crate::{arena::Arena, error::ArenaError};

/// Current program break, as reported by `sbrk(0)`.
pub fn program_break() -> usize {
  unsafe { sbrk(0) as usize }
}

/// Arena that grows the process data segment with `sbrk(2)`.
///
/// The base is the address returned by the first extension. Every later
/// extension must start exactly where the previous one ended; if another
/// user of the program break moved it in between, [`grow`](Arena::grow)
/// reports [`ArenaError::NotContiguous`] and the bytes it obtained are
/// abandoned. The region is never returned to the system.
pub struct SbrkArena {
  base: Option<NonNull<u8>>,
  len: usize,
}

// The region is owned by this arena alone; nothing about it is tied to the
// thread that created it.
unsafe impl Send for SbrkArena {}

impl SbrkArena {
  pub fn new() -> Self {
    Self { base: None, len: 0 }
  }

  /// Address of the first managed byte, once the arena has grown.
  pub fn base_address(&self) -> Option<usize> {
    self.base.map(|base| base.as_ptr() as usize)
  }
}

impl Default for SbrkArena {
  fn default() -> Self {
    Self::new()
  }
}

impl Arena for SbrkArena {
  fn grow(
    &mut self,
    increment: usize,
  ) -> Result<usize, ArenaError> {
    let exhausted = ArenaError::Exhausted {
      requested: increment,
      available: 0,
    };

    let delta = intptr_t::try_from(increment).map_err(|_| exhausted.clone())?;
    let address = unsafe { sbrk(delta) };

    if address == usize::MAX as *mut c_void {
      return Err(exhausted);
    }

    let Some(fresh) = NonNull::new(address as *mut u8) else {
      return Err(exhausted);
    };

    match self.base {
      None => self.base = Some(fresh),
      Some(base) => {
        let expected = base.as_ptr() as usize + self.len;
        if fresh.as_ptr() as usize != expected {
          return Err(ArenaError::NotContiguous {
            expected,
            actual: fresh.as_ptr() as usize,
          });
        }
      }
    }

    let start = self.len;
    self.len += increment;
    Ok(start)
  }

  fn len(&self) -> usize {
    self.len
  }

  fn as_bytes(&self) -> &[u8] {
    match self.base {
      // SAFETY: `base..base + len` was handed to this arena by `sbrk` and
      // the break is never lowered, so the range stays mapped and unaliased.
      Some(base) => unsafe { slice::from_raw_parts(base.as_ptr(), self.len) },
      None => &[],
    }
  }

  fn as_bytes_mut(&mut self) -> &mut [u8] {
    match self.base {
      // SAFETY: as in `as_bytes`; `&mut self` guarantees exclusivity.
      Some(base) => unsafe { slice::from_raw_parts_mut(base.as_ptr(), self.len) },
      None => &mut [],
    }
  }
}
