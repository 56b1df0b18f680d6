use std::mem;

/// Size in bytes of the header stored in front of every payload.
///
/// Three machine words: payload length, previous free block, next free block.
pub const HEADER_SIZE: usize = 3 * WORD;

const WORD: usize = mem::size_of::<usize>();

/// In-memory encoding of a null link.
const NIL: usize = usize::MAX;

/// Typed view of a block header.
///
/// The header lives in arena memory at `offset`, immediately before the
/// payload at `offset + HEADER_SIZE`. Links are arena offsets of other
/// headers and are only meaningful while the block sits on the free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
  pub length: usize,
  pub prev: Option<usize>,
  pub next: Option<usize>,
}

impl BlockHeader {
  pub fn new(length: usize) -> Self {
    Self {
      length,
      prev: None,
      next: None,
    }
  }

  /// Header of a block absorbed by a neighbour during coalescing.
  pub fn dead() -> Self {
    Self::new(0)
  }

  /// Decodes the header stored at `offset`.
  ///
  /// Panics if the header would extend past the end of `mem`.
  pub fn read(
    mem: &[u8],
    offset: usize,
  ) -> Self {
    Self {
      length: read_word(mem, offset),
      prev: decode_link(read_word(mem, offset + WORD)),
      next: decode_link(read_word(mem, offset + 2 * WORD)),
    }
  }

  pub fn write(
    &self,
    mem: &mut [u8],
    offset: usize,
  ) {
    write_word(mem, offset, self.length);
    write_word(mem, offset + WORD, encode_link(self.prev));
    write_word(mem, offset + 2 * WORD, encode_link(self.next));
  }

  /// First byte past this block's payload.
  pub fn end(
    &self,
    offset: usize,
  ) -> usize {
    payload_of(offset) + self.length
  }
}

/// Payload offset for a header at `header`.
pub fn payload_of(header: usize) -> usize {
  header + HEADER_SIZE
}

/// Header offset for a payload at `payload`.
pub fn header_of(payload: usize) -> usize {
  payload - HEADER_SIZE
}

/// Overwrites only the length word of the header at `offset`.
pub fn set_length(
  mem: &mut [u8],
  offset: usize,
  length: usize,
) {
  write_word(mem, offset, length);
}

pub fn set_prev(
  mem: &mut [u8],
  offset: usize,
  prev: Option<usize>,
) {
  write_word(mem, offset + WORD, encode_link(prev));
}

pub fn set_next(
  mem: &mut [u8],
  offset: usize,
  next: Option<usize>,
) {
  write_word(mem, offset + 2 * WORD, encode_link(next));
}

fn read_word(
  mem: &[u8],
  at: usize,
) -> usize {
  let mut word = [0u8; WORD];
  word.copy_from_slice(&mem[at..at + WORD]);
  usize::from_ne_bytes(word)
}

fn write_word(
  mem: &mut [u8],
  at: usize,
  value: usize,
) {
  mem[at..at + WORD].copy_from_slice(&value.to_ne_bytes());
}

fn encode_link(link: Option<usize>) -> usize {
  link.unwrap_or(NIL)
}

fn decode_link(word: usize) -> Option<usize> {
  (word != NIL).then_some(word)
}
