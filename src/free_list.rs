//! Address-ordered, doubly linked list of free blocks.
//!
//! The list is intrusive: the links live in the block headers inside arena
//! memory, so every operation takes the arena bytes alongside the list.
//! Nodes are identified by the arena offset of their header.

use crate::block::{self, BlockHeader};

#[derive(Debug, Default)]
pub struct FreeList {
  head: Option<usize>,
}

impl FreeList {
  pub fn new() -> Self {
    Self { head: None }
  }

  pub fn head(&self) -> Option<usize> {
    self.head
  }

  /// Links the header at `node` into its address-ordered slot.
  ///
  /// The node's own links are overwritten; its length is left alone.
  pub fn insert(
    &mut self,
    mem: &mut [u8],
    node: usize,
  ) {
    let Some(head) = self.head else {
      block::set_prev(mem, node, None);
      block::set_next(mem, node, None);
      self.head = Some(node);
      return;
    };

    if node < head {
      block::set_prev(mem, node, None);
      block::set_next(mem, node, Some(head));
      block::set_prev(mem, head, Some(node));
      self.head = Some(node);
      return;
    }

    let mut cursor = head;
    loop {
      match BlockHeader::read(mem, cursor).next {
        Some(next) if next < node => cursor = next,
        _ => break,
      }
    }

    self.insert_after(mem, cursor, node);
  }

  /// Splices `node` directly after `anchor`.
  ///
  /// Only valid when no free block lies between the two addresses, e.g. a
  /// residual carved from the tail of `anchor`.
  pub fn insert_after(
    &mut self,
    mem: &mut [u8],
    anchor: usize,
    node: usize,
  ) {
    let successor = BlockHeader::read(mem, anchor).next;

    block::set_prev(mem, node, Some(anchor));
    block::set_next(mem, node, successor);
    if let Some(successor) = successor {
      block::set_prev(mem, successor, Some(node));
    }
    block::set_next(mem, anchor, Some(node));
  }

  /// Detaches `node` using its own links and clears them.
  pub fn remove(
    &mut self,
    mem: &mut [u8],
    node: usize,
  ) {
    let header = BlockHeader::read(mem, node);

    match header.prev {
      Some(prev) => block::set_next(mem, prev, header.next),
      None => self.head = header.next,
    }
    if let Some(next) = header.next {
      block::set_prev(mem, next, header.prev);
    }

    block::set_prev(mem, node, None);
    block::set_next(mem, node, None);
  }

  /// Walks the list in address order.
  pub fn iter<'a>(
    &self,
    mem: &'a [u8],
  ) -> Iter<'a> {
    Iter {
      mem,
      cursor: self.head,
    }
  }
}

/// Iterator over `(offset, header)` pairs of a [`FreeList`].
pub struct Iter<'a> {
  mem: &'a [u8],
  cursor: Option<usize>,
}

impl Iterator for Iter<'_> {
  type Item = (usize, BlockHeader);

  fn next(&mut self) -> Option<Self::Item> {
    let offset = self.cursor?;
    let header = BlockHeader::read(self.mem, offset);
    self.cursor = header.next;
    Some((offset, header))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::HEADER_SIZE;

  /// Arena image with `count` back-to-back headers of payload length 8.
  fn blocks(count: usize) -> (Vec<u8>, Vec<usize>) {
    let stride = HEADER_SIZE + 8;
    let mut mem = vec![0u8; count * stride];
    let offsets: Vec<usize> = (0..count).map(|i| i * stride).collect();
    for &offset in &offsets {
      BlockHeader::new(8).write(&mut mem, offset);
    }
    (mem, offsets)
  }

  fn order(
    list: &FreeList,
    mem: &[u8],
  ) -> Vec<usize> {
    list.iter(mem).map(|(offset, _)| offset).collect()
  }

  fn assert_links_consistent(
    list: &FreeList,
    mem: &[u8],
  ) {
    let mut expected_prev = None;
    for (offset, header) in list.iter(mem) {
      assert_eq!(header.prev, expected_prev);
      expected_prev = Some(offset);
    }
  }

  #[test]
  fn test_insert_into_empty() {
    let (mut mem, offsets) = blocks(1);
    let mut list = FreeList::new();
    assert_eq!(list.head(), None);

    list.insert(&mut mem, offsets[0]);

    assert_eq!(list.head(), Some(offsets[0]));
    assert_eq!(order(&list, &mem), offsets);
  }

  #[test]
  fn test_insert_ascending() {
    let (mut mem, offsets) = blocks(4);
    let mut list = FreeList::new();

    for &offset in &offsets {
      list.insert(&mut mem, offset);
    }

    assert_eq!(order(&list, &mem), offsets);
    assert_links_consistent(&list, &mem);
  }

  #[test]
  fn test_insert_descending() {
    let (mut mem, offsets) = blocks(4);
    let mut list = FreeList::new();

    for &offset in offsets.iter().rev() {
      list.insert(&mut mem, offset);
    }

    assert_eq!(order(&list, &mem), offsets);
    assert_links_consistent(&list, &mem);
  }

  #[test]
  fn test_insert_interleaved() {
    let (mut mem, offsets) = blocks(5);
    let mut list = FreeList::new();

    for i in [2, 0, 4, 1, 3] {
      list.insert(&mut mem, offsets[i]);
    }

    assert_eq!(order(&list, &mem), offsets);
    assert_links_consistent(&list, &mem);
  }

  #[test]
  fn test_remove_head_middle_tail() {
    let (mut mem, offsets) = blocks(4);
    let mut list = FreeList::new();
    for &offset in &offsets {
      list.insert(&mut mem, offset);
    }

    list.remove(&mut mem, offsets[0]);
    assert_eq!(list.head(), Some(offsets[1]));

    list.remove(&mut mem, offsets[2]);
    list.remove(&mut mem, offsets[3]);

    assert_eq!(order(&list, &mem), vec![offsets[1]]);
    assert_links_consistent(&list, &mem);

    let removed = BlockHeader::read(&mem, offsets[2]);
    assert_eq!((removed.prev, removed.next), (None, None));
    assert_eq!(removed.length, 8);

    list.remove(&mut mem, offsets[1]);
    assert_eq!(list.head(), None);
  }

  #[test]
  fn test_insert_after() {
    let (mut mem, offsets) = blocks(3);
    let mut list = FreeList::new();
    list.insert(&mut mem, offsets[0]);
    list.insert(&mut mem, offsets[2]);

    list.insert_after(&mut mem, offsets[0], offsets[1]);

    assert_eq!(order(&list, &mem), offsets);
    assert_links_consistent(&list, &mem);
  }
}
