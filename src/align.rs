/// Rounds `value` up to the next multiple of the machine word.
///
/// The caller must make sure the rounded value fits in a `usize`.
///
/// # Examples
///
/// ```rust
/// use ffalloc::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::std::mem::size_of::<usize>() - 1) & !(::std::mem::size_of::<usize>() - 1)
  };
}

#[cfg(test)]
mod tests {
  use std::mem;

  #[test]
  fn test_align() {
    let ptr_size = mem::size_of::<usize>();

    for i in 0..10 {
      let sizes = (ptr_size * i + 1)..=(ptr_size * (i + 1));
      let expected = ptr_size * (i + 1);

      for size in sizes {
        assert_eq!(expected, align!(size));
      }
    }
  }

  #[test]
  fn test_align_keeps_multiples() {
    let ptr_size = mem::size_of::<usize>();

    assert_eq!(align!(0usize), 0);
    assert_eq!(align!(ptr_size * 7), ptr_size * 7);
  }
}
