//! Allocator configuration.

use std::env;

use tracing::warn;

/// Default byte limit for a [`BufferArena`](crate::BufferArena): 1 MiB.
pub const DEFAULT_ARENA_CAPACITY: usize = 1 << 20;

const ENV_ARENA_CAPACITY: &str = "FFALLOC_ARENA_CAPACITY";
const ENV_VERIFY: &str = "FFALLOC_VERIFY";
const ENV_WORD_ALIGN: &str = "FFALLOC_WORD_ALIGN";

/// Tunables for a [`FirstFitAllocator`](crate::FirstFitAllocator).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocatorConfig {
  /// Byte limit used when the allocator builds its own buffer arena.
  pub arena_capacity: usize,
  /// Run a full free-list integrity scan after every allocate and release,
  /// panicking if it fails.
  pub verify_after_each_op: bool,
  /// Round every request up to a whole machine word so payloads stay word
  /// aligned. Off by default: blocks then hold exactly the requested size.
  pub word_align: bool,
}

impl Default for AllocatorConfig {
  fn default() -> Self {
    Self {
      arena_capacity: DEFAULT_ARENA_CAPACITY,
      verify_after_each_op: cfg!(debug_assertions),
      word_align: false,
    }
  }
}

impl AllocatorConfig {
  /// Defaults overridden by `FFALLOC_ARENA_CAPACITY`, `FFALLOC_VERIFY` and
  /// `FFALLOC_WORD_ALIGN`.
  ///
  /// Unparsable values are logged and ignored.
  pub fn from_env() -> Self {
    Self::default().merge_from(|key| env::var(key).ok())
  }

  fn merge_from(
    mut self,
    lookup: impl Fn(&str) -> Option<String>,
  ) -> Self {
    if let Some(raw) = lookup(ENV_ARENA_CAPACITY) {
      match raw.trim().parse() {
        Ok(capacity) => self.arena_capacity = capacity,
        Err(_) => warn!(key = ENV_ARENA_CAPACITY, value = %raw, "ignoring invalid byte count"),
      }
    }
    if let Some(raw) = lookup(ENV_VERIFY) {
      match parse_flag(&raw) {
        Some(flag) => self.verify_after_each_op = flag,
        None => warn!(key = ENV_VERIFY, value = %raw, "ignoring invalid flag"),
      }
    }
    if let Some(raw) = lookup(ENV_WORD_ALIGN) {
      match parse_flag(&raw) {
        Some(flag) => self.word_align = flag,
        None => warn!(key = ENV_WORD_ALIGN, value = %raw, "ignoring invalid flag"),
      }
    }
    self
  }
}

fn parse_flag(raw: &str) -> Option<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "1" | "true" | "yes" | "on" => Some(true),
    "0" | "false" | "no" | "off" => Some(false),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn config_from(vars: &[(&str, &str)]) -> AllocatorConfig {
    let vars: HashMap<String, String> = vars
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    AllocatorConfig::default().merge_from(|key| vars.get(key).cloned())
  }

  #[test]
  fn test_defaults() {
    let config = AllocatorConfig::default();

    assert_eq!(config.arena_capacity, DEFAULT_ARENA_CAPACITY);
    assert_eq!(config.verify_after_each_op, cfg!(debug_assertions));
    assert!(!config.word_align);
  }

  #[test]
  fn test_overrides() {
    let config = config_from(&[
      ("FFALLOC_ARENA_CAPACITY", "4096"),
      ("FFALLOC_VERIFY", "off"),
      ("FFALLOC_WORD_ALIGN", "TRUE"),
    ]);

    assert_eq!(config.arena_capacity, 4096);
    assert!(!config.verify_after_each_op);
    assert!(config.word_align);
  }

  #[test]
  fn test_invalid_values_are_ignored() {
    let config = config_from(&[
      ("FFALLOC_ARENA_CAPACITY", "lots"),
      ("FFALLOC_WORD_ALIGN", "maybe"),
    ]);

    assert_eq!(config, AllocatorConfig::default());
  }
}
