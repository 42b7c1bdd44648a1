//! Typed cache keys for query results.
//!
//! A `CacheKey` is an ordered sequence of tagged segments with explicit
//! equality and hashing, so two logically identical requests always land on
//! the same cache slot. Collection keys are strict prefixes of the keys of
//! their members, which makes "invalidate everything under articles" a
//! prefix match instead of a string scan.

use sha2::{Digest, Sha256};
use std::fmt;

/// One segment of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
  /// Static resource or sub-resource name
  Name(&'static str),
  /// Numeric identifier
  Id(u64),
  /// Optional filter value; an absent filter is `None`
  Filter(Option<String>),
}

impl fmt::Display for Segment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Segment::Name(name) => write!(f, "{}", name),
      Segment::Id(id) => write!(f, "{}", id),
      Segment::Filter(Some(value)) => write!(f, "{}", value),
      Segment::Filter(None) => write!(f, "-"),
    }
  }
}

/// Canonical identifier for a cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  segments: Vec<Segment>,
}

impl CacheKey {
  /// Start a key at a resource root, e.g. `CacheKey::root("articles")`.
  pub fn root(name: &'static str) -> Self {
    Self {
      segments: vec![Segment::Name(name)],
    }
  }

  /// Append a static sub-resource name.
  pub fn name(mut self, name: &'static str) -> Self {
    self.segments.push(Segment::Name(name));
    self
  }

  /// Append a numeric identifier.
  pub fn id(mut self, id: u64) -> Self {
    self.segments.push(Segment::Id(id));
    self
  }

  /// Append an optional filter segment.
  ///
  /// An absent filter and an explicitly-empty (or whitespace-only) filter
  /// normalize to the same segment, so `list(3, None)` and `list(3, Some(""))`
  /// address the same cache slot. Use [`CacheKey::filter_verbatim`] to opt
  /// out of the normalization.
  pub fn filter(mut self, value: Option<&str>) -> Self {
    let normalized = value
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .map(str::to_owned);
    self.segments.push(Segment::Filter(normalized));
    self
  }

  /// Append a filter segment keeping an explicitly-empty value distinct
  /// from an absent one.
  pub fn filter_verbatim(mut self, value: Option<&str>) -> Self {
    self.segments.push(Segment::Filter(value.map(str::to_owned)));
    self
  }

  /// The ordered segments of this key.
  pub fn segments(&self) -> &[Segment] {
    &self.segments
  }

  /// Whether this key extends `prefix`. A key is a prefix of itself.
  ///
  /// Invalidation of a whole resource family walks cached keys and drops
  /// every one that starts with the family's collection key.
  pub fn starts_with(&self, prefix: &CacheKey) -> bool {
    self.segments.len() >= prefix.segments.len()
      && self.segments[..prefix.segments.len()] == prefix.segments[..]
  }

  /// Stable, fixed-length hash of this key for logging and external
  /// storage keys.
  pub fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    for segment in &self.segments {
      // Tag each segment so ("a", 1) and ("a:1",) cannot collide
      match segment {
        Segment::Name(name) => {
          hasher.update(b"n:");
          hasher.update(name.as_bytes());
        }
        Segment::Id(id) => {
          hasher.update(b"i:");
          hasher.update(id.to_be_bytes());
        }
        Segment::Filter(value) => {
          hasher.update(b"f:");
          if let Some(v) = value {
            hasher.update(v.as_bytes());
          }
        }
      }
      hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, segment) in self.segments.iter().enumerate() {
      if i > 0 {
        write!(f, ":")?;
      }
      write!(f, "{}", segment)?;
    }
    Ok(())
  }
}
