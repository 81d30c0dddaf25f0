use std::collections::HashSet;
use std::hash::Hash;

use crate::item::SpanId;

/// Tracks the span of the transaction currently being serialized and the
/// shards that have already received its marker.
#[derive(Debug)]
pub(crate) struct SpanTracker<K> {
  span: SpanId,
  valid: bool,
  notified: HashSet<K>,
}

impl<K: Eq + Hash + Clone> SpanTracker<K> {
  pub fn new() -> Self {
    Self {
      span: SpanId::default(),
      valid: false,
      notified: HashSet::new(),
    }
  }

  /// Replaces the current span and forgets which shards were notified.
  /// Returns true if a still-valid span was overwritten.
  pub fn install(&mut self, span: SpanId, valid: bool) -> bool {
    let overlapped = self.valid;
    self.span = span;
    self.valid = valid;
    self.notified.clear();
    overlapped
  }

  pub fn invalidate(&mut self) {
    self.valid = false;
  }

  pub fn current(&self) -> Option<SpanId> {
    self.valid.then_some(self.span)
  }

  /// Returns the span if `shard` still needs its marker, recording it as notified.
  pub fn claim(&mut self, shard: &K) -> Option<SpanId> {
    if !self.valid || self.notified.contains(shard) {
      return None;
    }
    self.notified.insert(shard.clone());
    Some(self.span)
  }
}
