use std::collections::BTreeSet;

use crate::error::Result;
use crate::item::Message;
use crate::serializer::{PushSerializer, ShardKey};

/// A handle for writing the mutations of one traced transaction.
///
/// Created by [`PushSerializer::begin_transaction`], which installs the
/// transaction's span. The span is cleared when the handle is finished or
/// dropped, so the next transaction never overwrites a live span.
pub struct TransactionWriter<'a, K: ShardKey> {
  serializer: &'a mut PushSerializer<K>,
  written: usize,
}

impl<'a, K: ShardKey> TransactionWriter<'a, K> {
  pub(crate) fn new(serializer: &'a mut PushSerializer<K>) -> Self {
    Self { serializer, written: 0 }
  }

  /// Writes a message to one shard. Returns its sequence number.
  pub fn write(&mut self, message: impl Into<Message>, shard: &K) -> Result<u64> {
    let seq = self.serializer.write_message(message, shard)?;
    self.written += 1;
    Ok(seq)
  }

  /// Writes a message to several shards under one sequence number.
  pub fn broadcast(&mut self, message: impl Into<Message>, shards: &BTreeSet<K>) -> Result<u64> {
    let seq = self.serializer.broadcast_message(message, shards)?;
    self.written += 1;
    Ok(seq)
  }

  /// Ends the transaction, returning how many messages it wrote.
  pub fn finish(self) -> usize {
    self.written
  }
}

impl<K: ShardKey> Drop for TransactionWriter<'_, K> {
  fn drop(&mut self) {
    self.serializer.clear_tracing_span();
  }
}
