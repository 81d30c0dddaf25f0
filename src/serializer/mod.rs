mod span;

use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

use crate::batch::TransactionWriter;
use crate::config::SerializerOptions;
use crate::error::{Error, Result};
use crate::item::{Message, Payload, SpanId, TaggedItem};
use crate::serializer::span::SpanTracker;
use crate::writer::ShardWriter;

/// Identifies one log shard (storage team). The serializer only hashes,
/// compares and clones these.
pub trait ShardKey: Clone + Eq + Ord + Hash + Debug {}

impl<T: Clone + Eq + Ord + Hash + Debug> ShardKey for T {}

/// Counters describing what a serializer has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializerStats {
  /// Data items written with `write_message`.
  pub messages_written: u64,
  /// Calls to `broadcast_message`.
  pub broadcasts_written: u64,
  /// Span-context markers injected across all shards.
  pub span_markers_written: u64,
  /// Span installations that replaced a span still marked valid.
  pub overlapping_span_installs: u64,
}

/// Serializes the mutations of a commit batch into one push message per shard.
///
/// Every item receives a number from a single counter shared by all shards,
/// so items can be totally ordered across shards. A broadcast item carries
/// the same number on every shard it was sent to.
///
/// When tracing is enabled and a valid span is installed, each shard receives
/// one span-context marker ahead of its first item for that span.
///
/// # Example
///
/// ```
/// use ironpush::{Mutation, PushSerializer, SerializerOptions};
/// use std::collections::BTreeSet;
///
/// # fn main() -> ironpush::Result<()> {
/// let mut serializer = PushSerializer::new(SerializerOptions::new(false));
///
/// serializer.write_message(Mutation::set(b"k1".to_vec(), b"v1".to_vec()), &1u16)?;
/// let teams: BTreeSet<u16> = [1, 2].into_iter().collect();
/// serializer.broadcast_message(Mutation::set(b"k2".to_vec(), b"v2".to_vec()), &teams)?;
///
/// let blobs = serializer.get_all_serialized()?;
/// assert_eq!(blobs.len(), 2);
///
/// let (header, items) = ironpush::deserialize(&blobs[&1])?;
/// assert_eq!(header.item_count, 2);
/// assert_eq!(items[1].sequence, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PushSerializer<K: ShardKey> {
  options: SerializerOptions,
  writers: HashMap<K, ShardWriter>,
  /// The number the next item will receive.
  current_sequence: u64,
  span: SpanTracker<K>,
  stats: SerializerStats,
}

impl<K: ShardKey> PushSerializer<K> {
  pub fn new(options: SerializerOptions) -> Self {
    Self {
      options,
      writers: HashMap::new(),
      current_sequence: 0,
      span: SpanTracker::new(),
      stats: SerializerStats::default(),
    }
  }

  /// Installs the span of the next transaction.
  ///
  /// Every shard becomes eligible for a marker again. Replacing a span that
  /// is still valid is allowed; it is counted in
  /// [`SerializerStats::overlapping_span_installs`].
  pub fn install_tracing_span(&mut self, span: SpanId, valid: bool) {
    if self.span.install(span, valid) {
      self.stats.overlapping_span_installs += 1;
      tracing::debug!(target: "ironpush", "Installed span {:?} over a span that was still valid", span);
    }
  }

  /// Marks the current span invalid. No further markers are written until
  /// a valid span is installed.
  pub fn clear_tracing_span(&mut self) {
    self.span.invalidate();
  }

  /// The span markers are currently written for, if any.
  pub fn tracing_span(&self) -> Option<SpanId> {
    self.span.current()
  }

  /// Installs `span` and returns a writer scoped to one transaction.
  /// The span is cleared when the writer is finished or dropped.
  pub fn begin_transaction(&mut self, span: SpanId) -> TransactionWriter<'_, K> {
    self.install_tracing_span(span, true);
    TransactionWriter::new(self)
  }

  /// Writes the span-context marker to `shard` if it still needs one.
  ///
  /// Returns false without writing when tracing is disabled, no valid span
  /// is installed, or the shard already has the marker for this span.
  pub fn write_transaction_info(&mut self, shard: &K) -> Result<bool> {
    if !self.options.tracing_enabled {
      return Ok(false);
    }
    let span = match self.span.claim(shard) {
      Some(span) => span,
      None => return Ok(false),
    };

    let item = TaggedItem::new(self.current_sequence, Payload::SpanContext(span));
    let mut encoded = Vec::with_capacity(item.encoded_len());
    item.encode_into(&mut encoded, usize::MAX)?;
    self.writer(shard).append_encoded(&encoded);
    self.current_sequence += 1;

    self.stats.span_markers_written += 1;
    tracing::trace!(target: "ironpush", "Wrote span marker {:?} to shard {:?} at {}", span, shard, item.sequence);
    Ok(true)
  }

  /// Appends `message` to `shard`, preceded by the span marker if due.
  ///
  /// Returns the sequence number assigned to the message.
  pub fn write_message(&mut self, message: impl Into<Message>, shard: &K) -> Result<u64> {
    let payload = Payload::from(message.into());
    self.check_item_size(&payload)?;

    self.write_transaction_info(shard)?;

    let item = TaggedItem::new(self.current_sequence, payload);
    self.writer(shard).write_item(&item)?;
    self.current_sequence += 1;

    self.stats.messages_written += 1;
    Ok(item.sequence)
  }

  /// Appends `message` to every shard in `shards` under one shared sequence
  /// number.
  ///
  /// Span markers for all recipients are written first, each taking its own
  /// number, so the shared number is greater than every marker's. The counter
  /// advances exactly once for the message itself, even when `shards` is empty.
  pub fn broadcast_message(&mut self, message: impl Into<Message>, shards: &BTreeSet<K>) -> Result<u64> {
    let payload = Payload::from(message.into());
    self.check_item_size(&payload)?;

    for shard in shards {
      self.write_transaction_info(shard)?;
    }

    let item = TaggedItem::new(self.current_sequence, payload);
    let mut encoded = Vec::with_capacity(item.encoded_len());
    item.encode_into(&mut encoded, self.options.max_item_size)?;

    for shard in shards {
      self.writer(shard).append_encoded(&encoded);
    }
    self.current_sequence += 1;

    self.stats.broadcasts_written += 1;
    Ok(item.sequence)
  }

  /// Writes the header of `shard`'s message.
  ///
  /// A shard that has never been written to gets a valid, empty message.
  /// Completing a shard again without new writes rewrites the same header.
  pub fn complete_message_writing(&mut self, shard: &K) -> Result<()> {
    let header = self.writer(shard).complete()?;
    tracing::debug!(
      target: "ironpush",
      "Completed message for shard {:?}: {} items, {} bytes",
      shard,
      header.item_count,
      header.length
    );
    Ok(())
  }

  /// Returns the completed message for `shard`.
  ///
  /// # Panics
  ///
  /// Panics if `shard` is unknown or its message has not been completed
  /// with [`complete_message_writing`](Self::complete_message_writing).
  pub fn get_serialized(&self, shard: &K) -> Vec<u8> {
    match self.writers.get(shard) {
      Some(writer) => completed_bytes(shard, writer),
      None => panic!("no message has been written for shard {:?}", shard),
    }
  }

  /// Completes every pending message and returns all of them, one per shard
  /// that has been referenced.
  pub fn get_all_serialized(&mut self) -> Result<HashMap<K, Vec<u8>>> {
    let pending: Vec<K> = self
      .writers
      .iter()
      .filter(|(_, writer)| !writer.is_completed())
      .map(|(shard, _)| shard.clone())
      .collect();
    for shard in &pending {
      self.complete_message_writing(shard)?;
    }

    let mut results = HashMap::with_capacity(self.writers.len());
    for (shard, writer) in &self.writers {
      let previous = results.insert(shard.clone(), completed_bytes(shard, writer));
      assert!(previous.is_none(), "duplicate shard {:?} in serialized results", shard);
    }
    Ok(results)
  }

  /// The number the next item will receive.
  pub fn current_sequence(&self) -> u64 {
    self.current_sequence
  }

  /// Shards that have a message, in no particular order.
  pub fn shards(&self) -> impl Iterator<Item = &K> + '_ {
    self.writers.keys()
  }

  pub fn is_completed(&self, shard: &K) -> bool {
    self.writers.get(shard).is_some_and(ShardWriter::is_completed)
  }

  pub fn stats(&self) -> SerializerStats {
    self.stats
  }

  pub fn options(&self) -> &SerializerOptions {
    &self.options
  }

  fn writer(&mut self, shard: &K) -> &mut ShardWriter {
    let options = &self.options;
    self
      .writers
      .entry(shard.clone())
      .or_insert_with(|| ShardWriter::new(options.shard_buffer_capacity, options.max_item_size))
  }

  fn check_item_size(&self, payload: &Payload) -> Result<()> {
    let size = payload.encoded_len();
    let max = self.options.max_item_size.min(u32::MAX as usize);
    if size > max {
      return Err(Error::PayloadTooLarge { size, max });
    }
    Ok(())
  }
}

impl<K: ShardKey> Default for PushSerializer<K> {
  fn default() -> Self {
    Self::new(SerializerOptions::default())
  }
}

fn completed_bytes<K: Debug>(shard: &K, writer: &ShardWriter) -> Vec<u8> {
  match writer.serialized() {
    Some(bytes) => bytes.to_vec(),
    None => panic!("message for shard {:?} has not been completed", shard),
  }
}
