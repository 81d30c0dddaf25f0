use crate::error::Result;
use crate::frame::MessageHeader;
use crate::item::TaggedItem;

/// Accumulates the item stream for a single shard.
///
/// Space for the header is reserved at the front of the buffer when the
/// writer is created; the header itself is only written on completion, once
/// the item count and length are known.
#[derive(Debug)]
pub struct ShardWriter {
  buffer: Vec<u8>,
  num_items: u32,
  completed: bool,
  max_item_size: usize,
}

impl ShardWriter {
  pub fn new(capacity: usize, max_item_size: usize) -> Self {
    let mut buffer = Vec::with_capacity(MessageHeader::SIZE + capacity);
    buffer.resize(MessageHeader::SIZE, 0);
    Self {
      buffer,
      num_items: 0,
      completed: false,
      max_item_size,
    }
  }

  /// Encodes and appends one item.
  ///
  /// # Panics
  ///
  /// Panics if the writer has already been completed.
  pub fn write_item(&mut self, item: &TaggedItem) -> Result<()> {
    self.assert_writable();
    item.encode_into(&mut self.buffer, self.max_item_size)?;
    self.num_items += 1;
    Ok(())
  }

  /// Appends one item that has already been encoded by [`TaggedItem::encode_into`].
  ///
  /// # Panics
  ///
  /// Panics if the writer has already been completed.
  pub fn append_encoded(&mut self, encoded_item: &[u8]) {
    self.assert_writable();
    self.buffer.extend_from_slice(encoded_item);
    self.num_items += 1;
  }

  pub fn num_items(&self) -> u32 {
    self.num_items
  }

  /// Bytes of item data written so far, excluding the header.
  pub fn items_bytes(&self) -> usize {
    self.buffer.len() - MessageHeader::SIZE
  }

  pub fn items(&self) -> &[u8] {
    &self.buffer[MessageHeader::SIZE..]
  }

  /// Writes `header` into the reserved space and marks the writer completed.
  pub fn write_header(&mut self, header: &MessageHeader) -> Result<()> {
    let mut slot = &mut self.buffer[..MessageHeader::SIZE];
    header.write(&mut slot)?;
    self.completed = true;
    Ok(())
  }

  /// Computes the header from the current contents and writes it.
  ///
  /// Completing an already completed writer recomputes the same header;
  /// the header region is never counted as item data.
  pub fn complete(&mut self) -> Result<MessageHeader> {
    let header = MessageHeader::describe(self.num_items, self.items())?;
    self.write_header(&header)?;
    Ok(header)
  }

  pub fn is_completed(&self) -> bool {
    self.completed
  }

  /// The framed message, or `None` if the writer has not been completed.
  pub fn serialized(&self) -> Option<&[u8]> {
    self.completed.then_some(self.buffer.as_slice())
  }

  fn assert_writable(&self) {
    assert!(
      !self.completed,
      "cannot append to a shard message that has already been completed"
    );
  }
}
