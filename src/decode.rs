use std::io::Cursor;

use crate::error::{Error, Result};
use crate::frame::MessageHeader;
use crate::item::TaggedItem;
use crate::iter::ItemIter;

/// Reads and verifies the header of a push message, returning it together
/// with the item bytes it describes.
pub fn read_header(serialized: &[u8]) -> Result<(MessageHeader, &[u8])> {
  if serialized.len() < MessageHeader::SIZE {
    return Err(Error::Corruption(format!(
      "Message too short for header: {} bytes (need {})",
      serialized.len(),
      MessageHeader::SIZE
    )));
  }

  let header = MessageHeader::read(&mut Cursor::new(serialized))?;
  let items = &serialized[MessageHeader::SIZE..];
  header.verify(items)?;
  Ok((header, items))
}

/// Decodes a complete push message produced by a shard writer.
///
/// Every payload is copied out of `serialized`, so the returned items do not
/// borrow from the input.
pub fn deserialize(serialized: &[u8]) -> Result<(MessageHeader, Vec<TaggedItem>)> {
  let result = read_header(serialized).and_then(|(header, items)| {
    let decoded = ItemIter::new(items, header.item_count).collect::<Result<Vec<_>>>()?;
    Ok((header, decoded))
  });

  if let Err(e) = &result {
    tracing::warn!(target: "ironpush", "Failed to decode push message of {} bytes: {}", serialized.len(), e);
  }
  result
}

/// Iterates over the items of `serialized` without collecting them.
pub fn iter_items(serialized: &[u8]) -> Result<(MessageHeader, ItemIter<'_>)> {
  let (header, items) = read_header(serialized)?;
  Ok((header, ItemIter::new(items, header.item_count)))
}
