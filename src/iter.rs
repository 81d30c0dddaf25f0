use std::io::Cursor;

use crate::error::{Error, Result};
use crate::item::TaggedItem;

/// An iterator that sequentially decodes the items of a push message.
///
/// Yields exactly `item_count` items, then checks that the stream has been
/// consumed. Stops after the first error.
pub struct ItemIter<'a> {
  cursor: Cursor<&'a [u8]>,
  item_count: u32,
  /// Index of the next item to decode.
  next_index: u32,
  failed: bool,
}

impl<'a> ItemIter<'a> {
  /// Iterates over `items`, the bytes following a header that declared `item_count`.
  pub fn new(items: &'a [u8], item_count: u32) -> Self {
    Self {
      cursor: Cursor::new(items),
      item_count,
      next_index: 0,
      failed: false,
    }
  }

  fn remaining(&self) -> usize {
    self.cursor.get_ref().len() - self.cursor.position() as usize
  }

  fn read_next(&mut self) -> Result<Option<TaggedItem>> {
    if self.next_index == self.item_count {
      // All declared items read; anything left over means the count is wrong.
      let trailing = self.remaining();
      if trailing != 0 {
        return Err(Error::ItemCountMismatch {
          declared: self.item_count,
          trailing,
        });
      }
      return Ok(None);
    }

    let offset = self.cursor.position();
    let remaining = self.remaining();
    match TaggedItem::read(&mut self.cursor, remaining)? {
      Some(item) => {
        self.next_index += 1;
        Ok(Some(item))
      }
      None => Err(Error::Truncated {
        index: self.next_index,
        offset,
      }),
    }
  }
}

impl Iterator for ItemIter<'_> {
  type Item = Result<TaggedItem>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed {
      return None;
    }

    match self.read_next() {
      Ok(Some(item)) => Some(Ok(item)),
      Ok(None) => None,
      Err(e) => {
        self.failed = true;
        Some(Err(e))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::item::Message;

  fn encode(items: &[TaggedItem]) -> Vec<u8> {
    let mut buf = Vec::new();
    for item in items {
      item.encode_into(&mut buf, usize::MAX).unwrap();
    }
    buf
  }

  #[test]
  fn test_yields_declared_items() {
    let items = vec![
      TaggedItem::new(0, Message::Raw(b"a".to_vec())),
      TaggedItem::new(1, Message::Raw(b"bb".to_vec())),
    ];
    let buf = encode(&items);

    let decoded: Vec<TaggedItem> = ItemIter::new(&buf, 2).collect::<Result<_>>().unwrap();
    assert_eq!(decoded, items);
  }

  #[test]
  fn test_count_too_high() {
    let buf = encode(&[TaggedItem::new(0, Message::Raw(b"a".to_vec()))]);

    let mut iter = ItemIter::new(&buf, 2);
    assert!(iter.next().unwrap().is_ok());
    assert!(matches!(iter.next(), Some(Err(Error::Truncated { index: 1, .. }))));
    assert!(iter.next().is_none());
  }

  #[test]
  fn test_count_too_low() {
    let buf = encode(&[
      TaggedItem::new(0, Message::Raw(b"a".to_vec())),
      TaggedItem::new(1, Message::Raw(b"b".to_vec())),
    ]);

    let mut iter = ItemIter::new(&buf, 1);
    assert!(iter.next().unwrap().is_ok());
    assert!(matches!(iter.next(), Some(Err(Error::ItemCountMismatch { declared: 1, trailing: 14 }))));
  }

  #[test]
  fn test_empty_stream() {
    let mut iter = ItemIter::new(&[], 0);
    assert!(iter.next().is_none());
  }
}
