use std::collections::HashMap;

use ironpush::{Payload, PushSerializer, SerializerOptions, TaggedItem, deserialize};

pub type Team = &'static str;

pub fn serializer(tracing_enabled: bool) -> PushSerializer<Team> {
  PushSerializer::new(SerializerOptions::new(tracing_enabled))
}

/// Completes everything and decodes every shard's message.
#[allow(dead_code)]
pub fn decode_all(serializer: &mut PushSerializer<Team>) -> HashMap<Team, Vec<TaggedItem>> {
  serializer
    .get_all_serialized()
    .unwrap()
    .into_iter()
    .map(|(team, blob)| {
      let (header, items) = deserialize(&blob).unwrap();
      assert_eq!(header.item_count as usize, items.len());
      (team, items)
    })
    .collect()
}

#[allow(dead_code)]
pub fn is_marker(item: &TaggedItem) -> bool {
  matches!(item.payload, Payload::SpanContext(_))
}

#[allow(dead_code)]
pub fn data_items(items: &[TaggedItem]) -> Vec<&TaggedItem> {
  items.iter().filter(|i| !is_marker(i)).collect()
}
