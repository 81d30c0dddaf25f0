/// Options controlling a [`PushSerializer`](crate::PushSerializer).
#[derive(Debug, Clone)]
pub struct SerializerOptions {
  /// Whether span-context markers are injected at all.
  /// This is the process-wide tracing knob, injected by the caller.
  /// Default: true.
  pub tracing_enabled: bool,

  /// Initial capacity of each shard's buffer, in bytes.
  /// Buffers grow as needed; this only avoids early reallocations.
  /// Default: 4 KB.
  pub shard_buffer_capacity: usize,

  /// Largest encoded payload accepted for a single item.
  /// Larger payloads are rejected with `Error::PayloadTooLarge`.
  /// Span-context markers are not subject to this limit.
  /// Default: u32::MAX (the wire format limit).
  pub max_item_size: usize,
}

impl Default for SerializerOptions {
  fn default() -> Self {
    Self {
      tracing_enabled: true,
      shard_buffer_capacity: 4 * 1024, // 4 KB
      max_item_size: u32::MAX as usize,
    }
  }
}

impl SerializerOptions {
  pub fn new(tracing_enabled: bool) -> Self {
    Self {
      tracing_enabled,
      ..Default::default()
    }
  }
}
