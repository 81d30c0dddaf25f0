//! # IronPush
//!
//! `ironpush` builds the messages a commit proxy pushes to its log servers.
//! Each log shard ("storage team") gets one self-describing binary message
//! per commit batch, and every item in every message carries a number from a
//! single counter, giving a total order across shards.
//!
//! ## Key Features
//!
//! * **Global Ordering**: One sequence counter per serializer, shared by all shards.
//! * **Broadcasts**: An item sent to several shards carries the same number on each.
//! * **Span Markers**: Tracing context is written at most once per shard per span.
//! * **Integrity**: Versioned header with a CRC32 over the item stream.
//!
//! ## Example
//!
//! ```
//! use ironpush::{Mutation, PushSerializer, SerializerOptions, SpanId};
//!
//! # fn main() -> ironpush::Result<()> {
//! let mut serializer = PushSerializer::new(SerializerOptions::default());
//!
//! let mut txn = serializer.begin_transaction(SpanId::new(0xfeed, 0xbeef));
//! txn.write(Mutation::set(b"apple".to_vec(), b"red".to_vec()), &"team_a")?;
//! txn.write(Mutation::set(b"banana".to_vec(), b"yellow".to_vec()), &"team_a")?;
//! txn.finish();
//!
//! let blob = serializer.get_all_serialized()?.remove("team_a").unwrap();
//! let (header, items) = ironpush::deserialize(&blob)?;
//! assert_eq!(header.item_count, 3); // span marker + 2 mutations
//! assert!(matches!(items[0].payload, ironpush::Payload::SpanContext(_)));
//! # Ok(())
//! # }
//! ```

mod batch;
mod config;
mod decode;
mod error;
mod frame;
mod item;
mod iter;
mod mutation;
mod serializer;
mod writer;

// Re-exports for the flat public API
pub use batch::TransactionWriter;
pub use config::SerializerOptions;
pub use decode::{deserialize, iter_items, read_header};
pub use error::{Error, Result};
pub use frame::{MESSAGE_MAGIC, MESSAGE_VERSION, MessageHeader};
pub use item::{Message, Payload, PayloadTag, SpanId, TaggedItem};
pub use iter::ItemIter;
pub use mutation::{Mutation, MutationType};
pub use serializer::{PushSerializer, SerializerStats, ShardKey};
pub use writer::ShardWriter;
