//! Tagged items: the numbered units written into a shard's buffer.
//!
//! ```text
//! [Sequence: 8][Tag: 1][Length: 4][Bytes: N]
//! ```

use crate::error::{Error, Result};
use crate::mutation::Mutation;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// Fixed bytes preceding every item payload.
pub const ITEM_HEADER_SIZE: usize = 8 + 1 + 4; // 13 bytes

/// Size of an encoded span context payload.
pub const SPAN_ID_SIZE: usize = 16;

/// Opaque distributed-trace correlation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpanId {
  pub first: u64,
  pub second: u64,
}

impl SpanId {
  pub fn new(first: u64, second: u64) -> Self {
    Self { first, second }
  }

  pub fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
    writer.write_u64::<LittleEndian>(self.first)?;
    writer.write_u64::<LittleEndian>(self.second)?;
    Ok(())
  }

  pub fn decode(bytes: &[u8]) -> Result<Self> {
    if bytes.len() != SPAN_ID_SIZE {
      return Err(Error::Corruption(format!(
        "Span context must be {} bytes, got {}",
        SPAN_ID_SIZE,
        bytes.len()
      )));
    }
    let mut reader = bytes;
    let first = reader.read_u64::<LittleEndian>()?;
    let second = reader.read_u64::<LittleEndian>()?;
    Ok(Self { first, second })
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadTag {
  Mutation = 0x00,
  Raw = 0x01,
  SpanContext = 0x02,
}

impl TryFrom<u8> for PayloadTag {
  type Error = Error;
  fn try_from(v: u8) -> Result<Self> {
    match v {
      0x00 => Ok(PayloadTag::Mutation),
      0x01 => Ok(PayloadTag::Raw),
      0x02 => Ok(PayloadTag::SpanContext),
      _ => Err(Error::UnknownPayloadTag(v)),
    }
  }
}

/// What a caller may push to a shard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
  Mutation(Mutation),
  /// Bytes the caller has already serialized.
  Raw(Vec<u8>),
}

impl From<Mutation> for Message {
  fn from(m: Mutation) -> Self {
    Message::Mutation(m)
  }
}

impl From<Vec<u8>> for Message {
  fn from(bytes: Vec<u8>) -> Self {
    Message::Raw(bytes)
  }
}

impl From<&[u8]> for Message {
  fn from(bytes: &[u8]) -> Self {
    Message::Raw(bytes.to_vec())
  }
}

/// Everything that can appear in an item stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
  Mutation(Mutation),
  Raw(Vec<u8>),
  /// Marks the start of a traced transaction on this shard.
  SpanContext(SpanId),
}

impl From<Message> for Payload {
  fn from(message: Message) -> Self {
    match message {
      Message::Mutation(m) => Payload::Mutation(m),
      Message::Raw(bytes) => Payload::Raw(bytes),
    }
  }
}

impl Payload {
  pub fn tag(&self) -> PayloadTag {
    match self {
      Payload::Mutation(_) => PayloadTag::Mutation,
      Payload::Raw(_) => PayloadTag::Raw,
      Payload::SpanContext(_) => PayloadTag::SpanContext,
    }
  }

  pub fn encoded_len(&self) -> usize {
    match self {
      Payload::Mutation(m) => m.encoded_len(),
      Payload::Raw(bytes) => bytes.len(),
      Payload::SpanContext(_) => SPAN_ID_SIZE,
    }
  }

  fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
    match self {
      Payload::Mutation(m) => m.encode(writer),
      Payload::Raw(bytes) => writer.write_all(bytes),
      Payload::SpanContext(span) => span.encode(writer),
    }
  }

  fn decode(tag: PayloadTag, bytes: Vec<u8>) -> Result<Self> {
    match tag {
      PayloadTag::Mutation => Ok(Payload::Mutation(Mutation::decode(&bytes)?)),
      PayloadTag::Raw => Ok(Payload::Raw(bytes)),
      PayloadTag::SpanContext => Ok(Payload::SpanContext(SpanId::decode(&bytes)?)),
    }
  }
}

/// One ordered, numbered unit of a shard's item stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedItem {
  pub sequence: u64,
  pub payload: Payload,
}

impl TaggedItem {
  pub fn new(sequence: u64, payload: impl Into<Payload>) -> Self {
    Self {
      sequence,
      payload: payload.into(),
    }
  }

  pub fn encoded_len(&self) -> usize {
    ITEM_HEADER_SIZE + self.payload.encoded_len()
  }

  /// Encodes the item, rejecting payloads above `max_payload` bytes.
  pub fn encode_into(&self, buf: &mut Vec<u8>, max_payload: usize) -> Result<()> {
    let payload_len = self.payload.encoded_len();
    let max = max_payload.min(u32::MAX as usize);
    if payload_len > max {
      return Err(Error::PayloadTooLarge { size: payload_len, max });
    }

    buf.reserve(ITEM_HEADER_SIZE + payload_len);
    buf.write_u64::<LittleEndian>(self.sequence)?;
    buf.write_u8(self.payload.tag() as u8)?;
    buf.write_u32::<LittleEndian>(payload_len as u32)?;
    self.payload.encode(buf)?;
    Ok(())
  }

  /// Reads one item. `remaining` is the number of bytes left in the stream,
  /// used to reject lengths that point past the end before allocating.
  pub(crate) fn read<R: Read>(reader: &mut R, remaining: usize) -> Result<Option<Self>> {
    if remaining < ITEM_HEADER_SIZE {
      return Ok(None);
    }

    let sequence = reader.read_u64::<LittleEndian>()?;
    let tag = PayloadTag::try_from(reader.read_u8()?)?;
    let len = reader.read_u32::<LittleEndian>()? as usize;
    if len > remaining - ITEM_HEADER_SIZE {
      return Ok(None);
    }

    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;

    Ok(Some(Self {
      sequence,
      payload: Payload::decode(tag, bytes)?,
    }))
  }
}
