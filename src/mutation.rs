//! Mutation records and their byte encoding.
//!
//! The serializer never looks inside a mutation; this codec only turns the
//! record into opaque bytes for the item stream and back.
//!
//! ```text
//! [Type: 1][Param1 Len: 4][Param1: N][Param2 Len: 4][Param2: M]
//! ```

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Read, Write};

/// Mutation type codes as understood by the log servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MutationType {
  SetValue = 0,
  ClearRange = 1,
  AddValue = 2,
  And = 6,
  Or = 7,
  Xor = 8,
  AppendIfFits = 9,
  Max = 12,
  Min = 13,
  SetVersionstampedKey = 14,
  SetVersionstampedValue = 15,
  ByteMin = 16,
  ByteMax = 17,
  CompareAndClear = 20,
}

impl TryFrom<u8> for MutationType {
  type Error = Error;
  fn try_from(v: u8) -> Result<Self> {
    match v {
      0 => Ok(MutationType::SetValue),
      1 => Ok(MutationType::ClearRange),
      2 => Ok(MutationType::AddValue),
      6 => Ok(MutationType::And),
      7 => Ok(MutationType::Or),
      8 => Ok(MutationType::Xor),
      9 => Ok(MutationType::AppendIfFits),
      12 => Ok(MutationType::Max),
      13 => Ok(MutationType::Min),
      14 => Ok(MutationType::SetVersionstampedKey),
      15 => Ok(MutationType::SetVersionstampedValue),
      16 => Ok(MutationType::ByteMin),
      17 => Ok(MutationType::ByteMax),
      20 => Ok(MutationType::CompareAndClear),
      _ => Err(Error::UnknownMutationType(v)),
    }
  }
}

/// A single mutation: a type code and two byte parameters
/// (key and value, or begin and end key for range clears).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mutation {
  pub kind: MutationType,
  pub param1: Vec<u8>,
  pub param2: Vec<u8>,
}

impl Mutation {
  pub fn new(kind: MutationType, param1: impl Into<Vec<u8>>, param2: impl Into<Vec<u8>>) -> Self {
    Self {
      kind,
      param1: param1.into(),
      param2: param2.into(),
    }
  }

  pub fn set(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
    Self::new(MutationType::SetValue, key, value)
  }

  pub fn clear_range(begin: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>) -> Self {
    Self::new(MutationType::ClearRange, begin, end)
  }

  pub fn encoded_len(&self) -> usize {
    1 + 4 + self.param1.len() + 4 + self.param2.len()
  }

  pub fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
    writer.write_u8(self.kind as u8)?;
    writer.write_u32::<LittleEndian>(self.param1.len() as u32)?;
    writer.write_all(&self.param1)?;
    writer.write_u32::<LittleEndian>(self.param2.len() as u32)?;
    writer.write_all(&self.param2)?;
    Ok(())
  }

  /// Decodes a mutation that occupies the whole of `bytes`.
  pub fn decode(bytes: &[u8]) -> Result<Self> {
    let mut cursor = Cursor::new(bytes);
    let kind = MutationType::try_from(cursor.read_u8()?)?;
    let param1 = read_param(&mut cursor, bytes.len())?;
    let param2 = read_param(&mut cursor, bytes.len())?;

    if cursor.position() != bytes.len() as u64 {
      return Err(Error::Corruption(format!(
        "Mutation has {} trailing bytes",
        bytes.len() as u64 - cursor.position()
      )));
    }

    Ok(Self { kind, param1, param2 })
  }
}

fn read_param(cursor: &mut Cursor<&[u8]>, total: usize) -> Result<Vec<u8>> {
  let len = cursor.read_u32::<LittleEndian>()? as usize;
  let remaining = total - cursor.position() as usize;
  if len > remaining {
    return Err(Error::Corruption(format!(
      "Mutation parameter length {} exceeds remaining {} bytes",
      len, remaining
    )));
  }

  let mut param = vec![0u8; len];
  cursor.read_exact(&mut param)?;
  Ok(param)
}
