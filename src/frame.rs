use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher;
use std::io::{self, Read, Write};

pub const MESSAGE_MAGIC: u32 = 0x504C5450; // "PTLP"

/// Current wire format version.
pub const MESSAGE_VERSION: u8 = 0x01;

/// The exact binary layout of a push message header (20 bytes).
///
/// [Magic: 4]
/// [Version: 1]
/// [Reserved: 3]
/// [Item Count: 4]
/// [Length: 4]
/// [CRC32: 4]
///
/// `length` is the number of item bytes following the header and `crc`
/// covers exactly those bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
  pub item_count: u32,
  pub length: u32,
  pub crc: u32,
}

impl MessageHeader {
  pub const SIZE: usize = 4 + 1 + 3 + 4 + 4 + 4; // 20 bytes

  /// Builds the header describing `items`, an already encoded item stream.
  pub fn describe(item_count: u32, items: &[u8]) -> Result<Self> {
    let length = u32::try_from(items.len()).map_err(|_| Error::PayloadTooLarge {
      size: items.len(),
      max: u32::MAX as usize,
    })?;

    Ok(Self {
      item_count,
      length,
      crc: calculate_checksum(items),
    })
  }

  pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
    writer.write_u32::<LittleEndian>(MESSAGE_MAGIC)?;
    writer.write_u8(MESSAGE_VERSION)?;
    writer.write_all(&[0u8; 3])?; // Padding
    writer.write_u32::<LittleEndian>(self.item_count)?;
    writer.write_u32::<LittleEndian>(self.length)?;
    writer.write_u32::<LittleEndian>(self.crc)?;
    Ok(())
  }

  pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != MESSAGE_MAGIC {
      return Err(Error::Corruption(format!("Invalid Message Magic: {:#x}", magic)));
    }

    let version = reader.read_u8()?;
    if version != MESSAGE_VERSION {
      return Err(Error::UnsupportedVersion {
        expected: MESSAGE_VERSION,
        actual: version,
      });
    }

    // Skip padding
    let mut pad = [0u8; 3];
    reader.read_exact(&mut pad)?;

    let item_count = reader.read_u32::<LittleEndian>()?;
    let length = reader.read_u32::<LittleEndian>()?;
    let crc = reader.read_u32::<LittleEndian>()?;

    Ok(Self { item_count, length, crc })
  }

  /// Checks the header against the item bytes that follow it.
  pub fn verify(&self, items: &[u8]) -> Result<()> {
    if self.length as usize != items.len() {
      return Err(Error::LengthMismatch {
        declared: self.length,
        actual: items.len(),
      });
    }

    let actual = calculate_checksum(items);
    if actual != self.crc {
      return Err(Error::CrcMismatch {
        expected: self.crc,
        actual,
      });
    }
    Ok(())
  }
}

/// Calculates CRC32 over an encoded item stream.
pub fn calculate_checksum(items: &[u8]) -> u32 {
  let mut hasher = Hasher::new();
  hasher.update(items);
  hasher.finalize()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn test_header_layout() {
    let header = MessageHeader::describe(3, b"abc").unwrap();
    let mut buf = Vec::new();
    header.write(&mut buf).unwrap();

    assert_eq!(buf.len(), MessageHeader::SIZE);
    assert_eq!(&buf[0..4], &MESSAGE_MAGIC.to_le_bytes());
    assert_eq!(buf[4], MESSAGE_VERSION);
    assert_eq!(&buf[8..12], &3u32.to_le_bytes());
    assert_eq!(&buf[12..16], &3u32.to_le_bytes());

    let parsed = MessageHeader::read(&mut Cursor::new(&buf)).unwrap();
    assert_eq!(parsed, header);
  }

  #[test]
  fn test_rejects_bad_magic() {
    let mut buf = Vec::new();
    MessageHeader::default().write(&mut buf).unwrap();
    buf[0] ^= 0xFF;

    let res = MessageHeader::read(&mut Cursor::new(&buf));
    assert!(matches!(res, Err(Error::Corruption(_))));
  }

  #[test]
  fn test_rejects_unknown_version() {
    let mut buf = Vec::new();
    MessageHeader::default().write(&mut buf).unwrap();
    buf[4] = 0x7F;

    let res = MessageHeader::read(&mut Cursor::new(&buf));
    assert!(matches!(res, Err(Error::UnsupportedVersion { actual: 0x7F, .. })));
  }

  #[test]
  fn test_verify_detects_mismatches() {
    let header = MessageHeader::describe(1, b"payload").unwrap();

    assert!(header.verify(b"payload").is_ok());
    assert!(matches!(header.verify(b"payloa"), Err(Error::LengthMismatch { declared: 7, actual: 6 })));
    assert!(matches!(header.verify(b"PAYLOAD"), Err(Error::CrcMismatch { .. })));
  }

  #[test]
  fn test_empty_stream_header() {
    let header = MessageHeader::describe(0, &[]).unwrap();
    assert_eq!(header.item_count, 0);
    assert_eq!(header.length, 0);
    assert!(header.verify(&[]).is_ok());
  }
}
