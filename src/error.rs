use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
  #[error("I/O Error: {0}")]
  Io(#[from] io::Error),

  #[error("Data Corruption: {0}")]
  Corruption(String),

  #[error("Unsupported message version: expected {expected}, got {actual}")]
  UnsupportedVersion { expected: u8, actual: u8 },

  #[error("CRC32 Checksum Mismatch: expected {expected:#x}, got {actual:#x}")]
  CrcMismatch { expected: u32, actual: u32 },

  #[error("Length Mismatch: header declares {declared} payload bytes, buffer holds {actual}")]
  LengthMismatch { declared: u32, actual: usize },

  #[error("Truncated item {index} at offset {offset}")]
  Truncated { index: u32, offset: u64 },

  #[error("Item Count Mismatch: header declares {declared} items, {trailing} bytes remain after the last one")]
  ItemCountMismatch { declared: u32, trailing: usize },

  #[error("Unknown payload tag: {0:#x}")]
  UnknownPayloadTag(u8),

  #[error("Unknown mutation type: {0}")]
  UnknownMutationType(u8),

  #[error("Payload too large: {size} bytes (max: {max})")]
  PayloadTooLarge { size: usize, max: usize },
}
