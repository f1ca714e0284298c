//! Sequential binary reader over a seekable stream.
//!
//! This module provides [`BinaryStreamReader`], a cursor-like type that reads
//! fixed-width integers, strings and byte blobs from an archive stream and
//! can skip over record payloads without pulling them into memory.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use std::str::FromStr;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

use crate::{Error, Result};

/// Byte order of the integer fields in an archive.
///
/// Little-endian is the canonical order. Big-endian exists for archives
/// packed on big-endian hosts by producers that wrote native order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ByteOrder {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

impl FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(Self::Little),
            "big" | "be" => Ok(Self::Big),
            other => Err(format!("unknown byte order: {other}")),
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Little => f.write_str("little"),
            Self::Big => f.write_str("big"),
        }
    }
}

/// A binary reader over any `Read + Seek` stream.
///
/// The total stream length is measured once on construction so that reads
/// and skips running past the end are reported as [`Error::UnexpectedEof`]
/// instead of silently seeking beyond the data.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use respak_common::BinaryStreamReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0xAA, 0xBB, b'h', b'i'];
/// let mut reader = BinaryStreamReader::new(Cursor::new(&data[..])).unwrap();
///
/// assert_eq!(reader.read_i32().unwrap(), 0x04030201);
/// reader.skip(2).unwrap();
/// assert_eq!(reader.read_string(2).unwrap(), "hi");
/// assert!(reader.is_at_end());
/// ```
pub struct BinaryStreamReader<R> {
    inner: R,
    order: ByteOrder,
    position: u64,
    len: u64,
}

impl<R: Read + Seek> BinaryStreamReader<R> {
    /// Create a little-endian reader at the stream's current position.
    pub fn new(inner: R) -> Result<Self> {
        Self::with_byte_order(inner, ByteOrder::Little)
    }

    /// Create a reader with an explicit byte order.
    pub fn with_byte_order(mut inner: R, order: ByteOrder) -> Result<Self> {
        let position = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(position))?;

        Ok(Self {
            inner,
            order,
            position,
            len,
        })
    }

    /// Current offset from the start of the stream.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total length of the stream in bytes.
    #[inline]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Check if the stream is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bytes left after the current position.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    /// Check if the reader sits exactly at the end of the stream.
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.len
    }

    /// The byte order used for integer fields.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Consume the reader and return the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn ensure(&self, needed: u64) -> Result<()> {
        if self.remaining() < needed {
            return Err(Error::UnexpectedEof {
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Read a signed byte.
    pub fn read_i8(&mut self) -> Result<i8> {
        self.ensure(1)?;
        let value = self.inner.read_i8()?;
        self.position += 1;
        Ok(value)
    }

    /// Read an i32 in the configured byte order.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.ensure(4)?;
        let value = match self.order {
            ByteOrder::Little => self.inner.read_i32::<LittleEndian>()?,
            ByteOrder::Big => self.inner.read_i32::<BigEndian>()?,
        };
        self.position += 4;
        Ok(value)
    }

    /// Read an i64 in the configured byte order.
    pub fn read_i64(&mut self) -> Result<i64> {
        self.ensure(8)?;
        let value = match self.order {
            ByteOrder::Little => self.inner.read_i64::<LittleEndian>()?,
            ByteOrder::Big => self.inner.read_i64::<BigEndian>()?,
        };
        self.position += 8;
        Ok(value)
    }

    /// Read an i32 length prefix, rejecting negative values.
    pub fn read_length(&mut self) -> Result<usize> {
        let length = self.read_i32()?;
        usize::try_from(length).map_err(|_| Error::NegativeLength(length as i64))
    }

    /// Read exactly `length` bytes into a freshly sized buffer.
    pub fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        if length == 0 {
            return Ok(Vec::new());
        }

        self.ensure(length as u64)?;
        let mut buffer = vec![0u8; length];
        self.inner.read_exact(&mut buffer)?;
        self.position += length as u64;
        Ok(buffer)
    }

    /// Read `length` bytes and decode them as UTF-8.
    ///
    /// A zero length yields an empty string without touching the stream.
    pub fn read_string(&mut self, length: usize) -> Result<String> {
        if length == 0 {
            return Ok(String::new());
        }

        let bytes = self.read_bytes(length)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Advance past `length` bytes by seeking, without reading them.
    pub fn skip(&mut self, length: u64) -> Result<()> {
        if length == 0 {
            return Ok(());
        }

        self.ensure(length)?;
        let offset = i64::try_from(length).map_err(|_| Error::UnexpectedEof {
            needed: length,
            available: self.remaining(),
        })?;
        self.inner.seek(SeekFrom::Current(offset))?;
        self.position += length;
        Ok(())
    }
}

impl<R> fmt::Debug for BinaryStreamReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryStreamReader")
            .field("order", &self.order)
            .field("position", &self.position)
            .field("len", &self.len)
            .finish()
    }
}
