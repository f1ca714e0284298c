//! Archive fixtures for tests.
//!
//! [`ArchiveWriter`] lays out records in the archive format so reader tests
//! can run against real bytes. It is only compiled for tests or with the
//! `test-support` feature and is not a packing tool.
//!
//! Encoding into a `Vec` cannot fail, so encoder results are expected.
#![allow(clippy::expect_used)]

use std::io::Write;
use std::path::Path;

use flate2::write::DeflateEncoder;
use flate2::Compression;
use respak_common::{hash, ByteOrder};

use crate::crypto::KeyMaterial;
use crate::recipe::Recipe;

/// One record, field by field, as it will be written.
///
/// The builder methods override individual fields to produce inconsistent
/// or corrupt records.
#[derive(Debug, Clone)]
pub struct RawRecord {
    identifier: String,
    is_cooked: bool,
    recipe: String,
    raw_type: Vec<u8>,
    raw_length: i64,
    cooked_length: i64,
    payload: Vec<u8>,
    declared_length: Option<i32>,
}

impl RawRecord {
    /// A record with consistent lengths; cooked whenever the recipe is set.
    pub fn new(identifier: &str, recipe: &str, raw_type: &[u8], payload: &[u8]) -> Self {
        Self {
            identifier: identifier.to_string(),
            is_cooked: !recipe.is_empty(),
            recipe: recipe.to_string(),
            raw_type: raw_type.to_vec(),
            raw_length: payload.len() as i64,
            cooked_length: payload.len() as i64,
            payload: payload.to_vec(),
            declared_length: None,
        }
    }

    /// Override the cooked flag.
    pub fn cooked(mut self, is_cooked: bool) -> Self {
        self.is_cooked = is_cooked;
        self
    }

    /// Override the declared raw length.
    pub fn raw_length(mut self, raw_length: i64) -> Self {
        self.raw_length = raw_length;
        self
    }

    /// Override the declared cooked length.
    pub fn cooked_length(mut self, cooked_length: i64) -> Self {
        self.cooked_length = cooked_length;
        self
    }

    /// Override the declared body length used for skipping.
    pub fn declared_length(mut self, declared_length: i32) -> Self {
        self.declared_length = Some(declared_length);
        self
    }
}

/// Builds archive bytes record by record.
#[derive(Debug, Clone, Default)]
pub struct ArchiveWriter {
    order: ByteOrder,
    records: Vec<RawRecord>,
    record_count: Option<i64>,
}

impl ArchiveWriter {
    /// A little-endian writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer using the given byte order.
    pub fn with_byte_order(order: ByteOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    /// Write this record count instead of the real one.
    pub fn record_count(&mut self, count: i64) -> &mut Self {
        self.record_count = Some(count);
        self
    }

    /// Append a record exactly as given.
    pub fn add_record(&mut self, record: RawRecord) -> &mut Self {
        self.records.push(record);
        self
    }

    /// Append an uncooked record under a literal identifier.
    pub fn add_raw(&mut self, identifier: &str, content_type: &str, data: &[u8]) -> &mut Self {
        self.add_record(RawRecord::new(identifier, "", content_type.as_bytes(), data))
    }

    /// Append a record cooked with `recipe`, identified the way a reader
    /// looks it up.
    pub fn add(
        &mut self,
        recipe: Recipe,
        namespace: &str,
        logical_path: &str,
        content_type: &str,
        data: &[u8],
    ) -> &mut Self {
        let lookup = hash::lookup_string(namespace, logical_path);

        let mut payload = if recipe.is_compressed() {
            deflate(data)
        } else {
            data.to_vec()
        };
        let mut raw_type = content_type.as_bytes().to_vec();

        let identifier = if recipe.is_encrypted() {
            let material = KeyMaterial::derive(&lookup);
            payload = material
                .decrypt(&payload)
                .expect("derived key material has cipher-sized fields");
            raw_type = material
                .decrypt(&raw_type)
                .expect("derived key material has cipher-sized fields");
            hash::secure_identifier(&lookup)
        } else {
            lookup
        };

        let record = RawRecord::new(&identifier, recipe.tag(), &raw_type, &payload)
            .raw_length(data.len() as i64);
        self.add_record(record)
    }

    fn put_i32(&self, out: &mut Vec<u8>, value: i32) {
        match self.order {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn put_i64(&self, out: &mut Vec<u8>, value: i64) {
        match self.order {
            ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
            ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    }

    fn put_blob(&self, out: &mut Vec<u8>, bytes: &[u8]) {
        self.put_i32(out, bytes.len() as i32);
        out.extend_from_slice(bytes);
    }

    fn encode_record(&self, record: &RawRecord, out: &mut Vec<u8>) {
        self.put_blob(out, record.identifier.as_bytes());
        out.push(u8::from(record.is_cooked));
        self.put_blob(out, record.recipe.as_bytes());

        let mut body = Vec::new();
        self.put_blob(&mut body, &record.raw_type);
        self.put_i64(&mut body, record.raw_length);
        self.put_i64(&mut body, record.cooked_length);
        self.put_blob(&mut body, &record.payload);

        let declared = record.declared_length.unwrap_or(body.len() as i32);
        self.put_i32(out, declared);
        out.extend_from_slice(&body);
    }

    /// Encode the archive.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let count = self.record_count.unwrap_or(self.records.len() as i64);
        self.put_i64(&mut out, count);

        for record in &self.records {
            self.encode_record(record, &mut out);
        }
        out
    }

    /// Encode the archive into a file.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_bytes())
    }
}

/// Raw DEFLATE at the default level.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .expect("writing into a Vec cannot fail");
    encoder.finish().expect("writing into a Vec cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_of_raw_record() {
        let mut writer = ArchiveWriter::new();
        writer.add_raw("id", "t", b"xy");
        let bytes = writer.to_bytes();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1i64.to_le_bytes());
        expected.extend_from_slice(&2i32.to_le_bytes());
        expected.extend_from_slice(b"id");
        expected.push(0);
        expected.extend_from_slice(&0i32.to_le_bytes());
        // body: 4 + 1 + 8 + 8 + 4 + 2
        expected.extend_from_slice(&27i32.to_le_bytes());
        expected.extend_from_slice(&1i32.to_le_bytes());
        expected.extend_from_slice(b"t");
        expected.extend_from_slice(&2i64.to_le_bytes());
        expected.extend_from_slice(&2i64.to_le_bytes());
        expected.extend_from_slice(&2i32.to_le_bytes());
        expected.extend_from_slice(b"xy");

        assert_eq!(bytes, expected);
    }
}
