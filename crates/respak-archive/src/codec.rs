//! Record decoding.
//!
//! Each record is read strictly in order: identifier, cooked flag, recipe and
//! declared body length form the header, which is read for every record.
//! On a match the body is decoded (content type, lengths, payload) and the
//! recipe is undone. Otherwise the body is skipped by its declared length so
//! the stream lands exactly on the next record.

use std::io::{Read, Seek};

use respak_common::{hash, BinaryStreamReader};
use tracing::{debug, warn};

use crate::crypto::KeyMaterial;
use crate::decompress;
use crate::recipe::Recipe;
use crate::record::{ArchiveRecord, RecordHeader};
use crate::{Error, Result};

/// How to treat a record whose lengths disagree: a decoded payload that
/// differs from the raw length, or a body that differs from the header's
/// declared length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LengthPolicy {
    /// Log a warning and return the data.
    #[default]
    Warn,
    /// Fail the decode with [`Error::CorruptPayload`] or
    /// [`Error::CorruptRecord`].
    Strict,
}

/// A resource lookup: the identifier to match plus the plaintext lookup
/// string that key material is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    lookup: String,
    identifier: String,
    secure: bool,
}

impl Lookup {
    /// Look up a secure record by the hash of `namespace + logical_path`.
    pub fn secure(namespace: &str, logical_path: &str) -> Self {
        let lookup = hash::lookup_string(namespace, logical_path);
        let identifier = hash::secure_identifier(&lookup);
        Self {
            lookup,
            identifier,
            secure: true,
        }
    }

    /// Look up a plain record by `namespace + logical_path` itself.
    pub fn plain(namespace: &str, logical_path: &str) -> Self {
        let lookup = hash::lookup_string(namespace, logical_path);
        Self {
            identifier: lookup.clone(),
            lookup,
            secure: false,
        }
    }

    /// The identifier a matching record carries.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The plaintext lookup string.
    #[inline]
    pub fn lookup_string(&self) -> &str {
        &self.lookup
    }

    /// Whether this is the secure (hashed) attempt.
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Derive the cipher key material for this lookup.
    pub fn key_material(&self) -> KeyMaterial {
        KeyMaterial::derive(&self.lookup)
    }
}

/// Read the header of the record starting at the current position.
pub fn read_header<R: Read + Seek>(reader: &mut BinaryStreamReader<R>) -> Result<RecordHeader> {
    let offset = reader.position();

    let identifier_length = reader.read_length()?;
    let identifier = reader.read_string(identifier_length)?;
    let is_cooked = reader.read_i8()? != 0;
    let recipe_length = reader.read_length()?;
    let recipe_tag = reader.read_string(recipe_length)?;
    let declared_length = reader.read_length()? as u64;

    Ok(RecordHeader::new(
        identifier,
        is_cooked,
        recipe_tag,
        declared_length,
        offset,
        reader.position(),
    ))
}

/// Skip the body of a record whose header was just read.
#[inline]
pub fn skip_body<R: Read + Seek>(
    reader: &mut BinaryStreamReader<R>,
    header: &RecordHeader,
) -> Result<()> {
    reader.skip(header.declared_length())?;
    Ok(())
}

/// Pick the transform to undo for a record.
fn effective_recipe(header: &RecordHeader, lookup: &Lookup) -> Result<Recipe> {
    let recipe = match header.recipe() {
        Ok(recipe) => recipe,
        Err(tag) if lookup.is_secure() => {
            return Err(Error::UnsupportedRecipe {
                identifier: header.identifier().to_string(),
                recipe: tag,
            });
        }
        Err(tag) => {
            warn!(
                identifier = header.identifier(),
                recipe = %tag,
                "unknown recipe on plain record, returning payload as stored"
            );
            return Ok(Recipe::None);
        }
    };

    // Secure records carry an `MS` recipe, plain records never do.
    if recipe.is_encrypted() != lookup.is_secure() {
        return Err(Error::UnsupportedRecipe {
            identifier: header.identifier().to_string(),
            recipe: header.recipe_tag().to_string(),
        });
    }

    if !header.is_cooked() && recipe != Recipe::None {
        warn!(
            identifier = header.identifier(),
            recipe = %recipe,
            "record is not cooked but carries a recipe, returning payload as stored"
        );
        return Ok(Recipe::None);
    }

    Ok(recipe)
}

fn read_non_negative<R: Read + Seek>(
    reader: &mut BinaryStreamReader<R>,
    header: &RecordHeader,
    field: &str,
) -> Result<u64> {
    let value = reader.read_i64()?;
    u64::try_from(value).map_err(|_| Error::CorruptRecord {
        identifier: header.identifier().to_string(),
        reason: format!("negative {field}: {value}"),
    })
}

/// Decode the body of a matching record and undo its recipe.
pub fn decode_body<R: Read + Seek>(
    reader: &mut BinaryStreamReader<R>,
    header: &RecordHeader,
    lookup: &Lookup,
    length_policy: LengthPolicy,
) -> Result<ArchiveRecord> {
    let recipe = effective_recipe(header, lookup)?;
    let corrupt = |reason: String| Error::CorruptRecord {
        identifier: header.identifier().to_string(),
        reason,
    };

    let raw_type_length = reader.read_length()?;
    let raw_type = reader.read_bytes(raw_type_length)?;
    let raw_length = read_non_negative(reader, header, "raw length")?;
    let cooked_length = read_non_negative(reader, header, "cooked length")?;
    let payload_length = reader.read_length()?;

    if payload_length as u64 != cooked_length {
        return Err(corrupt(format!(
            "payload length {payload_length} does not match cooked length {cooked_length}"
        )));
    }

    let payload = reader.read_bytes(payload_length)?;

    let consumed = reader.position() - header.body_offset();
    if consumed != header.declared_length() {
        match length_policy {
            LengthPolicy::Warn => warn!(
                identifier = header.identifier(),
                consumed,
                declared = header.declared_length(),
                "body length differs from declared length"
            ),
            LengthPolicy::Strict => {
                return Err(corrupt(format!(
                    "body is {consumed} bytes but header declares {}",
                    header.declared_length()
                )));
            }
        }
    }

    let (content_type, decrypted) = if recipe.is_encrypted() {
        let material = lookup.key_material();
        let content_type = String::from_utf8(material.decrypt(&raw_type)?)
            .map_err(|_| corrupt("content type does not decrypt to UTF-8".to_string()))?;
        (content_type, material.decrypt(&payload)?)
    } else {
        let content_type = String::from_utf8(raw_type).map_err(respak_common::Error::from)?;
        (content_type, payload)
    };

    let data = if recipe.is_compressed() {
        let size_hint = usize::try_from(raw_length).unwrap_or(usize::MAX);
        decompress::inflate(&decrypted, size_hint)?
    } else {
        decrypted
    };

    check_length(header.identifier(), data.len() as u64, raw_length, length_policy)?;

    debug!(
        identifier = header.identifier(),
        recipe = %recipe,
        content_type = %content_type,
        bytes = data.len(),
        "decoded record"
    );

    Ok(ArchiveRecord::new(
        header.identifier().to_string(),
        recipe,
        content_type,
        raw_length,
        cooked_length,
        data,
    ))
}

fn check_length(identifier: &str, actual: u64, declared: u64, policy: LengthPolicy) -> Result<()> {
    if actual == declared {
        return Ok(());
    }

    match policy {
        LengthPolicy::Warn => {
            warn!(identifier, actual, declared, "decoded length differs from raw length");
            Ok(())
        }
        LengthPolicy::Strict => Err(Error::CorruptPayload(format!(
            "{identifier}: decoded {actual} bytes, raw length is {declared}"
        ))),
    }
}
