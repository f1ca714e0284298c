//! Archive records.

use crate::recipe::Recipe;

/// The leading fields of a record, read for every record the scanner visits.
///
/// This contains metadata about the record, not the payload itself.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecordHeader {
    /// Plain lookup string or hex digest of it.
    identifier: String,
    /// Whether the payload was transformed.
    is_cooked: bool,
    /// Recipe tag as stored.
    recipe_tag: String,
    /// Length of the record body following the header.
    declared_length: u64,
    /// Stream offset of the record's first byte.
    offset: u64,
    /// Stream offset of the record body.
    body_offset: u64,
}

impl RecordHeader {
    pub(crate) fn new(
        identifier: String,
        is_cooked: bool,
        recipe_tag: String,
        declared_length: u64,
        offset: u64,
        body_offset: u64,
    ) -> Self {
        Self {
            identifier,
            is_cooked,
            recipe_tag,
            declared_length,
            offset,
            body_offset,
        }
    }

    /// Get the record identifier.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Check if the payload was transformed.
    #[inline]
    pub fn is_cooked(&self) -> bool {
        self.is_cooked
    }

    /// Get the recipe tag exactly as stored.
    #[inline]
    pub fn recipe_tag(&self) -> &str {
        &self.recipe_tag
    }

    /// Parse the recipe tag, returning the tag itself if it is unknown.
    pub fn recipe(&self) -> Result<Recipe, String> {
        Recipe::try_from(self.recipe_tag.as_str())
    }

    /// Check if this is a secure record (recipe tag starting with `MS`).
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.recipe_tag.starts_with(Recipe::SECURE_PREFIX)
    }

    /// Length of the body that follows the header.
    #[inline]
    pub fn declared_length(&self) -> u64 {
        self.declared_length
    }

    /// Offset of the record in the archive.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Offset of the record body in the archive.
    #[inline]
    pub fn body_offset(&self) -> u64 {
        self.body_offset
    }

    /// Offset of the record following this one.
    #[inline]
    pub fn end_offset(&self) -> u64 {
        self.body_offset + self.declared_length
    }
}

/// A fully decoded record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRecord {
    identifier: String,
    recipe: Recipe,
    content_type: String,
    raw_length: u64,
    cooked_length: u64,
    data: Vec<u8>,
}

impl ArchiveRecord {
    pub(crate) fn new(
        identifier: String,
        recipe: Recipe,
        content_type: String,
        raw_length: u64,
        cooked_length: u64,
        data: Vec<u8>,
    ) -> Self {
        Self {
            identifier,
            recipe,
            content_type,
            raw_length,
            cooked_length,
            data,
        }
    }

    /// Get the record identifier.
    #[inline]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Get the recipe that was undone to produce the data.
    #[inline]
    pub fn recipe(&self) -> Recipe {
        self.recipe
    }

    /// Get the decoded content type.
    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Declared decoded length.
    #[inline]
    pub fn raw_length(&self) -> u64 {
        self.raw_length
    }

    /// Stored payload length.
    #[inline]
    pub fn cooked_length(&self) -> u64 {
        self.cooked_length
    }

    /// Get the decoded data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take the decoded data.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(recipe_tag: &str) -> RecordHeader {
        RecordHeader::new("id".to_string(), true, recipe_tag.to_string(), 40, 8, 30)
    }

    #[test]
    fn test_secure_by_recipe_prefix() {
        assert!(header("MSC").is_secure());
        assert!(header("MSCZ").is_secure());
        assert!(header("MSX").is_secure());
        assert!(!header("Z").is_secure());
        assert!(!header("").is_secure());
    }

    #[test]
    fn test_end_offset() {
        let header = header("Z");
        assert_eq!(header.end_offset(), 70);
        assert_eq!(header.recipe(), Ok(Recipe::Compressed));
    }

    #[test]
    fn test_unknown_recipe_is_reported() {
        assert_eq!(header("BOGUS").recipe(), Err("BOGUS".to_string()));
    }
}
