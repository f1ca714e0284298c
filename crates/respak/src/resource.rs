//! Resolved resources.

use respak_archive::{ArchiveRecord, Recipe};

/// A decoded resource handed to a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResource {
    id: String,
    content_type: String,
    raw_length: u64,
    recipe: Recipe,
    data: Vec<u8>,
}

impl ResolvedResource {
    #[cfg(test)]
    pub(crate) fn new(id: &str, content_type: &str, recipe: Recipe, data: &[u8]) -> Self {
        Self {
            id: id.to_string(),
            content_type: content_type.to_string(),
            raw_length: data.len() as u64,
            recipe,
            data: data.to_vec(),
        }
    }

    /// Identifier of the record the resource was decoded from.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// MIME-like content type.
    #[inline]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Decoded length declared by the archive.
    #[inline]
    pub fn raw_length(&self) -> u64 {
        self.raw_length
    }

    /// Recipe that was undone.
    #[inline]
    pub fn recipe(&self) -> Recipe {
        self.recipe
    }

    /// Whether the resource came from a secure record.
    #[inline]
    pub fn is_secure(&self) -> bool {
        self.recipe.is_encrypted()
    }

    /// Decoded bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Split into data and content type.
    pub fn into_parts(self) -> (Vec<u8>, String) {
        (self.data, self.content_type)
    }
}

impl From<ArchiveRecord> for ResolvedResource {
    fn from(record: ArchiveRecord) -> Self {
        let id = record.identifier().to_string();
        let content_type = record.content_type().to_string();
        let raw_length = record.raw_length();
        let recipe = record.recipe();

        Self {
            id,
            content_type,
            raw_length,
            recipe,
            data: record.into_data(),
        }
    }
}
