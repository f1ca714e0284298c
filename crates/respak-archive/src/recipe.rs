//! Recipe tags.
//!
//! A recipe names the transforms a producer applied to a record payload.
//! It is stored as a short string and parsed once into [`Recipe`].

use std::fmt;

/// Transforms applied to a record's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Recipe {
    /// Stored as-is (`""`).
    None,
    /// DEFLATE only (`"Z"`).
    Compressed,
    /// Encrypted only (`"MSC"`).
    Encrypted,
    /// Encrypted, then compressed before encryption (`"MSCZ"`).
    ///
    /// Decoding decrypts first and inflates second.
    EncryptedCompressed,
}

impl Recipe {
    /// Prefix shared by all secure recipe tags.
    pub const SECURE_PREFIX: &'static str = "MS";

    /// The on-disk tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Compressed => "Z",
            Self::Encrypted => "MSC",
            Self::EncryptedCompressed => "MSCZ",
        }
    }

    /// Whether the payload and content type are ciphertext.
    #[inline]
    pub const fn is_encrypted(self) -> bool {
        matches!(self, Self::Encrypted | Self::EncryptedCompressed)
    }

    /// Whether the payload needs inflating.
    #[inline]
    pub const fn is_compressed(self) -> bool {
        matches!(self, Self::Compressed | Self::EncryptedCompressed)
    }
}

impl TryFrom<&str> for Recipe {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "" => Ok(Self::None),
            "Z" => Ok(Self::Compressed),
            "MSC" => Ok(Self::Encrypted),
            "MSCZ" => Ok(Self::EncryptedCompressed),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            other => f.write_str(other.tag()),
        }
    }
}
