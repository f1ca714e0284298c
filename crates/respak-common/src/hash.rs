//! Identifier hashing and digest helpers.
//!
//! Every lookup starts from a lookup string, `namespace + logical_path`,
//! concatenated without any separator normalisation. Secure records are
//! stored under the hex SHA-512 digest of that string, and their cipher key
//! and nonce are digests of the same plaintext.

use md5::Md5;
use sha2::{Digest, Sha256, Sha512};

/// Length in characters of a secure identifier (hex SHA-512).
pub const SECURE_IDENTIFIER_LEN: usize = 128;

/// Build the lookup string for a resource.
///
/// The namespace is prepended verbatim, so `"www"` + `"index.html"` gives
/// `"wwwindex.html"` while `"config/"` + `"io.xml"` gives `"config/io.xml"`.
#[inline]
pub fn lookup_string(namespace: &str, logical_path: &str) -> String {
    let mut lookup = String::with_capacity(namespace.len() + logical_path.len());
    lookup.push_str(namespace);
    lookup.push_str(logical_path);
    lookup
}

/// Compute the hashed identifier of a secure record.
pub fn secure_identifier(lookup: &str) -> String {
    hex::encode(Sha512::digest(lookup.as_bytes()))
}

/// Check whether an identifier has the shape of a secure identifier.
pub fn is_secure_identifier(identifier: &str) -> bool {
    identifier.len() == SECURE_IDENTIFIER_LEN
        && identifier
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// MD5 digest of a byte slice.
#[inline]
pub fn md5_digest(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&Md5::digest(data));
    out
}

/// SHA-256 digest of a byte slice.
#[inline]
pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(data));
    out
}
