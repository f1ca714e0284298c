//! Payload decryption using AES-128 in CTR mode.
//!
//! Secure records are encrypted with a keystream cipher keyed per resource.
//! The key is the MD5 digest of the lookup string and the initial counter
//! block is the first 16 bytes of its SHA-256 digest. Both come from the
//! plaintext lookup string, never from the hashed identifier.

use cipher::generic_array::GenericArray;
use cipher::{KeyIvInit, StreamCipher};
use respak_common::hash;

use crate::{Error, Result};

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// Required key length in bytes.
pub const KEY_LEN: usize = 16;

/// Required nonce (initial counter block) length in bytes.
pub const NONCE_LEN: usize = 16;

/// Per-resource key and nonce.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    key: [u8; KEY_LEN],
    nonce: [u8; NONCE_LEN],
}

impl KeyMaterial {
    /// Derive the key material for a lookup string.
    pub fn derive(lookup: &str) -> Self {
        let key = hash::md5_digest(lookup.as_bytes());
        let digest = hash::sha256_digest(lookup.as_bytes());

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&digest[..NONCE_LEN]);

        Self { key, nonce }
    }

    /// The cipher key.
    #[inline]
    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// The initial counter block.
    #[inline]
    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    /// Decrypt with this key material.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        decrypt(ciphertext, &self.key, &self.nonce)
    }
}

// Never print key bytes.
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial").finish_non_exhaustive()
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::InvalidKeyMaterial {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// XOR the keystream into `data` in place.
///
/// The operation is its own inverse: applying it twice with the same key and
/// nonce restores the input.
pub fn apply_keystream(data: &mut [u8], key: &[u8], nonce: &[u8]) -> Result<()> {
    check_len("key", KEY_LEN, key.len())?;
    check_len("nonce", NONCE_LEN, nonce.len())?;

    let key = GenericArray::from_slice(key);
    let nonce = GenericArray::from_slice(nonce);
    let mut keystream = Aes128Ctr::new(key, nonce);
    keystream.apply_keystream(data);

    Ok(())
}

/// Decrypt ciphertext to a new buffer.
pub fn decrypt(ciphertext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    let mut buffer = ciphertext.to_vec();
    apply_keystream(&mut buffer, key, nonce)?;
    Ok(buffer)
}

/// Encrypt plaintext to a new buffer.
pub fn encrypt(plaintext: &[u8], key: &[u8], nonce: &[u8]) -> Result<Vec<u8>> {
    decrypt(plaintext, key, nonce)
}
