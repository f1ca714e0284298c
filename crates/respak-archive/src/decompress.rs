//! Decompression of cooked payloads.

use std::io::Read;

use flate2::read::DeflateDecoder;

use crate::{Error, Result};

/// Upper bound on buffer presizing from a declared length.
///
/// The declared length comes from the archive and is only a hint.
const MAX_PRESIZE: usize = 64 * 1024 * 1024;

/// Inflate raw DEFLATE data into `output`.
pub fn inflate_into(data: &[u8], output: &mut Vec<u8>) -> Result<()> {
    let mut decoder = DeflateDecoder::new(data);

    output.clear();
    decoder
        .read_to_end(output)
        .map_err(|e| Error::CorruptPayload(e.to_string()))?;

    Ok(())
}

/// Inflate raw DEFLATE data, presizing the output from the declared length.
pub fn inflate(data: &[u8], size_hint: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(size_hint.min(MAX_PRESIZE));
    inflate_into(data, &mut output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use proptest::prelude::*;
    use std::io::Write;

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_inflate_html() {
        let original = b"<!doctype html><html><body>Hello, World!</body></html>";
        let compressed = deflate(original);

        let inflated = inflate(&compressed, original.len()).unwrap();
        assert_eq!(inflated, original);
    }

    #[test]
    fn test_inflate_garbage_is_corrupt() {
        let err = inflate(&[0xFF, 0xFF, 0xFF, 0xFF, 0x00], 16).unwrap_err();
        assert!(matches!(err, Error::CorruptPayload(_)));
    }

    #[test]
    fn test_hostile_size_hint_is_capped() {
        let compressed = deflate(b"tiny");
        let inflated = inflate(&compressed, usize::MAX).unwrap();
        assert_eq!(inflated, b"tiny");
    }

    proptest! {
        #[test]
        fn prop_inflate_is_stable(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let compressed = deflate(&data);
            let first = inflate(&compressed, data.len()).unwrap();
            let second = inflate(&deflate(&first), first.len()).unwrap();
            prop_assert_eq!(&first, &data);
            prop_assert_eq!(second, first);
        }
    }
}
