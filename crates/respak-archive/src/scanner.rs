//! Sequential archive scanner.
//!
//! Archives have no index: a lookup walks records from the start, reading
//! each header and skipping bodies until the identifier matches or the
//! record count runs out. Only the matching body is ever read into memory.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::time::Instant;

use respak_common::{BinaryStreamReader, ByteOrder};
use tracing::{debug, warn};

use crate::codec::{self, LengthPolicy, Lookup};
use crate::record::{ArchiveRecord, RecordHeader};
use crate::{Error, Result};

/// Options for a single scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Byte order of the archive's integer fields.
    pub byte_order: ByteOrder,
    /// Handling of decoded length mismatches.
    pub length_policy: LengthPolicy,
    /// Give up with [`Error::DeadlineExceeded`] once this instant passes.
    pub deadline: Option<Instant>,
}

/// Walks the records of one archive stream.
pub struct ArchiveScanner<R> {
    reader: BinaryStreamReader<R>,
    options: ScanOptions,
    record_count: u64,
    visited: u64,
}

impl ArchiveScanner<BufReader<File>> {
    /// Open an archive file for scanning.
    pub fn open<P: AsRef<Path>>(path: P, options: ScanOptions) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> ArchiveScanner<R> {
    /// Start scanning a stream positioned at the start of an archive.
    pub fn new(inner: R, options: ScanOptions) -> Result<Self> {
        let mut reader = BinaryStreamReader::with_byte_order(inner, options.byte_order)?;

        let record_count = if reader.is_empty() {
            warn!("archive is empty");
            0
        } else {
            let count = reader.read_i64()?;
            u64::try_from(count).unwrap_or_else(|_| {
                warn!(count, "archive declares a negative record count");
                0
            })
        };

        Ok(Self {
            reader,
            options,
            record_count,
            visited: 0,
        })
    }

    /// Number of records the archive declares.
    #[inline]
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Number of record headers read so far.
    #[inline]
    pub fn visited(&self) -> u64 {
        self.visited
    }

    /// Current stream offset.
    #[inline]
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    /// Read the next record header, if the archive has one.
    ///
    /// The caller must either skip or decode the body before reading the
    /// next header.
    fn next_header(&mut self) -> Result<Option<RecordHeader>> {
        if self.visited >= self.record_count {
            return Ok(None);
        }

        if let Some(deadline) = self.options.deadline {
            if Instant::now() >= deadline {
                return Err(Error::DeadlineExceeded {
                    records: self.visited,
                });
            }
        }

        if self.reader.is_at_end() {
            warn!(
                declared = self.record_count,
                found = self.visited,
                "archive ended before its declared record count"
            );
            self.record_count = self.visited;
            return Ok(None);
        }

        let header = codec::read_header(&mut self.reader)?;
        self.visited += 1;
        Ok(Some(header))
    }

    /// Find and decode the record matching `lookup`.
    ///
    /// Returns `Ok(None)` when no record matches.
    pub fn scan(&mut self, lookup: &Lookup) -> Result<Option<ArchiveRecord>> {
        while let Some(header) = self.next_header()? {
            if header.identifier() == lookup.identifier() {
                debug!(
                    identifier = lookup.identifier(),
                    offset = header.offset(),
                    records = self.visited,
                    "matched record"
                );
                let record = codec::decode_body(
                    &mut self.reader,
                    &header,
                    lookup,
                    self.options.length_policy,
                )?;
                return Ok(Some(record));
            }

            codec::skip_body(&mut self.reader, &header)?;
        }

        debug!(
            identifier = lookup.identifier(),
            records = self.visited,
            "no matching record"
        );
        Ok(None)
    }

    /// Iterate over the remaining record headers, skipping every body.
    pub fn headers(&mut self) -> Headers<'_, R> {
        Headers {
            scanner: self,
            failed: false,
        }
    }
}

impl<R> std::fmt::Debug for ArchiveScanner<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveScanner")
            .field("reader", &self.reader)
            .field("record_count", &self.record_count)
            .field("visited", &self.visited)
            .finish()
    }
}

/// Iterator over record headers. Stops after the first error.
pub struct Headers<'a, R> {
    scanner: &'a mut ArchiveScanner<R>,
    failed: bool,
}

impl<R: Read + Seek> Iterator for Headers<'_, R> {
    type Item = Result<RecordHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = self.scanner.next_header().and_then(|header| match header {
            Some(header) => {
                codec::skip_body(&mut self.scanner.reader, &header)?;
                Ok(Some(header))
            }
            None => Ok(None),
        });

        match result {
            Ok(header) => header.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
