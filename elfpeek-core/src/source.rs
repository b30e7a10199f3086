//! Seekable byte sources and fixed-size record reads.
//!
//! Every decode step goes through [`ByteSource`]: it seeks explicitly, then reads a whole record
//! or fails. Records themselves only know how to turn a byte slice into fields (see [`Record`]),
//! so they can be exercised against in-memory buffers without any I/O.

use crate::error::{ElfError, Result};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};

/// Largest fixed record we ever read in one go (the ELF64 file header).
const MAX_RECORD: usize = 64;

/// Chunk used when growing a variable-length buffer, so a corrupt size field cannot force a huge
/// allocation before we find out the data is not there.
const READ_CHUNK: u64 = 64 * 1024;

/// A fixed-layout little-endian record.
pub trait Record: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Short name used in error messages and logs.
    const NAME: &'static str;

    /// Reads the fields in declaration order.
    fn read_fields<R: Read>(r: &mut R) -> io::Result<Self>;

    /// Writes the fields back out in declaration order.
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()>;

    /// Decodes a record from the front of `bytes`.
    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(ElfError::TruncatedInput {
                what: Self::NAME,
                offset: 0,
                needed: Self::SIZE as u64,
            });
        }
        Ok(Self::read_fields(&mut Cursor::new(&bytes[..Self::SIZE]))?)
    }

    /// Encodes the record into a freshly allocated buffer of exactly [`Record::SIZE`] bytes.
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut out);
        out
    }
}

/// Anything we can decode ELF structures from.
pub trait ByteSource: Read + Seek {
    /// Positions the source at `offset` bytes from the start.
    fn seek_to(&mut self, offset: u64) -> Result<()> {
        if offset > i64::MAX as u64 {
            return Err(ElfError::SeekFailure {
                offset,
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "offset exceeds the addressable range",
                ),
            });
        }
        self.seek(SeekFrom::Start(offset))
            .map_err(|source| ElfError::SeekFailure { offset, source })?;
        Ok(())
    }

    /// Reads one whole record from the current position.
    fn read_record<R: Record>(&mut self) -> Result<R> {
        debug_assert!(R::SIZE <= MAX_RECORD);
        let offset = self.stream_position()?;
        let mut buf = [0u8; MAX_RECORD];
        let bytes = &mut buf[..R::SIZE];
        self.read_exact(bytes).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => ElfError::TruncatedInput {
                what: R::NAME,
                offset,
                needed: R::SIZE as u64,
            },
            _ => ElfError::Io(e),
        })?;
        R::decode(bytes)
    }

    /// Seeks to `offset` and reads `count` contiguous records.
    ///
    /// Either all `count` records come back or an error does.
    fn read_table<R: Record>(&mut self, offset: u64, count: usize) -> Result<Vec<R>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        self.seek_to(offset)?;
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            records.push(self.read_record::<R>()?);
        }
        Ok(records)
    }

    /// Seeks to `offset` and reads exactly `len` bytes.
    fn read_bytes(&mut self, offset: u64, len: u64, what: &'static str) -> Result<Vec<u8>> {
        self.seek_to(offset)?;
        let mut buf = Vec::with_capacity(len.min(READ_CHUNK) as usize);
        let got = Read::take(&mut *self, len).read_to_end(&mut buf)?;
        if (got as u64) < len {
            return Err(ElfError::TruncatedInput {
                what,
                offset,
                needed: len,
            });
        }
        Ok(buf)
    }
}

impl<T: Read + Seek> ByteSource for T {}
