use std::io;
use thiserror::Error;

/// Errors raised while decoding an ELF64 image.
#[derive(Error, Debug)]
pub enum ElfError {
    #[error("truncated input: {what} needs {needed} bytes at offset {offset:#x}")]
    TruncatedInput {
        what: &'static str,
        offset: u64,
        needed: u64,
    },

    #[error("cannot seek to offset {offset:#x}")]
    SeekFailure {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("section name string table index {index} is out of range ({count} sections)")]
    InvalidStringTableIndex { index: u16, count: u16 },

    #[error("invalid ELF magic {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("unsupported ELF class {0} (only ELFCLASS64 is supported)")]
    UnsupportedClass(u8),

    #[error("unsupported data encoding {0} (only little endian is supported)")]
    UnsupportedEncoding(u8),

    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ElfError>;
