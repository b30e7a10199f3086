//! Read-only decoding of ELF64 little-endian images: the file header, the program header table,
//! and the section header table with names resolved through the section name string table.

pub mod binary;
pub mod error;
pub mod header;
pub mod program;
pub mod sections;
pub mod source;
pub mod strtab;

pub use binary::*;
pub use error::{ElfError, Result};
pub use header::elf::{decode_file_header, Elf64Ehdr};
pub use header::Header;
pub use program::*;
pub use sections::*;
pub use source::{ByteSource, Record};
pub use strtab::*;

/// Reads the file header from the start of `source`.
pub fn read_file_header<S: ByteSource>(source: &mut S) -> Result<Elf64Ehdr> {
    source.seek_to(0)?;
    decode_file_header(source)
}

/// Reads every program header `header` declares.
pub fn read_program_headers<S: ByteSource>(
    source: &mut S,
    header: &Elf64Ehdr,
) -> Result<Vec<Elf64Phdr>> {
    decode_program_headers(source, header)
}

/// Reads every section header `header` declares, with names filled in.
pub fn read_resolved_section_headers<S: ByteSource>(
    source: &mut S,
    header: &Elf64Ehdr,
) -> Result<Vec<ResolvedSection>> {
    bind_names(source, header)
}
