use crate::error::Result;
use crate::header::elf::Elf64Ehdr;
use crate::header::Header;
use crate::program::Elf64Phdr;
use crate::sections::ResolvedSection;
use crate::source::ByteSource;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One ELF file under inspection.
///
/// Only the file header is read up front. The tables are decoded when asked for, each call
/// seeking to where the header says they are.
pub struct Binary<S> {
    pub path: String,
    pub header: Elf64Ehdr,
    source: S,
}

impl Binary<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let bin = Self::from_source(BufReader::new(file), path.as_ref().display().to_string())?;
        log::info!("opened {}: {}", bin.path, bin.header.summary());
        Ok(bin)
    }
}

impl<S: ByteSource> Binary<S> {
    /// Reads the file header from `source`, which is labelled `path` in messages.
    pub fn from_source(mut source: S, path: String) -> Result<Self> {
        let header = crate::read_file_header(&mut source)?;
        Ok(Self {
            path,
            header,
            source,
        })
    }

    pub fn program_headers(&mut self) -> Result<Vec<Elf64Phdr>> {
        crate::read_program_headers(&mut self.source, &self.header)
    }

    pub fn sections(&mut self) -> Result<Vec<ResolvedSection>> {
        crate::read_resolved_section_headers(&mut self.source, &self.header)
    }

    pub fn get_entry_offset(&self) -> u64 {
        self.header.entry_point()
    }

    pub fn into_source(self) -> S {
        self.source
    }
}
