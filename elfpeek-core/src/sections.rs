use crate::error::{ElfError, Result};
use crate::header::elf::Elf64Ehdr;
use crate::source::{ByteSource, Record};
use crate::strtab::{load_string_table, StringTable};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use goblin::elf::section_header::{
    sht_to_str, SHF_ALLOC, SHF_EXECINSTR, SHF_GROUP, SHF_INFO_LINK, SHF_LINK_ORDER, SHF_MERGE,
    SHF_STRINGS, SHF_TLS, SHF_WRITE,
};
use std::io::{self, Read, Write};

/// An ELF64 section header (`Elf64_Shdr`) as stored in the file.
///
/// `sh_name` is a byte offset into the section name string table, not a name.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Elf64Shdr {
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl Elf64Shdr {
    /// Attaches a resolved name, dropping the raw `sh_name` offset.
    pub fn with_name(&self, name: String) -> ResolvedSection {
        ResolvedSection {
            name,
            kind: self.sh_type,
            flags: self.sh_flags,
            vma: self.sh_addr,
            file_offset: self.sh_offset,
            size: self.sh_size,
            link: self.sh_link,
            info: self.sh_info,
            addralign: self.sh_addralign,
            entsize: self.sh_entsize,
        }
    }
}

impl Record for Elf64Shdr {
    const SIZE: usize = 64;
    const NAME: &'static str = "section header";

    fn read_fields<R: Read>(cur: &mut R) -> io::Result<Self> {
        Ok(Elf64Shdr {
            sh_name: cur.read_u32::<LE>()?,
            sh_type: cur.read_u32::<LE>()?,
            sh_flags: cur.read_u64::<LE>()?,
            sh_addr: cur.read_u64::<LE>()?,
            sh_offset: cur.read_u64::<LE>()?,
            sh_size: cur.read_u64::<LE>()?,
            sh_link: cur.read_u32::<LE>()?,
            sh_info: cur.read_u32::<LE>()?,
            sh_addralign: cur.read_u64::<LE>()?,
            sh_entsize: cur.read_u64::<LE>()?,
        })
    }

    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<LE>(self.sh_name)?;
        w.write_u32::<LE>(self.sh_type)?;
        w.write_u64::<LE>(self.sh_flags)?;
        w.write_u64::<LE>(self.sh_addr)?;
        w.write_u64::<LE>(self.sh_offset)?;
        w.write_u64::<LE>(self.sh_size)?;
        w.write_u32::<LE>(self.sh_link)?;
        w.write_u32::<LE>(self.sh_info)?;
        w.write_u64::<LE>(self.sh_addralign)?;
        w.write_u64::<LE>(self.sh_entsize)
    }
}

/// A section header with its name looked up in the section name string table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResolvedSection {
    pub name: String,
    pub kind: u32,
    pub flags: u64,
    pub vma: u64,
    pub file_offset: u64,
    pub size: u64,
    pub link: u32,
    pub info: u32,
    pub addralign: u64,
    pub entsize: u64,
}

const FLAG_LETTERS: &[(u32, char)] = &[
    (SHF_WRITE, 'W'),
    (SHF_ALLOC, 'A'),
    (SHF_EXECINSTR, 'X'),
    (SHF_MERGE, 'M'),
    (SHF_STRINGS, 'S'),
    (SHF_INFO_LINK, 'I'),
    (SHF_LINK_ORDER, 'L'),
    (SHF_GROUP, 'G'),
    (SHF_TLS, 'T'),
];

impl ResolvedSection {
    /// Symbolic section type, e.g. `SHT_PROGBITS`.
    pub fn type_name(&self) -> &'static str {
        sht_to_str(self.kind)
    }

    /// `readelf`-style flag letters, e.g. `AX`.
    pub fn flags_string(&self) -> String {
        FLAG_LETTERS
            .iter()
            .filter(|(bit, _)| self.flags & u64::from(*bit) != 0)
            .map(|(_, c)| *c)
            .collect()
    }

    /// Whether this entry carries the same values as `raw`, ignoring the name.
    pub fn matches(&self, raw: &Elf64Shdr) -> bool {
        self.kind == raw.sh_type
            && self.flags == raw.sh_flags
            && self.vma == raw.sh_addr
            && self.file_offset == raw.sh_offset
            && self.size == raw.sh_size
            && self.link == raw.sh_link
            && self.info == raw.sh_info
            && self.addralign == raw.sh_addralign
            && self.entsize == raw.sh_entsize
    }
}

/// Reads the raw section header table described by `header`.
pub fn decode_section_headers<S: ByteSource>(
    source: &mut S,
    header: &Elf64Ehdr,
) -> Result<Vec<Elf64Shdr>> {
    if header.e_shnum > 0 && usize::from(header.e_shentsize) != Elf64Shdr::SIZE {
        log::warn!(
            "e_shentsize is {}, reading {}-byte records anyway",
            header.e_shentsize,
            Elf64Shdr::SIZE
        );
    }
    log::debug!(
        "reading {} section headers at {:#x}",
        header.e_shnum,
        header.e_shoff
    );
    source.read_table(header.e_shoff, usize::from(header.e_shnum))
}

/// Resolves every section's name against `strtab`, keeping table order.
pub fn resolve_names(sections: &[Elf64Shdr], strtab: &StringTable) -> Vec<ResolvedSection> {
    sections
        .iter()
        .map(|sh| {
            if !strtab.contains(sh.sh_name) && sh.sh_name != 0 {
                log::warn!(
                    "section name offset {:#x} is outside the {} byte string table",
                    sh.sh_name,
                    strtab.len()
                );
            }
            sh.with_name(strtab.get(sh.sh_name).into_owned())
        })
        .collect()
}

/// Decodes the section header table and names every entry.
///
/// The names live in a second table, the section at `e_shstrndx`, so this takes two passes over
/// the source: first the headers, then that section's bytes.
pub fn bind_names<S: ByteSource>(
    source: &mut S,
    header: &Elf64Ehdr,
) -> Result<Vec<ResolvedSection>> {
    let sections = decode_section_headers(source, header)?;
    if sections.is_empty() {
        return Ok(Vec::new());
    }

    let index = header.e_shstrndx;
    let strtab_hdr = sections
        .get(usize::from(index))
        .ok_or(ElfError::InvalidStringTableIndex {
            index,
            count: header.e_shnum,
        })?;

    let strtab = load_string_table(source, strtab_hdr.sh_offset, strtab_hdr.sh_size)?;
    let resolved = resolve_names(&sections, &strtab);
    log::info!("named {} sections using section {}", resolved.len(), index);
    Ok(resolved)
}
