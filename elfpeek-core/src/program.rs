use crate::error::Result;
use crate::header::elf::Elf64Ehdr;
use crate::source::{ByteSource, Record};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use goblin::elf::program_header::{pt_to_str, PF_R, PF_W, PF_X};
use std::io::{self, Read, Write};

/// An ELF64 program header (`Elf64_Phdr`), describing one segment.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Elf64Phdr {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl Elf64Phdr {
    /// Symbolic segment type, e.g. `PT_LOAD`.
    pub fn type_name(&self) -> &'static str {
        pt_to_str(self.p_type)
    }

    /// Permissions in `readelf` order, e.g. `R E`.
    pub fn flags_string(&self) -> String {
        let mut s = String::with_capacity(3);
        s.push(if self.p_flags & PF_R != 0 { 'R' } else { ' ' });
        s.push(if self.p_flags & PF_W != 0 { 'W' } else { ' ' });
        s.push(if self.p_flags & PF_X != 0 { 'E' } else { ' ' });
        s
    }
}

impl Record for Elf64Phdr {
    const SIZE: usize = 56;
    const NAME: &'static str = "program header";

    fn read_fields<R: Read>(cur: &mut R) -> io::Result<Self> {
        Ok(Elf64Phdr {
            p_type: cur.read_u32::<LE>()?,
            p_flags: cur.read_u32::<LE>()?,
            p_offset: cur.read_u64::<LE>()?,
            p_vaddr: cur.read_u64::<LE>()?,
            p_paddr: cur.read_u64::<LE>()?,
            p_filesz: cur.read_u64::<LE>()?,
            p_memsz: cur.read_u64::<LE>()?,
            p_align: cur.read_u64::<LE>()?,
        })
    }

    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_u32::<LE>(self.p_type)?;
        w.write_u32::<LE>(self.p_flags)?;
        w.write_u64::<LE>(self.p_offset)?;
        w.write_u64::<LE>(self.p_vaddr)?;
        w.write_u64::<LE>(self.p_paddr)?;
        w.write_u64::<LE>(self.p_filesz)?;
        w.write_u64::<LE>(self.p_memsz)?;
        w.write_u64::<LE>(self.p_align)
    }
}

/// Reads the program header table described by `header`.
///
/// Records are read back to back from `e_phoff`; `e_phentsize` is only checked for sanity.
pub fn decode_program_headers<S: ByteSource>(
    source: &mut S,
    header: &Elf64Ehdr,
) -> Result<Vec<Elf64Phdr>> {
    if header.e_phnum > 0 && usize::from(header.e_phentsize) != Elf64Phdr::SIZE {
        log::warn!(
            "e_phentsize is {}, reading {}-byte records anyway",
            header.e_phentsize,
            Elf64Phdr::SIZE
        );
    }
    log::debug!(
        "reading {} program headers at {:#x}",
        header.e_phnum,
        header.e_phoff
    );
    source.read_table(header.e_phoff, usize::from(header.e_phnum))
}
