use crate::error::{ElfError, Result};
use crate::header::Header;
use crate::source::{ByteSource, Record};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use goblin::elf::header::{
    et_to_str, machine_to_str, EI_ABIVERSION, EI_CLASS, EI_DATA, EI_OSABI, EI_VERSION,
    ELFCLASS64, ELFDATA2LSB, ELFMAG, ET_EXEC, SELFMAG,
};
use std::io::{self, Read, Write};

/// The ELF64 file header (`Elf64_Ehdr`).
///
/// Sits at offset 0 of every ELF file and tells us where everything else lives: the program
/// header table, the section header table, and which section holds the section names.
///
/// Reference: [ELF Specification v1.2](https://refspecs.linuxfoundation.org/elf/elf.pdf)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Elf64Ehdr {
    /// Identification block: `\x7FELF`, class, data encoding, version, OS/ABI, ABI version and
    /// padding.
    pub e_ident: [u8; 16],

    /// Object file type.
    ///
    /// - `ET_REL` (1): Relocatable file
    /// - `ET_EXEC` (2): Executable file
    /// - `ET_DYN` (3): Shared object
    /// - `ET_CORE` (4): Core dump
    pub e_type: u16,

    /// Target architecture, e.g. `EM_X86_64` (62) or `EM_AARCH64` (183).
    pub e_machine: u16,

    /// Object file version (`EV_CURRENT` = 1).
    pub e_version: u32,

    /// Virtual address execution starts at.
    pub e_entry: u64,

    /// File offset of the program header table.
    pub e_phoff: u64,

    /// File offset of the section header table.
    pub e_shoff: u64,

    /// Processor-specific flags.
    pub e_flags: u32,

    /// Size of this header (64 for ELF64).
    pub e_ehsize: u16,

    /// Size of one program header table entry.
    pub e_phentsize: u16,

    /// Number of program header table entries.
    pub e_phnum: u16,

    /// Size of one section header table entry.
    pub e_shentsize: u16,

    /// Number of section header table entries.
    pub e_shnum: u16,

    /// Index of the section whose contents are the section names.
    pub e_shstrndx: u16,
}

impl Elf64Ehdr {
    pub fn magic(&self) -> [u8; 4] {
        [self.e_ident[0], self.e_ident[1], self.e_ident[2], self.e_ident[3]]
    }

    pub fn class(&self) -> u8 {
        self.e_ident[EI_CLASS]
    }

    pub fn data_encoding(&self) -> u8 {
        self.e_ident[EI_DATA]
    }

    pub fn ident_version(&self) -> u8 {
        self.e_ident[EI_VERSION]
    }

    pub fn os_abi(&self) -> u8 {
        self.e_ident[EI_OSABI]
    }

    pub fn abi_version(&self) -> u8 {
        self.e_ident[EI_ABIVERSION]
    }

    /// Symbolic object type, e.g. `EXEC`.
    pub fn type_name(&self) -> &'static str {
        et_to_str(self.e_type)
    }

    /// Symbolic machine name, e.g. `X86_64`.
    pub fn machine_name(&self) -> &'static str {
        machine_to_str(self.e_machine)
    }

    /// Checks that this is a little-endian ELF64 image.
    ///
    /// Decoding never calls this; it is up to the caller whether a foreign identification block
    /// is fatal.
    pub fn check_ident(&self) -> Result<()> {
        if self.e_ident[..SELFMAG] != ELFMAG[..] {
            return Err(ElfError::BadMagic(self.magic()));
        }
        if self.class() != ELFCLASS64 {
            return Err(ElfError::UnsupportedClass(self.class()));
        }
        if self.data_encoding() != ELFDATA2LSB {
            return Err(ElfError::UnsupportedEncoding(self.data_encoding()));
        }
        Ok(())
    }
}

impl Record for Elf64Ehdr {
    const SIZE: usize = 64;
    const NAME: &'static str = "file header";

    fn read_fields<R: Read>(cur: &mut R) -> io::Result<Self> {
        let mut e_ident = [0u8; 16];
        cur.read_exact(&mut e_ident)?;

        Ok(Elf64Ehdr {
            e_ident,
            e_type: cur.read_u16::<LE>()?,
            e_machine: cur.read_u16::<LE>()?,
            e_version: cur.read_u32::<LE>()?,
            e_entry: cur.read_u64::<LE>()?,
            e_phoff: cur.read_u64::<LE>()?,
            e_shoff: cur.read_u64::<LE>()?,
            e_flags: cur.read_u32::<LE>()?,
            e_ehsize: cur.read_u16::<LE>()?,
            e_phentsize: cur.read_u16::<LE>()?,
            e_phnum: cur.read_u16::<LE>()?,
            e_shentsize: cur.read_u16::<LE>()?,
            e_shnum: cur.read_u16::<LE>()?,
            e_shstrndx: cur.read_u16::<LE>()?,
        })
    }

    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.e_ident)?;
        w.write_u16::<LE>(self.e_type)?;
        w.write_u16::<LE>(self.e_machine)?;
        w.write_u32::<LE>(self.e_version)?;
        w.write_u64::<LE>(self.e_entry)?;
        w.write_u64::<LE>(self.e_phoff)?;
        w.write_u64::<LE>(self.e_shoff)?;
        w.write_u32::<LE>(self.e_flags)?;
        w.write_u16::<LE>(self.e_ehsize)?;
        w.write_u16::<LE>(self.e_phentsize)?;
        w.write_u16::<LE>(self.e_phnum)?;
        w.write_u16::<LE>(self.e_shentsize)?;
        w.write_u16::<LE>(self.e_shnum)?;
        w.write_u16::<LE>(self.e_shstrndx)
    }
}

impl Header for Elf64Ehdr {
    fn entry_point(&self) -> u64 {
        self.e_entry
    }

    fn machine(&self) -> u16 {
        self.e_machine
    }

    fn is_64(&self) -> bool {
        self.class() == ELFCLASS64
    }

    fn format_name(&self) -> &'static str {
        "ELF64"
    }

    fn is_executable(&self) -> bool {
        self.e_type == ET_EXEC
    }

    fn summary(&self) -> String {
        format!(
            "{} {} for {}, entry {:#x}",
            self.format_name(),
            self.type_name(),
            self.machine_name(),
            self.entry_point()
        )
    }
}

/// Decodes the file header at the source's current position.
pub fn decode_file_header<S: ByteSource>(source: &mut S) -> Result<Elf64Ehdr> {
    let header: Elf64Ehdr = source.read_record()?;
    log::debug!(
        "file header: {} program headers at {:#x}, {} section headers at {:#x}, shstrndx {}",
        header.e_phnum,
        header.e_phoff,
        header.e_shnum,
        header.e_shoff,
        header.e_shstrndx
    );
    Ok(header)
}
