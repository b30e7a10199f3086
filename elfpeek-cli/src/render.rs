//! Text and table views of decoded structures.

use elfpeek_core::{Elf64Ehdr, Elf64Phdr, ResolvedSection};
use std::fmt;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// `readelf -h` style listing of the file header.
pub struct HeaderText<'a>(pub &'a Elf64Ehdr);

impl fmt::Display for HeaderText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0;
        writeln!(f, "ELF Header:")?;
        write!(f, "  Magic:  ")?;
        for b in &h.e_ident {
            write!(f, " {b:02x}")?;
        }
        writeln!(f)?;
        writeln!(f, "  Class:                             {}", h.class())?;
        writeln!(f, "  Data:                              {}", h.data_encoding())?;
        writeln!(f, "  Version:                           {}", h.ident_version())?;
        writeln!(f, "  OS/ABI:                            {}", h.os_abi())?;
        writeln!(f, "  ABI Version:                       {}", h.abi_version())?;
        writeln!(f, "  Type:                              {} ({})", h.e_type, h.type_name())?;
        writeln!(f, "  Machine:                           {} ({})", h.e_machine, h.machine_name())?;
        writeln!(f, "  Version:                           {:#x}", h.e_version)?;
        writeln!(f, "  Entry point address:               {:#x}", h.e_entry)?;
        writeln!(f, "  Start of program headers:          {} (bytes into file)", h.e_phoff)?;
        writeln!(f, "  Start of section headers:          {} (bytes into file)", h.e_shoff)?;
        writeln!(f, "  Flags:                             {:#x}", h.e_flags)?;
        writeln!(f, "  Size of this header:               {} (bytes)", h.e_ehsize)?;
        writeln!(f, "  Size of program headers:           {} (bytes)", h.e_phentsize)?;
        writeln!(f, "  Number of program headers:         {}", h.e_phnum)?;
        writeln!(f, "  Size of section headers:           {} (bytes)", h.e_shentsize)?;
        writeln!(f, "  Number of section headers:         {}", h.e_shnum)?;
        writeln!(f, "  Section header string table index: {}", h.e_shstrndx)
    }
}

/// One block per program header.
pub struct SegmentsText<'a>(pub &'a [Elf64Phdr]);

impl fmt::Display for SegmentsText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "There are no program headers in this file.");
        }
        writeln!(f, "Program Headers:")?;
        for (i, ph) in self.0.iter().enumerate() {
            writeln!(f, "  [{i:2}] Type:               {} ({})", ph.type_name(), ph.p_type)?;
            writeln!(f, "       Offset:             {:#x}", ph.p_offset)?;
            writeln!(f, "       Virtual Address:    {:#x}", ph.p_vaddr)?;
            writeln!(f, "       Physical Address:   {:#x}", ph.p_paddr)?;
            writeln!(f, "       File Size:          {}", ph.p_filesz)?;
            writeln!(f, "       Memory Size:        {}", ph.p_memsz)?;
            writeln!(f, "       Flags:              {:#x} [{}]", ph.p_flags, ph.flags_string())?;
            writeln!(f, "       Align:              {}", ph.p_align)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One block per section, names already resolved.
pub struct SectionsText<'a>(pub &'a [ResolvedSection]);

impl fmt::Display for SectionsText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "There are no sections in this file.");
        }
        writeln!(f, "Section Headers:")?;
        for (i, s) in self.0.iter().enumerate() {
            writeln!(f, "  [{i:2}] Name:               {}", s.name)?;
            writeln!(f, "       Type:               {} ({})", s.type_name(), s.kind)?;
            writeln!(f, "       Flags:              {:#x} [{}]", s.flags, s.flags_string())?;
            writeln!(f, "       Address:            {:#x}", s.vma)?;
            writeln!(f, "       Offset:             {:#x}", s.file_offset)?;
            writeln!(f, "       Size:               {}", s.size)?;
            writeln!(f, "       Link:               {}", s.link)?;
            writeln!(f, "       Info:               {}", s.info)?;
            writeln!(f, "       Address Align:      {}", s.addralign)?;
            writeln!(f, "       Entry Size:         {}", s.entsize)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "VirtAddr")]
    vaddr: String,
    #[tabled(rename = "PhysAddr")]
    paddr: String,
    #[tabled(rename = "FileSiz")]
    filesz: String,
    #[tabled(rename = "MemSiz")]
    memsz: String,
    #[tabled(rename = "Flg")]
    flags: String,
    #[tabled(rename = "Align")]
    align: String,
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Nr")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Address")]
    vma: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "EntSize")]
    entsize: String,
    #[tabled(rename = "Flags")]
    flags: String,
    #[tabled(rename = "Link")]
    link: u32,
    #[tabled(rename = "Info")]
    info: u32,
    #[tabled(rename = "Align")]
    align: u64,
}

pub fn segments_table(segments: &[Elf64Phdr]) -> String {
    if segments.is_empty() {
        return SegmentsText(segments).to_string();
    }
    let rows = segments.iter().map(|ph| SegmentRow {
        kind: ph.type_name(),
        offset: format!("{:#x}", ph.p_offset),
        vaddr: format!("{:#x}", ph.p_vaddr),
        paddr: format!("{:#x}", ph.p_paddr),
        filesz: format!("{:#x}", ph.p_filesz),
        memsz: format!("{:#x}", ph.p_memsz),
        flags: ph.flags_string(),
        align: format!("{:#x}", ph.p_align),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("Program Headers:\n{table}\n")
}

pub fn sections_table(sections: &[ResolvedSection]) -> String {
    if sections.is_empty() {
        return SectionsText(sections).to_string();
    }
    let rows = sections.iter().enumerate().map(|(index, s)| SectionRow {
        index,
        name: s.name.clone(),
        kind: s.type_name(),
        vma: format!("{:#x}", s.vma),
        offset: format!("{:#x}", s.file_offset),
        size: format!("{:#x}", s.size),
        entsize: format!("{:#x}", s.entsize),
        flags: s.flags_string(),
        link: s.link,
        info: s.info,
        align: s.addralign,
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("Section Headers:\n{table}\n")
}
