use elfpeek_core::{
    read_file_header, read_program_headers, read_resolved_section_headers, Binary, ElfError,
    Elf64Ehdr, Elf64Phdr, Elf64Shdr, Header, Record,
};
use goblin::elf::header::{EM_X86_64, ET_DYN};
use goblin::elf::program_header::{PF_R, PF_W, PF_X, PT_DYNAMIC, PT_LOAD};
use goblin::elf::section_header::{SHT_DYNAMIC, SHT_NOBITS, SHT_NULL, SHT_PROGBITS, SHT_STRTAB};
use pretty_assertions::assert_eq;
use std::io::Cursor;

const SHSTRTAB: &[u8] = b"\0.text\0.data\0.bss\0.dynamic\0.shstrtab\0";

fn shdr(sh_name: u32, sh_type: u32, sh_offset: u64, sh_size: u64) -> Elf64Shdr {
    Elf64Shdr {
        sh_name,
        sh_type,
        sh_flags: 0,
        sh_addr: 0,
        sh_offset,
        sh_size,
        sh_link: 0,
        sh_info: 0,
        sh_addralign: 1,
        sh_entsize: 0,
    }
}

/// A small shared object: header, two program headers, the name table, then six section headers.
struct Image {
    header: Elf64Ehdr,
    segments: Vec<Elf64Phdr>,
    sections: Vec<Elf64Shdr>,
    bytes: Vec<u8>,
}

fn build_image() -> Image {
    let segments = vec![
        Elf64Phdr {
            p_type: PT_LOAD,
            p_flags: PF_R | PF_X,
            p_offset: 0,
            p_vaddr: 0,
            p_paddr: 0,
            p_filesz: 0x1234,
            p_memsz: 0x1234,
            p_align: 0x1000,
        },
        Elf64Phdr {
            p_type: PT_DYNAMIC,
            p_flags: PF_R | PF_W,
            p_offset: 0x2e10,
            p_vaddr: 0x3e10,
            p_paddr: 0x3e10,
            p_filesz: 0x1c0,
            p_memsz: 0x1c0,
            p_align: 8,
        },
    ];

    let strtab_off = 64 + 2 * 56;
    let shoff = (strtab_off + SHSTRTAB.len() as u64).next_multiple_of(8);

    let mut text = shdr(1, SHT_PROGBITS, 0x1000, 0x200);
    text.sh_flags = 0x6;
    text.sh_addr = 0x1000;
    text.sh_addralign = 16;
    let mut dynamic = shdr(18, SHT_DYNAMIC, 0x2e10, 0x1c0);
    dynamic.sh_link = 5;
    dynamic.sh_entsize = 16;
    let sections = vec![
        shdr(0, SHT_NULL, 0, 0),
        text,
        shdr(7, SHT_PROGBITS, 0x2000, 0x10),
        shdr(13, SHT_NOBITS, 0x2010, 0x40),
        dynamic,
        shdr(27, SHT_STRTAB, strtab_off, SHSTRTAB.len() as u64),
    ];

    let mut e_ident = [0u8; 16];
    e_ident[..8].copy_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
    let header = Elf64Ehdr {
        e_ident,
        e_type: ET_DYN,
        e_machine: EM_X86_64,
        e_version: 1,
        e_entry: 0x1040,
        e_phoff: 64,
        e_shoff: shoff,
        e_flags: 0,
        e_ehsize: 64,
        e_phentsize: 56,
        e_phnum: segments.len() as u16,
        e_shentsize: 64,
        e_shnum: sections.len() as u16,
        e_shstrndx: 5,
    };

    let mut bytes = header.encode();
    for ph in &segments {
        ph.write_to(&mut bytes).unwrap();
    }
    bytes.extend_from_slice(SHSTRTAB);
    bytes.resize(shoff as usize, 0);
    for sh in &sections {
        sh.write_to(&mut bytes).unwrap();
    }

    Image {
        header,
        segments,
        sections,
        bytes,
    }
}

#[test_log::test]
fn decodes_whole_image() {
    let img = build_image();
    let mut src = Cursor::new(img.bytes.clone());

    let header = read_file_header(&mut src).unwrap();
    assert_eq!(header, img.header);
    header.check_ident().unwrap();

    assert_eq!(read_program_headers(&mut src, &header).unwrap(), img.segments);

    let sections = read_resolved_section_headers(&mut src, &header).unwrap();
    let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["", ".text", ".data", ".bss", ".dynamic", ".shstrtab"]);
    for (resolved, raw) in sections.iter().zip(&img.sections) {
        assert!(resolved.matches(raw));
    }
}

#[test]
fn decode_calls_do_not_depend_on_order() {
    let img = build_image();
    let mut src = Cursor::new(img.bytes);
    let header = read_file_header(&mut src).unwrap();

    let first = read_resolved_section_headers(&mut src, &header).unwrap();
    let segments = read_program_headers(&mut src, &header).unwrap();
    let again = read_resolved_section_headers(&mut src, &header).unwrap();
    assert_eq!(first, again);
    assert_eq!(segments, img.segments);

    // The header read seeks back to the start on its own.
    assert_eq!(read_file_header(&mut src).unwrap(), header);
}

#[test]
fn truncated_program_table() {
    let img = build_image();
    let cut = (img.header.e_phoff + 56 + 20) as usize;
    let mut src = Cursor::new(img.bytes[..cut].to_vec());
    let header = read_file_header(&mut src).unwrap();
    assert!(matches!(
        read_program_headers(&mut src, &header),
        Err(ElfError::TruncatedInput { what: "program header", .. })
    ));
}

#[test]
fn bad_string_table_index() {
    let mut img = build_image();
    img.header.e_shstrndx = img.header.e_shnum;
    let mut src = Cursor::new(img.bytes);
    assert!(matches!(
        read_resolved_section_headers(&mut src, &img.header),
        Err(ElfError::InvalidStringTableIndex { index: 6, count: 6 })
    ));
}

#[test]
fn binary_reads_tables_on_demand() {
    let img = build_image();
    let mut bin = Binary::from_source(Cursor::new(img.bytes), "synthetic.so".into()).unwrap();
    assert_eq!(bin.get_entry_offset(), 0x1040);
    assert!(!bin.header.is_executable());
    assert_eq!(bin.program_headers().unwrap().len(), 2);
    assert_eq!(bin.sections().unwrap()[4].name, ".dynamic");
}

#[test]
fn open_reports_missing_files() {
    assert!(matches!(
        Binary::open("/definitely/not/here.elf"),
        Err(ElfError::Io(_))
    ));
}

/// Decodes the running test binary and compares against goblin's parser.
#[cfg(all(target_os = "linux", target_pointer_width = "64", target_endian = "little"))]
#[test]
fn agrees_with_goblin_on_own_executable() {
    let exe = std::env::current_exe().unwrap();
    let bytes = std::fs::read(&exe).unwrap();
    let elf = goblin::elf::Elf::parse(&bytes).unwrap();

    let mut bin = Binary::open(&exe).unwrap();
    let hdr = bin.header;
    assert_eq!(hdr.e_entry, elf.header.e_entry);
    assert_eq!(hdr.e_phnum, elf.header.e_phnum);
    assert_eq!(hdr.e_shnum, elf.header.e_shnum);
    assert_eq!(hdr.e_shstrndx, elf.header.e_shstrndx);
    assert_eq!(&hdr.e_ident[..], &elf.header.e_ident[..]);

    let segments = bin.program_headers().unwrap();
    assert_eq!(segments.len(), elf.program_headers.len());
    for (ours, theirs) in segments.iter().zip(&elf.program_headers) {
        assert_eq!(ours.p_type, theirs.p_type);
        assert_eq!(ours.p_flags, theirs.p_flags);
        assert_eq!(ours.p_offset, theirs.p_offset);
        assert_eq!(ours.p_vaddr, theirs.p_vaddr);
        assert_eq!(ours.p_filesz, theirs.p_filesz);
        assert_eq!(ours.p_memsz, theirs.p_memsz);
    }

    let sections = bin.sections().unwrap();
    assert_eq!(sections.len(), elf.section_headers.len());
    for (ours, theirs) in sections.iter().zip(&elf.section_headers) {
        let name = elf.shdr_strtab.get_at(theirs.sh_name).unwrap_or("");
        assert_eq!(ours.name, name);
        assert_eq!(ours.kind, theirs.sh_type);
        assert_eq!(ours.file_offset, theirs.sh_offset);
        assert_eq!(ours.size, theirs.sh_size);
    }
    assert!(sections.iter().any(|s| s.name == ".text"));
}
