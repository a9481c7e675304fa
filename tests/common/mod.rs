//! In-memory ELF fixtures.

use object::elf::{
    FileHeader32, FileHeader64, ProgramHeader32, ProgramHeader64, SectionHeader32,
    SectionHeader64, Sym32, Sym64,
};
use object::endian::{U16, U32, U64};
use object::pod::bytes_of;
use object::Endianness;

/// Symbol table, string tables and section headers start on this boundary.
const TABLE_ALIGN: usize = 8;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Elf32,
    Elf64,
}

impl Class {
    fn ehdr_size(self) -> usize {
        match self {
            Class::Elf32 => 52,
            Class::Elf64 => 64,
        }
    }

    fn phdr_size(self) -> usize {
        match self {
            Class::Elf32 => 32,
            Class::Elf64 => 56,
        }
    }

    fn shdr_size(self) -> usize {
        match self {
            Class::Elf32 => 40,
            Class::Elf64 => 64,
        }
    }

    fn sym_size(self) -> usize {
        match self {
            Class::Elf32 => 16,
            Class::Elf64 => 24,
        }
    }
}

struct SegmentFixture {
    p_type: u32,
    vaddr: u32,
    paddr: u32,
    memsz: u32,
    data: Vec<u8>,
    /// Overrides the file offset and size instead of writing `data`.
    detached: Option<(u32, u32)>,
}

struct SymbolFixture {
    name: String,
    value: u32,
    bind: u8,
    shndx: u16,
}

/// Builds an executable ELF file with the given program headers and symbols.
/// Defaults to little-endian ELF32.
pub struct ElfBuilder {
    class: Class,
    endian: Endianness,
    segments: Vec<SegmentFixture>,
    symbols: Vec<SymbolFixture>,
}

struct Section {
    name: u32,
    sh_type: u32,
    offset: usize,
    size: usize,
    link: u32,
    info: u32,
    entsize: usize,
}

/// Pads `body`, which starts at file offset `base`, to the next table boundary.
fn align(body: &mut Vec<u8>, base: usize) {
    let end = base + body.len();
    let padded = (end + TABLE_ALIGN - 1) / TABLE_ALIGN * TABLE_ALIGN;
    body.resize(padded - base, 0);
}

impl Default for ElfBuilder {
    fn default() -> Self {
        Self {
            class: Class::Elf32,
            endian: Endianness::Little,
            segments: Vec::new(),
            symbols: Vec::new(),
        }
    }
}

impl ElfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: Class) -> Self {
        self.class = class;
        self
    }

    pub fn endian(mut self, endian: Endianness) -> Self {
        self.endian = endian;
        self
    }

    /// A `PT_LOAD` segment with equal virtual and physical addresses.
    pub fn load(self, address: u32, data: &[u8]) -> Self {
        let memsz = data.len() as u32;
        self.segment(object::elf::PT_LOAD, address, address, memsz, data)
    }

    pub fn segment(mut self, p_type: u32, vaddr: u32, paddr: u32, memsz: u32, data: &[u8]) -> Self {
        self.segments.push(SegmentFixture {
            p_type,
            vaddr,
            paddr,
            memsz,
            data: data.to_vec(),
            detached: None,
        });
        self
    }

    /// A `PT_LOAD` segment whose file range is `[offset, offset + filesz)`,
    /// with no bytes written for it.
    pub fn load_at_offset(mut self, address: u32, offset: u32, filesz: u32) -> Self {
        self.segments.push(SegmentFixture {
            p_type: object::elf::PT_LOAD,
            vaddr: address,
            paddr: address,
            memsz: filesz,
            data: Vec::new(),
            detached: Some((offset, filesz)),
        });
        self
    }

    /// An absolute global symbol.
    pub fn symbol(self, name: &str, value: u32) -> Self {
        self.push_symbol(name, value, object::elf::STB_GLOBAL, object::elf::SHN_ABS)
    }

    /// An absolute local symbol.
    pub fn local_symbol(self, name: &str, value: u32) -> Self {
        self.push_symbol(name, value, object::elf::STB_LOCAL, object::elf::SHN_ABS)
    }

    /// A global symbol referenced but not defined.
    pub fn undefined_symbol(self, name: &str) -> Self {
        self.push_symbol(name, 0, object::elf::STB_GLOBAL, object::elf::SHN_UNDEF)
    }

    fn push_symbol(mut self, name: &str, value: u32, bind: u8, shndx: u16) -> Self {
        self.symbols.push(SymbolFixture {
            name: name.to_string(),
            value,
            bind,
            shndx,
        });
        self
    }

    fn u16(&self, v: u16) -> U16<Endianness> {
        U16::new(self.endian, v)
    }

    fn u32(&self, v: u32) -> U32<Endianness> {
        U32::new(self.endian, v)
    }

    fn u64(&self, v: u64) -> U64<Endianness> {
        U64::new(self.endian, v)
    }

    fn program_header(&self, seg: &SegmentFixture, offset: u32, filesz: u32) -> Vec<u8> {
        let flags = object::elf::PF_R | object::elf::PF_W | object::elf::PF_X;
        match self.class {
            Class::Elf32 => bytes_of(&ProgramHeader32::<Endianness> {
                p_type: self.u32(seg.p_type),
                p_offset: self.u32(offset),
                p_vaddr: self.u32(seg.vaddr),
                p_paddr: self.u32(seg.paddr),
                p_filesz: self.u32(filesz),
                p_memsz: self.u32(seg.memsz),
                p_flags: self.u32(flags),
                p_align: self.u32(4),
            })
            .to_vec(),
            Class::Elf64 => bytes_of(&ProgramHeader64::<Endianness> {
                p_type: self.u32(seg.p_type),
                p_flags: self.u32(flags),
                p_offset: self.u64(offset as u64),
                p_vaddr: self.u64(seg.vaddr as u64),
                p_paddr: self.u64(seg.paddr as u64),
                p_filesz: self.u64(filesz as u64),
                p_memsz: self.u64(seg.memsz as u64),
                p_align: self.u64(4),
            })
            .to_vec(),
        }
    }

    fn symbol_entry(&self, sym: &SymbolFixture, st_name: u32) -> Vec<u8> {
        let st_info = (sym.bind << 4) | object::elf::STT_NOTYPE;
        match self.class {
            Class::Elf32 => bytes_of(&Sym32::<Endianness> {
                st_name: self.u32(st_name),
                st_value: self.u32(sym.value),
                st_size: self.u32(0),
                st_info,
                st_other: 0,
                st_shndx: self.u16(sym.shndx),
            })
            .to_vec(),
            Class::Elf64 => bytes_of(&Sym64::<Endianness> {
                st_name: self.u32(st_name),
                st_info,
                st_other: 0,
                st_shndx: self.u16(sym.shndx),
                st_value: self.u64(sym.value as u64),
                st_size: self.u64(0),
            })
            .to_vec(),
        }
    }

    fn section_header(&self, s: &Section) -> Vec<u8> {
        match self.class {
            Class::Elf32 => bytes_of(&SectionHeader32::<Endianness> {
                sh_name: self.u32(s.name),
                sh_type: self.u32(s.sh_type),
                sh_flags: self.u32(0),
                sh_addr: self.u32(0),
                sh_offset: self.u32(s.offset as u32),
                sh_size: self.u32(s.size as u32),
                sh_link: self.u32(s.link),
                sh_info: self.u32(s.info),
                sh_addralign: self.u32(1),
                sh_entsize: self.u32(s.entsize as u32),
            })
            .to_vec(),
            Class::Elf64 => bytes_of(&SectionHeader64::<Endianness> {
                sh_name: self.u32(s.name),
                sh_type: self.u32(s.sh_type),
                sh_flags: self.u64(0),
                sh_addr: self.u64(0),
                sh_offset: self.u64(s.offset as u64),
                sh_size: self.u64(s.size as u64),
                sh_link: self.u32(s.link),
                sh_info: self.u32(s.info),
                sh_addralign: self.u64(1),
                sh_entsize: self.u64(s.entsize as u64),
            })
            .to_vec(),
        }
    }

    fn file_header(&self, phnum: usize, shoff: usize, shnum: usize) -> Vec<u8> {
        let data = match self.endian {
            Endianness::Little => object::elf::ELFDATA2LSB,
            Endianness::Big => object::elf::ELFDATA2MSB,
        };
        let ident = |class| object::elf::Ident {
            magic: object::elf::ELFMAG,
            class,
            data,
            version: object::elf::EV_CURRENT,
            os_abi: object::elf::ELFOSABI_SYSV,
            abi_version: 0,
            padding: [0; 7],
        };
        let phoff = if phnum > 0 { self.class.ehdr_size() } else { 0 };
        match self.class {
            Class::Elf32 => bytes_of(&FileHeader32::<Endianness> {
                e_ident: ident(object::elf::ELFCLASS32),
                e_type: self.u16(object::elf::ET_EXEC),
                e_machine: self.u16(object::elf::EM_RISCV),
                e_version: self.u32(object::elf::EV_CURRENT as u32),
                e_entry: self.u32(0),
                e_phoff: self.u32(phoff as u32),
                e_shoff: self.u32(shoff as u32),
                e_flags: self.u32(0),
                e_ehsize: self.u16(self.class.ehdr_size() as u16),
                e_phentsize: self.u16(self.class.phdr_size() as u16),
                e_phnum: self.u16(phnum as u16),
                e_shentsize: self.u16(self.class.shdr_size() as u16),
                e_shnum: self.u16(shnum as u16),
                e_shstrndx: self.u16(3),
            })
            .to_vec(),
            Class::Elf64 => bytes_of(&FileHeader64::<Endianness> {
                e_ident: ident(object::elf::ELFCLASS64),
                e_type: self.u16(object::elf::ET_EXEC),
                e_machine: self.u16(object::elf::EM_RISCV),
                e_version: self.u32(object::elf::EV_CURRENT as u32),
                e_entry: self.u64(0),
                e_phoff: self.u64(phoff as u64),
                e_shoff: self.u64(shoff as u64),
                e_flags: self.u32(0),
                e_ehsize: self.u16(self.class.ehdr_size() as u16),
                e_phentsize: self.u16(self.class.phdr_size() as u16),
                e_phnum: self.u16(phnum as u16),
                e_shentsize: self.u16(self.class.shdr_size() as u16),
                e_shnum: self.u16(shnum as u16),
                e_shstrndx: self.u16(3),
            })
            .to_vec(),
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let phnum = self.segments.len();
        let data_start = self.class.ehdr_size() + phnum * self.class.phdr_size();

        // Segment contents follow the program headers.
        let mut body = Vec::new();
        let mut phdrs = Vec::new();
        for seg in &self.segments {
            let (offset, filesz) = match seg.detached {
                Some(range) => range,
                None => {
                    let offset = (data_start + body.len()) as u32;
                    body.extend_from_slice(&seg.data);
                    (offset, seg.data.len() as u32)
                }
            };
            phdrs.extend(self.program_header(seg, offset, filesz));
        }

        // Locals precede globals in the symbol table.
        let mut ordered: Vec<&SymbolFixture> = self.symbols.iter().collect();
        ordered.sort_by_key(|s| s.bind != object::elf::STB_LOCAL);
        let first_global = 1 + ordered
            .iter()
            .filter(|s| s.bind == object::elf::STB_LOCAL)
            .count();

        let mut strtab = vec![0u8];
        let mut symtab = vec![0u8; self.class.sym_size()];
        for sym in ordered {
            let st_name = strtab.len() as u32;
            strtab.extend_from_slice(sym.name.as_bytes());
            strtab.push(0);
            symtab.extend(self.symbol_entry(sym, st_name));
        }
        let shstrtab = b"\0.symtab\0.strtab\0.shstrtab\0";

        align(&mut body, data_start);
        let symtab_off = data_start + body.len();
        body.extend_from_slice(&symtab);
        let strtab_off = data_start + body.len();
        body.extend_from_slice(&strtab);
        let shstrtab_off = data_start + body.len();
        body.extend_from_slice(shstrtab);
        align(&mut body, data_start);
        let shoff = data_start + body.len();

        let sections = [
            Section { name: 0, sh_type: object::elf::SHT_NULL, offset: 0, size: 0, link: 0, info: 0, entsize: 0 },
            Section {
                name: 1,
                sh_type: object::elf::SHT_SYMTAB,
                offset: symtab_off,
                size: symtab.len(),
                link: 2,
                info: first_global as u32,
                entsize: self.class.sym_size(),
            },
            Section { name: 9, sh_type: object::elf::SHT_STRTAB, offset: strtab_off, size: strtab.len(), link: 0, info: 0, entsize: 0 },
            Section { name: 17, sh_type: object::elf::SHT_STRTAB, offset: shstrtab_off, size: shstrtab.len(), link: 0, info: 0, entsize: 0 },
        ];

        let mut buffer = self.file_header(phnum, shoff, sections.len());
        buffer.extend_from_slice(&phdrs);
        buffer.extend_from_slice(&body);
        for section in &sections {
            buffer.extend(self.section_header(section));
        }
        buffer
    }
}
