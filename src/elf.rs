//! ELF object reader.
//!
//! Parses an ELF32 or ELF64 file (either byte order) with the `object` crate
//! and exposes its program headers and symbol table as an `ObjectSource`.
//! Addresses and sizes are truncated to 32 bits.

use object::read::elf::{ElfFile, FileHeader, ProgramHeader};
use object::{elf, Endianness, FileKind, Object, ObjectSymbol};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::segment::{ObjectSource, Segment, SegmentKind};

struct SymbolEntry {
    address: u32,
    is_global: bool,
}

/// An ELF file borrowed from a byte buffer (typically a memory map).
pub struct ElfObject<'data> {
    segments: Vec<Segment<'data>>,
    symbols: HashMap<String, SymbolEntry>,
}

impl<'data> ElfObject<'data> {
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        let kind = FileKind::parse(data).map_err(|e| Error::ObjectLoad(e.to_string()))?;
        match kind {
            FileKind::Elf32 => Self::parse_elf::<elf::FileHeader32<Endianness>>(data),
            FileKind::Elf64 => Self::parse_elf::<elf::FileHeader64<Endianness>>(data),
            other => Err(Error::ObjectLoad(format!(
                "unsupported file format {:?}, expected ELF",
                other
            ))),
        }
    }

    fn parse_elf<Elf>(data: &'data [u8]) -> Result<Self>
    where
        Elf: FileHeader<Endian = Endianness>,
    {
        let file = ElfFile::<Elf>::parse(data).map_err(|e| Error::ObjectLoad(e.to_string()))?;
        let endian = file.endian();

        let mut segments = Vec::new();
        for (index, phdr) in file.elf_program_headers().iter().enumerate() {
            let kind = SegmentKind::from_p_type(phdr.p_type(endian));
            let bytes: &'data [u8] = if kind == SegmentKind::Load {
                phdr.data(endian, data)
                    .map_err(|()| Error::MissingSegmentData { segment: index })?
            } else {
                &[]
            };
            let vaddr: u64 = phdr.p_vaddr(endian).into();
            let paddr: u64 = phdr.p_paddr(endian).into();
            let filesz: u64 = phdr.p_filesz(endian).into();
            let memsz: u64 = phdr.p_memsz(endian).into();
            tracing::trace!(
                "segment {}: {:?} vaddr=0x{:x} paddr=0x{:x} filesz=0x{:x} memsz=0x{:x}",
                index, kind, vaddr, paddr, filesz, memsz
            );
            segments.push(Segment {
                kind,
                virtual_address: vaddr as u32,
                physical_address: paddr as u32,
                file_size: filesz as u32,
                memory_size: memsz as u32,
                data: bytes,
            });
        }

        let mut symbols: HashMap<String, SymbolEntry> = HashMap::new();
        for sym in file.symbols() {
            if sym.is_undefined() {
                continue;
            }
            let name = match sym.name() {
                Ok(name) if !name.is_empty() => name,
                _ => continue,
            };
            let candidate = SymbolEntry {
                address: sym.address() as u32,
                is_global: sym.is_global(),
            };
            match symbols.entry(name.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(candidate);
                }
                Entry::Occupied(mut slot) => {
                    if candidate.is_global && !slot.get().is_global {
                        slot.insert(candidate);
                    }
                }
            }
        }

        tracing::debug!(
            "loaded ELF with {} segments and {} symbols",
            segments.len(),
            symbols.len()
        );
        Ok(Self { segments, symbols })
    }
}

impl ObjectSource for ElfObject<'_> {
    fn segments(&self) -> &[Segment<'_>] {
        &self.segments
    }

    fn symbol_address(&self, name: &str) -> Option<u32> {
        self.symbols.get(name).map(|s| s.address)
    }
}
