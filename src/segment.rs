//! Loadable segment model.
//!
//! This module defines the view of an object file the extractor works on: an
//! ordered list of program segments plus a symbol lookup. The `ObjectSource`
//! trait is the seam between the core and whatever reads the container.

/// The program header type of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// `PT_LOAD`: mapped into memory at run time.
    Load,
    /// Any other program header type, kept with its raw value.
    Other(u32),
}

impl SegmentKind {
    pub fn from_p_type(p_type: u32) -> Self {
        if p_type == object::elf::PT_LOAD {
            SegmentKind::Load
        } else {
            SegmentKind::Other(p_type)
        }
    }
}

/// A segment borrowed from an input object file.
///
/// `file_size <= memory_size` is expected but not checked here. For `Load`
/// segments `data` should hold at least `file_size` bytes.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'data> {
    pub kind: SegmentKind,
    /// The address the segment runs at (whole-image placement).
    pub virtual_address: u32,
    /// The load address of the segment (windowed placement).
    pub physical_address: u32,
    /// Number of bytes backed by the file.
    pub file_size: u32,
    /// Number of bytes occupied in memory.
    pub memory_size: u32,
    /// The raw file contents of the segment.
    pub data: &'data [u8],
}

impl<'data> Segment<'data> {
    /// Creates a `Load` segment whose virtual and physical addresses agree and
    /// whose sizes both equal `data.len()`.
    pub fn load(address: u32, data: &'data [u8]) -> Self {
        Self {
            kind: SegmentKind::Load,
            virtual_address: address,
            physical_address: address,
            file_size: data.len() as u32,
            memory_size: data.len() as u32,
            data,
        }
    }

    pub fn is_load(&self) -> bool {
        self.kind == SegmentKind::Load
    }

    /// The first `file_size` bytes of the segment, if the data span is long enough.
    pub fn file_bytes(&self) -> Option<&'data [u8]> {
        self.data.get(..self.file_size as usize)
    }
}

/// Read access to a parsed object file.
pub trait ObjectSource {
    /// Segments in program header order.
    fn segments(&self) -> &[Segment<'_>];

    /// Looks up a symbol's value by name.
    fn symbol_address(&self, name: &str) -> Option<u32>;
}
