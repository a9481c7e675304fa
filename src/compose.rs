//! Segment composition.
//!
//! Builds a flat memory image out of the `LOAD` segments of an object file.
//! Two strategies are provided:
//! 1. Windowed: segments are placed by physical address and clipped to a
//!    caller supplied window.
//! 2. Whole image: the window is discovered from the segments' virtual
//!    addresses and every segment is copied in full.
//!
//! Bytes not covered by any segment hold `FILL_BYTE`. Where segments overlap
//! the one copied last wins.

use crate::error::{Error, Result};
use crate::resolve::AddressWindow;
use crate::segment::Segment;

/// Value of image bytes that no segment supplies.
pub const FILL_BYTE: u8 = 0x00;

/// Gaps below this size are treated as alignment padding and pass silently.
pub const ALIGNMENT_SLACK: u64 = 8;

/// Largest gap that is padded with a warning. Anything larger aborts.
pub const MAX_PADDING: u64 = 1024 * 1024;

/// One past the highest 32-bit address.
const ADDRESS_SPACE: u64 = 1 << 32;

/// A contiguous byte buffer where index `i` holds address `base + i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    base: u32,
    bytes: Vec<u8>,
}

impl MemoryImage {
    fn filled(base: u32, size: usize) -> Self {
        Self {
            base,
            bytes: vec![FILL_BYTE; size],
        }
    }

    /// Address of the first byte.
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Order in which whole-image mode copies segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopyOrder {
    /// Program header order. Bounds are still discovered in address order.
    #[default]
    Container,
    /// Ascending virtual address, ties kept in program header order.
    Address,
}

/// How the next segment's start relates to the end of everything before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Starts exactly where the previous data ended.
    Contiguous,
    /// Small gap, expected from section alignment.
    Aligned { gap: u64 },
    /// Gap worth a warning, filled with `FILL_BYTE`.
    Padded { gap: u64 },
    /// Gap too large to pad.
    Excessive { gap: u64 },
    /// Starts inside data that is already placed.
    Overlapping { overlap: u64 },
}

/// Classifies the placement of a segment starting at `next_start` when the
/// image built so far ends at `current_end`.
pub fn classify_gap(current_end: u64, next_start: u64) -> Placement {
    if next_start < current_end {
        return Placement::Overlapping {
            overlap: current_end - next_start,
        };
    }
    match next_start - current_end {
        0 => Placement::Contiguous,
        gap if gap < ALIGNMENT_SLACK => Placement::Aligned { gap },
        gap if gap <= MAX_PADDING => Placement::Padded { gap },
        gap => Placement::Excessive { gap },
    }
}

/// Copies the parts of all `LOAD` segments that fall inside `window`.
///
/// Segments are placed at their physical address and processed in program
/// header order.
pub fn compose_window(segments: &[Segment<'_>], window: AddressWindow) -> Result<MemoryImage> {
    let window_start = window.start() as u64;
    let window_end = window.end() as u64;
    let mut image = MemoryImage::filled(window.start(), window.size() as usize);
    let mut contributed = false;

    for (index, segment) in segments.iter().enumerate() {
        if !segment.is_load() {
            continue;
        }
        let seg_start = segment.physical_address as u64;
        let seg_end = seg_start + segment.file_size as u64;
        if seg_end <= window_start || seg_start >= window_end {
            continue;
        }

        let source = segment
            .file_bytes()
            .ok_or(Error::MissingSegmentData { segment: index })?;

        let source_offset = window_start.saturating_sub(seg_start);
        let dest_offset = seg_start.saturating_sub(window_start);
        let tail = seg_end.saturating_sub(window_end);
        let len = segment.file_size as u64 - source_offset - tail;

        tracing::debug!(
            "segment {}: 0x{:08x}-0x{:08x}{} copying 0x{:x} bytes from +0x{:x} to +0x{:x}",
            index,
            seg_start,
            seg_end,
            if source_offset > 0 || tail > 0 { " (truncated)" } else { "" },
            len,
            source_offset,
            dest_offset
        );

        let (src, dst, len) = (source_offset as usize, dest_offset as usize, len as usize);
        image.bytes[dst..dst + len].copy_from_slice(&source[src..src + len]);
        contributed = true;
    }

    if !contributed {
        tracing::warn!(
            "no LOAD segment overlaps 0x{:08x}-0x{:08x}, image is all fill bytes",
            window.start(),
            window.end()
        );
    }
    Ok(image)
}

/// Builds an image spanning every `LOAD` segment, placed by virtual address.
///
/// The bounds run from the lowest virtual address to the highest
/// `virtual_address + memory_size`. Gaps larger than `MAX_PADDING` bytes abort
/// with `ExcessivePadding`; smaller gaps and overlaps are logged. A segment
/// reaching past the 32-bit address space fails with `AddressOverflow`.
pub fn compose_whole(segments: &[Segment<'_>], order: CopyOrder) -> Result<MemoryImage> {
    let mut sorted: Vec<usize> = segments
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_load())
        .map(|(i, _)| i)
        .collect();
    let container: Vec<usize> = sorted.clone();
    sorted.sort_by_key(|&i| segments[i].virtual_address);

    let Some(&first) = sorted.first() else {
        return Err(Error::EmptyImage);
    };
    let start = segments[first].virtual_address as u64;
    let mut end = start;

    for (position, &index) in sorted.iter().enumerate() {
        let segment = &segments[index];
        let seg_start = segment.virtual_address as u64;
        if position > 0 {
            match classify_gap(end, seg_start) {
                Placement::Contiguous | Placement::Aligned { .. } => {}
                Placement::Padded { gap } => {
                    tracing::warn!("inserting {} bytes of padding before segment {}", gap, index);
                }
                Placement::Excessive { gap } => {
                    return Err(Error::ExcessivePadding { gap, segment: index });
                }
                Placement::Overlapping { .. } => {
                    tracing::warn!(
                        "inserting {} bytes in a possibly already allocated region for segment {}",
                        segment.memory_size,
                        index
                    );
                }
            }
        }
        let seg_end = seg_start + segment.memory_size as u64;
        if seg_end > ADDRESS_SPACE {
            return Err(Error::AddressOverflow {
                start: segment.virtual_address,
                size: segment.memory_size,
            });
        }
        end = end.max(seg_end);
    }

    let size = end - start;
    if size == 0 {
        return Err(Error::EmptyImage);
    }
    tracing::debug!("whole image 0x{:08x}-0x{:08x} ({} bytes)", start, end, size);

    let mut image = MemoryImage::filled(start as u32, size as usize);
    let copy_order = match order {
        CopyOrder::Container => &container,
        CopyOrder::Address => &sorted,
    };
    for &index in copy_order {
        let segment = &segments[index];
        let source = segment
            .file_bytes()
            .ok_or(Error::MissingSegmentData { segment: index })?;
        let offset = (segment.virtual_address as u64 - start) as usize;
        let dest = image
            .bytes
            .get_mut(offset..offset + source.len())
            .ok_or(Error::SegmentOverrun { segment: index })?;
        tracing::debug!(
            "segment {}: copying 0x{:x} bytes to +0x{:x}",
            index,
            source.len(),
            offset
        );
        dest.copy_from_slice(source);
    }
    Ok(image)
}
