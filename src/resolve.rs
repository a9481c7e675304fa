//! Address resolution.
//!
//! Turns a region selection into a concrete half-open address window.

use crate::error::{Error, Result};
use crate::segment::ObjectSource;

/// A half-open address range `[start, end)` with `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressWindow {
    start: u32,
    end: u32,
}

impl AddressWindow {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if end <= start {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn size(&self) -> u32 {
        self.end - self.start
    }
}

/// Which part of the object to extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `size` bytes starting at `start`.
    Range { start: u32, size: u32 },
    /// From the value of `start` up to, but excluding, the value of `end`.
    Symbols { start: String, end: String },
    /// Every `LOAD` segment, placed by virtual address.
    Whole,
}

/// `[start, start + size)`.
pub fn resolve_range(start: u32, size: u32) -> Result<AddressWindow> {
    let end = start
        .checked_add(size)
        .ok_or(Error::AddressOverflow { start, size })?;
    AddressWindow::new(start, end)
}

/// Resolves a window bounded by two symbols.
///
/// The end symbol marks the first address past the region, so the last byte
/// dumped is `value(end) - 1`.
pub fn resolve_symbols(
    source: &dyn ObjectSource,
    start_symbol: &str,
    end_symbol: &str,
) -> Result<AddressWindow> {
    let start = source
        .symbol_address(start_symbol)
        .ok_or_else(|| Error::SymbolNotFound(start_symbol.to_string()))?;
    let end_value = source
        .symbol_address(end_symbol)
        .ok_or_else(|| Error::SymbolNotFound(end_symbol.to_string()))?;

    let last = end_value
        .checked_sub(1)
        .filter(|last| *last >= start)
        .ok_or(Error::InvalidRange {
            start,
            end: end_value.wrapping_sub(1),
        })?;

    tracing::debug!(
        "symbols {}..{} resolve to 0x{:08x}..=0x{:08x}",
        start_symbol, end_symbol, start, last
    );
    // `last < u32::MAX` because it came from `end_value - 1`.
    AddressWindow::new(start, last + 1)
}

/// Resolves `selection` to a window, or `None` for whole-image mode where the
/// compositor discovers the bounds itself.
pub fn resolve_window(
    source: &dyn ObjectSource,
    selection: &Selection,
) -> Result<Option<AddressWindow>> {
    match selection {
        Selection::Range { start, size } => resolve_range(*start, *size).map(Some),
        Selection::Symbols { start, end } => resolve_symbols(source, start, end).map(Some),
        Selection::Whole => Ok(None),
    }
}
