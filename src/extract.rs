//! Extraction pipeline.
//!
//! Resolves the selection against an object and composes the memory image.
//! Writing is left to the caller so a failed composition never touches the
//! output file.

use crate::compose::{compose_whole, compose_window, CopyOrder, MemoryImage};
use crate::error::Result;
use crate::resolve::{resolve_window, Selection};
use crate::segment::ObjectSource;

/// Knobs that affect composition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Segment copy order for whole-image mode.
    pub copy_order: CopyOrder,
}

pub fn extract(
    source: &dyn ObjectSource,
    selection: &Selection,
    options: ExtractOptions,
) -> Result<MemoryImage> {
    match resolve_window(source, selection)? {
        Some(window) => {
            tracing::debug!(
                "extracting 0x{:08x}-0x{:08x} ({} bytes)",
                window.start(),
                window.end(),
                window.size()
            );
            compose_window(source.segments(), window)
        }
        None => compose_whole(source.segments(), options.copy_order),
    }
}
