//! Error types.
//!
//! Every failure in the extraction pipeline is terminal for the run, so the
//! variants carry just enough context for a one-line diagnostic.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load object: {0}")]
    ObjectLoad(String),

    #[error("unable to locate symbol '{0}'")]
    SymbolNotFound(String),

    #[error("unable to dump from 0x{start:08x} to 0x{end:08x}")]
    InvalidRange { start: u32, end: u32 },

    #[error("region 0x{start:08x} + {size} bytes exceeds the 32-bit address space")]
    AddressOverflow { start: u32, size: u32 },

    #[error("inserting {gap} bytes of padding before segment {segment}")]
    ExcessivePadding { gap: u64, segment: usize },

    #[error("no loadable data: image is empty")]
    EmptyImage,

    #[error("image length {len} is not a multiple of 4 bytes")]
    TruncatedImage { len: usize },

    #[error("segment {segment} has less data than its file size")]
    MissingSegmentData { segment: usize },

    #[error("segment {segment} extends past the end of the image")]
    SegmentOverrun { segment: usize },

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
