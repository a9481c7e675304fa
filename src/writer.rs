//! MIF file writer.
//!
//! This module handles writing the final Memory Initialization File.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::compose::MemoryImage;
use crate::error::{Error, Result};
use crate::mif::{check_word_aligned, MifEncoder, WordFormat};

/// Write `image` to `output_path` as a MIF, truncating any existing file.
///
/// The image length is validated before the file is touched. Returns the
/// number of lines written.
pub fn write_mif(output_path: &Path, image: &MemoryImage, format: WordFormat) -> Result<usize> {
    check_word_aligned(image)?;

    let io_err = |source: std::io::Error| Error::Io {
        path: output_path.to_path_buf(),
        source,
    };

    let file = File::create(output_path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    let lines = MifEncoder::new(format)
        .encode(image.as_bytes(), &mut out)
        .map_err(io_err)?;
    out.flush().map_err(io_err)?;

    tracing::debug!("wrote {} lines to {}", lines, output_path.display());
    Ok(lines)
}
