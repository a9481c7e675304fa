//! Memory Initialization File encoding.
//!
//! A MIF is plain text with one 32-bit word per line and no header. Line `n`
//! holds the bytes at image offset `4n`, read as a little-endian word and
//! printed most significant digit first.

use std::io::{self, Write};

use crate::compose::MemoryImage;
use crate::error::{Error, Result};

/// Bytes per MIF line.
pub const WORD_SIZE: usize = 4;

/// Digit representation of each word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WordFormat {
    /// 32 characters of `0`/`1`.
    #[default]
    Binary,
    /// 8 uppercase hexadecimal digits.
    Hex,
}

/// Renders one word without the trailing newline.
pub fn encode_word(word: u32, format: WordFormat) -> String {
    match format {
        WordFormat::Binary => format!("{:032b}", word),
        WordFormat::Hex => format!("{:08X}", word),
    }
}

/// Fails with `TruncatedImage` unless the image is a whole number of words.
pub fn check_word_aligned(image: &MemoryImage) -> Result<()> {
    if image.len() % WORD_SIZE != 0 {
        return Err(Error::TruncatedImage { len: image.len() });
    }
    Ok(())
}

/// Streams an image out as MIF lines.
#[derive(Debug, Clone, Copy)]
pub struct MifEncoder {
    format: WordFormat,
}

impl MifEncoder {
    pub fn new(format: WordFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> WordFormat {
        self.format
    }

    /// Writes every word of `bytes` to `out`. A trailing partial word is
    /// ignored; `check_word_aligned` should be called first.
    pub fn encode<W: Write>(&self, bytes: &[u8], out: &mut W) -> io::Result<usize> {
        let mut lines = 0;
        for chunk in bytes.chunks_exact(WORD_SIZE) {
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            writeln!(out, "{}", encode_word(word, self.format))?;
            lines += 1;
        }
        Ok(lines)
    }
}
