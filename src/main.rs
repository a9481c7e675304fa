//! Entry point for the elf2mif tool.
//!
//! This file handles high-level application flow:
//! 1. Parse command-line arguments using `clap`.
//! 2. Set up logging.
//! 3. Map and parse the input ELF file.
//! 4. Execute the extraction steps: resolve, compose, write.
//!
//! Error handling is done via `anyhow`.

use anyhow::{Context, Result};
use clap::Parser;
use memmap2::Mmap;
use std::fs::File;
use tracing_subscriber::EnvFilter;

use elf2mif::config::Config;
use elf2mif::elf::ElfObject;
use elf2mif::extract::extract;
use elf2mif::writer::write_mif;

fn main() -> Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let selection = config.selection()?;

    let file = File::open(&config.input)
        .with_context(|| format!("failed to open {}", config.input.display()))?;
    let mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("failed to map {}", config.input.display()))?;
    let object = ElfObject::parse(&mmap)
        .with_context(|| format!("failed to read {}", config.input.display()))?;

    // 1. Resolve the window and compose the image
    let image = extract(&object, &selection, config.options())?;

    // 2. Write the MIF
    let lines = write_mif(&config.output, &image, config.format())?;

    tracing::info!(
        "wrote {} words from 0x{:08x} to {}",
        lines,
        image.base(),
        config.output.display()
    );
    Ok(())
}
