//! Configuration module.
//!
//! This module defines the command-line interface (CLI) using `clap`.
//! It handles the input ELF and output MIF paths, the optional region
//! arguments, and output options.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::compose::CopyOrder;
use crate::extract::ExtractOptions;
use crate::mif::WordFormat;
use crate::resolve::Selection;
use crate::utils::{is_decimal, parse_dec_u32, parse_hex_u32};

/// Tool to generate Memory Initialization Files (MIFs).
///
/// Without region arguments every LOAD segment is dumped, placed by virtual
/// address. ADDR_START (hex) and SIZE (decimal bytes) select an explicit
/// region by physical address; SYMBOL_START and SYMBOL_END select the region
/// between two symbols, excluding the end symbol's address.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Config {
    /// Input ELF file
    pub input: PathBuf,

    /// Output Memory Initialization File (MIF)
    pub output: PathBuf,

    /// Either ADDR_START SIZE or SYMBOL_START SYMBOL_END
    #[arg(value_name = "REGION", num_args = 0..)]
    pub region: Vec<String>,

    /// Output a hex MIF instead of a binary MIF
    #[arg(short = 'H', long)]
    pub hex: bool,

    /// Segment copy order when dumping the whole image
    #[arg(long, value_enum, default_value_t = CopyOrderArg::Container)]
    pub copy_order: CopyOrderArg,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", help = "Set the logging level")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOrderArg {
    /// Program header order
    Container,
    /// Ascending virtual address
    Address,
}

impl Config {
    pub fn format(&self) -> WordFormat {
        if self.hex {
            WordFormat::Hex
        } else {
            WordFormat::Binary
        }
    }

    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            copy_order: match self.copy_order {
                CopyOrderArg::Container => CopyOrder::Container,
                CopyOrderArg::Address => CopyOrder::Address,
            },
        }
    }

    /// Works out the selection mode from the shape of the region arguments.
    pub fn selection(&self) -> Result<Selection> {
        match self.region.as_slice() {
            [] => Ok(Selection::Whole),
            [first, second] if !is_decimal(second) => Ok(Selection::Symbols {
                start: first.clone(),
                end: second.clone(),
            }),
            [first, second] => {
                let Some(size) = parse_dec_u32(second) else {
                    bail!("SIZE '{}' does not fit in 32 bits", second);
                };
                let Some(start) = parse_hex_u32(first) else {
                    bail!("ADDR_START '{}' is not a 32-bit hexadecimal address", first);
                };
                Ok(Selection::Range { start, size })
            }
            other => bail!(
                "expected no region or exactly two region arguments, got {}",
                other.len()
            ),
        }
    }
}
