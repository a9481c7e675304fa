//! ELF to MIF conversion library.
//!
//! This library provides the core components for the `elf2mif` tool.
//! It is organized into several modules:
//! - `config`: CLI configuration.
//! - `segment`: The segment model and the object reader seam.
//! - `elf`: ELF reader backend.
//! - `resolve`: Address window resolution.
//! - `compose`: Segment to flat image composition.
//! - `mif`: Word encoding.
//! - `writer`: MIF file output.
//! - `extract`: The resolve and compose pipeline.

pub mod compose;
pub mod config;
pub mod elf;
pub mod error;
pub mod extract;
pub mod mif;
pub mod resolve;
pub mod segment;
pub mod utils;
pub mod writer;

pub use error::{Error, Result};
