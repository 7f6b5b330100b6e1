//! # `sizefile`
//!
//! The `sizefile` crate reads and writes `.size` files, which record the
//! symbols of a compiled binary along with their sizes, addresses and the
//! files they came from.
//!
//! A `.size` file is a gzip compressed text payload. The payload starts with a
//! JSON header holding the build metadata and section sizes, followed by a
//! deduplicated table of paths and column-oriented symbol data. Addresses and
//! path indices are delta encoded per section.
//!
//! See the [`SizeInfo`] struct for the in-memory model, [`write`] and
//! [`read`] for the uncompressed payload, and [`save_size_info`] and
//! [`load_size_info`] for files on disk.
//!
//! # Example
//! ```no_run
//! use sizefile::{SizeInfo, Symbol};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut size_info = SizeInfo::default();
//!     size_info.section_sizes.insert(".text".into(), 64);
//!     size_info.symbols.push(Symbol::new(".text", 0x1000, 64, "main"));
//!
//!     sizefile::save_size_info(&size_info, "out.size", &Default::default())?;
//!     let loaded = sizefile::load_size_info("out.size")?;
//!     assert_eq!(loaded.symbols[0].name, "main");
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(missing_debug_implementations)]

mod error;
pub use error::{Error, ErrorKind, Result};

mod model;
pub use model::*;

pub mod delta;
pub mod describe;
pub mod read;
pub mod write;

#[cfg(feature = "compression")]
mod compression;
#[cfg(feature = "compression")]
pub use compression::*;

/// The format version line. Files with any other version are rejected.
pub const SERIALIZATION_VERSION: &str = "Size File Format v1";
