//! Interface for writing `.size` files.
//!
//! [`write_size_info`] produces the uncompressed text payload. Gzip framing is
//! applied by the caller, or by [`save_size_info`](crate::save_size_info) when
//! the `compression` feature is enabled.

use std::io::{self, Write};

use indexmap::IndexSet;
#[cfg(feature = "logging")]
use log::debug;
use serde::Serialize;

use crate::delta;
use crate::model::{Metadata, SectionSizes, SizeInfo, Symbol};
use crate::{Error, Result, SERIALIZATION_VERSION};

mod util;
pub use util::CountingWriter;

/// The comment written on the first line of every file.
pub const FILE_COMMENT: &str = "# Created by //tools/binary_size";

/// Options for saving a file.
///
/// These only affect how the bytes reach the destination, never the content
/// of the uncompressed payload.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Options {
    /// Compress while serializing, instead of serializing to memory first.
    ///
    /// Serializing to memory first is faster, but needs the whole
    /// uncompressed payload in memory.
    pub streaming: bool,
    /// The gzip compression level.
    #[cfg(feature = "compression")]
    pub compression: flate2::Compression,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            streaming: false,
            #[cfg(feature = "compression")]
            compression: flate2::Compression::default(),
        }
    }
}

#[derive(Serialize)]
struct Headers<'a> {
    metadata: &'a Metadata,
    section_sizes: &'a SectionSizes,
}

/// Write the uncompressed payload for `size_info` to `w`.
///
/// Symbols are grouped by section, with sections sorted by name. Within a
/// section, symbols are written in the order they appear in
/// `size_info.symbols`.
pub fn write_size_info<W: Write>(size_info: &SizeInfo, w: W) -> Result<()> {
    check_symbols(&size_info.symbols)?;

    let mut w = CountingWriter::new(w);
    writeln!(w, "{}", FILE_COMMENT)?;
    writeln!(w, "{}", SERIALIZATION_VERSION)?;
    let headers = Headers {
        metadata: &size_info.metadata,
        section_sizes: &size_info.section_sizes,
    };
    let headers = serde_json::to_string_pretty(&headers)
        .map_err(|e| Error::write(format!("Failed to serialize headers: {}", e)))?;
    writeln!(w, "{}", headers.len())?;
    w.write_all(headers.as_bytes())?;
    w.write_all(b"\n")?;
    log_size(&w, "header");

    // Store a single copy of each path pair, in first seen order, and refer
    // to them by index.
    let mut paths = IndexSet::new();
    let path_indices: Vec<usize> = size_info
        .symbols
        .iter()
        .map(|symbol| {
            paths
                .insert_full((symbol.object_path.as_str(), symbol.source_path.as_str()))
                .0
        })
        .collect();
    writeln!(w, "{}", paths.len())?;
    for (object_path, source_path) in &paths {
        writeln!(w, "{}\t{}", object_path, source_path)?;
    }
    log_size(&w, "paths");

    let sections = size_info.symbols_by_section();
    let names: Vec<&str> = sections.iter().map(|(name, _)| *name).collect();
    writeln!(w, "{}", names.join("\t"))?;
    let counts: Vec<String> = sections
        .iter()
        .map(|(_, indices)| indices.len().to_string())
        .collect();
    writeln!(w, "{}", counts.join("\t"))?;

    for (_, indices) in &sections {
        let addresses = indices
            .iter()
            .map(|&i| i128::from(size_info.symbols[i].address));
        util::write_row(&mut w, &delta::encode(addresses))?;
    }
    log_size(&w, "addresses");

    // Padding is not stored. It is recomputed from addresses after loading.
    for (_, indices) in &sections {
        let sizes: Vec<i64> = indices
            .iter()
            .map(|&i| size_info.symbols[i].size_without_padding())
            .collect();
        util::write_row(&mut w, &sizes)?;
    }
    log_size(&w, "sizes");

    for (_, indices) in &sections {
        let path_indices = indices.iter().map(|&i| path_indices[i] as i128);
        util::write_row(&mut w, &delta::encode(path_indices))?;
    }
    log_size(&w, "path indices");

    for (_, indices) in &sections {
        for &i in indices {
            let symbol = &size_info.symbols[i];
            // The name is derived from the full name on load.
            w.write_all(symbol.stored_name().as_bytes())?;
            if symbol.flags != 0 {
                write!(w, "\t{:x}", symbol.flags)?;
            }
            w.write_all(b"\n")?;
        }
    }
    log_size(&w, "names (final)");

    w.flush()?;
    Ok(())
}

/// Serialize `size_info` to an uncompressed payload in memory.
pub fn to_vec(size_info: &SizeInfo) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_size_info(size_info, &mut buffer)?;
    Ok(buffer)
}

#[allow(unused_variables)]
fn log_size<W: io::Write>(w: &CountingWriter<W>, desc: &str) {
    #[cfg(feature = "logging")]
    debug!("File size with {}: {}", desc, w.len());
}

fn check_symbols(symbols: &[Symbol]) -> Result<()> {
    for symbol in symbols {
        if symbol.section_name.is_empty() {
            return Err(Error::write(format!(
                "Symbol `{}` has an empty section name",
                symbol.stored_name()
            )));
        }
        for (field, value) in [
            ("section name", symbol.section_name.as_str()),
            ("name", symbol.stored_name()),
            ("object path", symbol.object_path.as_str()),
            ("source path", symbol.source_path.as_str()),
        ] {
            if value.contains(['\t', '\n']) {
                return Err(Error::write(format!(
                    "Symbol {} {:?} contains a tab or newline",
                    field, value
                )));
            }
        }
    }
    Ok(())
}
