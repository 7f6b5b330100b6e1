//! Interface for reading `.size` files.
//!
//! [`parse`] decodes an uncompressed payload. Gzip framing must already have
//! been removed, for example by [`load_size_info`](crate::load_size_info).

use std::io::Read;

#[cfg(feature = "logging")]
use log::info;
use serde::Deserialize;

use crate::delta;
use crate::model::{Metadata, SectionSizes, SizeInfo, Symbol};
use crate::{Error, Result, SERIALIZATION_VERSION};

mod lines;
use lines::{parse_integer, Lines};

#[derive(Deserialize)]
struct Headers {
    #[serde(default)]
    metadata: Option<Metadata>,
    section_sizes: SectionSizes,
}

/// The per-section numeric columns.
struct Columns {
    addresses: Vec<u64>,
    sizes: Vec<i64>,
    path_indices: Vec<usize>,
}

/// Read an uncompressed payload from `r` and decode it.
pub fn read_size_info<R: Read>(mut r: R) -> Result<SizeInfo> {
    let mut data = Vec::new();
    r.read_to_end(&mut data)?;
    parse(&data)
}

/// Decode an uncompressed payload.
///
/// The loaded symbols have no padding and no full name. Their size is the
/// stored size without padding. Symbols are returned grouped by section, in
/// the order they were written.
pub fn parse(data: &[u8]) -> Result<SizeInfo> {
    let mut lines = Lines::new(data);
    lines.next_line("comment line")?;
    let version = lines.next_line("version line")?;
    if version != SERIALIZATION_VERSION {
        return Err(Error::version(SERIALIZATION_VERSION, version));
    }

    let headers_len: usize = lines.next_integer("header length")?;
    let headers = lines.read_bytes(headers_len, "header")?;
    let headers: Headers =
        serde_json::from_slice(headers).map_err(|e| Error::json("invalid header", e))?;
    let terminator = lines.next_line("header terminator")?;
    if !terminator.is_empty() {
        return Err(Error::corrupt(format!(
            "expected newline after {} byte header, found {:?}",
            headers_len, terminator
        )));
    }

    let num_paths: usize = lines.next_integer("path count")?;
    let mut paths = Vec::with_capacity(num_paths.min(data.len()));
    for _ in 0..num_paths {
        let line = lines.next_line("path")?;
        let pair = line
            .split_once('\t')
            .ok_or_else(|| Error::corrupt(format!("path {:?} has no tab separator", line)))?;
        paths.push(pair);
    }

    let section_names = lines.next_fields('\t', "section names")?;
    let section_counts = lines
        .next_fields('\t', "section counts")?
        .into_iter()
        .map(|count| parse_integer::<usize>(count, "section counts"))
        .collect::<Result<Vec<_>>>()?;
    if section_names.len() != section_counts.len() {
        return Err(Error::corrupt(format!(
            "expected {} section counts, found {}",
            section_names.len(),
            section_counts.len()
        )));
    }
    let total = section_counts
        .iter()
        .try_fold(0usize, |total, &count| total.checked_add(count))
        .ok_or_else(|| Error::corrupt("section counts overflow"))?;

    let columns = read_columns(&mut lines, &section_counts, paths.len())?;

    let mut symbols = Vec::with_capacity(total.min(data.len()));
    let sections = section_names.iter().zip(&section_counts).zip(&columns);
    for ((section_name, &count), section) in sections {
        for i in 0..count {
            let line = lines.next_line("symbol name")?;
            let (name, flags) = match line.rfind('\t') {
                Some(tab) => {
                    let flags = &line[tab + 1..];
                    let flags = u32::from_str_radix(flags, 16).map_err(|_| {
                        Error::corrupt(format!("invalid flags {:?} in symbol {:?}", flags, line))
                    })?;
                    (&line[..tab], flags)
                }
                None => (line, 0),
            };
            let (object_path, source_path) = paths[section.path_indices[i]];
            symbols.push(Symbol {
                section_name: (*section_name).to_string(),
                address: section.addresses[i],
                size: section.sizes[i],
                padding: 0,
                name: name.to_string(),
                full_name: None,
                object_path: object_path.to_string(),
                source_path: source_path.to_string(),
                flags,
            });
        }
    }
    if !lines.is_empty() {
        return Err(Error::corrupt(format!(
            "unexpected {} bytes after {} symbols",
            data.len() - lines.offset(),
            total
        )));
    }

    #[cfg(feature = "logging")]
    info!(
        "Loaded {} symbols in {} sections with {} paths",
        symbols.len(),
        section_names.len(),
        paths.len()
    );

    Ok(SizeInfo::new(
        headers.section_sizes,
        symbols,
        headers.metadata.unwrap_or_default(),
    ))
}

/// Read the address, size and path index blocks.
///
/// Each block has one row per section. Delta encoded rows are summed with a
/// running total that restarts at 0 for every section.
fn read_columns(
    lines: &mut Lines<'_>,
    section_counts: &[usize],
    num_paths: usize,
) -> Result<Vec<Columns>> {
    let mut addresses = Vec::with_capacity(section_counts.len());
    for &count in section_counts {
        let row = delta::decode(lines.next_row(count, "addresses")?)
            .ok_or_else(|| Error::corrupt("address overflow"))?;
        let row = row
            .into_iter()
            .map(|address| {
                u64::try_from(address)
                    .map_err(|_| Error::corrupt(format!("address {} out of range", address)))
            })
            .collect::<Result<Vec<_>>>()?;
        addresses.push(row);
    }

    let mut sizes = Vec::with_capacity(section_counts.len());
    for &count in section_counts {
        let row = lines
            .next_row(count, "sizes")?
            .into_iter()
            .map(|size| {
                i64::try_from(size)
                    .map_err(|_| Error::corrupt(format!("size {} out of range", size)))
            })
            .collect::<Result<Vec<_>>>()?;
        sizes.push(row);
    }

    let mut path_indices = Vec::with_capacity(section_counts.len());
    for &count in section_counts {
        let row = delta::decode(lines.next_row(count, "path indices")?)
            .ok_or_else(|| Error::corrupt("path index overflow"))?;
        let row = row
            .into_iter()
            .map(|index| match usize::try_from(index) {
                Ok(index) if index < num_paths => Ok(index),
                _ => Err(Error::corrupt(format!(
                    "path index {} out of range for {} paths",
                    index, num_paths
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        path_indices.push(row);
    }

    Ok(addresses
        .into_iter()
        .zip(sizes)
        .zip(path_indices)
        .map(|((addresses, sizes), path_indices)| Columns {
            addresses,
            sizes,
            path_indices,
        })
        .collect())
}
