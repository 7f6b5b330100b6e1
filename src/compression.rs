//! Gzip framing for `.size` files.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
#[cfg(feature = "logging")]
use log::{debug, info};

use crate::model::SizeInfo;
use crate::read::read_size_info;
use crate::write::{self, write_size_info, Options};
use crate::Result;

/// Save `size_info` to a gzip compressed file at `path`.
pub fn save_size_info<P: AsRef<Path>>(
    size_info: &SizeInfo,
    path: P,
    options: &Options,
) -> Result<()> {
    let path = path.as_ref();
    let file = fs::File::create(path)?;
    write_compressed(size_info, io::BufWriter::new(file), options)?;
    #[cfg(feature = "logging")]
    info!(
        "Saved {} symbols to {}",
        size_info.symbols.len(),
        path.display()
    );
    Ok(())
}

/// Load a `SizeInfo` from the gzip compressed file at `path`.
pub fn load_size_info<P: AsRef<Path>>(path: P) -> Result<SizeInfo> {
    let file = fs::File::open(path)?;
    read_compressed(io::BufReader::new(file))
}

/// Write `size_info` to `w` as a gzip compressed payload.
pub fn write_compressed<W: Write>(size_info: &SizeInfo, w: W, options: &Options) -> Result<()> {
    let mut encoder = GzEncoder::new(w, options.compression);
    if options.streaming {
        write_size_info(size_info, &mut encoder)?;
    } else {
        // Compressing in a separate pass takes less time overall.
        let buffer = write::to_vec(size_info)?;
        #[cfg(feature = "logging")]
        debug!("Serialization complete. Gzipping {} bytes", buffer.len());
        encoder.write_all(&buffer)?;
    }
    encoder.finish()?.flush()?;
    Ok(())
}

/// Read a gzip compressed payload from `r` and decode it.
pub fn read_compressed<R: Read>(r: R) -> Result<SizeInfo> {
    read_size_info(GzDecoder::new(r))
}

/// Gzip compress an uncompressed payload.
pub fn compress(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Remove the gzip framing from a compressed payload.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoded = Vec::new();
    GzDecoder::new(data).read_to_end(&mut decoded)?;
    Ok(decoded)
}
