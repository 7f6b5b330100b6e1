#![cfg(feature = "compression")]

use std::fs;

use flate2::Compression;
use serde_json::json;
use sizefile::write::{self, Options};
use sizefile::{ErrorKind, Metadata, SectionSizes, SizeInfo, Symbol};

fn sample() -> SizeInfo {
    let mut section_sizes = SectionSizes::new();
    section_sizes.insert(".text".into(), 4096);
    let mut metadata = Metadata::new();
    metadata.insert("elf_arch".into(), json!("arm"));
    let symbols = (0..1000u64)
        .map(|i| {
            let mut symbol = Symbol::new(".text", 0x1000 + i * 4, 4, format!("fn_{}", i));
            symbol.object_path = format!("obj/{}.o", i % 7);
            symbol.source_path = format!("src/{}.cc", i % 7);
            symbol
        })
        .collect();
    SizeInfo::new(section_sizes, symbols, metadata)
}

#[test]
fn save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.size");
    let size_info = sample();
    sizefile::save_size_info(&size_info, &path, &Options::default()).unwrap();
    let loaded = sizefile::load_size_info(&path).unwrap();
    assert_eq!(loaded, size_info);
}

#[test]
fn streaming_matches_buffered() {
    let size_info = sample();
    let mut options = Options::default();
    options.compression = Compression::best();

    let mut buffered = Vec::new();
    sizefile::write_compressed(&size_info, &mut buffered, &options).unwrap();
    options.streaming = true;
    let mut streamed = Vec::new();
    sizefile::write_compressed(&size_info, &mut streamed, &options).unwrap();

    let payload = write::to_vec(&size_info).unwrap();
    assert_eq!(sizefile::decompress(&buffered).unwrap(), payload);
    assert_eq!(sizefile::decompress(&streamed).unwrap(), payload);
    assert!(buffered.len() < payload.len());
}

#[test]
fn load_uncompressed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.size");
    fs::write(&path, write::to_vec(&sample()).unwrap()).unwrap();
    let error = sizefile::load_size_info(&path).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::Io(_)));
}

#[test]
fn load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let error = sizefile::load_size_info(dir.path().join("missing.size")).unwrap_err();
    assert_eq!(
        error.kind(),
        ErrorKind::Io(std::io::ErrorKind::NotFound)
    );
}

#[test]
fn version_mismatch_in_gzip() {
    let payload = write::to_vec(&sample()).unwrap();
    let text = String::from_utf8(payload)
        .unwrap()
        .replacen("Size File Format v1", "Size File Format v2", 1);
    let compressed = sizefile::compress(text.as_bytes(), Compression::fast()).unwrap();
    let error = sizefile::read_compressed(&compressed[..]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Version);
}
