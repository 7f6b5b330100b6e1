use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{command, Arg, ArgAction};
use sizefile::describe::Describer;
use sizefile::write::{self, Options};

fn main() -> Result<()> {
    let matches = command!()
        .max_term_width(100)
        .args(&[
            Arg::new("input")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("The input .size file"),
            Arg::new("output")
                .required(false)
                .value_parser(clap::value_parser!(PathBuf))
                .help(
                    "Save the loaded size info to this file. \
                    Use - to write the uncompressed payload to stdout instead of a description",
                ),
            Arg::new("raw")
                .long("raw")
                .action(ArgAction::SetTrue)
                .help("Read and write the uncompressed payload instead of gzip"),
            Arg::new("streaming")
                .long("streaming")
                .action(ArgAction::SetTrue)
                .help("Compress the output while serializing it, using less memory"),
            Arg::new("level")
                .long("level")
                .value_name("level")
                .value_parser(clap::value_parser!(u32).range(0..=9))
                .help("The gzip compression level of the output, from 0 to 9"),
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Describe padding, paths, flags and coverage, and enable debug logging"),
        ])
        .get_matches();

    let verbose = matches.get_flag("verbose");
    if verbose {
        env_logger::builder()
            .format_level(false)
            .format_target(false)
            .filter_module("sizefile", log::LevelFilter::Debug)
            .init();
    }
    let raw = matches.get_flag("raw");

    let in_path = matches
        .get_one::<PathBuf>("input")
        .context("Missing input file")?;
    let in_file = fs::File::open(in_path)
        .with_context(|| format!("Failed to open input file '{}'", in_path.display()))?;
    let in_data = unsafe { memmap2::Mmap::map(&in_file) }
        .with_context(|| format!("Failed to map input file '{}'", in_path.display()))?;
    let in_data = &*in_data;
    let size_info = if raw {
        sizefile::read::parse(in_data)
    } else {
        sizefile::read_compressed(in_data)
    }
    .with_context(|| format!("Failed to parse input file '{}'", in_path.display()))?;

    let out_path = matches.get_one::<PathBuf>("output");
    if out_path.map_or(true, |path| path != Path::new("-")) {
        let mut stdout = io::stdout().lock();
        for line in Describer::new(verbose).describe_size_info(&size_info) {
            writeln!(stdout, "{}", line)?;
        }
    }

    let Some(out_path) = out_path else {
        return Ok(());
    };

    if out_path == Path::new("-") {
        write::write_size_info(&size_info, io::stdout().lock())
            .with_context(|| "Failed to write output to stdout")?;
        return Ok(());
    }

    let mut options = Options::default();
    options.streaming = matches.get_flag("streaming");
    if let Some(&level) = matches.get_one::<u32>("level") {
        options.compression = flate2::Compression::new(level);
    }
    let result = if raw {
        fs::File::create(out_path)
            .map_err(sizefile::Error::from)
            .and_then(|file| write::write_size_info(&size_info, io::BufWriter::new(file)))
    } else {
        sizefile::save_size_info(&size_info, out_path, &options)
    };
    result.with_context(|| {
        if out_path.is_file() {
            // This is a regular file that we either created or truncated,
            // so we can safely remove it.
            fs::remove_file(out_path).ok();
        }
        format!("Failed to write output file '{}'", out_path.display())
    })?;
    Ok(())
}
