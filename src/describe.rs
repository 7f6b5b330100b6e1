//! Human readable descriptions of size infos and symbols.
//!
//! Every function returns lines without trailing newlines.

use std::collections::HashSet;

use chrono::DateTime;
use serde_json::Value;

use crate::model::{
    Metadata, SectionSizes, SizeInfo, Symbol, METADATA_ELF_MTIME, METADATA_GN_ARGS, SECTION_BSS,
    SECTION_TO_SECTION_NAME,
};

/// Format a size in bytes, using kb or mb units for larger sizes.
///
/// Sizes are always shown with three significant digits once units are used.
pub fn pretty_size(size: i128) -> String {
    if size.unsigned_abs() < 2000 {
        return format!("{} bytes", size);
    }
    let size = size as f64 / 1024.0;
    if size.abs() < 10.0 {
        format!("{:.2}kb", size)
    } else if size.abs() < 100.0 {
        format!("{:.1}kb", size)
    } else if size.abs() < 1024.0 {
        format!("{}kb", size.trunc() as i64)
    } else {
        let size = size / 1024.0;
        if size.abs() < 10.0 {
            format!("{:.2}mb", size)
        } else {
            format!("{:.1}mb", size)
        }
    }
}

/// Format an integer with `,` thousands separators.
fn commas(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Describe metadata as sorted `key=value` lines.
///
/// The ELF modification time is shown as a UTC date, and build arguments are
/// joined with `; `.
pub fn describe_metadata(metadata: &Metadata) -> Vec<String> {
    let mut lines: Vec<String> = metadata
        .iter()
        .map(|(key, value)| format!("{}={}", key, metadata_value(key, value)))
        .collect();
    lines.sort();
    lines
}

fn metadata_value(key: &str, value: &Value) -> String {
    if key == METADATA_ELF_MTIME {
        let timestamp = value
            .as_i64()
            .or_else(|| value.as_f64().map(|secs| secs as i64))
            .filter(|&secs| secs != 0)
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        if let Some(timestamp) = timestamp {
            return timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        }
    } else if key == METADATA_GN_ARGS {
        if let Some(args) = value.as_array().filter(|args| !args.is_empty()) {
            let args: Vec<String> = args.iter().map(display_value).collect();
            return args.join("; ");
        }
    }
    display_value(value)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Describe how much of each tracked section is accounted for by symbols.
pub fn describe_coverage(size_info: &SizeInfo) -> Vec<String> {
    let mut lines = Vec::new();
    for &(section, section_name) in SECTION_TO_SECTION_NAME {
        let expected_size: u64 = if section == 'd' {
            size_info
                .section_sizes
                .iter()
                .filter(|(name, _)| name.starts_with(".data"))
                .map(|(_, size)| *size)
                .sum()
        } else {
            size_info
                .section_sizes
                .get(section_name)
                .copied()
                .unwrap_or(0)
        };

        let in_section: Vec<&Symbol> = size_info
            .symbols
            .iter()
            .filter(|symbol| symbol.section() == section)
            .collect();
        lines.push(coverage_stat(section, expected_size, &in_section));

        let (star_syms, rest): (Vec<&Symbol>, Vec<&Symbol>) = in_section
            .iter()
            .copied()
            .partition(|symbol| symbol.name.starts_with('*'));
        let (attributed_syms, anonymous_syms): (Vec<&Symbol>, Vec<&Symbol>) = rest
            .into_iter()
            .partition(|symbol| symbol.has_any_attribution());
        if !star_syms.is_empty() || !anonymous_syms.is_empty() {
            let missing_size = total_size(&star_syms) + total_size(&anonymous_syms);
            lines.push(format!(
                "+ Without {} merge sections and {} anonymous entries (accounting for {} bytes):",
                star_syms.len(),
                anonymous_syms.len(),
                missing_size
            ));
            lines.push(format!(
                "+ {}",
                coverage_stat(section, expected_size, &attributed_syms)
            ));
        }
    }
    lines
}

fn coverage_stat(section: char, expected_size: u64, symbols: &[&Symbol]) -> String {
    let actual_size = total_size(symbols);
    let padding: i128 = symbols
        .iter()
        .map(|symbol| i128::from(symbol.padding))
        .sum();
    let size_percent = if expected_size == 0 {
        0.0
    } else {
        100.0 * actual_size as f64 / expected_size as f64
    };
    format!(
        "Section {} has {:.1}% of {} bytes accounted for from {} symbols. \
         {} bytes are unaccounted for. Padding accounts for {} bytes",
        section,
        size_percent,
        actual_size,
        symbols.len(),
        i128::from(expected_size) - actual_size,
        padding
    )
}

/// Sum the sizes without overflowing on extreme values.
fn total_size(symbols: &[&Symbol]) -> i128 {
    symbols.iter().map(|symbol| i128::from(symbol.size)).sum()
}

/// Produces text descriptions of size infos and symbols.
#[derive(Debug, Default, Clone)]
pub struct Describer {
    /// Include padding, both paths, flags, full names, coverage and the
    /// sizes of untracked sections.
    pub verbose: bool,
}

impl Describer {
    /// Create a new describer.
    pub fn new(verbose: bool) -> Self {
        Describer { verbose }
    }

    /// Describe the metadata, section sizes and symbols of `size_info`.
    pub fn describe_size_info(&self, size_info: &SizeInfo) -> Vec<String> {
        let mut lines = vec!["Metadata:".to_string()];
        lines.extend(
            describe_metadata(&size_info.metadata)
                .into_iter()
                .map(|line| format!("    {}", line)),
        );
        lines.extend(self.describe_section_sizes(&size_info.section_sizes));
        if self.verbose {
            lines.push(String::new());
            lines.extend(describe_coverage(size_info));
        }
        lines.push(String::new());
        let symbols: Vec<&Symbol> = size_info.symbols.iter().collect();
        lines.extend(self.describe_symbols(&symbols));
        lines
    }

    /// Describe the section sizes.
    ///
    /// Only tracked sections count towards the total, and `.bss` never does.
    pub fn describe_section_sizes(&self, section_sizes: &SectionSizes) -> Vec<String> {
        let is_relevant = |name: &str| {
            name.starts_with(".data")
                || SECTION_TO_SECTION_NAME
                    .iter()
                    .any(|&(_, section_name)| section_name == name)
        };
        let total_bytes: u64 = section_sizes
            .iter()
            .filter(|(name, _)| is_relevant(name) && name.as_str() != SECTION_BSS)
            .map(|(_, size)| *size)
            .sum();

        let mut lines = vec![
            String::new(),
            format!(
                "Section Sizes (Total={} bytes):",
                commas(i128::from(total_bytes))
            ),
        ];
        for (name, &size) in section_sizes.iter().filter(|(name, _)| is_relevant(name)) {
            if name == SECTION_BSS {
                lines.push(format!(
                    "    {}: {} bytes (not included in totals)",
                    name,
                    commas(i128::from(size))
                ));
            } else {
                let percent = if total_bytes == 0 {
                    0.0
                } else {
                    100.0 * size as f64 / total_bytes as f64
                };
                lines.push(format!(
                    "    {}: {} bytes ({:.1}%)",
                    name,
                    commas(i128::from(size)),
                    percent
                ));
            }
        }

        if self.verbose {
            lines.push(String::new());
            lines.push("Other section sizes:".to_string());
            for (name, &size) in section_sizes.iter().filter(|(name, _)| !is_relevant(name)) {
                lines.push(format!("    {}: {} bytes", name, commas(i128::from(size))));
            }
        }
        lines
    }

    /// Describe a list of symbols, with a summary header.
    ///
    /// Symbols are listed largest first, with `.bss` symbols last. Each entry
    /// starts with a running total of the sizes so far, which excludes `.bss`
    /// unless every symbol is in `.bss`.
    pub fn describe_symbols(&self, symbols: &[&Symbol]) -> Vec<String> {
        let total_size = total_size(symbols);
        let code_size: i128 = symbols
            .iter()
            .filter(|symbol| symbol.section() == 't')
            .map(|symbol| i128::from(symbol.size))
            .sum();
        let ro_size: i128 = symbols
            .iter()
            .filter(|symbol| symbol.section() == 'r')
            .map(|symbol| i128::from(symbol.size))
            .sum();
        let unique_paths: HashSet<&str> = symbols
            .iter()
            .map(|symbol| symbol.object_path.as_str())
            .collect();

        let mut lines = vec![
            format!(
                "Showing {} symbols with total size: {} bytes",
                commas(symbols.len() as i128),
                total_size
            ),
            format!(
                ".text={:<10} .rodata={:<10} other={:<10} total={}",
                pretty_size(code_size),
                pretty_size(ro_size),
                pretty_size(total_size - code_size - ro_size),
                pretty_size(total_size)
            ),
            format!("Number of object files: {}", unique_paths.len()),
            String::new(),
            "First columns are: running total, type, size".to_string(),
        ];

        let mut sorted = symbols.to_vec();
        sorted.sort_by(|a, b| {
            a.is_bss()
                .cmp(&b.is_bss())
                .then_with(|| b.size.unsigned_abs().cmp(&a.size.unsigned_abs()))
                .then_with(|| a.name.cmp(&b.name))
        });
        let all_bss = !sorted.is_empty() && sorted.iter().all(|symbol| symbol.is_bss());

        let mut running_total = 0i128;
        for symbol in sorted {
            if all_bss || !symbol.is_bss() {
                running_total += i128::from(symbol.size);
            }
            for line in self.describe_symbol(symbol) {
                if line.starts_with("    ") {
                    lines.push(format!("{} {}", " ".repeat(8), line));
                } else {
                    lines.push(format!("{:8} {}", running_total, line));
                }
            }
        }
        lines
    }

    /// Describe a single symbol.
    ///
    /// The first line starts with the section tag and address. Continuation
    /// lines are indented by four spaces.
    pub fn describe_symbol(&self, symbol: &Symbol) -> Vec<String> {
        let address = format!("{:#x}", symbol.address);
        let mut lines = Vec::new();
        if self.verbose {
            lines.push(format!(
                "{}@{:<9}  size={}  padding={}  size_without_padding={}",
                symbol.section(),
                address,
                symbol.size,
                symbol.padding,
                symbol.size_without_padding()
            ));
            lines.push(format!(
                "    source_path={} \tobject_path={}",
                symbol.source_path, symbol.object_path
            ));
            let full_name = symbol.full_name.as_deref().filter(|name| !name.is_empty());
            if !symbol.name.is_empty() {
                lines.push(format!(
                    "    flags={}  name={}",
                    symbol.flags_string(),
                    symbol.name
                ));
                if let Some(full_name) = full_name {
                    lines.push(format!("               full_name={}", full_name));
                }
            } else if let Some(full_name) = full_name {
                lines.push(format!(
                    "    flags={}  full_name={}",
                    symbol.flags_string(),
                    full_name
                ));
            }
        } else {
            let path = if !symbol.source_path.is_empty() {
                symbol.source_path.as_str()
            } else if !symbol.object_path.is_empty() {
                symbol.object_path.as_str()
            } else {
                "{no path}"
            };
            lines.push(format!(
                "{}@{:<9}  {:<7} {}",
                symbol.section(),
                address,
                symbol.size,
                path
            ));
            if !symbol.name.is_empty() {
                lines.push(format!("    {}", symbol.name));
            }
        }
        lines
    }
}
