use serde_json::json;
use sizefile::describe::Describer;
use sizefile::{read, write};
use sizefile::{Metadata, SectionSizes, SizeInfo, Symbol, FLAG_ANONYMOUS, FLAG_REL};

fn symbol(
    section_name: &str,
    address: u64,
    size: i64,
    name: &str,
    object_path: &str,
    source_path: &str,
) -> Symbol {
    let mut symbol = Symbol::new(section_name, address, size, name);
    symbol.object_path = object_path.into();
    symbol.source_path = source_path.into();
    symbol
}

fn sample() -> SizeInfo {
    let mut section_sizes = SectionSizes::new();
    section_sizes.insert(".bss".into(), 4096);
    section_sizes.insert(".data".into(), 512);
    section_sizes.insert(".rodata".into(), 2048);
    section_sizes.insert(".text".into(), 8192);
    section_sizes.insert(".comment".into(), 33);

    let mut metadata = Metadata::new();
    metadata.insert("elf_mtime".into(), json!(1500000000));
    metadata.insert("gn_args".into(), json!(["is_debug=false", "symbol_level=1"]));
    metadata.insert("git_revision".into(), json!("deadbeef"));

    let mut flagged = symbol(".data", 0x3000, 24, "g_table", "data.o", "data.cc");
    flagged.flags = FLAG_ANONYMOUS | FLAG_REL;

    // Symbols are already grouped in section name order, so the decoded
    // order matches.
    let symbols = vec![
        symbol(".bss", 0x9000, 64, "g_buffer", "buf.o", "buf.cc"),
        flagged,
        symbol(".rodata", 0x2000, 16, "kName", "a.o", "a.cc"),
        symbol(".rodata", 0x2010, 32, "** merge strings", "", ""),
        symbol(".text", 0x1000, 100, "main", "main.o", "main.cc"),
        symbol(".text", 0x1080, 20, "", "main.o", "main.cc"),
        symbol(".text", 0x1040, 40, "helper", "a.o", "a.cc"),
    ];
    SizeInfo::new(section_sizes, symbols, metadata)
}

#[test]
fn round_trip() {
    let size_info = sample();
    let bytes = write::to_vec(&size_info).unwrap();
    let loaded = read::parse(&bytes).unwrap();
    assert_eq!(loaded, size_info);
}

#[test]
fn round_trip_reader() {
    let size_info = sample();
    let bytes = write::to_vec(&size_info).unwrap();
    let loaded = read::read_size_info(&bytes[..]).unwrap();
    assert_eq!(loaded.symbols, size_info.symbols);
}

#[test]
fn lossy_fields() {
    let mut size_info = sample();
    let main = &mut size_info.symbols[4];
    main.padding = 12;
    main.full_name = Some("main(int, char**)".into());

    let loaded = read::parse(&write::to_vec(&size_info).unwrap()).unwrap();
    let main = &loaded.symbols[4];
    assert_eq!(main.padding, 0);
    assert_eq!(main.full_name, None);
    assert_eq!(main.size, 88);
    assert_eq!(main.size_without_padding(), 88);
    // The full name is stored in place of the name.
    assert_eq!(main.name, "main(int, char**)");
}

#[test]
fn sections_are_grouped() {
    let size_info = SizeInfo::new(
        SectionSizes::new(),
        vec![
            symbol(".text", 10, 1, "t1", "a.o", ""),
            symbol(".bss", 20, 1, "b1", "a.o", ""),
            symbol(".text", 5, 1, "t2", "b.o", ""),
        ],
        Metadata::new(),
    );
    let loaded = read::parse(&write::to_vec(&size_info).unwrap()).unwrap();
    let names: Vec<&str> = loaded.symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["b1", "t1", "t2"]);
    let addresses: Vec<u64> = loaded.symbols.iter().map(|s| s.address).collect();
    assert_eq!(addresses, [20, 10, 5]);
}

#[test]
fn delta_per_section() {
    let size_info = SizeInfo::new(
        SectionSizes::new(),
        vec![
            symbol(".rodata", 100, 1, "a", "", ""),
            symbol(".rodata", 150, 1, "b", "", ""),
            symbol(".rodata", 150, 1, "c", "", ""),
            symbol(".rodata", 90, 1, "d", "", ""),
            symbol(".text", 70, 1, "e", "", ""),
        ],
        Metadata::new(),
    );
    let bytes = write::to_vec(&size_info).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let names = lines.iter().position(|line| *line == ".rodata\t.text").unwrap();
    assert_eq!(lines[names + 1], "4\t1");
    assert_eq!(lines[names + 2], "100 50 0 -60");
    assert_eq!(lines[names + 3], "70");

    let loaded = read::parse(&bytes).unwrap();
    let addresses: Vec<u64> = loaded.symbols.iter().map(|s| s.address).collect();
    assert_eq!(addresses, [100, 150, 150, 90, 70]);
}

#[test]
fn path_dedup() {
    let size_info = SizeInfo::new(
        SectionSizes::new(),
        vec![
            symbol(".text", 0, 1, "a", "a.o", "a.cc"),
            symbol(".text", 1, 1, "b", "a.o", "a.cc"),
        ],
        Metadata::new(),
    );
    let text = String::from_utf8(write::to_vec(&size_info).unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let count = lines.iter().position(|line| *line == "1").unwrap();
    assert_eq!(lines[count + 1], "a.o\ta.cc");
    assert_eq!(lines[count + 2], ".text");
    // Path indices for both symbols are 0.
    assert_eq!(lines[count + 6], "0 0");

    let loaded = read::parse(text.as_bytes()).unwrap();
    for symbol in &loaded.symbols {
        assert_eq!(symbol.object_path, "a.o");
        assert_eq!(symbol.source_path, "a.cc");
    }
}

#[test]
fn flags_suffix() {
    let mut flagged = symbol(".text", 1, 1, "name", "", "");
    flagged.flags = 0x5;
    let size_info = SizeInfo::new(
        SectionSizes::new(),
        vec![symbol(".text", 0, 1, "plain", "", ""), flagged],
        Metadata::new(),
    );
    let text = String::from_utf8(write::to_vec(&size_info).unwrap()).unwrap();
    assert!(text.ends_with("\nplain\nname\t5\n"));

    let loaded = read::parse(text.as_bytes()).unwrap();
    assert_eq!(loaded.symbols[0].flags, 0);
    assert_eq!(loaded.symbols[1].flags, 0x5);
    assert_eq!(loaded.symbols[1].name, "name");
}

#[test]
fn empty() {
    let size_info = SizeInfo::default();
    let loaded = read::parse(&write::to_vec(&size_info).unwrap()).unwrap();
    assert_eq!(loaded, size_info);
}

#[test]
fn section_sizes_without_symbols() {
    let mut section_sizes = SectionSizes::new();
    section_sizes.insert(".data.rel.ro".into(), 128);
    let size_info = SizeInfo::new(section_sizes, Vec::new(), Metadata::new());
    let loaded = read::parse(&write::to_vec(&size_info).unwrap()).unwrap();
    assert_eq!(loaded.section_sizes.get(".data.rel.ro"), Some(&128));
    assert!(loaded.symbols.is_empty());
}

#[test]
fn large_addresses() {
    let size_info = SizeInfo::new(
        SectionSizes::new(),
        vec![
            symbol(".text", u64::MAX - 16, 8, "hi", "", ""),
            symbol(".text", 0, 8, "lo", "", ""),
            symbol(".text", u64::MAX, 8, "top", "", ""),
        ],
        Metadata::new(),
    );
    let loaded = read::parse(&write::to_vec(&size_info).unwrap()).unwrap();
    assert_eq!(loaded.symbols, size_info.symbols);
}

#[test]
fn non_ascii_metadata() {
    let mut metadata = Metadata::new();
    metadata.insert("note".into(), json!("größe ✓"));
    let size_info = SizeInfo::new(SectionSizes::new(), Vec::new(), metadata);
    let loaded = read::parse(&write::to_vec(&size_info).unwrap()).unwrap();
    assert_eq!(loaded.metadata, size_info.metadata);
}

#[test]
fn extreme_sizes() {
    let size_info = SizeInfo::new(
        SectionSizes::new(),
        vec![
            symbol(".text", 0, i64::MIN, "low", "", ""),
            symbol(".text", 8, i64::MAX, "high", "", ""),
        ],
        Metadata::new(),
    );
    let loaded = read::parse(&write::to_vec(&size_info).unwrap()).unwrap();
    assert_eq!(loaded.symbols, size_info.symbols);
    let symbols: Vec<&Symbol> = loaded.symbols.iter().collect();
    let lines = Describer::new(false).describe_symbols(&symbols);
    assert_eq!(lines[0], "Showing 2 symbols with total size: -1 bytes");
}

#[test]
fn describe_verbose() {
    let lines = Describer::new(true).describe_size_info(&sample());
    assert_eq!(
        lines[..13],
        [
            "Metadata:",
            "    elf_mtime=2017-07-14 02:40:00",
            "    git_revision=deadbeef",
            "    gn_args=is_debug=false; symbol_level=1",
            "",
            "Section Sizes (Total=10,752 bytes):",
            "    .bss: 4,096 bytes (not included in totals)",
            "    .data: 512 bytes (4.8%)",
            "    .rodata: 2,048 bytes (19.0%)",
            "    .text: 8,192 bytes (76.2%)",
            "",
            "Other section sizes:",
            "    .comment: 33 bytes",
        ]
    );
    assert_eq!(lines[13], "");
    assert_eq!(
        lines[14..20],
        [
            "Section b has 1.6% of 64 bytes accounted for from 1 symbols. \
             4032 bytes are unaccounted for. Padding accounts for 0 bytes",
            "Section d has 4.7% of 24 bytes accounted for from 1 symbols. \
             488 bytes are unaccounted for. Padding accounts for 0 bytes",
            "Section r has 2.3% of 48 bytes accounted for from 2 symbols. \
             2000 bytes are unaccounted for. Padding accounts for 0 bytes",
            "+ Without 1 merge sections and 0 anonymous entries (accounting for 32 bytes):",
            "+ Section r has 0.8% of 16 bytes accounted for from 1 symbols. \
             2032 bytes are unaccounted for. Padding accounts for 0 bytes",
            "Section t has 2.0% of 160 bytes accounted for from 3 symbols. \
             8032 bytes are unaccounted for. Padding accounts for 0 bytes",
        ]
    );
    assert_eq!(lines[20], "");
    assert_eq!(lines[21], "Showing 7 symbols with total size: 296 bytes");
}

#[test]
fn describe_brief() {
    let lines = Describer::new(false).describe_size_info(&sample());
    assert_eq!(lines[0], "Metadata:");
    assert!(!lines.iter().any(|line| line == "Other section sizes:"));
    assert!(!lines.iter().any(|line| line.starts_with("Section t has")));
    let showing = lines.iter().position(|line| line.starts_with("Showing ")).unwrap();
    assert_eq!(lines[showing - 1], "");
    assert_eq!(lines[showing - 2], "    .text: 8,192 bytes (76.2%)");
}
