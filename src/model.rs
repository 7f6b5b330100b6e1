//! The in-memory model of a `.size` file.

use std::collections::BTreeMap;

/// Arbitrary build metadata, keyed by name.
///
/// Keys are kept sorted so the serialized header is deterministic.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Section sizes in bytes, keyed by section name.
pub type SectionSizes = BTreeMap<String, u64>;

/// The name of the executable code section.
pub const SECTION_TEXT: &str = ".text";
/// The name of the read only data section.
pub const SECTION_RODATA: &str = ".rodata";
/// The name of the uninitialized data section.
pub const SECTION_BSS: &str = ".bss";
/// The name of the data section.
pub const SECTION_DATA: &str = ".data";

/// The section tags that are tracked, and the section name for each.
pub const SECTION_TO_SECTION_NAME: &[(char, &str)] = &[
    ('b', SECTION_BSS),
    ('d', SECTION_DATA),
    ('r', SECTION_RODATA),
    ('t', SECTION_TEXT),
];

/// The git revision the binary was built from.
pub const METADATA_GIT_REVISION: &str = "git_revision";
/// The file name of the APK the binary was extracted from.
pub const METADATA_APK_FILENAME: &str = "apk_file_name";
/// The file name of the linker map file.
pub const METADATA_MAP_FILENAME: &str = "map_file_name";
/// The architecture of the ELF file.
pub const METADATA_ELF_ARCHITECTURE: &str = "elf_arch";
/// The file name of the ELF file.
pub const METADATA_ELF_FILENAME: &str = "elf_file_name";
/// The modification time of the ELF file, in seconds since the unix epoch.
pub const METADATA_ELF_MTIME: &str = "elf_mtime";
/// The build ID of the ELF file.
pub const METADATA_ELF_BUILD_ID: &str = "elf_build_id";
/// The list of build arguments.
pub const METADATA_GN_ARGS: &str = "gn_args";
/// The prefix of the toolchain used to analyze the binary.
pub const METADATA_TOOL_PREFIX: &str = "tool_prefix";

/// The symbol has no name of its own, and was named after its contents.
pub const FLAG_ANONYMOUS: u32 = 1;
/// The symbol is in a startup code section.
pub const FLAG_STARTUP: u32 = 2;
/// The symbol is in an unlikely code section.
pub const FLAG_UNLIKELY: u32 = 4;
/// The symbol is in a relocated data section.
pub const FLAG_REL: u32 = 8;
/// The symbol is in a locally relocated data section.
pub const FLAG_REL_LOCAL: u32 = 16;

const FLAG_NAMES: &[(u32, &str)] = &[
    (FLAG_ANONYMOUS, "anon"),
    (FLAG_STARTUP, "startup"),
    (FLAG_UNLIKELY, "unlikely"),
    (FLAG_REL, "rel"),
    (FLAG_REL_LOCAL, "rel.loc"),
];

/// A symbol from a compiled binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Symbol {
    /// The name of the section containing the symbol, such as `.text`.
    pub section_name: String,
    /// The address of the symbol.
    ///
    /// Only the ordering of addresses within a section is meaningful.
    pub address: u64,
    /// The size of the symbol in bytes, including padding.
    pub size: i64,
    /// The number of bytes of padding preceding the symbol.
    pub padding: i64,
    /// The name of the symbol. May be empty.
    pub name: String,
    /// The full (for example, demangled) name of the symbol.
    ///
    /// When present, this is stored instead of `name`.
    pub full_name: Option<String>,
    /// The path of the object file that defined the symbol.
    pub object_path: String,
    /// The path of the source file that defined the symbol.
    pub source_path: String,
    /// A bitmask of `FLAG_*` values.
    pub flags: u32,
}

impl Symbol {
    /// Create a symbol with no padding, paths, flags or full name.
    pub fn new(
        section_name: impl Into<String>,
        address: u64,
        size: i64,
        name: impl Into<String>,
    ) -> Self {
        Symbol {
            section_name: section_name.into(),
            address,
            size,
            padding: 0,
            name: name.into(),
            full_name: None,
            object_path: String::new(),
            source_path: String::new(),
            flags: 0,
        }
    }

    /// The one character tag for the section, such as `t` for `.text`.
    pub fn section(&self) -> char {
        let mut chars = self.section_name.chars();
        match chars.next() {
            Some('.') => chars.next().unwrap_or('.'),
            Some(c) => c,
            None => '?',
        }
    }

    /// Return true if the symbol is in the uninitialized data section.
    #[inline]
    pub fn is_bss(&self) -> bool {
        self.section() == 'b'
    }

    /// The size of the symbol without its padding.
    ///
    /// Wraps on overflow.
    #[inline]
    pub fn size_without_padding(&self) -> i64 {
        self.size.wrapping_sub(self.padding)
    }

    /// The name that is persisted for the symbol.
    ///
    /// This is the full name if there is a non-empty one, and the name otherwise.
    pub fn stored_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(full_name) if !full_name.is_empty() => full_name,
            _ => &self.name,
        }
    }

    /// Return true if either path is known.
    pub fn has_any_attribution(&self) -> bool {
        !self.object_path.is_empty() || !self.source_path.is_empty()
    }

    /// Format the known flags as `{flag,flag}`, or an empty string if none are set.
    pub fn flags_string(&self) -> String {
        let names: Vec<&str> = FLAG_NAMES
            .iter()
            .filter(|(flag, _)| self.flags & flag != 0)
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            String::new()
        } else {
            format!("{{{}}}", names.join(","))
        }
    }
}

/// The symbols and summary metadata for one analyzed binary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeInfo {
    /// The size of every section, including sections without symbols.
    pub section_sizes: SectionSizes,
    /// The symbols, in section order.
    pub symbols: Vec<Symbol>,
    /// Build metadata.
    pub metadata: Metadata,
}

impl SizeInfo {
    /// Create a new `SizeInfo`.
    pub fn new(section_sizes: SectionSizes, symbols: Vec<Symbol>, metadata: Metadata) -> Self {
        SizeInfo {
            section_sizes,
            symbols,
            metadata,
        }
    }

    /// Group the symbols by section name.
    ///
    /// Returns the indices into `symbols` for each section. Sections are
    /// sorted by name. Within a section, indices keep the order of `symbols`,
    /// which is the order used for delta encoding.
    pub fn symbols_by_section(&self) -> Vec<(&str, Vec<usize>)> {
        let mut sections: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (index, symbol) in self.symbols.iter().enumerate() {
            sections
                .entry(symbol.section_name.as_str())
                .or_default()
                .push(index);
        }
        sections.into_iter().collect()
    }
}
