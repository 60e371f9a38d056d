//! Domain types for the build-graph snapshot.
//!
//! Source, reference and response-file paths are kept as the `PathBuf`s the
//! snapshot gives; resolution against the workspace root happens later.
//! Every type round-trips through serde.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a compilation unit. Unique within a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitName(pub String);

impl UnitName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for UnitName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UnitName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Where a compilation unit comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    BuiltIn,
    Embedded,
    Git,
    Local,
    LocalArchive,
    Registry,
    Unknown,
    PlayerVariant,
}

impl Provenance {
    /// All categories in a stable order.
    pub fn all() -> &'static [Provenance] {
        &[
            Provenance::BuiltIn,
            Provenance::Embedded,
            Provenance::Git,
            Provenance::Local,
            Provenance::LocalArchive,
            Provenance::Registry,
            Provenance::Unknown,
            Provenance::PlayerVariant,
        ]
    }

    /// The bit this category owns in a [`ProvenanceMask`].
    pub fn bit(self) -> u32 {
        match self {
            Provenance::BuiltIn => 1 << 0,
            Provenance::Embedded => 1 << 1,
            Provenance::Git => 1 << 2,
            Provenance::Local => 1 << 3,
            Provenance::LocalArchive => 1 << 4,
            Provenance::Registry => 1 << 5,
            Provenance::Unknown => 1 << 6,
            Provenance::PlayerVariant => 1 << 7,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::BuiltIn => write!(f, "built-in"),
            Provenance::Embedded => write!(f, "embedded"),
            Provenance::Git => write!(f, "git"),
            Provenance::Local => write!(f, "local"),
            Provenance::LocalArchive => write!(f, "local-archive"),
            Provenance::Registry => write!(f, "registry"),
            Provenance::Unknown => write!(f, "unknown"),
            Provenance::PlayerVariant => write!(f, "player-variant"),
        }
    }
}

/// Bitmask of provenance categories for which manifests are generated.
///
/// Serialized as a list of category names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Provenance>", into = "Vec<Provenance>")]
pub struct ProvenanceMask(pub u32);

impl ProvenanceMask {
    pub const NONE: ProvenanceMask = ProvenanceMask(0);

    pub fn all() -> Self {
        Provenance::all().iter().copied().collect()
    }

    pub fn contains(self, provenance: Provenance) -> bool {
        self.0 & provenance.bit() != 0
    }

    pub fn with(self, provenance: Provenance) -> Self {
        ProvenanceMask(self.0 | provenance.bit())
    }

    pub fn without(self, provenance: Provenance) -> Self {
        ProvenanceMask(self.0 & !provenance.bit())
    }
}

impl Default for ProvenanceMask {
    fn default() -> Self {
        ProvenanceMask::NONE
            .with(Provenance::Embedded)
            .with(Provenance::Local)
    }
}

impl FromIterator<Provenance> for ProvenanceMask {
    fn from_iter<I: IntoIterator<Item = Provenance>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ProvenanceMask::NONE, |mask, p| mask.with(p))
    }
}

impl From<Vec<Provenance>> for ProvenanceMask {
    fn from(list: Vec<Provenance>) -> Self {
        list.into_iter().collect()
    }
}

impl From<ProvenanceMask> for Vec<Provenance> {
    fn from(mask: ProvenanceMask) -> Self {
        Provenance::all()
            .iter()
            .copied()
            .filter(|p| mask.contains(*p))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One compilation unit of the build graph. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub name: UnitName,
    #[serde(default)]
    pub source_files: Vec<PathBuf>,
    #[serde(default)]
    pub defines: Vec<String>,
    /// Compiled binaries this unit links against.
    #[serde(default)]
    pub references: Vec<PathBuf>,
    /// Other units of the same snapshot this unit depends on.
    #[serde(default)]
    pub unit_references: Vec<UnitName>,
    #[serde(default = "default_lang_version")]
    pub lang_version: String,
    #[serde(default)]
    pub allow_unsafe: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_files: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    /// API compatibility level used to look up system reference directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_level: Option<String>,
}

fn default_lang_version() -> String {
    "latest".to_string()
}

impl UnitRecord {
    /// A record with only a name; everything else empty or default.
    pub fn new(name: impl Into<UnitName>) -> Self {
        UnitRecord {
            name: name.into(),
            source_files: Vec::new(),
            defines: Vec::new(),
            references: Vec::new(),
            unit_references: Vec::new(),
            lang_version: default_lang_version(),
            allow_unsafe: false,
            response_files: Vec::new(),
            provenance: None,
            api_level: None,
        }
    }

    pub fn has_sources(&self) -> bool {
        !self.source_files.is_empty()
    }
}

/// The ordered list of unit records for one sync pass.
///
/// Declaration order is the order of `units`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub units: Vec<UnitRecord>,
}

impl Snapshot {
    pub fn new(units: Vec<UnitRecord>) -> Self {
        Snapshot { units }
    }

    pub fn get(&self, name: &UnitName) -> Option<&UnitRecord> {
        self.units.iter().find(|u| &u.name == name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
