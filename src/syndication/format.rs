use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Format Kind
// ============================================================================

/// The syndication dialects a document can be recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormatKind {
    /// Attention Profiling Markup Language
    Apml,
    Atom,
    BlogML,
    /// Outline Processor Markup Language
    Opml,
    /// Really Simple Discovery
    Rsd,
    Rss,
    /// No dialect signature matched the root element.
    Unknown,
}

impl FormatKind {
    /// Every concrete format, in a stable order. Excludes [`FormatKind::Unknown`].
    pub const CONCRETE: [FormatKind; 6] = [
        FormatKind::Apml,
        FormatKind::Atom,
        FormatKind::BlogML,
        FormatKind::Opml,
        FormatKind::Rsd,
        FormatKind::Rss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormatKind::Apml => "APML",
            FormatKind::Atom => "Atom",
            FormatKind::BlogML => "BlogML",
            FormatKind::Opml => "OPML",
            FormatKind::Rsd => "RSD",
            FormatKind::Rss => "RSS",
            FormatKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A format name that does not match any concrete [`FormatKind`].
#[derive(Debug, Error)]
#[error("unknown syndication format name: {0:?}")]
pub struct UnknownFormatName(pub String);

impl FromStr for FormatKind {
    type Err = UnknownFormatName;

    /// Case-insensitive. `Unknown` is deliberately not parseable: callers
    /// must name a concrete dialect.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatKind::CONCRETE
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFormatName(s.to_string()))
    }
}

// ============================================================================
// Version Tag
// ============================================================================

/// A dotted `major.minor` version, compared by exact equality only.
///
/// `"0.91"` is `(0, 91)` and `"0.9"` is `(0, 9)`, so the two never compare
/// equal. Leading zeros are numeric, so `"2.00"` equals `"2.0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VersionTag {
    pub major: u16,
    pub minor: u16,
}

impl VersionTag {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Parses exactly two numeric components. Returns `None` for anything
    /// else, including `"2"`, `"2.0.1"` and `" 2.0"`.
    pub fn parse(s: &str) -> Option<Self> {
        let (major, minor) = s.split_once('.')?;
        if !is_digits(major) || !is_digits(minor) {
            return None;
        }
        Some(Self {
            major: major.parse().ok()?,
            minor: minor.parse().ok()?,
        })
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for VersionTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Fingerprint and Adapter Key
// ============================================================================

/// The `(format, version)` pair inferred from a document's root element.
///
/// Fields are private so an [`FormatKind::Unknown`] fingerprint can only be
/// built through [`Fingerprint::unknown`] and never carries a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Fingerprint {
    format: FormatKind,
    version: Option<VersionTag>,
}

impl Fingerprint {
    /// A recognised dialect. `version` is `None` when the version indicator
    /// was missing or unparseable.
    ///
    /// Passing `FormatKind::Unknown` yields [`Fingerprint::unknown`].
    pub fn recognized(format: FormatKind, version: Option<VersionTag>) -> Self {
        if format == FormatKind::Unknown {
            return Self::unknown();
        }
        Self { format, version }
    }

    pub const fn unknown() -> Self {
        Self {
            format: FormatKind::Unknown,
            version: None,
        }
    }

    pub fn format(&self) -> FormatKind {
        self.format
    }

    pub fn version(&self) -> Option<VersionTag> {
        self.version
    }

    /// The registry lookup key, if the fingerprint carries a version.
    pub fn key(&self) -> Option<AdapterKey> {
        self.version.map(|version| AdapterKey {
            format: self.format,
            version,
        })
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(version) => write!(f, "{} {}", self.format, version),
            None => write!(f, "{} (no version)", self.format),
        }
    }
}

/// Registry lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AdapterKey {
    pub format: FormatKind,
    pub version: VersionTag,
}

impl AdapterKey {
    pub const fn new(format: FormatKind, version: VersionTag) -> Self {
        Self { format, version }
    }
}
