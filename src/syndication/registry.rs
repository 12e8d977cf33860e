//! The fixed `(format, version)` → parser variant table.
//!
//! Expressed as a literal match so the compiler checks it and there is no
//! table to build or lock. Lookup is exact: `(RSS, 2.0)` never falls back
//! to `(RSS, 0.92)`.

use super::format::{AdapterKey, FormatKind, VersionTag};
use serde::Serialize;
use std::fmt;

/// One parser routine per supported dialect version.
///
/// OPML 1.0, 1.1 and 2.0 share a single reader: later versions only add
/// optional head elements and outline attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParserVariant {
    Apml06,
    Atom03,
    Atom10,
    BlogML20,
    Opml,
    Rsd06,
    Rsd10,
    Rss090,
    Rss091,
    Rss092,
    Rss10,
    Rss20,
}

impl ParserVariant {
    pub const ALL: [ParserVariant; 12] = [
        ParserVariant::Apml06,
        ParserVariant::Atom03,
        ParserVariant::Atom10,
        ParserVariant::BlogML20,
        ParserVariant::Opml,
        ParserVariant::Rsd06,
        ParserVariant::Rsd10,
        ParserVariant::Rss090,
        ParserVariant::Rss091,
        ParserVariant::Rss092,
        ParserVariant::Rss10,
        ParserVariant::Rss20,
    ];

    /// The dialect this variant reads.
    pub fn format(self) -> FormatKind {
        match self {
            ParserVariant::Apml06 => FormatKind::Apml,
            ParserVariant::Atom03 | ParserVariant::Atom10 => FormatKind::Atom,
            ParserVariant::BlogML20 => FormatKind::BlogML,
            ParserVariant::Opml => FormatKind::Opml,
            ParserVariant::Rsd06 | ParserVariant::Rsd10 => FormatKind::Rsd,
            ParserVariant::Rss090
            | ParserVariant::Rss091
            | ParserVariant::Rss092
            | ParserVariant::Rss10
            | ParserVariant::Rss20 => FormatKind::Rss,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParserVariant::Apml06 => "APML 0.6",
            ParserVariant::Atom03 => "Atom 0.3",
            ParserVariant::Atom10 => "Atom 1.0",
            ParserVariant::BlogML20 => "BlogML 2.0",
            ParserVariant::Opml => "OPML",
            ParserVariant::Rsd06 => "RSD 0.6",
            ParserVariant::Rsd10 => "RSD 1.0",
            ParserVariant::Rss090 => "RSS 0.9",
            ParserVariant::Rss091 => "RSS 0.91",
            ParserVariant::Rss092 => "RSS 0.92",
            ParserVariant::Rss10 => "RSS 1.0",
            ParserVariant::Rss20 => "RSS 2.0",
        }
    }
}

impl fmt::Display for ParserVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every supported `(format, version)` pair.
pub const SUPPORTED: [AdapterKey; 14] = [
    AdapterKey::new(FormatKind::Apml, VersionTag::new(0, 6)),
    AdapterKey::new(FormatKind::Atom, VersionTag::new(0, 3)),
    AdapterKey::new(FormatKind::Atom, VersionTag::new(1, 0)),
    AdapterKey::new(FormatKind::BlogML, VersionTag::new(2, 0)),
    AdapterKey::new(FormatKind::Opml, VersionTag::new(1, 0)),
    AdapterKey::new(FormatKind::Opml, VersionTag::new(1, 1)),
    AdapterKey::new(FormatKind::Opml, VersionTag::new(2, 0)),
    AdapterKey::new(FormatKind::Rsd, VersionTag::new(0, 6)),
    AdapterKey::new(FormatKind::Rsd, VersionTag::new(1, 0)),
    AdapterKey::new(FormatKind::Rss, VersionTag::new(0, 9)),
    AdapterKey::new(FormatKind::Rss, VersionTag::new(0, 91)),
    AdapterKey::new(FormatKind::Rss, VersionTag::new(0, 92)),
    AdapterKey::new(FormatKind::Rss, VersionTag::new(1, 0)),
    AdapterKey::new(FormatKind::Rss, VersionTag::new(2, 0)),
];

/// Looks up the parser variant for an exact `(format, version)` pair.
///
/// `None` means the format is known but the version is not supported (or
/// the format is `Unknown`); the dispatcher reports the two differently.
pub fn resolve(key: AdapterKey) -> Option<ParserVariant> {
    use FormatKind::*;

    let VersionTag { major, minor } = key.version;
    let variant = match (key.format, major, minor) {
        (Apml, 0, 6) => ParserVariant::Apml06,
        (Atom, 0, 3) => ParserVariant::Atom03,
        (Atom, 1, 0) => ParserVariant::Atom10,
        (BlogML, 2, 0) => ParserVariant::BlogML20,
        (Opml, 1, 0) | (Opml, 1, 1) | (Opml, 2, 0) => ParserVariant::Opml,
        (Rsd, 0, 6) => ParserVariant::Rsd06,
        (Rsd, 1, 0) => ParserVariant::Rsd10,
        (Rss, 0, 9) => ParserVariant::Rss090,
        (Rss, 0, 91) => ParserVariant::Rss091,
        (Rss, 0, 92) => ParserVariant::Rss092,
        (Rss, 1, 0) => ParserVariant::Rss10,
        (Rss, 2, 0) => ParserVariant::Rss20,
        _ => return None,
    };
    Some(variant)
}

/// Supported versions of one format, in table order.
pub fn supported_versions(format: FormatKind) -> impl Iterator<Item = VersionTag> {
    SUPPORTED
        .into_iter()
        .filter(move |key| key.format == format)
        .map(|key| key.version)
}
