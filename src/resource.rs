//! Bytes in, filled document out.
//!
//! The loading pipeline around [`fill`]: decode the bytes, build the
//! document handle, then dispatch. Callers that already hold a parsed
//! `roxmltree::Document` call [`fill`] directly.

use crate::config::LoadSettings;
use crate::formats::apml::ApmlDocument;
use crate::formats::atom::{AtomEntry, AtomFeed};
use crate::formats::blogml::BlogMLDocument;
use crate::formats::opml::OpmlDocument;
use crate::formats::rsd::RsdDocument;
use crate::formats::rss::RssFeed;
use crate::syndication::{
    extract_fingerprint, fill, AtomTarget, FillError, Fingerprint, FormatKind, ParserVariant,
    TargetDocument,
};
use crate::xml::{self, LoadError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Fill(#[from] FillError),

    /// No expected format was given and the root matches no dialect.
    #[error("Unrecognised document: root element <{root}> matches no supported format")]
    Unrecognized { root: String },
}

/// An owned document of any supported dialect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "document", rename_all = "snake_case")]
pub enum SyndicationDocument {
    Apml(ApmlDocument),
    AtomFeed(AtomFeed),
    AtomEntry(AtomEntry),
    #[serde(rename = "blogml")]
    BlogML(BlogMLDocument),
    Opml(OpmlDocument),
    Rsd(RsdDocument),
    Rss(RssFeed),
}

impl SyndicationDocument {
    /// An empty document of `format`. Atom picks entry or feed from the
    /// root element's local name.
    fn empty(format: FormatKind, root_name: &str) -> Option<Self> {
        let doc = match format {
            FormatKind::Apml => Self::Apml(ApmlDocument::default()),
            FormatKind::Atom if root_name == "entry" => Self::AtomEntry(AtomEntry::default()),
            FormatKind::Atom => Self::AtomFeed(AtomFeed::default()),
            FormatKind::BlogML => Self::BlogML(BlogMLDocument::default()),
            FormatKind::Opml => Self::Opml(OpmlDocument::default()),
            FormatKind::Rsd => Self::Rsd(RsdDocument::default()),
            FormatKind::Rss => Self::Rss(RssFeed::default()),
            FormatKind::Unknown => return None,
        };
        Some(doc)
    }

    pub fn as_target(&mut self) -> TargetDocument<'_> {
        match self {
            Self::Apml(doc) => TargetDocument::Apml(doc),
            Self::AtomFeed(feed) => TargetDocument::Atom(AtomTarget::Feed(feed)),
            Self::AtomEntry(entry) => TargetDocument::Atom(AtomTarget::Entry(entry)),
            Self::BlogML(doc) => TargetDocument::BlogML(doc),
            Self::Opml(doc) => TargetDocument::Opml(doc),
            Self::Rsd(doc) => TargetDocument::Rsd(doc),
            Self::Rss(feed) => TargetDocument::Rss(feed),
        }
    }
}

/// The outcome of [`load`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loaded {
    pub fingerprint: Fingerprint,
    pub variant: ParserVariant,
    #[serde(flatten)]
    pub document: SyndicationDocument,
}

/// Decodes and parses `bytes`, then reports the fingerprint.
pub fn detect(bytes: &[u8], settings: &LoadSettings) -> Result<Fingerprint, ResourceError> {
    let text = xml::decode(bytes, settings)?;
    let doc = xml::parse(&text, settings)?;
    Ok(extract_fingerprint(&doc))
}

/// Fills a caller-owned `target` from raw bytes.
pub fn load_into(
    target: TargetDocument<'_>,
    expected: FormatKind,
    bytes: &[u8],
    settings: &LoadSettings,
) -> Result<ParserVariant, ResourceError> {
    let text = xml::decode(bytes, settings)?;
    let doc = xml::parse(&text, settings)?;
    Ok(fill(target, expected, &doc, settings)?)
}

/// Loads `bytes` into a fresh document.
///
/// With `expected` set this is a strict load of that dialect. Without it,
/// the detected format is used, and a document matching no dialect is
/// [`ResourceError::Unrecognized`].
pub fn load(
    bytes: &[u8],
    expected: Option<FormatKind>,
    settings: &LoadSettings,
) -> Result<Loaded, ResourceError> {
    let text = xml::decode(bytes, settings)?;
    let doc = xml::parse(&text, settings)?;
    let fingerprint = extract_fingerprint(&doc);
    let root_name = doc.root_element().tag_name().name();

    let format = match expected {
        Some(format) => format,
        None if fingerprint.format() == FormatKind::Unknown => {
            return Err(ResourceError::Unrecognized {
                root: root_name.to_string(),
            });
        }
        None => fingerprint.format(),
    };

    let mut document =
        SyndicationDocument::empty(format, root_name).ok_or(FillError::InvalidExpectedFormat)?;
    let variant = fill(document.as_target(), format, &doc, settings)?;

    Ok(Loaded {
        fingerprint,
        variant,
        document,
    })
}
