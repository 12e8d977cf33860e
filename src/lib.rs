//! Syndication format detection and loading.
//!
//! Recognises APML, Atom, BlogML, OPML, RSD and RSS documents from their
//! root element, and fills a typed document model with the reader for the
//! exact dialect version found.
//!
//! ```no_run
//! use syndic::formats::rss::RssFeed;
//! use syndic::{fill, FormatKind, LoadSettings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = LoadSettings::default();
//! let doc = roxmltree::Document::parse(r#"<rss version="2.0"><channel/></rss>"#)?;
//! let mut feed = RssFeed::default();
//! fill((&mut feed).into(), FormatKind::Rss, &doc, &settings)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod formats;
pub mod resource;
pub mod syndication;
pub mod xml;

pub use config::{LoadSettings, SettingsError};
pub use resource::{detect, load, load_into, Loaded, ResourceError, SyndicationDocument};
pub use syndication::{
    extract_fingerprint, fill, resolve, AdapterKey, AtomTarget, FillError, Fingerprint, FormatKind,
    ParserVariant, TargetDocument, TargetKind, VersionTag,
};
