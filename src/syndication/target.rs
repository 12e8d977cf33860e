//! Caller-owned documents a fill writes into.

use super::format::FormatKind;
use crate::formats::apml::ApmlDocument;
use crate::formats::atom::{AtomEntry, AtomFeed};
use crate::formats::blogml::BlogMLDocument;
use crate::formats::opml::OpmlDocument;
use crate::formats::rsd::RsdDocument;
use crate::formats::rss::RssFeed;
use serde::Serialize;
use std::fmt;

/// A mutable borrow of exactly one concrete document.
///
/// The borrow gives the caller's exclusion for free: one target can never
/// be filled by two calls at once.
#[derive(Debug)]
pub enum TargetDocument<'a> {
    Apml(&'a mut ApmlDocument),
    Atom(AtomTarget<'a>),
    BlogML(&'a mut BlogMLDocument),
    Opml(&'a mut OpmlDocument),
    Rsd(&'a mut RsdDocument),
    Rss(&'a mut RssFeed),
}

/// Atom documents are either a feed or a standalone entry, and each has
/// its own reader.
#[derive(Debug)]
pub enum AtomTarget<'a> {
    Feed(&'a mut AtomFeed),
    Entry(&'a mut AtomEntry),
}

/// The concrete type behind a [`TargetDocument`], without the borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TargetKind {
    ApmlDocument,
    AtomFeed,
    AtomEntry,
    BlogMLDocument,
    OpmlDocument,
    RsdDocument,
    RssFeed,
}

impl TargetKind {
    pub fn format(self) -> FormatKind {
        match self {
            TargetKind::ApmlDocument => FormatKind::Apml,
            TargetKind::AtomFeed | TargetKind::AtomEntry => FormatKind::Atom,
            TargetKind::BlogMLDocument => FormatKind::BlogML,
            TargetKind::OpmlDocument => FormatKind::Opml,
            TargetKind::RsdDocument => FormatKind::Rsd,
            TargetKind::RssFeed => FormatKind::Rss,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetKind::ApmlDocument => "APML document",
            TargetKind::AtomFeed => "Atom feed",
            TargetKind::AtomEntry => "Atom entry",
            TargetKind::BlogMLDocument => "BlogML document",
            TargetKind::OpmlDocument => "OPML document",
            TargetKind::RsdDocument => "RSD document",
            TargetKind::RssFeed => "RSS feed",
        };
        f.write_str(name)
    }
}

impl TargetDocument<'_> {
    pub fn kind(&self) -> TargetKind {
        match self {
            TargetDocument::Apml(_) => TargetKind::ApmlDocument,
            TargetDocument::Atom(AtomTarget::Feed(_)) => TargetKind::AtomFeed,
            TargetDocument::Atom(AtomTarget::Entry(_)) => TargetKind::AtomEntry,
            TargetDocument::BlogML(_) => TargetKind::BlogMLDocument,
            TargetDocument::Opml(_) => TargetKind::OpmlDocument,
            TargetDocument::Rsd(_) => TargetKind::RsdDocument,
            TargetDocument::Rss(_) => TargetKind::RssFeed,
        }
    }

    /// The format this target belongs to.
    pub fn format(&self) -> FormatKind {
        self.kind().format()
    }
}

macro_rules! impl_from_target {
    ($ty:ty => $arm:path) => {
        impl<'a> From<&'a mut $ty> for TargetDocument<'a> {
            fn from(doc: &'a mut $ty) -> Self {
                $arm(doc)
            }
        }
    };
}

impl_from_target!(ApmlDocument => TargetDocument::Apml);
impl_from_target!(BlogMLDocument => TargetDocument::BlogML);
impl_from_target!(OpmlDocument => TargetDocument::Opml);
impl_from_target!(RsdDocument => TargetDocument::Rsd);
impl_from_target!(RssFeed => TargetDocument::Rss);

impl<'a> From<&'a mut AtomFeed> for TargetDocument<'a> {
    fn from(feed: &'a mut AtomFeed) -> Self {
        TargetDocument::Atom(AtomTarget::Feed(feed))
    }
}

impl<'a> From<&'a mut AtomEntry> for TargetDocument<'a> {
    fn from(entry: &'a mut AtomEntry) -> Self {
        TargetDocument::Atom(AtomTarget::Entry(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_format() {
        let mut feed = AtomFeed::default();
        let mut entry = AtomEntry::default();
        let mut rss = RssFeed::default();

        assert_eq!(TargetDocument::from(&mut feed).kind(), TargetKind::AtomFeed);
        assert_eq!(TargetDocument::from(&mut entry).kind(), TargetKind::AtomEntry);
        assert_eq!(TargetDocument::from(&mut entry).format(), FormatKind::Atom);
        assert_eq!(TargetDocument::from(&mut rss).format(), FormatKind::Rss);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TargetKind::AtomEntry.to_string(), "Atom entry");
        assert_eq!(TargetKind::OpmlDocument.format(), FormatKind::Opml);
    }
}
