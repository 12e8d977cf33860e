//! Root-element fingerprinting.
//!
//! A namespace URI wins over the bare local name: `feed` means Atom only
//! inside one of the Atom namespaces, and an RDF root is RSS only when its
//! `channel` sits in an RSS namespace. Documents in no namespace (or in one
//! we do not recognise) fall back to local-name signatures.

use super::format::{FormatKind, Fingerprint, VersionTag};
use crate::formats::ns;
use crate::xml::nav::attr;
use roxmltree::{Document, Node};

const ATOM_10: VersionTag = VersionTag::new(1, 0);
const ATOM_03: VersionTag = VersionTag::new(0, 3);
const BLOGML_DEFAULT: VersionTag = VersionTag::new(2, 0);
const RSS_10: VersionTag = VersionTag::new(1, 0);
const RSS_090: VersionTag = VersionTag::new(0, 9);

/// Derives the `(format, version)` pair from the document's root element.
///
/// Never fails: a root matching no signature yields
/// [`Fingerprint::unknown`]. Reads only the root and, for RDF, its
/// `channel` child.
pub fn extract_fingerprint(doc: &Document<'_>) -> Fingerprint {
    fingerprint_root(doc.root_element())
}

fn fingerprint_root(root: Node<'_, '_>) -> Fingerprint {
    let name = root.tag_name().name();

    match (root.tag_name().namespace(), name) {
        (Some(ns::ATOM_10), "feed" | "entry") => {
            Fingerprint::recognized(FormatKind::Atom, Some(ATOM_10))
        }
        (Some(ns::ATOM_03), "feed" | "entry") => {
            Fingerprint::recognized(FormatKind::Atom, Some(ATOM_03))
        }
        (Some(ns::APML_06), "APML") => {
            Fingerprint::recognized(FormatKind::Apml, version_attr(root))
        }
        (Some(ns::BLOGML_20), "blog") => Fingerprint::recognized(
            FormatKind::BlogML,
            // Exporters routinely omit the attribute; the namespace is dated
            Some(version_attr(root).unwrap_or(BLOGML_DEFAULT)),
        ),
        (Some(ns::RSD), "rsd") => Fingerprint::recognized(FormatKind::Rsd, version_attr(root)),
        (Some(ns::RDF), "RDF") => Fingerprint::recognized(FormatKind::Rss, rdf_version(root)),
        (Some(ns::ATOM_10 | ns::ATOM_03 | ns::APML_06 | ns::BLOGML_20 | ns::RSD | ns::RDF), _) => {
            Fingerprint::unknown()
        }
        (_, "rss") => Fingerprint::recognized(FormatKind::Rss, version_attr(root)),
        (_, "opml") => Fingerprint::recognized(FormatKind::Opml, version_attr(root)),
        (_, "rsd") => Fingerprint::recognized(FormatKind::Rsd, version_attr(root)),
        (_, "APML") => Fingerprint::recognized(FormatKind::Apml, version_attr(root)),
        _ => Fingerprint::unknown(),
    }
}

fn version_attr(root: Node<'_, '_>) -> Option<VersionTag> {
    attr(root, "version").and_then(|v| VersionTag::parse(&v))
}

/// RSS 1.0 and 0.9 share the RDF envelope and differ only in the namespace
/// of their channel element.
fn rdf_version(root: Node<'_, '_>) -> Option<VersionTag> {
    let channel = root
        .children()
        .find(|c| c.is_element() && c.tag_name().name() == "channel")?;

    match channel.tag_name().namespace() {
        Some(ns::RSS_10) => Some(RSS_10),
        Some(ns::RSS_090) => Some(RSS_090),
        _ => None,
    }
}
