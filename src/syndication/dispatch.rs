//! The `fill` entry point: fingerprint, check, resolve, run.

use super::fingerprint::extract_fingerprint;
use super::format::{FormatKind, VersionTag};
use super::registry::{resolve, ParserVariant};
use super::target::{AtomTarget, TargetDocument, TargetKind};
use crate::config::LoadSettings;
use crate::formats::{apml, atom, blogml, opml, rsd, rss, VariantError};
use roxmltree::{Document, Node};
use thiserror::Error;

/// Why a fill did not happen. The target is left exactly as supplied on
/// every one of these.
#[derive(Debug, Error)]
pub enum FillError {
    /// The caller must name a concrete dialect.
    #[error("Expected format must be a concrete dialect, not Unknown")]
    InvalidExpectedFormat,

    /// The document is not in the dialect the caller asked for.
    #[error("Format mismatch: expected {expected}, document is {detected}")]
    FormatMismatch {
        expected: FormatKind,
        detected: FormatKind,
    },

    /// The target document does not belong to the expected dialect.
    #[error("{target} cannot be filled as {expected}")]
    InvalidTargetVariant {
        expected: FormatKind,
        target: TargetKind,
    },

    /// The dialect is recognised but no reader exists for its version.
    #[error("Unsupported {format} version: {}", version_label(.version))]
    UnsupportedVersion {
        format: FormatKind,
        version: Option<VersionTag>,
    },

    /// The reader rejected the document's structure.
    #[error("{variant} reader failed: {source}")]
    Malformed {
        variant: ParserVariant,
        #[source]
        source: VariantError,
    },
}

fn version_label(version: &Option<VersionTag>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "missing or unparseable".to_string(),
    }
}

/// Fills `target` from `doc`, which must be a document of `expected`'s
/// dialect.
///
/// Checks run in order: `expected` is concrete, `target` belongs to
/// `expected`, the document's fingerprint matches `expected`, and a reader
/// exists for its version. Only then does the reader run. Readers build a
/// fresh document that replaces `*target` on success, so a failed call
/// never leaves a partial fill behind and repeating a call is idempotent.
///
/// Returns the variant that ran.
pub fn fill(
    target: TargetDocument<'_>,
    expected: FormatKind,
    doc: &Document<'_>,
    settings: &LoadSettings,
) -> Result<ParserVariant, FillError> {
    if expected == FormatKind::Unknown {
        return Err(FillError::InvalidExpectedFormat);
    }

    let target_kind = target.kind();
    if target_kind.format() != expected {
        return Err(FillError::InvalidTargetVariant {
            expected,
            target: target_kind,
        });
    }

    let fingerprint = extract_fingerprint(doc);
    if fingerprint.format() != expected {
        tracing::debug!(%expected, detected = %fingerprint.format(), "Format mismatch");
        return Err(FillError::FormatMismatch {
            expected,
            detected: fingerprint.format(),
        });
    }

    let Some(variant) = fingerprint.key().and_then(resolve) else {
        tracing::debug!(%fingerprint, "No reader for this version");
        return Err(FillError::UnsupportedVersion {
            format: fingerprint.format(),
            version: fingerprint.version(),
        });
    };

    tracing::debug!(%variant, target = %target_kind, "Dispatching");
    run_variant(variant, target, doc.root_element(), settings)?;
    Ok(variant)
}

fn run_variant(
    variant: ParserVariant,
    target: TargetDocument<'_>,
    root: Node<'_, '_>,
    settings: &LoadSettings,
) -> Result<(), FillError> {
    use ParserVariant as V;

    let wrong_target = |target: TargetKind| FillError::InvalidTargetVariant {
        expected: variant.format(),
        target,
    };
    let malformed = |source: VariantError| FillError::Malformed { variant, source };

    match target {
        TargetDocument::Apml(doc) => {
            let parsed = match variant {
                V::Apml06 => apml::parse_apml_06(root, settings),
                _ => return Err(wrong_target(TargetKind::ApmlDocument)),
            };
            *doc = parsed.map_err(malformed)?;
        }
        TargetDocument::Atom(AtomTarget::Feed(feed)) => {
            let parsed = match variant {
                V::Atom03 => atom::parse_atom_03_feed(root, settings),
                V::Atom10 => atom::parse_atom_10_feed(root, settings),
                _ => return Err(wrong_target(TargetKind::AtomFeed)),
            };
            *feed = parsed.map_err(malformed)?;
        }
        TargetDocument::Atom(AtomTarget::Entry(entry)) => {
            let parsed = match variant {
                V::Atom03 => atom::parse_atom_03_entry(root, settings),
                V::Atom10 => atom::parse_atom_10_entry(root, settings),
                _ => return Err(wrong_target(TargetKind::AtomEntry)),
            };
            *entry = parsed.map_err(malformed)?;
        }
        TargetDocument::BlogML(doc) => {
            let parsed = match variant {
                V::BlogML20 => blogml::parse_blogml_20(root, settings),
                _ => return Err(wrong_target(TargetKind::BlogMLDocument)),
            };
            *doc = parsed.map_err(malformed)?;
        }
        TargetDocument::Opml(doc) => {
            let parsed = match variant {
                V::Opml => opml::parse_opml(root, settings),
                _ => return Err(wrong_target(TargetKind::OpmlDocument)),
            };
            *doc = parsed.map_err(malformed)?;
        }
        TargetDocument::Rsd(doc) => {
            let parsed = match variant {
                V::Rsd06 => rsd::parse_rsd_06(root, settings),
                V::Rsd10 => rsd::parse_rsd_10(root, settings),
                _ => return Err(wrong_target(TargetKind::RsdDocument)),
            };
            *doc = parsed.map_err(malformed)?;
        }
        TargetDocument::Rss(feed) => {
            let parsed = match variant {
                V::Rss090 => rss::parse_rss_090(root, settings),
                V::Rss091 => rss::parse_rss_091(root, settings),
                V::Rss092 => rss::parse_rss_092(root, settings),
                V::Rss10 => rss::parse_rss_10(root, settings),
                V::Rss20 => rss::parse_rss_20(root, settings),
                _ => return Err(wrong_target(TargetKind::RssFeed)),
            };
            *feed = parsed.map_err(malformed)?;
        }
    }

    Ok(())
}
