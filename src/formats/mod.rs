//! Document models and the per-version parser variants that fill them.
//!
//! Each submodule owns one dialect: its document types and one `parse_*`
//! function per supported version. Variants never touch the caller's
//! target directly: they return a fresh document, which the dispatcher
//! assigns only on success.
//!
//! - [`apml`] - APML 0.6
//! - [`atom`] - Atom 0.3 and 1.0, feeds and entries
//! - [`blogml`] - BlogML 2.0
//! - [`opml`] - OPML 1.0, 1.1 and 2.0
//! - [`rsd`] - RSD 0.6 and 1.0
//! - [`rss`] - RSS 0.9, 0.91, 0.92, 1.0 and 2.0

pub mod apml;
pub mod atom;
pub mod blogml;
pub mod opml;
pub mod rsd;
pub mod rss;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use thiserror::Error;
use url::Url;

/// Namespace URIs that identify dialects and versions.
pub mod ns {
    pub const ATOM_10: &str = "http://www.w3.org/2005/Atom";
    pub const ATOM_03: &str = "http://purl.org/atom/ns#";
    pub const APML_06: &str = "http://www.apml.org/apml-0.6";
    pub const BLOGML_20: &str = "http://www.blogml.com/2006/09/BlogML";
    pub const RSD: &str = "http://archipelago.phrasewise.com/rsd";
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RSS_10: &str = "http://purl.org/rss/1.0/";
    pub const RSS_090: &str = "http://my.netscape.com/rdf/simple/0.9/";
    pub const DUBLIN_CORE: &str = "http://purl.org/dc/elements/1.1/";
    /// Bound to the `xml:` prefix in every document.
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Errors raised by a parser variant. The caller's target is never touched
/// when one of these is returned.
#[derive(Debug, Error)]
pub enum VariantError {
    /// The root element is not the one this entry point reads.
    #[error("expected root element <{expected}>, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    /// A structurally required element is absent.
    #[error("required element <{0}> is missing")]
    MissingElement(&'static str),

    /// SEC-003: Outline nesting exceeds the safety limit.
    #[error("nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

/// Check the root element's local name, returning `UnexpectedRoot` otherwise.
pub(crate) fn expect_root(
    root: roxmltree::Node<'_, '_>,
    expected: &'static str,
) -> Result<(), VariantError> {
    let found = root.tag_name().name();
    if found == expected {
        Ok(())
    } else {
        Err(VariantError::UnexpectedRoot {
            expected,
            found: found.to_string(),
        })
    }
}

/// Parses the date formats syndication documents use in practice:
/// RFC 822/2822 (RSS, OPML), RFC 3339 (Atom, APML, BlogML), offset-less
/// `YYYY-MM-DDTHH:MM:SS` timestamps and bare `YYYY-MM-DD` dates. Values
/// without an offset are taken as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(midnight.and_utc().fixed_offset());
    }

    tracing::debug!(value, "Unrecognised date format");
    None
}

/// Parses an optional absolute URL. Unparseable values are dropped with a
/// warning rather than failing the whole document.
pub fn parse_url(value: Option<String>, field: &'static str) -> Option<Url> {
    parse_url_with_base(value, None, field)
}

/// Like [`parse_url`], but relative references are resolved against `base`
/// when one is known.
pub fn parse_url_with_base(
    value: Option<String>,
    base: Option<&Url>,
    field: &'static str,
) -> Option<Url> {
    let value = value?;
    let parsed = match base {
        Some(base) => base.join(&value),
        None => Url::parse(&value),
    };
    match parsed {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!(field, value = %value, error = %e, "Ignoring unparseable URL");
            None
        }
    }
}

/// The `xml:base` in effect at `node`: every `xml:base` from the root down
/// to `node`, each resolved against the one above it. Values that do not
/// resolve are skipped.
pub fn xml_base(node: roxmltree::Node<'_, '_>) -> Option<Url> {
    let mut declared: Vec<&str> = node
        .ancestors()
        .filter_map(|n| n.attribute((ns::XML, "base")))
        .collect();
    declared.reverse();

    declared.into_iter().fold(None, |base, value| {
        let resolved = match &base {
            Some(base) => base.join(value),
            None => Url::parse(value),
        };
        resolved.ok().or(base)
    })
}
