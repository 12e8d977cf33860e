//! Dialect detection and dispatch.
//!
//! - [`format`] - Format kinds, version tags and fingerprints
//! - [`fingerprint`] - Derive a fingerprint from a document's root element
//! - [`registry`] - Map `(format, version)` to a parser variant
//! - [`target`] - The caller's document, as a sum over concrete types
//! - [`dispatch`] - The `fill` entry point tying the above together
//!
//! Everything here is synchronous and holds no state between calls.

pub mod dispatch;
pub mod fingerprint;
pub mod format;
pub mod registry;
pub mod target;

pub use dispatch::{fill, FillError};
pub use fingerprint::extract_fingerprint;
pub use format::{AdapterKey, Fingerprint, FormatKind, UnknownFormatName, VersionTag};
pub use registry::{resolve, supported_versions, ParserVariant, SUPPORTED};
pub use target::{AtomTarget, TargetDocument, TargetKind};
