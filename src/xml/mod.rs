//! Raw bytes to a read-only XML document handle, plus navigation helpers.
//!
//! - [`decode`] - Resolve the character encoding and turn bytes into text
//! - [`parse`] - Build a namespace-resolved `roxmltree` document
//! - [`nav`] - Namespace-aware child/attribute lookups used by the parser variants
//!
//! The document handle consumed by the dispatcher is `&roxmltree::Document`.
//! It is immutable and `Sync`, so one parsed document may back several
//! concurrent fills of distinct targets.

mod extension;
mod loader;
pub mod nav;

pub use extension::{collect_children, collect_extensions, ExtensionElement};
pub use loader::{declared_encoding, decode, parse, LoadError};
