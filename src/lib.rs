//! `kdlv1` is a document-oriented parser and printer for version 1.x of
//! the [KDL Document Language](https://kdl.dev), a node-based,
//! human-friendly configuration and serialization format.
//!
//! Parsing produces a tree of [`KdlNode`]s holding [`KdlValue`]s; printing
//! walks that tree back out to a canonical textual form under a
//! configurable [`PrintConfig`]. Comments and original whitespace are not
//! preserved: a parse/print round trip normalizes the document.
//!
//! ## Example
//!
//! ```rust
//! use kdlv1::KdlDocument;
//!
//! let doc: KdlDocument = r#"
//! // Two ports, one of them slashdashed out.
//! listen 8080 /- 9090 proto="tcp"
//! limits z=0x10 a=25
//! "#
//! .parse()?;
//!
//! assert_eq!(
//!     doc.iter_args("listen").collect::<Vec<_>>(),
//!     vec![&8080.into()]
//! );
//! assert_eq!(
//!     doc.get("listen").and_then(|node| node.get_prop("proto")),
//!     Some(&"tcp".into())
//! );
//!
//! // Printing is canonicalizing: comments gone, properties sorted,
//! // radixes kept.
//! assert_eq!(
//!     doc.to_string(),
//!     "listen 8080 proto=\"tcp\"\nlimits a=25 z=0x10\n"
//! );
//! # Ok::<(), kdlv1::KdlError>(())
//! ```
//!
//! ## Printing
//!
//! [`KdlDocument::to_kdl`] takes a [`PrintConfig`]; two presets are
//! provided, [`PrintConfig::pretty_default`] and
//! [`PrintConfig::raw_default`], and every knob is settable through
//! [`PrintConfig::builder`].
//!
//! ## Error Reporting
//!
//! [`KdlError`] implements [`miette::Diagnostic`] and carries a snapshot
//! of the offending line:
//!
//! ```no_run
//! fn main() -> miette::Result<()> {
//!     "retry 1.".parse::<kdlv1::KdlDocument>()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Minimum Supported Rust Version
//!
//! You must be at least `1.70.0` tall to get on this ride.
//!
//! ## License
//!
//! The code in this repository is covered by [the Apache-2.0
//! License](LICENSE).

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub use document::*;
pub use error::*;
pub use node::*;
pub use reader::{CharSource, ReadSource, StrSource};
pub use value::*;

pub use fmt::{PrintConfig, PrintConfigBuilder};

mod chars;
mod document;
mod error;
mod fmt;
mod node;
mod parser;
mod reader;
mod value;
