use std::fmt::Display;
use std::io::Read;
use std::str::FromStr;

use crate::reader::{CharSource, ParseContext, ReadSource, StrSource};
use crate::{KdlError, KdlNode, KdlValue, PrintConfig};

/// An ordered sequence of [`KdlNode`]s. Also used for a node's children
/// block.
///
/// # Examples
///
/// The easiest way to create a `KdlDocument` is to parse it:
/// ```rust
/// # use kdlv1::KdlDocument;
/// let doc: KdlDocument = "foo 1 2 3\nbar 4 5 6".parse().expect("parse failed");
/// assert_eq!(doc.nodes().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KdlDocument {
    pub(crate) nodes: Vec<KdlNode>,
}

impl KdlDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Default::default()
    }

    /// Parses a string into a document.
    pub fn parse(input: &str) -> Result<Self, KdlError> {
        Self::parse_from(StrSource::new(input))
    }

    /// Parses a document from any [`CharSource`].
    ///
    /// This is the toplevel entry point: on any failure the parse context
    /// is invalidated, its location snapshot is attached to the error, and
    /// the error is returned. A parse either yields a complete document or
    /// nothing.
    pub fn parse_from<S: CharSource>(source: S) -> Result<Self, KdlError> {
        let mut ctx = ParseContext::new(source);
        match crate::parser::document(&mut ctx, true) {
            Ok(doc) => Ok(doc),
            Err(kind) => {
                let location = ctx.error_location().unwrap_or_default();
                Err(KdlError { kind, location })
            }
        }
    }

    /// Parses a document from a byte reader, decoding UTF-8 incrementally.
    pub fn parse_reader<R: Read>(reader: R) -> Result<Self, KdlError> {
        Self::parse_from(ReadSource::new(reader))
    }

    /// Gets the first node with a matching name.
    pub fn get(&self, name: &str) -> Option<&KdlNode> {
        self.nodes.iter().find(move |n| n.name() == name)
    }

    /// Gets a mutable reference to the first node with a matching name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut KdlNode> {
        self.nodes.iter_mut().find(move |n| n.name() == name)
    }

    /// Gets the first argument of the first node with a matching name.
    /// This is a shorthand for documents used as key/value stores.
    ///
    /// ```rust
    /// # use kdlv1::{KdlDocument, KdlValue};
    /// # let doc: KdlDocument = "foo 1\nbar false".parse().unwrap();
    /// assert_eq!(doc.get_arg("foo"), Some(&1.into()));
    /// ```
    pub fn get_arg(&self, name: &str) -> Option<&KdlValue> {
        self.get(name).and_then(|node| node.get_arg(0))
    }

    /// Returns an iterator over all arguments of the first node with a
    /// matching name, or an empty iterator if there is no such node.
    pub fn iter_args(&self, name: &str) -> impl Iterator<Item = &KdlValue> {
        self.get(name)
            .map(|n| n.args())
            .unwrap_or_default()
            .iter()
    }

    /// Returns a reference to this document's nodes.
    pub fn nodes(&self) -> &[KdlNode] {
        &self.nodes
    }

    /// Returns a mutable reference to this document's nodes.
    pub fn nodes_mut(&mut self) -> &mut Vec<KdlNode> {
        &mut self.nodes
    }

    /// Returns `true` if this document has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serializes this document under the given configuration.
    pub fn to_kdl(&self, config: &PrintConfig) -> String {
        let mut out = String::new();
        self.write_kdl(&mut out, config)
            .expect("writing to a String cannot fail");
        out
    }

    /// Serializes this document into any [`std::fmt::Write`] sink.
    pub fn write_kdl<W: std::fmt::Write>(
        &self,
        sink: &mut W,
        config: &PrintConfig,
    ) -> std::fmt::Result {
        crate::fmt::write_document(sink, self, 0, config)
    }
}

impl FromStr for KdlDocument {
    type Err = KdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KdlDocument::parse(s)
    }
}

impl Display for KdlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::fmt::write_document(f, self, 0, &PrintConfig::default())
    }
}

impl IntoIterator for KdlDocument {
    type Item = KdlNode;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
