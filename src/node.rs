use std::collections::BTreeMap;
use std::fmt::Display;

use crate::{KdlDocument, KdlValue, PrintConfig};

/// A KDL node: a name, an optional type annotation, ordered arguments,
/// keyed properties, and an optional children document.
///
/// # Examples
///
/// ```rust
/// use kdlv1::KdlNode;
///
/// let mut node = KdlNode::new("server");
/// node.push("0.0.0.0");
/// node.insert("port", 8080);
/// assert_eq!(node.to_string(), "server \"0.0.0.0\" port=8080\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KdlNode {
    pub(crate) name: String,
    pub(crate) ty: Option<String>,
    pub(crate) args: Vec<KdlValue>,
    pub(crate) props: BTreeMap<String, KdlValue>,
    pub(crate) children: Option<KdlDocument>,
}

impl KdlNode {
    /// Creates a new node with the given name and nothing else.
    pub fn new(name: impl Into<String>) -> Self {
        KdlNode {
            name: name.into(),
            ty: None,
            args: Vec::new(),
            props: BTreeMap::new(),
            children: None,
        }
    }

    /// Gets this node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets this node's name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Gets this node's type annotation, if any.
    pub fn ty(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    /// Sets this node's type annotation.
    pub fn set_ty(&mut self, ty: impl Into<String>) {
        self.ty = Some(ty.into());
    }

    /// Returns this node's arguments, in source order.
    pub fn args(&self) -> &[KdlValue] {
        &self.args
    }

    /// Returns a mutable reference to this node's arguments.
    pub fn args_mut(&mut self) -> &mut Vec<KdlValue> {
        &mut self.args
    }

    /// Appends an argument.
    pub fn push(&mut self, value: impl Into<KdlValue>) {
        self.args.push(value.into());
    }

    /// Gets the argument at `index`, if present.
    pub fn get_arg(&self, index: usize) -> Option<&KdlValue> {
        self.args.get(index)
    }

    /// Returns this node's properties, keyed by name.
    pub fn props(&self) -> &BTreeMap<String, KdlValue> {
        &self.props
    }

    /// Returns a mutable reference to this node's properties.
    pub fn props_mut(&mut self) -> &mut BTreeMap<String, KdlValue> {
        &mut self.props
    }

    /// Sets a property. An existing value under the same key is replaced,
    /// mirroring how duplicate keys behave in source text.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<KdlValue>) {
        self.props.insert(key.into(), value.into());
    }

    /// Gets the value of the property `key`, if present.
    pub fn get_prop(&self, key: &str) -> Option<&KdlValue> {
        self.props.get(key)
    }

    /// Returns this node's children document, if it has one.
    pub fn children(&self) -> Option<&KdlDocument> {
        self.children.as_ref()
    }

    /// Returns a mutable reference to this node's children document.
    pub fn children_mut(&mut self) -> Option<&mut KdlDocument> {
        self.children.as_mut()
    }

    /// Sets this node's children document.
    pub fn set_children(&mut self, children: KdlDocument) {
        self.children = Some(children);
    }

    /// Returns a mutable reference to this node's children, creating an
    /// empty document first if there is none.
    pub fn ensure_children(&mut self) -> &mut KdlDocument {
        self.children.get_or_insert_with(KdlDocument::new)
    }
}

impl Display for KdlNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::fmt::write_node(f, self, 0, &PrintConfig::default())
    }
}
