/*!
A mutable XML tree for SVG post-processing.

`svgxml` is similar to [`roxmltree`](https://github.com/RazrFalcon/roxmltree),
and even uses it for parsing, but unlike it allows in-place mutation:
attributes can be set and removed, nodes can be detached and namespace
declarations dropped. It exists for pipelines that rewrite an SVG
document and serialize it back, rather than for pipelines that only
read it.

Unlike an SVG-specific tree, element and attribute names are kept as
plain qualified names. Editor namespaces (Inkscape, Illustrator, etc.)
survive parsing and can be stripped selectively.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use std::num::NonZeroU32;

mod parse;
mod write;

pub use roxmltree::{self, Error};
pub use write::{Indent, WriteOptions};

/// The SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// A qualified XML name.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QName {
    /// Namespace prefix, when present.
    pub prefix: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl QName {
    /// Splits a raw `prefix:local` name.
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((prefix, local)) => QName {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => QName {
                prefix: None,
                local: text.to_string(),
            },
        }
    }

    /// Checks the name against its raw `prefix:local` form.
    pub fn is(&self, text: &str) -> bool {
        match (text.split_once(':'), self.prefix.as_deref()) {
            (Some((prefix, local)), Some(p)) => p == prefix && self.local == local,
            (None, None) => self.local == text,
            _ => false,
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.prefix {
            Some(ref prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// An attribute.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Attribute {
    /// Attribute's name.
    pub name: QName,
    /// Attribute's value.
    pub value: String,
}

/// A namespace declaration.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Namespace {
    /// Declared prefix. `None` for the default namespace.
    pub prefix: Option<String>,
    /// Namespace URI.
    pub uri: String,
}

/// A node identifier.
///
/// Stable across mutations: detaching a node never invalidates the
/// identifiers of other nodes. An identifier of a detached node must
/// not be used again.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    #[inline]
    fn new(id: u32) -> Self {
        debug_assert!(id < u32::MAX);

        // We are using `NonZeroU32` to reduce overhead of `Option<NodeId>`.
        NodeId(NonZeroU32::new(id + 1).unwrap())
    }

    #[inline]
    fn get_usize(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(id: usize) -> Self {
        debug_assert!(id <= u32::MAX as usize);
        NodeId::new(id as u32)
    }
}

pub(crate) enum NodeKind {
    Root,
    Element {
        name: QName,
        attributes: Vec<Attribute>,
        namespaces: Vec<Namespace>,
    },
    Text(String),
    Comment(String),
}

pub(crate) struct NodeData {
    parent: Option<NodeId>,
    next_sibling: Option<NodeId>,
    children: Option<(NodeId, NodeId)>,
    kind: NodeKind,
}

/// An XML tree container.
///
/// Nodes live in an arena and are addressed by [`NodeId`].
/// Detached nodes stay in the arena, but are no longer reachable
/// from the root.
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> Node {
        self.get(NodeId::new(0))
    }

    /// Returns the root element.
    ///
    /// A parsed document is guaranteed to have one.
    pub fn root_element(&self) -> Node {
        // `unwrap` is safe, because the parser rejects documents
        // without a root element.
        self.root().first_element_child().unwrap()
    }

    /// Returns a node by its id.
    #[inline]
    pub fn get(&self, id: NodeId) -> Node {
        Node {
            id,
            d: &self.nodes[id.get_usize()],
            doc: self,
        }
    }

    /// Returns an iterator over document's descendant nodes.
    ///
    /// Shorthand for `doc.root().descendants()`.
    #[inline]
    pub fn descendants(&self) -> Descendants {
        self.root().descendants()
    }

    /// Collects ids of descendant nodes matching a predicate, in document order.
    ///
    /// Use this instead of [`Document::descendants`] when the matched
    /// nodes are going to be mutated.
    pub fn select<P: FnMut(Node) -> bool>(&self, mut predicate: P) -> Vec<NodeId> {
        self.descendants()
            .filter(|n| predicate(*n))
            .map(|n| n.id())
            .collect()
    }

    /// Sets an attribute on an element, replacing an existing value.
    ///
    /// Does nothing when the node is not an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let qname = QName::parse(name);
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.get_usize()].kind {
            match attributes.iter_mut().find(|a| a.name == qname) {
                Some(attr) => attr.value = value.to_string(),
                None => attributes.push(Attribute {
                    name: qname,
                    value: value.to_string(),
                }),
            }
        }
    }

    /// Removes an attribute from an element.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.get_usize()].kind {
            attributes.retain(|a| !a.name.is(name));
        }
    }

    /// Removes attributes matching a predicate from an element.
    pub fn retain_attributes<P: FnMut(&Attribute) -> bool>(&mut self, id: NodeId, predicate: P) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[id.get_usize()].kind {
            attributes.retain(predicate);
        }
    }

    /// Detaches a node and its subtree from the tree.
    ///
    /// The nodes stay in the arena and simply become unreachable,
    /// the same way `rctree`-style trees handle removal.
    pub fn detach(&mut self, id: NodeId) {
        let parent_id = match self.nodes[id.get_usize()].parent {
            Some(v) => v,
            None => return, // the root cannot be detached
        };

        let prev = {
            let mut prev = None;
            let mut curr = self.nodes[parent_id.get_usize()].children.map(|(v, _)| v);
            while let Some(curr_id) = curr {
                if curr_id == id {
                    break;
                }
                prev = curr;
                curr = self.nodes[curr_id.get_usize()].next_sibling;
            }
            prev
        };

        let next = self.nodes[id.get_usize()].next_sibling;
        if let Some(prev_id) = prev {
            self.nodes[prev_id.get_usize()].next_sibling = next;
        }

        let children = self.nodes[parent_id.get_usize()].children;
        if let Some((first, last)) = children {
            let new_first = if first == id { next } else { Some(first) };
            let new_last = if last == id { prev } else { Some(last) };
            self.nodes[parent_id.get_usize()].children = match (new_first, new_last) {
                (Some(f), Some(l)) => Some((f, l)),
                _ => None,
            };
        }

        self.nodes[id.get_usize()].parent = None;
        self.nodes[id.get_usize()].next_sibling = None;
    }

    /// Returns all namespace declarations, in document order.
    pub fn namespaces(&self) -> Vec<&Namespace> {
        let mut list = Vec::new();
        for node in self.descendants() {
            list.extend(node.namespaces());
        }
        list
    }

    /// Removes every declaration of a namespace URI.
    ///
    /// Elements and attributes under the removed namespace are left
    /// as-is. Callers that want them gone must detach them first.
    pub fn remove_namespace(&mut self, uri: &str) {
        for node in &mut self.nodes {
            if let NodeKind::Element { namespaces, .. } = &mut node.kind {
                namespaces.retain(|ns| ns.uri != uri);
            }
        }
    }

    /// Removes a single namespace declaration by prefix.
    pub fn remove_namespace_declaration(&mut self, id: NodeId, prefix: Option<&str>) {
        if let NodeKind::Element { namespaces, .. } = &mut self.nodes[id.get_usize()].kind {
            namespaces.retain(|ns| ns.prefix.as_deref() != prefix);
        }
    }

    /// Adds a namespace declaration to an element, unless the same
    /// prefix is already declared there.
    pub fn declare_namespace(&mut self, id: NodeId, prefix: Option<&str>, uri: &str) {
        if let NodeKind::Element { namespaces, .. } = &mut self.nodes[id.get_usize()].kind {
            if namespaces.iter().any(|ns| ns.prefix.as_deref() == prefix) {
                return;
            }

            namespaces.push(Namespace {
                prefix: prefix.map(|s| s.to_string()),
                uri: uri.to_string(),
            });
        }
    }

    /// Renames every element and attribute carrying `prefix` to the
    /// unprefixed form.
    ///
    /// An existing unprefixed attribute with the same local name wins;
    /// the prefixed duplicate is dropped.
    pub fn strip_prefix(&mut self, prefix: &str) {
        for node in &mut self.nodes {
            if let NodeKind::Element {
                name, attributes, ..
            } = &mut node.kind
            {
                if name.prefix.as_deref() == Some(prefix) {
                    name.prefix = None;
                }

                let plain: Vec<String> = attributes
                    .iter()
                    .filter(|a| a.name.prefix.is_none())
                    .map(|a| a.name.local.clone())
                    .collect();
                attributes.retain(|a| {
                    !(a.name.prefix.as_deref() == Some(prefix) && plain.contains(&a.name.local))
                });
                for attr in attributes.iter_mut() {
                    if attr.name.prefix.as_deref() == Some(prefix) {
                        attr.name.prefix = None;
                    }
                }
            }
        }
    }

    pub(crate) fn append(&mut self, parent_id: NodeId, kind: NodeKind) -> NodeId {
        let new_child_id = NodeId::from(self.nodes.len());
        self.nodes.push(NodeData {
            parent: Some(parent_id),
            next_sibling: None,
            children: None,
            kind,
        });

        let last_child_id = self.nodes[parent_id.get_usize()].children.map(|(_, id)| id);
        if let Some(id) = last_child_id {
            self.nodes[id.get_usize()].next_sibling = Some(new_child_id);
        }

        self.nodes[parent_id.get_usize()].children = Some(
            if let Some((first_child_id, _)) = self.nodes[parent_id.get_usize()].children {
                (first_child_id, new_child_id)
            } else {
                (new_child_id, new_child_id)
            },
        );

        new_child_id
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Document({} nodes)", self.nodes.len())
    }
}

/// A read-only node handle.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    id: NodeId,
    doc: &'a Document,
    d: &'a NodeData,
}

impl Eq for Node<'_> {}

impl PartialEq for Node<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.doc, other.doc)
    }
}

impl<'a> Node<'a> {
    /// Returns the node's id.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Checks if the current node is an element.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.d.kind, NodeKind::Element { .. })
    }

    /// Checks if the current node is a text.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.d.kind, NodeKind::Text(_))
    }

    /// Checks if the current node is a comment.
    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self.d.kind, NodeKind::Comment(_))
    }

    /// Returns node's document.
    #[inline]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Returns element's qualified name, unless the current node is not an element.
    #[inline]
    pub fn qname(&self) -> Option<&'a QName> {
        match self.d.kind {
            NodeKind::Element { ref name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns element's local name.
    #[inline]
    pub fn local_name(&self) -> Option<&'a str> {
        self.qname().map(|n| n.local.as_str())
    }

    /// Checks that the element has the given local name and lives in
    /// the SVG namespace.
    ///
    /// An element is considered an SVG one when it has no prefix or
    /// its prefix resolves to the SVG namespace URI.
    pub fn is_svg_element(&self, local: &str) -> bool {
        let name = match self.qname() {
            Some(v) => v,
            None => return false,
        };

        if name.local != local {
            return false;
        }

        match name.prefix.as_deref() {
            None => true,
            Some(prefix) => self.lookup_namespace(Some(prefix)) == Some(SVG_NS),
        }
    }

    /// Resolves a prefix against the namespace declarations in scope.
    pub fn lookup_namespace(&self, prefix: Option<&str>) -> Option<&'a str> {
        for node in self.ancestors() {
            for ns in node.namespaces() {
                if ns.prefix.as_deref() == prefix {
                    return Some(ns.uri.as_str());
                }
            }
        }

        None
    }

    /// Returns an attribute value by its raw `prefix:local` name.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.name.is(name))
            .map(|a| a.value.as_str())
    }

    /// Checks if an attribute is present.
    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Returns a list of all element's attributes.
    #[inline]
    pub fn attributes(&self) -> &'a [Attribute] {
        match self.d.kind {
            NodeKind::Element { ref attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Returns namespace declarations made on this element.
    #[inline]
    pub fn namespaces(&self) -> &'a [Namespace] {
        match self.d.kind {
            NodeKind::Element { ref namespaces, .. } => namespaces,
            _ => &[],
        }
    }

    /// Returns node's text data.
    ///
    /// For text and comment nodes returns the content,
    /// for elements the first text child, if any.
    pub fn text(&self) -> &'a str {
        match self.d.kind {
            NodeKind::Text(ref text) | NodeKind::Comment(ref text) => text,
            NodeKind::Element { .. } => match self.first_child() {
                Some(child) if child.is_text() => child.text(),
                _ => "",
            },
            NodeKind::Root => "",
        }
    }

    /// Returns a parent node.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.d.parent.map(|id| self.doc.get(id))
    }

    /// Returns the parent element.
    #[inline]
    pub fn parent_element(&self) -> Option<Self> {
        self.ancestors().skip(1).find(|n| n.is_element())
    }

    /// Returns the next sibling.
    #[inline]
    pub fn next_sibling(&self) -> Option<Self> {
        self.d.next_sibling.map(|id| self.doc.get(id))
    }

    /// Returns the first child.
    #[inline]
    pub fn first_child(&self) -> Option<Self> {
        self.d.children.map(|(id, _)| self.doc.get(id))
    }

    /// Returns the first child element.
    #[inline]
    pub fn first_element_child(&self) -> Option<Self> {
        self.children().find(|n| n.is_element())
    }

    /// Returns the last child.
    #[inline]
    pub fn last_child(&self) -> Option<Self> {
        self.d.children.map(|(_, id)| self.doc.get(id))
    }

    /// Checks if the node has child nodes.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.d.children.is_some()
    }

    /// Checks if the node has child elements.
    #[inline]
    pub fn has_element_children(&self) -> bool {
        self.children().any(|n| n.is_element())
    }

    /// Returns an iterator over ancestor nodes starting at this node.
    #[inline]
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors(Some(*self))
    }

    /// Returns an iterator over children nodes.
    #[inline]
    pub fn children(&self) -> Children<'a> {
        Children {
            front: self.first_child(),
            back: self.last_child(),
        }
    }

    #[inline]
    fn traverse(&self) -> Traverse<'a> {
        Traverse {
            root: *self,
            edge: None,
        }
    }

    /// Returns an iterator over this node and its descendants.
    #[inline]
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants(self.traverse())
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.d.kind {
            NodeKind::Root => write!(f, "Root"),
            NodeKind::Element { .. } => write!(
                f,
                "Element {{ name: {}, attributes: {:?} }}",
                self.qname().unwrap(),
                self.attributes()
            ),
            NodeKind::Text(ref text) => write!(f, "Text({:?})", text),
            NodeKind::Comment(ref text) => write!(f, "Comment({:?})", text),
        }
    }
}

/// An iterator over ancestor nodes.
#[derive(Clone, Debug)]
pub struct Ancestors<'a>(Option<Node<'a>>);

impl<'a> Iterator for Ancestors<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.0.take();
        self.0 = node.as_ref().and_then(Node::parent);
        node
    }
}

/// An iterator over children nodes.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    front: Option<Node<'a>>,
    back: Option<Node<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front.take();
        if self.front == self.back {
            self.back = None;
        } else {
            self.front = node.as_ref().and_then(Node::next_sibling);
        }
        node
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Edge<'a> {
    Open(Node<'a>),
    Close(Node<'a>),
}

#[derive(Clone, Debug)]
struct Traverse<'a> {
    root: Node<'a>,
    edge: Option<Edge<'a>>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Edge<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.edge {
            Some(Edge::Open(node)) => {
                self.edge = Some(match node.first_child() {
                    Some(first_child) => Edge::Open(first_child),
                    None => Edge::Close(node),
                });
            }
            Some(Edge::Close(node)) => {
                if node == self.root {
                    self.edge = None;
                } else if let Some(next_sibling) = node.next_sibling() {
                    self.edge = Some(Edge::Open(next_sibling));
                } else {
                    self.edge = node.parent().map(Edge::Close);
                }
            }
            None => {
                self.edge = Some(Edge::Open(self.root));
            }
        }

        self.edge
    }
}

/// A descendants iterator.
#[derive(Clone, Debug)]
pub struct Descendants<'a>(Traverse<'a>);

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for edge in &mut self.0 {
            if let Edge::Open(node) = edge {
                return Some(node);
            }
        }

        None
    }
}
