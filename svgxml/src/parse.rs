use crate::{Document, Namespace, NodeData, NodeId, NodeKind, QName};

use roxmltree::Error;

const XML_NAMESPACE_NS: &str = "http://www.w3.org/XML/1998/namespace";

impl Document {
    /// Parses a [`Document`] from a string.
    pub fn parse_str(text: &str) -> Result<Document, Error> {
        let xml = roxmltree::Document::parse(text)?;
        parse(&xml)
    }
}

fn parse(xml: &roxmltree::Document) -> Result<Document, Error> {
    let mut doc = Document { nodes: Vec::new() };

    // Add a root node.
    doc.nodes.push(NodeData {
        parent: None,
        next_sibling: None,
        children: None,
        kind: NodeKind::Root,
    });

    let root_id = NodeId::from(0usize);
    parse_xml_node_children(xml.root(), root_id, &mut doc)?;

    Ok(doc)
}

fn parse_xml_node_children(
    parent: roxmltree::Node,
    parent_id: NodeId,
    doc: &mut Document,
) -> Result<(), Error> {
    for node in parent.children() {
        parse_xml_node(node, parent_id, doc)?;
    }

    Ok(())
}

fn parse_xml_node(
    node: roxmltree::Node,
    parent_id: NodeId,
    doc: &mut Document,
) -> Result<(), Error> {
    if doc.nodes.len() > 1_000_000 {
        return Err(Error::NodesLimitReached);
    }

    if node.is_element() {
        let kind = NodeKind::Element {
            name: element_name(node),
            attributes: attributes(node),
            namespaces: declarations(node),
        };
        let node_id = doc.append(parent_id, kind);
        parse_xml_node_children(node, node_id, doc)?;
    } else if node.is_text() {
        // Inter-element whitespace carries no meaning for an SVG
        // document and would break serialization stability,
        // so it is dropped.
        let text = node.text().unwrap_or("");
        if !text.trim().is_empty() {
            doc.append(parent_id, NodeKind::Text(text.to_string()));
        }
    } else if node.is_comment() {
        let text = node.text().unwrap_or("");
        doc.append(parent_id, NodeKind::Comment(text.to_string()));
    } else if node.is_pi() {
        // The doctype never gets here, roxmltree consumes it.
        log::warn!("a processing instruction was dropped");
    }

    Ok(())
}

fn element_name(node: roxmltree::Node) -> QName {
    QName {
        prefix: prefix_for(node, node.tag_name().namespace(), true),
        local: node.tag_name().name().to_string(),
    }
}

fn attributes(node: roxmltree::Node) -> Vec<crate::Attribute> {
    node.attributes()
        .map(|attr| crate::Attribute {
            name: QName {
                prefix: prefix_for(node, attr.namespace(), false),
                local: attr.name().to_string(),
            },
            value: attr.value().to_string(),
        })
        .collect()
}

/// Maps a namespace URI back to the prefix used in the source.
///
/// `roxmltree` resolves names to URIs and does not keep the prefix,
/// so we look it up among the declarations in scope. Elements may use
/// the default namespace; attributes never do.
fn prefix_for(node: roxmltree::Node, uri: Option<&str>, allow_default: bool) -> Option<String> {
    let uri = uri?;

    if uri == XML_NAMESPACE_NS {
        return Some("xml".to_string());
    }

    let mut named = None;
    for ns in node.namespaces() {
        if ns.uri() == uri {
            match ns.name() {
                None if allow_default => return None,
                None => {}
                Some(name) => {
                    if named.is_none() {
                        named = Some(name.to_string());
                    }
                }
            }
        }
    }

    named
}

/// Collects namespace declarations made on this very element.
///
/// `roxmltree` exposes only the in-scope set, so the declaring element
/// is recovered by diffing against the parent's in-scope set.
fn declarations(node: roxmltree::Node) -> Vec<Namespace> {
    let parent: Vec<_> = node
        .parent()
        .map(|p| p.namespaces().collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.uri() != XML_NAMESPACE_NS)
        .filter(|ns| {
            !parent
                .iter()
                .any(|p| p.name() == ns.name() && p.uri() == ns.uri())
        })
        .map(|ns| Namespace {
            prefix: ns.name().map(|s| s.to_string()),
            uri: ns.uri().to_string(),
        })
        .collect()
}
