use xmlwriter::XmlWriter;

pub use xmlwriter::Indent;

use crate::{Document, Node, NodeKind};

/// XML writing options.
#[derive(Clone, Copy, Debug)]
pub struct WriteOptions {
    /// Use single quote marks instead of double quote.
    ///
    /// Default: disabled
    pub use_single_quote: bool,

    /// Set XML nodes indention.
    ///
    /// `Indent::None` guarantees that parsing the output and writing
    /// it again produces identical bytes.
    ///
    /// Default: `Indent::None`
    pub indent: Indent,

    /// Set XML attributes indention.
    ///
    /// Default: `Indent::None`
    pub attributes_indent: Indent,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            use_single_quote: false,
            indent: Indent::None,
            attributes_indent: Indent::None,
        }
    }
}

impl Document {
    /// Writes the document back to XML.
    pub fn to_string(&self, opt: &WriteOptions) -> String {
        let mut xml = XmlWriter::new(xmlwriter::Options {
            use_single_quote: opt.use_single_quote,
            indent: opt.indent,
            attributes_indent: opt.attributes_indent,
        });

        for child in self.root().children() {
            write_node(child, &mut xml);
        }

        xml.end_document()
    }
}

fn write_node(node: Node, xml: &mut XmlWriter) {
    match node.d.kind {
        NodeKind::Element { .. } => write_element(node, xml),
        NodeKind::Text(ref text) => xml.write_text(text),
        NodeKind::Comment(ref text) => xml.write_comment(text),
        NodeKind::Root => {}
    }
}

fn write_element(node: Node, xml: &mut XmlWriter) {
    // `unwrap` is safe, the caller checked the node kind.
    let name = node.qname().unwrap().to_string();
    xml.start_element(&name);

    for ns in node.namespaces() {
        match ns.prefix {
            Some(ref prefix) => xml.write_attribute(&format!("xmlns:{}", prefix), &ns.uri),
            None => xml.write_attribute("xmlns", &ns.uri),
        }
    }

    for attr in node.attributes() {
        xml.write_attribute(&attr.name.to_string(), &attr.value);
    }

    // Indentation inside a text-carrying element would alter its content.
    let has_text = node.children().any(|n| n.is_text());
    if has_text {
        xml.set_preserve_whitespaces(true);
    }

    for child in node.children() {
        write_node(child, xml);
    }

    xml.end_element();

    if has_text {
        xml.set_preserve_whitespaces(false);
    }
}
