// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Size optimization passes.
//!
//! Every pass is independent and best-effort: a pass that finds
//! nothing to do leaves the tree untouched, and no pass can fail the
//! fetch. Order matters only at the edges — the `svg:` prefix is
//! dropped last so earlier passes can still match prefixed names.

use std::collections::HashSet;
use std::str::FromStr;

use svgxml::{Document, NodeId, SVG_NS};

use crate::Options;

/// Namespace URIs injected by drawing editors.
///
/// They describe editing state, not rendering, and only add weight.
const EDITOR_NAMESPACES: &[&str] = &[
    "http://www.inkscape.org/namespaces/inkscape",
    "http://sodipodi.sourceforge.net/DTD/sodipodi-0.0.dtd",
    "http://ns.adobe.com/AdobeIllustrator/10.0/",
    "http://ns.adobe.com/Graphs/1.0/",
    "http://ns.adobe.com/AdobeSVGViewerExtensions/3.0/",
    "http://ns.adobe.com/Variables/1.0/",
    "http://ns.adobe.com/SaveForWeb/1.0/",
    "http://ns.adobe.com/Extensibility/1.0/",
    "http://ns.adobe.com/Flows/1.0/",
    "http://ns.adobe.com/ImageReplacement/1.0/",
    "http://ns.adobe.com/GenericCustomNamespace/1.0/",
    "http://ns.adobe.com/XPath/1.0/",
    "http://purl.org/dc/elements/1.1/",
    "http://creativecommons.org/ns#",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    "http://www.serif.com/",
    "http://www.bohemiancoding.com/sketch/ns",
    "http://schemas.microsoft.com/visio/2003/SVGExtensions/",
    "http://krita.org/namespaces/svg/krita",
    "http://www.figma.com/figma/ns",
    "http://taptrix.com/vectorillustrator/svg_extensions",
];

/// Attribute values that equal the SVG spec default and can be
/// dropped without changing rendering. Exact string match only.
const DEFAULT_ATTRIBUTES: &[(&str, &str)] = &[
    ("x", "0"),
    ("y", "0"),
    ("width", "100%"),
    ("height", "100%"),
    ("preserveAspectRatio", "xMidYMid meet"),
    ("version", "1.1"),
    ("baseProfile", "full"),
];

/// Applies all enabled optimization passes, in order.
pub fn optimize(doc: &mut Document, options: &Options, preserve_style: bool) {
    if options.remove_editor_namespaces {
        remove_editor_namespaces(doc, options);
    }

    if options.remove_unused_namespaces {
        remove_unused_namespaces(doc, options);
    }

    if options.remove_comments {
        remove_comments(doc);
    }

    if options.remove_default_attributes {
        remove_default_attributes(doc);
    }

    if !options.attributes_to_delete.is_empty() {
        remove_configured_attributes(doc, options, preserve_style);
    }

    if options.remove_redundant_size {
        remove_redundant_size(doc);
    }

    if !options.elements_to_delete.is_empty() {
        remove_configured_elements(doc, options, preserve_style);
    }

    if !options.elements_to_delete_if_empty.is_empty() {
        remove_empty_elements(doc, options);
    }

    // Must stay last: earlier passes may still match `svg:` names.
    if options.remove_svg_prefix {
        remove_svg_prefix(doc, options);
    }
}

fn is_kept(options: &Options, prefix: Option<&str>, uri: &str) -> bool {
    options
        .namespaces_to_keep
        .iter()
        .any(|kept| Some(kept.as_str()) == prefix || kept == uri)
}

/// Strips editor namespaces along with the elements and attributes
/// living under them.
fn remove_editor_namespaces(doc: &mut Document, options: &Options) {
    let declarations: Vec<(Option<String>, String)> = doc
        .namespaces()
        .iter()
        .map(|ns| (ns.prefix.clone(), ns.uri.clone()))
        .collect();

    for (prefix, uri) in declarations {
        if !EDITOR_NAMESPACES.contains(&uri.as_str()) {
            continue;
        }
        if is_kept(options, prefix.as_deref(), &uri) {
            continue;
        }

        if let Some(prefix) = prefix.as_deref() {
            for id in doc.select(|n| {
                n.qname()
                    .map_or(false, |q| q.prefix.as_deref() == Some(prefix))
            }) {
                doc.detach(id);
            }

            for id in doc.select(|n| {
                n.attributes()
                    .iter()
                    .any(|a| a.name.prefix.as_deref() == Some(prefix))
            }) {
                doc.retain_attributes(id, |a| a.name.prefix.as_deref() != Some(prefix));
            }
        }

        doc.remove_namespace(&uri);
    }
}

/// Drops prefixed declarations with zero matching elements/attributes.
fn remove_unused_namespaces(doc: &mut Document, options: &Options) {
    let mut used: HashSet<String> = HashSet::new();
    for node in doc.descendants() {
        if let Some(prefix) = node.qname().and_then(|q| q.prefix.clone()) {
            used.insert(prefix);
        }
        for attr in node.attributes() {
            if let Some(ref prefix) = attr.name.prefix {
                used.insert(prefix.clone());
            }
        }
    }

    let mut unused: Vec<(NodeId, String)> = Vec::new();
    for node in doc.descendants() {
        for ns in node.namespaces() {
            // The default namespace is always kept.
            let prefix = match ns.prefix {
                Some(ref v) => v,
                None => continue,
            };

            if !used.contains(prefix) && !is_kept(options, Some(prefix), &ns.uri) {
                unused.push((node.id(), prefix.clone()));
            }
        }
    }

    for (id, prefix) in unused {
        doc.remove_namespace_declaration(id, Some(&prefix));
    }
}

fn remove_comments(doc: &mut Document) {
    for id in doc.select(|n| n.is_comment()) {
        doc.detach(id);
    }
}

/// Removes root attributes whose value spells the SVG default.
fn remove_default_attributes(doc: &mut Document) {
    let root = doc.root_element().id();
    doc.retain_attributes(root, |a| {
        !DEFAULT_ATTRIBUTES
            .iter()
            .any(|&(name, value)| a.name.is(name) && a.value == value)
    });
}

fn remove_configured_attributes(doc: &mut Document, options: &Options, preserve_style: bool) {
    let names: Vec<&str> = options
        .attributes_to_delete
        .iter()
        .map(|s| s.as_str())
        .filter(|name| !(preserve_style && matches!(*name, "style" | "class" | "id")))
        .collect();

    if names.is_empty() {
        return;
    }

    for id in doc.select(|n| n.is_element()) {
        doc.retain_attributes(id, |a| !names.iter().any(|name| a.name.is(name)));
    }
}

/// Removes the root `width`/`height` when the viewBox already carries
/// the same pixel values.
///
/// Intrinsic dimensions were captured at load time, so later pipeline
/// stages are not affected by this removal.
fn remove_redundant_size(doc: &mut Document) {
    let root = doc.root_element();

    let view_box = match root
        .attribute("viewBox")
        .and_then(|v| svgtypes::ViewBox::from_str(v).ok())
    {
        Some(v) => v,
        None => return,
    };

    let width = match root.attribute("width").and_then(parse_px_length) {
        Some(v) => v,
        None => return,
    };
    let height = match root.attribute("height").and_then(parse_px_length) {
        Some(v) => v,
        None => return,
    };

    if view_box.x == 0.0 && view_box.y == 0.0 && view_box.w == width && view_box.h == height {
        let id = root.id();
        doc.remove_attribute(id, "width");
        doc.remove_attribute(id, "height");
    }
}

fn parse_px_length(value: &str) -> Option<f64> {
    let length = svgtypes::Length::from_str(value).ok()?;
    match length.unit {
        svgtypes::LengthUnit::None | svgtypes::LengthUnit::Px => Some(length.number),
        _ => None,
    }
}

fn remove_configured_elements(doc: &mut Document, options: &Options, preserve_style: bool) {
    for name in &options.elements_to_delete {
        if preserve_style && name == "style" {
            continue;
        }

        for id in doc.select(|n| n.is_svg_element(name)) {
            doc.detach(id);
        }
    }
}

/// Delete-if-empty semantics: a configured element goes away only when
/// it has no children. Repeats until the tree settles, so a `g` that
/// only contained a removed `metadata` goes away too.
fn remove_empty_elements(doc: &mut Document, options: &Options) {
    loop {
        let mut changed = false;

        for name in &options.elements_to_delete_if_empty {
            for id in doc.select(|n| n.is_svg_element(name) && !n.has_children()) {
                doc.detach(id);
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }
}

/// Drops the `xmlns:svg` declaration, last.
///
/// Names carrying the prefix are moved to the default namespace, which
/// is declared on the spot when missing.
fn remove_svg_prefix(doc: &mut Document, options: &Options) {
    if is_kept(options, Some("svg"), SVG_NS) {
        return;
    }

    let declaring: Vec<NodeId> = doc.select(|n| {
        n.namespaces()
            .iter()
            .any(|ns| ns.prefix.as_deref() == Some("svg"))
    });

    if declaring.is_empty() {
        return;
    }

    let prefix_in_use = doc.descendants().any(|n| {
        n.qname().map_or(false, |q| q.prefix.as_deref() == Some("svg"))
            || n.attributes()
                .iter()
                .any(|a| a.name.prefix.as_deref() == Some("svg"))
    });

    if prefix_in_use {
        doc.strip_prefix("svg");
    }

    for id in declaring {
        if prefix_in_use {
            doc.declare_namespace(id, None, SVG_NS);
        }
        doc.remove_namespace_declaration(id, Some("svg"));
    }
}
