// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fill/stroke color rewriting for icons and tiles.

use std::collections::HashSet;

use svgxml::{Document, NodeId};

use crate::classify::UsageKind;

/// How an icon paints itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PaintModel {
    /// Solid shapes, colored via `fill`.
    FillSolid,
    /// Outlined shapes, colored via `stroke`.
    StrokeOutline,
}

/// Rewrites fill/stroke attributes so the icon follows one color.
///
/// `source_name` is the icon/source identifier, used for known-vendor
/// cleanups. Applies only to icon/tile contexts; the pipeline gates
/// the call.
pub fn process_colors(
    doc: &mut Document,
    source_name: &str,
    usage: UsageKind,
    requested_color: Option<&str>,
    primary_color: Option<&str>,
) {
    let root_id = doc.root_element().id();

    let model = if doc.root_element().has_attribute("stroke") {
        PaintModel::StrokeOutline
    } else {
        PaintModel::FillSolid
    };

    // An icon with two distinct fill colors keeps its second color.
    let double_color = model == PaintModel::FillSolid && {
        let fills: HashSet<&str> = doc
            .descendants()
            .filter(|n| n.is_element())
            .filter_map(|n| n.attribute("fill"))
            .filter(|v| *v != "none")
            .collect();
        fills.len() > 1
    };

    // The SVG default fill is black. `currentColor` instead makes the
    // icon inherit the surrounding text color.
    if model == PaintModel::FillSolid
        && !double_color
        && !doc.root_element().has_attribute("fill")
    {
        doc.set_attribute(root_id, "fill", "currentColor");
    }

    // Carbon and Eva icons ship a background rect that renders as a
    // solid box once recolored.
    let lower = source_name.to_ascii_lowercase();
    if lower.contains("carbon") || lower.contains("eva") {
        for id in doc.select(|n| n.is_svg_element("rect")) {
            doc.detach(id);
        }
    }

    let effective: Option<String> = requested_color.map(str::to_string).or_else(|| {
        if usage == UsageKind::Illustration {
            primary_color.map(str::to_string)
        } else {
            None
        }
    });

    let color = match effective {
        Some(v) => v,
        None => return,
    };

    match model {
        PaintModel::FillSolid if double_color => {
            // Only the first fill in document order takes the new
            // color; the second color is preserved.
            let first = doc
                .descendants()
                .find(|n| n.is_element() && n.has_attribute("fill"))
                .map(|n| n.id());
            if let Some(id) = first {
                doc.set_attribute(id, "fill", &color);
            }
        }
        PaintModel::FillSolid => {
            doc.set_attribute(root_id, "fill", &color);

            // Direct children inherit from the root; deeper shapes
            // follow it via `currentColor`.
            let shapes: Vec<(NodeId, bool)> = doc
                .descendants()
                .filter(|n| n.is_svg_element("path") || n.is_svg_element("g"))
                .filter(|n| matches!(n.attribute("fill"), Some(v) if v != "none"))
                .map(|n| {
                    let parent_is_root = n.parent_element().map(|p| p.id()) == Some(root_id);
                    (n.id(), parent_is_root)
                })
                .collect();

            for (id, parent_is_root) in shapes {
                if parent_is_root {
                    doc.remove_attribute(id, "fill");
                } else {
                    doc.set_attribute(id, "fill", "currentColor");
                }
            }
        }
        PaintModel::StrokeOutline => {
            doc.set_attribute(root_id, "fill", "none");
            doc.set_attribute(root_id, "stroke", &color);

            let paths: Vec<(NodeId, Option<String>)> = doc
                .descendants()
                .filter(|n| n.is_svg_element("path"))
                .filter(|n| n.id() != root_id)
                .map(|n| (n.id(), n.attribute("stroke").map(str::to_string)))
                .collect();

            for (id, stroke) in paths {
                match stroke.as_deref() {
                    // A none-stroke path in an outline icon is
                    // decorative cruft.
                    Some("none") => doc.detach(id),
                    Some(_) => doc.remove_attribute(id, "stroke"),
                    None => {}
                }
            }
        }
    }
}
