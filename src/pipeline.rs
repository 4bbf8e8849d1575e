// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The transform pipeline.
//!
//! One pipeline owns one document for one request. Intrinsic
//! dimensions are captured eagerly at load and never re-derived from
//! attributes the optimizer may have rewritten.

use std::str::FromStr;

use svgxml::{Document, NodeId};

use crate::classify::{classify_structure, classify_usage, StructureKind, UsageKind};
use crate::color::process_colors;
use crate::geom::{self, IntrinsicSize};
use crate::optimize::optimize;
use crate::request::FetchRequest;
use crate::{Error, Options};

/// The fallback `preserveAspectRatio` for illustrations.
const DEFAULT_PRESERVE_ASPECT_RATIO: &str = "xMidYMid slice";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ProcessState {
    Unprocessed,
    Processed,
}

/// A single-use SVG transform.
///
/// Built from source markup and a request, run once via
/// [`SvgPipeline::process`], then serialized. Running it twice is a
/// caller bug: the second call is a logged no-op.
#[derive(Debug)]
pub struct SvgPipeline {
    doc: Document,
    intrinsic: IntrinsicSize,
    name: String,
    in_icon_directory: bool,
    request: FetchRequest,
    options: Options,
    state: ProcessState,
}

impl SvgPipeline {
    /// Loads the source markup and captures its intrinsic dimensions.
    ///
    /// `source_name` is the addressing name fallback, usually the file
    /// stem or the icon name.
    pub fn new(
        markup: &str,
        source_name: &str,
        in_icon_directory: bool,
        request: FetchRequest,
        options: Options,
    ) -> Result<Self, Error> {
        let doc = Document::parse_str(markup)?;

        if !doc.root_element().is_svg_element("svg") {
            return Err(Error::NotAnSvg);
        }

        let intrinsic = intrinsic_dimensions(&doc)?;
        let name = request
            .name
            .clone()
            .unwrap_or_else(|| source_name.to_string());

        Ok(SvgPipeline {
            doc,
            intrinsic,
            name,
            in_icon_directory,
            request,
            options,
            state: ProcessState::Unprocessed,
        })
    }

    /// Intrinsic dimensions captured at load time.
    pub fn intrinsic(&self) -> IntrinsicSize {
        self.intrinsic
    }

    /// The working document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Serializes the current state of the document.
    pub fn markup(&self) -> String {
        self.doc.to_string(&svgxml::WriteOptions::default())
    }

    /// Runs the transform, mutating the document in place.
    ///
    /// Exactly once per pipeline: a repeated call signals a caller bug
    /// and leaves the document untouched.
    pub fn process(&mut self) {
        if self.state == ProcessState::Processed {
            log::error!("the document has already been processed");
            return;
        }
        self.state = ProcessState::Processed;

        let root_id = self.doc.root_element().id();

        // The viewBox is the coordinate system every later step
        // manipulates, so synthesize it when absent.
        if !self.doc.root_element().has_attribute("viewBox") {
            self.doc.set_attribute(
                root_id,
                "viewBox",
                &format!("0 0 {} {}", self.intrinsic.width, self.intrinsic.height),
            );
        }

        if self.request.resolved_optimize(self.options.optimize) {
            optimize(&mut self.doc, &self.options, self.request.preserve_style);
        }

        self.doc.set_attribute(root_id, "data-name", &self.name);

        let structure =
            classify_structure(self.intrinsic, self.in_icon_directory, self.request.kind);
        let usage = classify_usage(structure, self.request.kind);

        match usage {
            UsageKind::Icon | UsageKind::Tile => self.size_as_icon(root_id, usage),
            UsageKind::Illustration => self.size_as_illustration(root_id),
        }

        if structure == StructureKind::Icon || usage == UsageKind::Tile {
            process_colors(
                &mut self.doc,
                &self.name,
                usage,
                self.request.color.as_deref(),
                self.options.primary_color.as_deref(),
            );
        }

        self.crop_and_zoom(root_id, structure, usage);

        // Per-path classes for styling and test addressing.
        let paths = self.doc.select(|n| n.is_svg_element("path"));
        for (index, id) in paths.into_iter().enumerate() {
            let class = format!("{}-{}", self.name, index);
            merge_class(&mut self.doc, id, &class);
        }

        if let Some(class) = self.request.class.clone() {
            for token in class.split_whitespace() {
                merge_class(&mut self.doc, root_id, token);
            }
        }
    }

    fn size_as_icon(&mut self, root_id: NodeId, usage: UsageKind) {
        let (width, height) = if self.request.width.is_none() && self.request.height.is_none() {
            let default = match usage {
                UsageKind::Tile => self.options.default_tile_width,
                _ => self.options.default_icon_width,
            };
            (default, default)
        } else {
            let width = geom::target_width(
                self.intrinsic,
                self.request.width,
                self.request.height,
                self.request.ratio,
            );
            let height = geom::target_height(
                self.intrinsic,
                self.request.width,
                self.request.height,
                self.request.ratio,
            );
            if width != height {
                log::info!(
                    "{}: non-square {}x{} rendering of an icon crops it",
                    self.name,
                    width,
                    height
                );
            }
            (width, height)
        };

        self.doc
            .set_attribute(root_id, "width", &width.to_string());
        self.doc
            .set_attribute(root_id, "height", &height.to_string());
    }

    fn size_as_illustration(&mut self, root_id: NodeId) {
        let preserve = self
            .request
            .preserve_aspect_ratio
            .as_deref()
            .or(self.options.preserve_aspect_ratio.as_deref())
            .unwrap_or(DEFAULT_PRESERVE_ASPECT_RATIO);
        self.doc
            .set_attribute(root_id, "preserveAspectRatio", preserve);

        let mut style = StyleDecls::parse(self.doc.root_element().attribute("style"));
        if !style.has("width") {
            style.push("width", "100%");
        }
        if !style.has("height") {
            style.push("height", "auto");
        }

        if let Some(width) = self.request.width {
            // `width:auto!important` table styling would collapse the
            // image without a pixel width on the element itself.
            style.set("max-width", &format!("{}px", width));
            self.doc
                .set_attribute(root_id, "width", &width.to_string());
        }

        self.doc.set_attribute(root_id, "style", &style.to_string());
    }

    fn crop_and_zoom(&mut self, root_id: NodeId, structure: StructureKind, usage: UsageKind) {
        // A width/height pair that disagrees with the intrinsic ratio
        // forces a crop, it is never an error.
        let target_ratio = match (self.request.width, self.request.height) {
            (Some(width), Some(height)) => width as f64 / height as f64,
            _ => self
                .request
                .ratio
                .unwrap_or_else(|| self.intrinsic.ratio()),
        };
        let (width, height) = geom::cropping_dimensions(target_ratio, self.intrinsic);
        if !geom::ratio_matches(width, height, target_ratio) {
            log::warn!(
                "{}: crop {}x{} misses the requested ratio {}",
                self.name,
                width,
                height,
                target_ratio
            );
        }

        self.doc
            .set_attribute(root_id, "viewBox", &format!("0 0 {} {}", width, height));

        // An icon blown up to an illustration is zoomed out so it does
        // not fill the whole frame.
        let zoom = self.request.zoom.or_else(|| {
            if structure == StructureKind::Icon && usage == UsageKind::Illustration {
                Some(-4.0)
            } else {
                None
            }
        });

        let factor = match zoom {
            Some(v) if v != 0.0 => v,
            _ => return,
        };

        let (width, height) = if factor < 0.0 {
            (
                scale(width, -factor, true),
                scale(height, -factor, true),
            )
        } else {
            (
                scale(width, factor, false),
                scale(height, factor, false),
            )
        };

        // Keep the view centered on the original intrinsic box.
        let x = -((width as i64 - self.intrinsic.width as i64) / 2);
        let y = -((height as i64 - self.intrinsic.height as i64) / 2);
        self.doc.set_attribute(
            root_id,
            "viewBox",
            &format!("{} {} {} {}", x, y, width, height),
        );
    }
}

fn scale(value: u32, factor: f64, up: bool) -> u32 {
    let scaled = if up {
        value as f64 * factor
    } else {
        value as f64 / factor
    };
    scaled.round().max(1.0) as u32
}

/// Reads the intrinsic size from the `viewBox`, falling back to the
/// `width`/`height` attributes.
fn intrinsic_dimensions(doc: &Document) -> Result<IntrinsicSize, Error> {
    let root = doc.root_element();

    if let Some(value) = root.attribute("viewBox") {
        let vb = svgtypes::ViewBox::from_str(value).map_err(|_| Error::InvalidSize)?;
        return IntrinsicSize::new(vb.w.round() as u32, vb.h.round() as u32)
            .ok_or(Error::InvalidSize);
    }

    let width = root
        .attribute("width")
        .and_then(parse_px)
        .ok_or(Error::InvalidSize)?;
    let height = root
        .attribute("height")
        .and_then(parse_px)
        .ok_or(Error::InvalidSize)?;

    IntrinsicSize::new(width, height).ok_or(Error::InvalidSize)
}

fn parse_px(value: &str) -> Option<u32> {
    let length = svgtypes::Length::from_str(value).ok()?;
    match length.unit {
        svgtypes::LengthUnit::None | svgtypes::LengthUnit::Px => {
            let number = length.number.round();
            if number > 0.0 {
                Some(number as u32)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Appends a class token unless it is already present.
fn merge_class(doc: &mut Document, id: NodeId, token: &str) {
    let merged = match doc.get(id).attribute("class") {
        Some(existing) => {
            if existing.split_whitespace().any(|t| t == token) {
                return;
            }
            format!("{} {}", existing, token)
        }
        None => token.to_string(),
    };

    doc.set_attribute(id, "class", &merged);
}

/// An ordered list of `style` declarations, merge-friendly.
struct StyleDecls(Vec<(String, String)>);

impl StyleDecls {
    fn parse(text: Option<&str>) -> Self {
        let mut decls = Vec::new();
        for part in text.unwrap_or("").split(';') {
            if let Some((name, value)) = part.split_once(':') {
                let name = name.trim();
                let value = value.trim();
                if !name.is_empty() && !value.is_empty() {
                    decls.push((name.to_string(), value.to_string()));
                }
            }
        }
        StyleDecls(decls)
    }

    fn has(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    fn push(&mut self, name: &str, value: &str) {
        self.0.push((name.to_string(), value.to_string()));
    }

    fn set(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(decl) => decl.1 = value.to_string(),
            None => self.push(name, value),
        }
    }

    fn to_string(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.0 {
            if !out.is_empty() {
                out.push(';');
            }
            out.push_str(name);
            out.push(':');
            out.push_str(value);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::StyleDecls;

    #[test]
    fn style_merge_keeps_existing() {
        let mut style = StyleDecls::parse(Some("width:50%;color:red"));
        assert!(style.has("width"));
        if !style.has("height") {
            style.push("height", "auto");
        }
        assert_eq!(style.to_string(), "width:50%;color:red;height:auto");
    }

    #[test]
    fn style_set_replaces() {
        let mut style = StyleDecls::parse(Some("max-width:10px"));
        style.set("max-width", "24px");
        assert_eq!(style.to_string(), "max-width:24px");
    }
}
