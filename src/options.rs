// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

/// Processing options.
///
/// Resolved once per fetch and passed to the pipeline explicitly.
/// The pipeline never reads ambient state, so two runs with equal
/// options and equal input produce identical bytes.
#[derive(Clone, Debug)]
pub struct Options {
    /// Run the optimizer unless the request says otherwise.
    ///
    /// Default: true
    pub optimize: bool,

    /// Namespaces that the optimizer must keep, by prefix or URI.
    ///
    /// Default: empty
    pub namespaces_to_keep: Vec<String>,

    /// Attributes removed from every element by the optimizer.
    ///
    /// `style`, `class` and `id` are retained when a request asks to
    /// preserve styling.
    ///
    /// Default: `id`, `style`, `class`, `data-name`
    pub attributes_to_delete: Vec<String>,

    /// Elements removed unconditionally by the optimizer.
    ///
    /// Default: `script`, `style`, `title`, `desc`
    pub elements_to_delete: Vec<String>,

    /// Elements removed by the optimizer only when they have no child
    /// nodes at all. An element holding only text is kept.
    ///
    /// Default: `metadata`, `defs`, `g`
    pub elements_to_delete_if_empty: Vec<String>,

    /// Remove comment nodes.
    ///
    /// Default: true
    pub remove_comments: bool,

    /// Remove attributes whose value equals the SVG spec default.
    ///
    /// Default: true
    pub remove_default_attributes: bool,

    /// Remove the root `width`/`height` when they only duplicate
    /// the `viewBox`.
    ///
    /// Default: true
    pub remove_redundant_size: bool,

    /// Strip editor-vendor namespaces (Inkscape, Illustrator, ...).
    ///
    /// Default: true
    pub remove_editor_namespaces: bool,

    /// Drop namespace declarations with no remaining usage.
    ///
    /// Default: true
    pub remove_unused_namespaces: bool,

    /// Drop the `xmlns:svg` declaration, moving prefixed names to the
    /// default namespace.
    ///
    /// Default: true
    pub remove_svg_prefix: bool,

    /// The `preserveAspectRatio` value applied to illustrations when
    /// the request carries none.
    ///
    /// Default: `None` (the pipeline falls back to `xMidYMid slice`)
    pub preserve_aspect_ratio: Option<String>,

    /// The site's primary color, applied to illustrations without a
    /// requested color.
    ///
    /// Default: `None`
    pub primary_color: Option<String>,

    /// Default square size for an icon without a requested dimension.
    ///
    /// Default: 24
    pub default_icon_width: u32,

    /// Default square size for a tile without a requested dimension.
    ///
    /// Default: 192
    pub default_tile_width: u32,

    /// Directories whose SVG files are always treated as icons.
    ///
    /// Default: empty
    pub icon_directories: Vec<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            optimize: true,
            namespaces_to_keep: Vec::new(),
            attributes_to_delete: str_list(&["id", "style", "class", "data-name"]),
            elements_to_delete: str_list(&["script", "style", "title", "desc"]),
            elements_to_delete_if_empty: str_list(&["metadata", "defs", "g"]),
            remove_comments: true,
            remove_default_attributes: true,
            remove_redundant_size: true,
            remove_editor_namespaces: true,
            remove_unused_namespaces: true,
            remove_svg_prefix: true,
            preserve_aspect_ratio: None,
            primary_color: None,
            default_icon_width: 24,
            default_tile_width: 192,
            icon_directories: Vec::new(),
        }
    }
}

fn str_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
