// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use once_cell::sync::Lazy;
use svgfetch::svgxml::{Document, WriteOptions};
use svgfetch::{FetchRequest, Fetcher, MemoryCache, Options, SvgPipeline, SvgSource};

static OPTIONS: Lazy<Options> = Lazy::new(Options::default);

fn run(markup: &str, name: &str, query: &[(&str, &str)]) -> String {
    let request = FetchRequest::from_query(query.iter().copied());
    let mut pipeline =
        SvgPipeline::new(markup, name, false, request, OPTIONS.clone()).unwrap();
    pipeline.process();
    pipeline.markup()
}

fn root_attr(markup: &str, name: &str) -> Option<String> {
    let doc = Document::parse_str(markup).unwrap();
    doc.root_element().attribute(name).map(str::to_string)
}

fn path_attrs(markup: &str, name: &str) -> Vec<Option<String>> {
    let doc = Document::parse_str(markup).unwrap();
    doc.root_element()
        .descendants()
        .filter(|n| n.is_svg_element("path"))
        .map(|n| n.attribute(name).map(str::to_string))
        .collect()
}

#[test]
fn serialization_is_idempotent() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
         <!-- generator --><path d='M0 0h24v24'/></svg>",
        "acme",
        &[("color", "red")],
    );

    let reparsed = Document::parse_str(&markup).unwrap();
    assert_eq!(markup, reparsed.to_string(&WriteOptions::default()));
}

#[test]
fn processing_twice_changes_nothing() {
    let request = FetchRequest::from_query([("width", "48")]);
    let mut pipeline = SvgPipeline::new(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h24'/></svg>",
        "acme",
        false,
        request,
        OPTIONS.clone(),
    )
    .unwrap();

    pipeline.process();
    let first = pipeline.markup();
    pipeline.process();
    assert_eq!(first, pipeline.markup());
}

#[test]
fn equal_inputs_produce_equal_bytes() {
    let markup = "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
                  <path d='M0 0h24v24'/></svg>";
    let query = [("width", "32"), ("color", "#336699")];
    assert_eq!(run(markup, "acme", &query), run(markup, "acme", &query));
}

#[test]
fn double_color_icon_keeps_its_second_color() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
         <path fill='#111111' d='M0 0h12'/><path fill='#999999' d='M12 0h12'/></svg>",
        "logo",
        &[("color", "red")],
    );

    assert_eq!(
        path_attrs(&markup, "fill"),
        vec![Some("#ff0000".to_string()), Some("#999999".to_string())]
    );
    // The root fill stays untouched in the double-color case.
    assert_eq!(root_attr(&markup, "fill"), None);
}

#[test]
fn icon_without_color_inherits_current_color() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h24v24'/></svg>",
        "acme",
        &[],
    );

    assert_eq!(root_attr(&markup, "fill"), Some("currentColor".to_string()));
    assert_eq!(root_attr(&markup, "data-name"), Some("acme".to_string()));
    assert_eq!(path_attrs(&markup, "class"), vec![Some("acme-0".to_string())]);
    assert_eq!(path_attrs(&markup, "fill"), vec![None]);
}

#[test]
fn stroke_icon_is_colored_through_the_stroke() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24' stroke='#000000'>\
         <path stroke='#000000' d='M0 0h24'/><path stroke='none' d='M0 12h24'/></svg>",
        "feather",
        &[("color", "#ff0000")],
    );

    assert_eq!(root_attr(&markup, "fill"), Some("none".to_string()));
    assert_eq!(root_attr(&markup, "stroke"), Some("#ff0000".to_string()));
    // The surviving path inherits the root stroke; the none-stroke
    // path is gone entirely.
    assert_eq!(path_attrs(&markup, "stroke"), vec![None]);
    assert_eq!(path_attrs(&markup, "d"), vec![Some("M0 0h24".to_string())]);
}

#[test]
fn ratio_request_crops_the_view_box() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><path d='M0 0h100'/></svg>",
        "banner",
        &[("ratio", "16x9")],
    );

    assert_eq!(root_attr(&markup, "viewBox"), Some("0 0 100 56".to_string()));
}

#[test]
fn conflicting_width_and_height_crop_the_view_box() {
    // Both dimensions requested and off the intrinsic ratio: the
    // image is cropped to the requested ratio, never distorted.
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><path d='M0 0h100'/></svg>",
        "banner",
        &[("width", "100"), ("height", "50")],
    );

    assert_eq!(root_attr(&markup, "viewBox"), Some("0 0 100 50".to_string()));
    assert_eq!(root_attr(&markup, "width"), Some("100".to_string()));
    assert_eq!(root_attr(&markup, "height"), Some("50".to_string()));
}

#[test]
fn icon_as_illustration_zooms_out() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h24v24'/></svg>",
        "acme",
        &[("type", "illustration")],
    );

    assert_eq!(
        root_attr(&markup, "viewBox"),
        Some("-36 -36 96 96".to_string())
    );
    assert_eq!(
        root_attr(&markup, "preserveAspectRatio"),
        Some("xMidYMid slice".to_string())
    );
}

#[test]
fn icon_defaults_to_text_size() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h24'/></svg>",
        "acme",
        &[],
    );

    assert_eq!(root_attr(&markup, "width"), Some("24".to_string()));
    assert_eq!(root_attr(&markup, "height"), Some("24".to_string()));
}

#[test]
fn tile_defaults_to_tile_size() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h24'/></svg>",
        "logo",
        &[("type", "tile")],
    );

    assert_eq!(root_attr(&markup, "width"), Some("192".to_string()));
    assert_eq!(root_attr(&markup, "height"), Some("192".to_string()));
}

#[test]
fn illustration_is_responsive() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 800 600'><path d='M0 0h800'/></svg>",
        "hero",
        &[("width", "400")],
    );

    assert_eq!(
        root_attr(&markup, "style"),
        Some("width:100%;height:auto;max-width:400px".to_string())
    );
    assert_eq!(root_attr(&markup, "width"), Some("400".to_string()));
}

#[test]
fn requested_class_is_merged_onto_the_root() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h24'/></svg>",
        "acme",
        &[("class", "inline-icon")],
    );

    assert_eq!(
        root_attr(&markup, "class"),
        Some("inline-icon".to_string())
    );
}

#[test]
fn optimizer_strips_editor_cruft() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' \
         xmlns:inkscape='http://www.inkscape.org/namespaces/inkscape' \
         viewBox='0 0 24 24' version='1.1'>\
         <!-- Generator: drawing tool -->\
         <inkscape:grid id='grid1'/>\
         <metadata></metadata>\
         <path inkscape:label='shape' d='M0 0h24'/></svg>",
        "acme",
        &[],
    );

    assert!(!markup.contains("inkscape"));
    assert!(!markup.contains("Generator"));
    assert!(!markup.contains("metadata"));
    assert!(!markup.contains("version"));
}

#[test]
fn optimizer_removes_groups_emptied_by_earlier_passes() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
         <g><metadata><desc>drawn by hand</desc></metadata></g><path d='M0 0h24'/></svg>",
        "acme",
        &[],
    );

    assert!(!markup.contains("<g"));
    assert!(!markup.contains("metadata"));
}

#[test]
fn text_bearing_elements_survive_the_empty_pass() {
    // Delete-if-empty means no child nodes at all; text counts.
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
         <metadata>scanned at 300dpi</metadata><path d='M0 0h24'/></svg>",
        "acme",
        &[],
    );

    assert!(markup.contains("<metadata>scanned at 300dpi</metadata>"));
}

#[test]
fn optimizer_moves_prefixed_names_to_the_default_namespace() {
    let markup = run(
        "<svg:svg xmlns:svg='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
         <svg:path d='M0 0h24'/></svg:svg>",
        "acme",
        &[],
    );

    assert!(!markup.contains("svg:"));
    assert!(markup.contains("xmlns=\"http://www.w3.org/2000/svg\""));
}

#[test]
fn preserve_style_keeps_styling_attributes() {
    let source = "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
                  <path id='p1' class='brand' style='opacity:.5' d='M0 0h24'/></svg>";

    let stripped = run(source, "acme", &[]);
    assert_eq!(path_attrs(&stripped, "id"), vec![None]);
    assert_eq!(path_attrs(&stripped, "style"), vec![None]);

    let preserved = run(source, "acme", &[("preserve", "style")]);
    assert_eq!(path_attrs(&preserved, "id"), vec![Some("p1".to_string())]);
    assert_eq!(
        path_attrs(&preserved, "style"),
        vec![Some("opacity:.5".to_string())]
    );
}

#[test]
fn vendor_background_rect_is_dropped() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
         <rect width='24' height='24'/><path d='M0 0h24'/></svg>",
        "carbon-add",
        &[],
    );

    assert!(!markup.contains("<rect"));
}

#[test]
fn missing_view_box_is_synthesized_from_width_and_height() {
    let markup = run(
        "<svg xmlns='http://www.w3.org/2000/svg' width='24' height='24'><path d='M0 0h24'/></svg>",
        "acme",
        &[],
    );

    assert_eq!(root_attr(&markup, "viewBox"), Some("0 0 24 24".to_string()));
}

#[test]
fn non_svg_root_is_rejected() {
    let request = FetchRequest::default();
    let result = SvgPipeline::new(
        "<html xmlns='http://www.w3.org/1999/xhtml'/>",
        "acme",
        false,
        request,
        OPTIONS.clone(),
    );
    assert!(matches!(result, Err(svgfetch::Error::NotAnSvg)));
}

#[test]
fn unsized_document_is_rejected() {
    let request = FetchRequest::default();
    assert!(SvgPipeline::new(
        "<svg xmlns='http://www.w3.org/2000/svg'><path d='M0 0h24'/></svg>",
        "acme",
        false,
        request,
        OPTIONS.clone(),
    )
    .is_err());
}

#[test]
fn fetcher_serves_the_second_request_from_cache() {
    let source = SvgSource::markup(
        "acme",
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h24'/></svg>",
    );
    let request = FetchRequest::from_query([("width", "32")]);
    let fetcher = Fetcher::new(OPTIONS.clone());
    let mut cache = MemoryCache::new();

    let first = fetcher.fetch(&source, &request, &mut cache).unwrap();
    assert_eq!(cache.len(), 1);
    let second = fetcher.fetch(&source, &request, &mut cache).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(first, second);
}

#[test]
fn different_requests_have_different_cache_keys() {
    let source = SvgSource::markup(
        "acme",
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h24'/></svg>",
    );
    let fetcher = Fetcher::new(OPTIONS.clone());
    let mut cache = MemoryCache::new();

    let icon = FetchRequest::from_query([("width", "24")]);
    let tile = FetchRequest::from_query([("width", "24"), ("type", "tile")]);
    fetcher.fetch(&source, &icon, &mut cache).unwrap();
    fetcher.fetch(&source, &tile, &mut cache).unwrap();
    assert_eq!(cache.len(), 2);
}

#[test]
fn markup_sources_sharing_a_name_do_not_share_a_cache_entry() {
    let a = SvgSource::markup(
        "acme",
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h24'/></svg>",
    );
    let b = SvgSource::markup(
        "acme",
        "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'><path d='M0 0h12v12'/></svg>",
    );
    let request = FetchRequest::from_query([("width", "32")]);
    let fetcher = Fetcher::new(OPTIONS.clone());
    let mut cache = MemoryCache::new();

    let first = fetcher.fetch(&a, &request, &mut cache).unwrap();
    let second = fetcher.fetch(&b, &request, &mut cache).unwrap();
    assert_ne!(first, second);
    assert_eq!(cache.len(), 2);
}
