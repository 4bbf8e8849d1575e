use svgxml::{Document, WriteOptions};

fn resave(text: &str) -> String {
    let doc = Document::parse_str(text).unwrap();
    doc.to_string(&WriteOptions::default())
}

#[test]
fn roundtrip_is_stable() {
    let svg = "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 24 24'>\
               <path fill='red' d='M0 0 L10 10'/></svg>";

    let first = resave(svg);
    let second = resave(&first);
    assert_eq!(first, second);
}

#[test]
fn keeps_foreign_namespaces() {
    let svg = "<svg xmlns='http://www.w3.org/2000/svg' \
               xmlns:inkscape='http://www.inkscape.org/namespaces/inkscape' \
               inkscape:version='1.0'><inkscape:grid/></svg>";

    let doc = Document::parse_str(svg).unwrap();
    let root = doc.root_element();
    assert_eq!(root.attribute("inkscape:version"), Some("1.0"));
    assert_eq!(root.namespaces().len(), 2);

    let out = doc.to_string(&WriteOptions::default());
    assert!(out.contains("xmlns:inkscape="));
    assert!(out.contains("<inkscape:grid/>"));
}

#[test]
fn keeps_comments() {
    let svg = "<svg xmlns='http://www.w3.org/2000/svg'><!-- generator --><path/></svg>";
    let out = resave(svg);
    assert!(out.contains("<!-- generator -->"));
}

#[test]
fn set_attribute_replaces_value() {
    let svg = "<svg xmlns='http://www.w3.org/2000/svg' fill='red'/>";
    let mut doc = Document::parse_str(svg).unwrap();

    let root = doc.root_element().id();
    doc.set_attribute(root, "fill", "blue");
    doc.set_attribute(root, "stroke", "green");

    let root = doc.root_element();
    assert_eq!(root.attribute("fill"), Some("blue"));
    assert_eq!(root.attribute("stroke"), Some("green"));
    assert_eq!(root.attributes().len(), 2);
}

#[test]
fn detach_removes_subtree() {
    let svg = "<svg xmlns='http://www.w3.org/2000/svg'>\
               <g><path id='a'/></g><path id='b'/></svg>";
    let mut doc = Document::parse_str(svg).unwrap();

    let groups = doc.select(|n| n.is_svg_element("g"));
    assert_eq!(groups.len(), 1);
    doc.detach(groups[0]);

    assert!(doc.descendants().all(|n| !n.is_svg_element("g")));
    // The sibling stays reachable.
    assert_eq!(doc.select(|n| n.is_svg_element("path")).len(), 1);

    let out = doc.to_string(&WriteOptions::default());
    assert!(!out.contains("<g>"));
    assert!(out.contains("id=\"b\""));
}

#[test]
fn detach_first_and_last_child() {
    let svg = "<svg xmlns='http://www.w3.org/2000/svg'>\
               <path id='a'/><path id='b'/><path id='c'/></svg>";
    let mut doc = Document::parse_str(svg).unwrap();

    let paths = doc.select(|n| n.is_svg_element("path"));
    doc.detach(paths[0]);
    doc.detach(paths[2]);

    let left: Vec<_> = doc
        .descendants()
        .filter(|n| n.is_svg_element("path"))
        .filter_map(|n| n.attribute("id"))
        .collect();
    assert_eq!(left, ["b"]);
}

#[test]
fn remove_namespace_drops_declaration() {
    let svg = "<svg xmlns='http://www.w3.org/2000/svg' \
               xmlns:sodipodi='http://sodipodi.sourceforge.net/DTD/sodipodi-0.0.dtd'/>";
    let mut doc = Document::parse_str(svg).unwrap();

    doc.remove_namespace("http://sodipodi.sourceforge.net/DTD/sodipodi-0.0.dtd");

    let out = doc.to_string(&WriteOptions::default());
    assert!(!out.contains("sodipodi"));
    assert!(out.contains("xmlns=\"http://www.w3.org/2000/svg\""));
}

#[test]
fn processing_instructions_are_dropped() {
    let svg = "<?xml-stylesheet href='a.css'?>\
               <svg xmlns='http://www.w3.org/2000/svg'><path/></svg>";
    let out = resave(svg);
    assert!(!out.contains("xml-stylesheet"));
    assert!(out.contains("<path/>"));
}

#[test]
fn malformed_input_fails() {
    assert!(Document::parse_str("<svg").is_err());
    assert!(Document::parse_str("not xml at all").is_err());
}

#[test]
fn text_survives() {
    let svg = "<svg xmlns='http://www.w3.org/2000/svg'><title>hello</title></svg>";
    let doc = Document::parse_str(svg).unwrap();
    let title = doc.descendants().find(|n| n.is_svg_element("title")).unwrap();
    assert_eq!(title.text(), "hello");
}
