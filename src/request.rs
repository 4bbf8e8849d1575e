// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The externally-supplied transform request and its cache identity.

use std::hash::Hasher;
use std::str::FromStr;

use siphasher::sip::SipHasher13;

use crate::classify::UsageKind;

/// A transform request.
///
/// Every field is optional; absence is a real state, not a zero.
/// Two requests with the same canonical query are the same request.
#[derive(Clone, Default, Debug)]
pub struct FetchRequest {
    /// Requested width, in pixels.
    pub width: Option<u32>,
    /// Requested height, in pixels.
    pub height: Option<u32>,
    /// Requested aspect ratio.
    pub ratio: Option<f64>,
    /// Zoom factor. Negative means zoom out.
    pub zoom: Option<f64>,
    /// Requested color, canonicalized to `#rrggbb`/`#rrggbbaa`.
    pub color: Option<String>,
    /// A `preserveAspectRatio` value for illustrations.
    pub preserve_aspect_ratio: Option<String>,
    /// Identity/selection name, also the icon lookup key.
    pub name: Option<String>,
    /// Extra CSS classes merged onto the root element.
    pub class: Option<String>,
    /// Requested usage type.
    pub kind: Option<UsageKind>,
    /// Retain `style`/`class`/`id` attributes during optimization.
    pub preserve_style: bool,
    /// Optimizer override. `None` falls back to the configured value.
    pub optimize: Option<bool>,
}

impl FetchRequest {
    /// Builds a request from query parameters.
    ///
    /// Unknown keys are ignored. A malformed value is logged and
    /// dropped, it never fails the fetch.
    pub fn from_query<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut request = FetchRequest::default();

        for (key, value) in pairs {
            match key {
                "w" | "width" => request.width = parse_px(key, value),
                "h" | "height" => request.height = parse_px(key, value),
                "ratio" => request.ratio = parse_ratio(value),
                "zoom" => request.zoom = parse_float(key, value),
                "color" => request.color = canonical_color(value),
                "preserveAspectRatio" => {
                    request.preserve_aspect_ratio = parse_aspect_ratio(value)
                }
                "name" => request.name = Some(value.to_string()),
                "class" => request.class = Some(value.to_string()),
                "type" => {
                    request.kind = UsageKind::from_request(value);
                    if request.kind.is_none() {
                        log::warn!("unknown type value '{}' was ignored", value);
                    }
                }
                "preserve" => request.preserve_style = value.contains("style"),
                // The security token is derived, not consumed.
                "tok" => {}
                _ => log::debug!("unknown query parameter '{}' was ignored", key),
            }
        }

        request
    }

    /// The canonical query string: sorted keys, normalized values.
    ///
    /// This is the request part of the cache identity, so equivalent
    /// requests must serialize identically.
    pub fn canonical_query(&self) -> String {
        let mut pairs: Vec<(&'static str, String)> = Vec::new();

        if let Some(v) = self.width {
            pairs.push(("width", v.to_string()));
        }
        if let Some(v) = self.height {
            pairs.push(("height", v.to_string()));
        }
        if let Some(v) = self.ratio {
            pairs.push(("ratio", v.to_string()));
        }
        if let Some(v) = self.zoom {
            pairs.push(("zoom", v.to_string()));
        }
        if let Some(ref v) = self.color {
            pairs.push(("color", v.clone()));
        }
        if let Some(ref v) = self.preserve_aspect_ratio {
            pairs.push(("preserveAspectRatio", v.clone()));
        }
        if let Some(ref v) = self.name {
            pairs.push(("name", v.clone()));
        }
        if let Some(ref v) = self.class {
            pairs.push(("class", v.clone()));
        }
        if let Some(v) = self.kind {
            pairs.push(("type", v.as_str().to_string()));
        }
        if self.preserve_style {
            pairs.push(("preserve", "style".to_string()));
        }
        if let Some(v) = self.optimize {
            pairs.push(("optimize", v.to_string()));
        }

        pairs.sort_by_key(|(k, _)| *k);

        let mut query = String::new();
        for (key, value) in pairs {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(key);
            query.push('=');
            query.push_str(&value);
        }

        query
    }

    /// Resolves the optimizer flag against the configured default.
    pub fn resolved_optimize(&self, configured: bool) -> bool {
        self.optimize.unwrap_or(configured)
    }
}

/// Computes the cache key for a source/request pair.
///
/// Any change to the source identity, its buster token or the request
/// parameters yields a new key.
pub fn cache_key(identity: &str, buster: &str, canonical_query: &str) -> String {
    let mut hasher = SipHasher13::new();
    hasher.write(identity.as_bytes());
    hasher.write(&[0xff]);
    hasher.write(buster.as_bytes());
    hasher.write(&[0xff]);
    hasher.write(canonical_query.as_bytes());
    format!("{:016x}", hasher.finish())
}

fn parse_px(key: &str, value: &str) -> Option<u32> {
    match value.parse::<u32>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            log::warn!("invalid {} value '{}' was ignored", key, value);
            None
        }
    }
}

fn parse_float(key: &str, value: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v != 0.0 => Some(v),
        _ => {
            log::warn!("invalid {} value '{}' was ignored", key, value);
            None
        }
    }
}

/// Parses `16x9`, `16:9` or a plain float.
pub fn parse_ratio(value: &str) -> Option<f64> {
    let parts = value
        .split_once('x')
        .or_else(|| value.split_once(':'))
        .and_then(|(w, h)| Some((w.trim().parse::<f64>().ok()?, h.trim().parse::<f64>().ok()?)));

    let ratio = match parts {
        Some((_, h)) if h == 0.0 => None,
        Some((w, h)) => Some(w / h),
        None => value.trim().parse::<f64>().ok(),
    };

    match ratio {
        Some(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            log::warn!("invalid ratio value '{}' was ignored", value);
            None
        }
    }
}

/// Canonicalizes a CSS color so spelling variants share a cache key.
fn canonical_color(value: &str) -> Option<String> {
    match svgtypes::Color::from_str(value) {
        Ok(color) => {
            if color.alpha == 255 {
                Some(format!(
                    "#{:02x}{:02x}{:02x}",
                    color.red, color.green, color.blue
                ))
            } else {
                Some(format!(
                    "#{:02x}{:02x}{:02x}{:02x}",
                    color.red, color.green, color.blue, color.alpha
                ))
            }
        }
        Err(_) => {
            log::warn!("invalid color value '{}' was ignored", value);
            None
        }
    }
}

fn parse_aspect_ratio(value: &str) -> Option<String> {
    match svgtypes::AspectRatio::from_str(value) {
        Ok(_) => Some(value.to_string()),
        Err(_) => {
            log::warn!("invalid preserveAspectRatio value '{}' was ignored", value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_canonical() {
        let a = FetchRequest::from_query([("w", "24"), ("color", "red"), ("type", "icon")]);
        let b = FetchRequest::from_query([("type", "icon"), ("color", "#ff0000"), ("width", "24")]);
        assert_eq!(a.canonical_query(), b.canonical_query());
        assert_eq!(a.canonical_query(), "color=#ff0000&type=icon&width=24");
    }

    #[test]
    fn ratio_forms() {
        assert_eq!(parse_ratio("16x9"), Some(16.0 / 9.0));
        assert_eq!(parse_ratio("16:9"), Some(16.0 / 9.0));
        assert_eq!(parse_ratio("1.5"), Some(1.5));
        assert_eq!(parse_ratio("0"), None);
        assert_eq!(parse_ratio("16x0"), None);
        assert_eq!(parse_ratio("wide"), None);
    }

    #[test]
    fn bad_arguments_are_dropped() {
        let request = FetchRequest::from_query([
            ("width", "not-a-number"),
            ("height", "0"),
            ("color", "#zzz"),
            ("zoom", "nan"),
        ]);
        assert_eq!(request.width, None);
        assert_eq!(request.height, None);
        assert_eq!(request.color, None);
        assert_eq!(request.zoom, None);
    }

    #[test]
    fn cache_key_is_stable_and_sensitive() {
        let key = cache_key("a.svg", "100-200", "width=24");
        assert_eq!(key, cache_key("a.svg", "100-200", "width=24"));
        assert_ne!(key, cache_key("a.svg", "100-201", "width=24"));
        assert_ne!(key, cache_key("a.svg", "100-200", "width=25"));
        assert_ne!(key, cache_key("b.svg", "100-200", "width=24"));
    }
}
