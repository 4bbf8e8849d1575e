// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svgfetch` turns a source SVG into a cacheable derivative.

Given a file or generated markup and a set of request parameters
(width, height, ratio, zoom, color, type, ...), it:

1. derives the intrinsic dimensions and classifies the document as an
   icon, tile or illustration;
2. rewrites fill/stroke colors, including the `currentColor`
   convention for icons;
3. crops or zooms via `viewBox` manipulation;
4. strips editor namespaces, default attributes and configured
   elements for size;
5. serializes deterministic bytes, keyed by the full parameter
   surface for caching.

The transform is pure: identical input bytes and parameters always
produce identical output bytes.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use svgxml;

pub mod classify;
pub mod color;
pub mod geom;
pub mod optimize;

mod error;
mod fetch;
mod options;
mod pipeline;
mod request;

pub use error::Error;
pub use fetch::{DirIconStore, FetchCache, Fetcher, IconStore, MemoryCache, SvgSource};
pub use options::Options;
pub use pipeline::SvgPipeline;
pub use request::{cache_key, parse_ratio, FetchRequest};
