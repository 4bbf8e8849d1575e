// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Source resolution and cache orchestration.
//!
//! The cache store itself and the icon download are host concerns,
//! kept behind the [`FetchCache`] and [`IconStore`] traits. Two
//! concurrent fetches for the same key do redundant work rather than
//! coordinating; the transform is pure, so both produce the same
//! bytes.

use std::collections::HashMap;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use siphasher::sip::SipHasher13;

use crate::pipeline::SvgPipeline;
use crate::request::{cache_key, FetchRequest};
use crate::{Error, Options};

/// Origin of the SVG bytes. Immutable once set.
#[derive(Clone, Debug)]
pub enum SvgSource {
    /// A file on disk. Its mtime feeds the buster token.
    File(PathBuf),
    /// Generated markup with an addressing name.
    Markup {
        /// Addressing name, stands in for a file stem.
        name: String,
        /// The SVG markup.
        text: String,
    },
}

impl SvgSource {
    /// A source backed by a file.
    pub fn file<P: Into<PathBuf>>(path: P) -> Self {
        SvgSource::File(path.into())
    }

    /// A source backed by generated markup.
    pub fn markup(name: &str, text: &str) -> Self {
        SvgSource::Markup {
            name: name.to_string(),
            text: text.to_string(),
        }
    }

    /// The addressing name: the file stem, or the markup name.
    pub fn name(&self) -> String {
        match self {
            SvgSource::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            SvgSource::Markup { name, .. } => name.clone(),
        }
    }

    /// A stable identity string, part of the cache key.
    pub fn identity(&self) -> String {
        match self {
            SvgSource::File(path) => path.to_string_lossy().into_owned(),
            SvgSource::Markup { name, .. } => format!("markup:{}", name),
        }
    }

    /// Reads the source markup.
    pub fn read(&self) -> Result<String, Error> {
        match self {
            SvgSource::File(path) => Ok(std::fs::read_to_string(path)?),
            SvgSource::Markup { text, .. } => Ok(text.clone()),
        }
    }
}

/// Resolves icon names to files, downloading on demand if need be.
///
/// The network part lives with the host; this crate only consumes the
/// resolved path.
pub trait IconStore {
    /// Returns the path of a named icon, when available.
    fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// An icon store over a local directory: `name` → `<dir>/<name>.svg`.
#[derive(Clone, Debug)]
pub struct DirIconStore {
    dir: PathBuf,
}

impl DirIconStore {
    /// Creates a store over a directory.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        DirIconStore { dir: dir.into() }
    }
}

impl IconStore for DirIconStore {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        let path = self.dir.join(format!("{}.svg", name));
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }
}

/// A key→bytes cache for transformed documents.
pub trait FetchCache {
    /// Returns cached bytes for a key.
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    /// Stores bytes under a key.
    fn store(&mut self, key: &str, bytes: &[u8]);
}

/// A process-local cache, used by tests and the CLI.
#[derive(Default, Debug)]
pub struct MemoryCache {
    map: HashMap<String, Vec<u8>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        MemoryCache::default()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Checks that the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FetchCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.map.get(key).cloned()
    }

    fn store(&mut self, key: &str, bytes: &[u8]) {
        self.map.insert(key.to_string(), bytes.to_vec());
    }
}

/// Runs fetches against one configuration.
#[derive(Clone, Debug)]
pub struct Fetcher {
    options: Options,
    config_path: Option<PathBuf>,
}

impl Fetcher {
    /// Creates a fetcher over resolved options.
    pub fn new(options: Options) -> Self {
        Fetcher {
            options,
            config_path: None,
        }
    }

    /// Tracks the site configuration file: any change to it busts
    /// every cached derivative.
    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// The options the fetcher runs with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Resolves the source for a name-only request via the icon store.
    pub fn resolve_source(
        &self,
        request: &FetchRequest,
        icons: &dyn IconStore,
    ) -> Result<SvgSource, Error> {
        let name = request
            .name
            .as_deref()
            .ok_or_else(|| Error::IconNotFound(String::new()))?;

        icons
            .locate(name)
            .map(SvgSource::File)
            .ok_or_else(|| Error::IconNotFound(name.to_string()))
    }

    /// Returns the transformed bytes for a source/request pair,
    /// from cache when possible.
    pub fn fetch(
        &self,
        source: &SvgSource,
        request: &FetchRequest,
        cache: &mut dyn FetchCache,
    ) -> Result<Vec<u8>, Error> {
        let buster = self.buster(source);
        let key = cache_key(&source.identity(), &buster, &request.canonical_query());

        if let Some(bytes) = cache.get(&key) {
            return Ok(bytes);
        }

        let text = source.read()?;
        let mut pipeline = SvgPipeline::new(
            &text,
            &source.name(),
            self.in_icon_directory(source),
            request.clone(),
            self.options.clone(),
        )?;
        pipeline.process();

        let bytes = pipeline.markup().into_bytes();
        cache.store(&key, &bytes);
        Ok(bytes)
    }

    fn in_icon_directory(&self, source: &SvgSource) -> bool {
        match source {
            SvgSource::File(path) => self
                .options
                .icon_directories
                .iter()
                .any(|dir| path.starts_with(dir)),
            SvgSource::Markup { .. } => false,
        }
    }

    /// Source stamp plus configuration mtime. A site-wide config
    /// change invalidates all cached derivatives.
    ///
    /// A markup source has no mtime; its content hash stands in, so
    /// two markups sharing a name never share a cache entry.
    fn buster(&self, source: &SvgSource) -> String {
        let source_stamp = match source {
            SvgSource::File(path) => mtime_seconds(path),
            SvgSource::Markup { text, .. } => content_stamp(text),
        };
        let config_stamp = self
            .config_path
            .as_deref()
            .map(mtime_seconds)
            .unwrap_or(0);

        format!("{}-{}", source_stamp, config_stamp)
    }
}

fn content_stamp(text: &str) -> u64 {
    let mut hasher = SipHasher13::new();
    hasher.write(text.as_bytes());
    hasher.finish()
}

fn mtime_seconds(path: &Path) -> u64 {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
