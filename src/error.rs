// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// Failed to parse an SVG data.
    ParsingFailed(svgxml::Error),

    /// The document is well-formed XML, but its root element is not
    /// an `svg` one.
    NotAnSvg,

    /// SVG doesn't have a valid size.
    ///
    /// Occurs when neither the `viewBox` nor the `width`/`height`
    /// attributes resolve to positive integers.
    InvalidSize,

    /// A named icon is not present in the icon store.
    IconNotFound(String),

    /// Failed to read the SVG source.
    Io(std::io::Error),
}

impl From<svgxml::Error> for Error {
    fn from(e: svgxml::Error) -> Self {
        Error::ParsingFailed(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::ParsingFailed(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
            Error::NotAnSvg => {
                write!(f, "the root element is not an 'svg' element")
            }
            Error::InvalidSize => {
                write!(f, "SVG has an invalid size")
            }
            Error::IconNotFound(ref name) => {
                write!(f, "icon '{}' was not found", name)
            }
            Error::Io(ref e) => {
                write!(f, "failed to read the SVG source cause {}", e)
            }
        }
    }
}

impl std::error::Error for Error {}
