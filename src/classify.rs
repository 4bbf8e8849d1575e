// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::geom::IntrinsicSize;

/// A square document smaller than this is structurally an icon.
pub const ICON_STRUCTURE_LIMIT: u32 = 400;

/// What the document *is*, derived from its intrinsic geometry.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StructureKind {
    /// A small square drawing.
    Icon,
    /// Everything else.
    Illustration,
}

/// How the result should be laid out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UsageKind {
    /// Inline, text-sized.
    Icon,
    /// A fixed-size block, e.g. a card logo.
    Tile,
    /// A responsive, full-width image.
    Illustration,
}

impl UsageKind {
    /// Parses the `type` request parameter.
    pub fn from_request(text: &str) -> Option<Self> {
        match text {
            "icon" => Some(UsageKind::Icon),
            "tile" => Some(UsageKind::Tile),
            "illustration" => Some(UsageKind::Illustration),
            _ => None,
        }
    }

    /// The canonical query value.
    pub fn as_str(&self) -> &'static str {
        match self {
            UsageKind::Icon => "icon",
            UsageKind::Tile => "tile",
            UsageKind::Illustration => "illustration",
        }
    }
}

/// Derives the structural type of a document.
///
/// A small square is an icon. Anything else is an illustration, unless
/// the source lives in an icon directory or the request forces the
/// icon type.
pub fn classify_structure(
    intrinsic: IntrinsicSize,
    in_icon_directory: bool,
    requested: Option<UsageKind>,
) -> StructureKind {
    if intrinsic.is_square() && intrinsic.width < ICON_STRUCTURE_LIMIT {
        return StructureKind::Icon;
    }

    if requested == Some(UsageKind::Icon) || in_icon_directory {
        StructureKind::Icon
    } else {
        StructureKind::Illustration
    }
}

/// Derives the usage type: the request wins, otherwise the structure
/// maps onto itself.
pub fn classify_usage(structure: StructureKind, requested: Option<UsageKind>) -> UsageKind {
    if let Some(usage) = requested {
        return usage;
    }

    match structure {
        StructureKind::Icon => UsageKind::Icon,
        StructureKind::Illustration => UsageKind::Illustration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> IntrinsicSize {
        IntrinsicSize::new(w, h).unwrap()
    }

    #[test]
    fn small_square_is_icon() {
        assert_eq!(
            classify_structure(size(24, 24), false, None),
            StructureKind::Icon
        );
        assert_eq!(
            classify_structure(size(399, 399), false, None),
            StructureKind::Icon
        );
    }

    #[test]
    fn large_or_non_square_is_illustration() {
        assert_eq!(
            classify_structure(size(400, 400), false, None),
            StructureKind::Illustration
        );
        assert_eq!(
            classify_structure(size(24, 48), false, None),
            StructureKind::Illustration
        );
    }

    #[test]
    fn icon_directory_forces_icon() {
        assert_eq!(
            classify_structure(size(800, 600), true, None),
            StructureKind::Icon
        );
    }

    #[test]
    fn requested_icon_type_forces_icon() {
        assert_eq!(
            classify_structure(size(800, 600), false, Some(UsageKind::Icon)),
            StructureKind::Icon
        );
        // A tile request does not.
        assert_eq!(
            classify_structure(size(800, 600), false, Some(UsageKind::Tile)),
            StructureKind::Illustration
        );
    }

    #[test]
    fn usage_defaults_from_structure() {
        assert_eq!(classify_usage(StructureKind::Icon, None), UsageKind::Icon);
        assert_eq!(
            classify_usage(StructureKind::Illustration, None),
            UsageKind::Illustration
        );
        assert_eq!(
            classify_usage(StructureKind::Icon, Some(UsageKind::Tile)),
            UsageKind::Tile
        );
    }
}
