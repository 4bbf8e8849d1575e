// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Target dimension resolution.
//!
//! Pure functions only. All width/height values are rounded to the
//! nearest integer, half away from zero. Truncation is forbidden here:
//! the cache token is derived from these values, so a silently
//! shrunken dimension would produce a key mismatch.

/// An intrinsic document size, in pixels.
///
/// Guaranteed to be positive by the loader.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct IntrinsicSize {
    /// Intrinsic width.
    pub width: u32,
    /// Intrinsic height.
    pub height: u32,
}

impl IntrinsicSize {
    /// Creates a new size. Returns `None` when a dimension is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        Some(IntrinsicSize { width, height })
    }

    /// Width/height ratio.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Checks that the size is a square.
    #[inline]
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

#[inline]
fn round(value: f64) -> u32 {
    // `f64::round` rounds half away from zero, which is exactly
    // the rounding rule we need.
    value.round().max(1.0) as u32
}

/// Resolves the target width for a request.
///
/// Resolution order: the requested width; the requested height scaled
/// by the ratio; the cropping box for a bare ratio; the intrinsic width.
pub fn target_width(
    intrinsic: IntrinsicSize,
    requested_width: Option<u32>,
    requested_height: Option<u32>,
    requested_ratio: Option<f64>,
) -> u32 {
    if let Some(width) = requested_width {
        return width;
    }

    if let Some(height) = requested_height {
        let ratio = requested_ratio.unwrap_or_else(|| intrinsic.ratio());
        return round(ratio * height as f64);
    }

    if let Some(ratio) = requested_ratio {
        return cropping_dimensions(ratio, intrinsic).0;
    }

    intrinsic.width
}

/// Resolves the target height for a request. Symmetric to [`target_width`].
pub fn target_height(
    intrinsic: IntrinsicSize,
    requested_width: Option<u32>,
    requested_height: Option<u32>,
    requested_ratio: Option<f64>,
) -> u32 {
    if let Some(height) = requested_height {
        return height;
    }

    if let Some(width) = requested_width {
        let ratio = requested_ratio.unwrap_or_else(|| intrinsic.ratio());
        return round(width as f64 / ratio);
    }

    if let Some(ratio) = requested_ratio {
        return cropping_dimensions(ratio, intrinsic).1;
    }

    intrinsic.height
}

/// Computes the crop box for a target ratio, anchored at (0,0).
///
/// Crops by width first: `height = round(width / ratio)`. When that
/// height would exceed the intrinsic one, crops by height instead.
/// The result never exceeds the intrinsic box in either dimension.
pub fn cropping_dimensions(target_ratio: f64, intrinsic: IntrinsicSize) -> (u32, u32) {
    let target_ratio = if target_ratio > 0.0 {
        target_ratio
    } else {
        log::warn!("non-positive target ratio {}, falling back to 1", target_ratio);
        1.0
    };

    let height = round(intrinsic.width as f64 / target_ratio);
    if height <= intrinsic.height {
        (intrinsic.width, height)
    } else {
        let width = round(target_ratio * intrinsic.height as f64);
        (width.min(intrinsic.width), intrinsic.height)
    }
}

/// Checks two dimensions against a target ratio with a 1px tolerance.
///
/// The tolerance absorbs integer rounding. A violation is a logging
/// matter for the caller, never a fatal one.
pub fn ratio_matches(width: u32, height: u32, target_ratio: f64) -> bool {
    if target_ratio <= 0.0 {
        return false;
    }

    let width = width as f64;
    let height = height as f64;
    (height * target_ratio - width).abs() <= 1.0 || (width / target_ratio - height).abs() <= 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: u32, h: u32) -> IntrinsicSize {
        IntrinsicSize::new(w, h).unwrap()
    }

    #[test]
    fn height_is_rounded_not_truncated() {
        // 11 / 3 = 3.666... must become 4, not 3.
        assert_eq!(target_height(size(100, 100), Some(11), None, Some(3.0)), 4);
        assert_eq!(target_height(size(37, 37), Some(37), None, Some(1.0)), 37);
    }

    #[test]
    fn width_from_height_uses_ratio() {
        assert_eq!(target_width(size(100, 50), None, Some(30), None), 60);
        assert_eq!(target_width(size(100, 50), None, Some(30), Some(1.0)), 30);
    }

    #[test]
    fn explicit_request_wins() {
        assert_eq!(target_width(size(100, 50), Some(640), None, None), 640);
        assert_eq!(target_height(size(100, 50), None, Some(480), None), 480);
    }

    #[test]
    fn falls_back_to_intrinsic() {
        assert_eq!(target_width(size(100, 50), None, None, None), 100);
        assert_eq!(target_height(size(100, 50), None, None, None), 50);
    }

    #[test]
    fn crop_by_width_first() {
        // 100x100 at 16:9 crops the height: round(100 / 1.777...) = 56.
        let (w, h) = cropping_dimensions(16.0 / 9.0, size(100, 100));
        assert_eq!((w, h), (100, 56));
    }

    #[test]
    fn crop_falls_back_to_height() {
        // A portrait ratio on a landscape box cannot crop by width.
        let (w, h) = cropping_dimensions(0.5, size(100, 50));
        assert_eq!((w, h), (25, 50));
    }

    #[test]
    fn crop_never_exceeds_intrinsic() {
        let sizes = [(100u32, 100u32), (24, 24), (333, 87), (87, 333), (1, 1)];
        let ratios = [0.1, 0.5, 1.0, 16.0 / 9.0, 4.0 / 3.0, 10.0];
        for &(iw, ih) in &sizes {
            for &ratio in &ratios {
                let (w, h) = cropping_dimensions(ratio, size(iw, ih));
                assert!(w <= iw, "w={} iw={} ratio={}", w, iw, ratio);
                assert!(h <= ih, "h={} ih={} ratio={}", h, ih, ratio);
            }
        }
    }

    #[test]
    fn ratio_tolerance() {
        assert!(ratio_matches(100, 56, 16.0 / 9.0));
        assert!(ratio_matches(100, 100, 1.0));
        assert!(!ratio_matches(100, 30, 1.0));
    }
}
