// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/region.rs
//
// Crop region domain model.

/// Crop region in whole image pixels.
///
/// Pure domain model: a normalized rectangle (top-left origin, non-negative
/// size) that can be copied out of a source raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    #[cfg(test)]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }

    /// Check if region has valid dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Build a region from signed pixel edges, clamped to `img_width` x `img_height`.
    ///
    /// Edges outside the image are pulled back onto it; a rectangle lying
    /// entirely outside yields an empty (invalid) region.
    pub fn clamped(left: i64, top: i64, right: i64, bottom: i64, img_width: u32, img_height: u32) -> Self {
        let max_x = i64::from(img_width);
        let max_y = i64::from(img_height);

        let left = left.clamp(0, max_x);
        let right = right.clamp(0, max_x);
        let top = top.clamp(0, max_y);
        let bottom = bottom.clamp(0, max_y);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self {
            x: left as u32,
            y: top as u32,
            width: (right - left).max(0) as u32,
            height: (bottom - top).max(0) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_keeps_in_bounds_rect() {
        let region = CropRegion::clamped(10, 20, 110, 70, 200, 100);
        assert_eq!(region.as_tuple(), (10, 20, 100, 50));
        assert!(region.is_valid());
    }

    #[test]
    fn clamped_trims_overhang() {
        let region = CropRegion::clamped(-30, 50, 250, 140, 200, 100);
        assert_eq!(region.as_tuple(), (0, 50, 200, 50));
    }

    #[test]
    fn clamped_rect_outside_image_is_empty() {
        let region = CropRegion::clamped(300, 10, 400, 60, 200, 100);
        assert_eq!(region.width, 0);
        assert!(!region.is_valid());
    }
}
