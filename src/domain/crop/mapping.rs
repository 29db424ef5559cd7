// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/mapping.rs
//
// Mapping between pointer (display) space and image-pixel space.

/// A position in either display or image-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Where and how large the source image is rendered on screen.
///
/// The rendered size may differ from the native pixel size on either axis,
/// so each axis carries its own scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapping {
    /// Top-left of the rendered image in pointer coordinates.
    pub left: f32,
    pub top: f32,
    /// Rendered on-screen size.
    pub rendered_width: f32,
    pub rendered_height: f32,
    /// Native pixel size of the source image.
    pub image_width: u32,
    pub image_height: u32,
}

impl DisplayMapping {
    pub fn new(
        left: f32,
        top: f32,
        rendered_width: f32,
        rendered_height: f32,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        Self {
            left,
            top,
            rendered_width,
            rendered_height,
            image_width,
            image_height,
        }
    }

    /// Image drawn 1:1 at the pointer origin.
    pub fn native(image_width: u32, image_height: u32) -> Self {
        Self::new(
            0.0,
            0.0,
            image_width as f32,
            image_height as f32,
            image_width,
            image_height,
        )
    }

    /// Image fitted (contain) and centered inside a viewport, letterboxed on
    /// the axis with spare room.
    pub fn fit(
        bounds_x: f32,
        bounds_y: f32,
        bounds_width: f32,
        bounds_height: f32,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        if image_width == 0 || image_height == 0 {
            return Self::new(bounds_x, bounds_y, 0.0, 0.0, image_width, image_height);
        }

        let scale_x = bounds_width / image_width as f32;
        let scale_y = bounds_height / image_height as f32;
        let scale = scale_x.min(scale_y);

        let rendered_width = image_width as f32 * scale;
        let rendered_height = image_height as f32 * scale;
        let offset_x = (bounds_width - rendered_width) / 2.0;
        let offset_y = (bounds_height - rendered_height) / 2.0;

        Self::new(
            bounds_x + offset_x,
            bounds_y + offset_y,
            rendered_width,
            rendered_height,
            image_width,
            image_height,
        )
    }

    /// Image pixels per display unit, horizontally.
    pub fn scale_x(&self) -> f32 {
        axis_ratio(self.image_width, self.rendered_width)
    }

    /// Image pixels per display unit, vertically.
    pub fn scale_y(&self) -> f32 {
        axis_ratio(self.image_height, self.rendered_height)
    }

    /// Map a pointer position to image-pixel coordinates.
    ///
    /// Not clamped: a pointer beyond the rendered image maps beyond the
    /// image bounds, and the crop step decides what to do with it.
    pub fn to_image_coords(&self, pointer: Point) -> Point {
        Point::new(
            (pointer.x - self.left) * self.scale_x(),
            (pointer.y - self.top) * self.scale_y(),
        )
    }
}

fn axis_ratio(native: u32, rendered: f32) -> f32 {
    // Collapsed layouts (zero size) fall back to 1:1.
    if rendered > 0.0 {
        native as f32 / rendered
    } else {
        1.0
    }
}
