// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/cropper/canvas.rs
//
// Live preview surface: dimmed overlay, exposed selection, border.

use image::{Rgba, RgbaImage};

use crate::constant::{CROP_BORDER_COLOR, CROP_BORDER_WIDTH, CROP_OVERLAY_ALPHA};
use crate::domain::crop::SelectionRect;

/// Half-open pixel rectangle on the canvas, clamped to its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl PixelRect {
    fn clamped(left: f32, top: f32, right: f32, bottom: f32, width: u32, height: u32) -> Self {
        let clamp = |v: f32, max: u32| -> u32 {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let v = v.max(0.0).min(max as f32) as u32;
            v
        };

        Self {
            left: clamp(left.floor(), width),
            top: clamp(top.floor(), height),
            right: clamp(right.ceil(), width),
            bottom: clamp(bottom.ceil(), height),
        }
    }

    fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }
}

/// Preview frame at the source's native size.
///
/// Every redraw starts from the source pixels, so nothing from an earlier
/// frame survives a repaint.
#[derive(Debug, Clone)]
pub struct PreviewCanvas {
    frame: RgbaImage,
}

impl PreviewCanvas {
    pub fn new(source: &RgbaImage) -> Self {
        Self {
            frame: source.clone(),
        }
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Show the untouched source.
    pub fn clear(&mut self, source: &RgbaImage) {
        self.frame.clone_from(source);
    }

    /// Full repaint: source, dark mask, re-exposed selection, border.
    pub fn repaint(&mut self, source: &RgbaImage, selection: &SelectionRect) {
        self.clear(source);
        self.draw_overlay();

        let (x, y, w, h) = selection.normalized();
        let (width, height) = self.frame.dimensions();
        let exposed = PixelRect::clamped(x, y, x + w, y + h, width, height);

        self.expose(source, exposed);
        self.draw_border(x, y, w, h);
    }

    fn draw_overlay(&mut self) {
        let keep = 1.0 - CROP_OVERLAY_ALPHA;
        for pixel in self.frame.pixels_mut() {
            let Rgba([r, g, b, a]) = *pixel;
            *pixel = Rgba([
                scale_channel(r, keep),
                scale_channel(g, keep),
                scale_channel(b, keep),
                // Black at CROP_OVERLAY_ALPHA composited over the pixel.
                scale_channel(a, keep).saturating_add(scale_channel(u8::MAX, CROP_OVERLAY_ALPHA)),
            ]);
        }
    }

    fn expose(&mut self, source: &RgbaImage, rect: PixelRect) {
        if rect.is_empty() {
            return;
        }
        for y in rect.top..rect.bottom {
            for x in rect.left..rect.right {
                self.frame.put_pixel(x, y, *source.get_pixel(x, y));
            }
        }
    }

    fn draw_border(&mut self, x: f32, y: f32, w: f32, h: f32) {
        if w == 0.0 && h == 0.0 {
            return;
        }

        // Stroke is centered on the selection edge.
        let half = CROP_BORDER_WIDTH / 2.0;
        let (width, height) = self.frame.dimensions();
        let outer = PixelRect::clamped(x - half, y - half, x + w + half, y + h + half, width, height);
        let inner = PixelRect::clamped(x + half, y + half, x + w - half, y + h - half, width, height);

        for py in outer.top..outer.bottom {
            for px in outer.left..outer.right {
                if inner.is_empty() || !inner.contains(px, py) {
                    self.frame.put_pixel(px, py, CROP_BORDER_COLOR);
                }
            }
        }
    }
}

fn scale_channel(value: u8, factor: f32) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = (f32::from(value) * factor).round() as u8;
    scaled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crop::Point;

    fn source() -> RgbaImage {
        RgbaImage::from_pixel(40, 30, Rgba([200, 100, 50, 255]))
    }

    #[test]
    fn repaint_dims_outside_and_exposes_inside() {
        let source = source();
        let mut canvas = PreviewCanvas::new(&source);
        let rect = SelectionRect::between(Point::new(10.0, 10.0), Point::new(30.0, 25.0));

        canvas.repaint(&source, &rect);

        let frame = canvas.frame();
        assert_eq!(*frame.get_pixel(20, 18), Rgba([200, 100, 50, 255]));
        assert_eq!(*frame.get_pixel(1, 1), Rgba([100, 50, 25, 255]));
        assert_eq!(*frame.get_pixel(10, 18), CROP_BORDER_COLOR);
        assert_eq!(*frame.get_pixel(29, 18), CROP_BORDER_COLOR);
    }

    #[test]
    fn reversed_rect_exposes_same_pixels() {
        let source = source();
        let mut forward = PreviewCanvas::new(&source);
        let mut backward = PreviewCanvas::new(&source);

        forward.repaint(
            &source,
            &SelectionRect::between(Point::new(5.0, 5.0), Point::new(25.0, 20.0)),
        );
        backward.repaint(
            &source,
            &SelectionRect::between(Point::new(25.0, 20.0), Point::new(5.0, 5.0)),
        );

        assert_eq!(forward.frame(), backward.frame());
    }

    #[test]
    fn repaint_does_not_accumulate() {
        let source = source();
        let mut canvas = PreviewCanvas::new(&source);
        let first = SelectionRect::between(Point::new(0.0, 0.0), Point::new(20.0, 20.0));
        let second = SelectionRect::between(Point::new(22.0, 2.0), Point::new(38.0, 28.0));

        canvas.repaint(&source, &first);
        canvas.repaint(&source, &second);

        let mut fresh = PreviewCanvas::new(&source);
        fresh.repaint(&source, &second);
        assert_eq!(canvas.frame(), fresh.frame());
    }

    #[test]
    fn clear_restores_source() {
        let source = source();
        let mut canvas = PreviewCanvas::new(&source);
        canvas.repaint(
            &source,
            &SelectionRect::between(Point::new(1.0, 1.0), Point::new(9.0, 9.0)),
        );
        canvas.clear(&source);
        assert_eq!(canvas.frame(), &source);
    }
}
