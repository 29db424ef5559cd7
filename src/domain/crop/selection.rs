// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/selection.rs
//
// Pointer drag state and the selection rectangle derived from it.

use super::mapping::Point;
use super::region::CropRegion;

/// Transient pointer state, in image-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub origin: Point,
    pub current: Point,
    pub dragging: bool,
}

/// Rectangle spanned by a drag, in image-pixel coordinates.
///
/// `w` and `h` are signed: a drag up or to the left yields negative
/// values. Zero on either axis means "nothing selected".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl SelectionRect {
    pub fn between(origin: Point, current: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            w: current.x - origin.x,
            h: current.y - origin.y,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0.0 || self.h == 0.0
    }

    /// Top-left corner and absolute size, independent of drag direction.
    pub fn normalized(&self) -> (f32, f32, f32, f32) {
        let nx = if self.w >= 0.0 { self.x } else { self.x + self.w };
        let ny = if self.h >= 0.0 { self.y } else { self.y + self.h };
        (nx, ny, self.w.abs(), self.h.abs())
    }

    /// Whole-pixel region inside an `img_width` x `img_height` raster.
    ///
    /// The corner and the size are rounded separately so the output size is
    /// always `round(|w|) x round(|h|)` for in-bounds drags; whatever hangs
    /// past the image edges is clamped away.
    pub fn to_region(&self, img_width: u32, img_height: u32) -> CropRegion {
        let (nx, ny, nw, nh) = self.normalized();

        #[allow(clippy::cast_possible_truncation)]
        let (left, top, width, height) = (
            nx.round() as i64,
            ny.round() as i64,
            nw.round() as i64,
            nh.round() as i64,
        );

        CropRegion::clamped(
            left,
            top,
            left.saturating_add(width),
            top.saturating_add(height),
            img_width,
            img_height,
        )
    }
}

/// Selection state for one crop session.
#[derive(Debug, Clone, Default)]
pub struct CropSelection {
    pub pointer: PointerState,
    pub rect: SelectionRect,
}

impl CropSelection {
    /// Start a fresh drag at `at`, discarding any previous rectangle.
    pub fn start_new_selection(&mut self, at: Point) {
        self.pointer = PointerState {
            origin: at,
            current: at,
            dragging: true,
        };
        self.rect = SelectionRect::between(at, at);
    }

    /// Track the pointer while dragging. Returns `false` when idle.
    pub fn update_drag(&mut self, at: Point) -> bool {
        if !self.pointer.dragging {
            return false;
        }

        self.pointer.current = at;
        self.rect = SelectionRect::between(self.pointer.origin, at);
        true
    }

    /// Release the pointer; the rectangle is kept for confirmation.
    pub fn end_drag(&mut self) {
        self.pointer.dragging = false;
    }

    pub fn reset(&mut self) {
        self.pointer = PointerState::default();
        self.rect = SelectionRect::default();
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.dragging
    }

    pub fn as_pixel_rect(&self, img_width: u32, img_height: u32) -> Option<CropRegion> {
        if self.rect.is_empty() {
            return None;
        }

        Some(self.rect.to_region(img_width, img_height)).filter(CropRegion::is_valid)
    }
}
