// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/cropper/mod.rs
//
// Region selector / crop tool: turns a pointer drag over a displayed image
// into a cropped PNG, with a live preview frame.

mod canvas;
mod loader;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage, imageops};

pub use canvas::PreviewCanvas;
pub use loader::{DecodeError, SourceImage, load_image};

use crate::app::message::CropMessage;
use crate::constant::CROP_OUTPUT_MIME;
use crate::domain::crop::{CropRegion, CropSelection, DisplayMapping, Point, SelectionRect};
use crate::domain::media;

/// Receiver of the tool's two exits.
pub trait CropHost {
    /// A selection was confirmed. Called once per successful confirm.
    fn on_cropped(&mut self, image: CroppedImage);

    /// The tool was cancelled without output.
    fn on_closed(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropPhase {
    Idle,
    Dragging,
    Closed,
}

/// Encoded crop output, owned by the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImage {
    pub region: CropRegion,
    pub png: Vec<u8>,
}

impl CroppedImage {
    pub fn width(&self) -> u32 {
        self.region.width
    }

    pub fn height(&self) -> u32 {
        self.region.height
    }

    pub fn to_base64(&self) -> String {
        media::to_base64(&self.png)
    }

    pub fn to_data_url(&self) -> String {
        media::to_data_url(CROP_OUTPUT_MIME, &self.png)
    }
}

/// Crop tool session over one decoded source image.
///
/// A tool only exists once its source is decoded, so pointer input can
/// never arrive before the pixels are paintable.
pub struct CropTool {
    source: SourceImage,
    pixels: RgbaImage,
    mapping: DisplayMapping,
    selection: CropSelection,
    canvas: PreviewCanvas,
    closed: bool,
}

impl CropTool {
    /// Start a session, with the image displayed at its native size.
    pub fn new(source: SourceImage) -> Self {
        let (width, height) = source.dimensions();
        let pixels = source.to_rgba8();
        let canvas = PreviewCanvas::new(&pixels);

        Self {
            source,
            pixels,
            mapping: DisplayMapping::native(width, height),
            selection: CropSelection::default(),
            canvas,
            closed: false,
        }
    }

    /// Load `url` and start a session over it.
    pub async fn open(url: &str) -> Result<Self, DecodeError> {
        Ok(Self::new(load_image(url).await?))
    }

    /// Record where, and how large, the host renders the image.
    pub fn set_display(&mut self, left: f32, top: f32, rendered_width: f32, rendered_height: f32) {
        let (width, height) = self.source.dimensions();
        self.mapping =
            DisplayMapping::new(left, top, rendered_width, rendered_height, width, height);
    }

    /// Fit the image (contain) into a host viewport.
    pub fn fit_display(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let (img_width, img_height) = self.source.dimensions();
        self.mapping = DisplayMapping::fit(x, y, width, height, img_width, img_height);
    }

    pub fn phase(&self) -> CropPhase {
        if self.closed {
            CropPhase::Closed
        } else if self.selection.is_dragging() {
            CropPhase::Dragging
        } else {
            CropPhase::Idle
        }
    }

    pub fn selection(&self) -> SelectionRect {
        self.selection.rect
    }

    /// Normalized, clamped pixel region that a confirm would produce.
    pub fn region(&self) -> Option<CropRegion> {
        let (width, height) = self.source.dimensions();
        self.selection.as_pixel_rect(width, height)
    }

    /// Whether the confirm control is enabled.
    pub fn can_confirm(&self) -> bool {
        !self.closed && self.region().is_some()
    }

    /// Current preview frame.
    pub fn frame(&self) -> &RgbaImage {
        self.canvas.frame()
    }

    /// Pointer pressed over the display surface.
    pub fn begin(&mut self, pointer: Point) {
        if self.closed {
            return;
        }
        let origin = self.mapping.to_image_coords(pointer);
        self.selection.start_new_selection(origin);
        self.canvas.clear(&self.pixels);
        log::debug!("Crop drag started at ({:.1}, {:.1})", origin.x, origin.y);
    }

    /// Pointer moved. Returns `true` when the preview was redrawn.
    pub fn update(&mut self, pointer: Point) -> bool {
        if self.closed {
            return false;
        }
        let current = self.mapping.to_image_coords(pointer);
        if !self.selection.update_drag(current) {
            return false;
        }
        self.canvas.repaint(&self.pixels, &self.selection.rect);
        true
    }

    /// Pointer released. The selection stays available for confirm.
    pub fn end(&mut self) {
        if self.selection.is_dragging() {
            self.selection.end_drag();
            let rect = self.selection.rect;
            log::debug!(
                "Crop drag ended: x={:.1} y={:.1} w={:.1} h={:.1}",
                rect.x,
                rect.y,
                rect.w,
                rect.h
            );
        }
    }

    /// Copy the selected pixels into a new PNG and hand it to `host`.
    ///
    /// Does nothing (returns `Ok(false)`) while confirm is disabled.
    pub fn confirm<H: CropHost + ?Sized>(&mut self, host: &mut H) -> Result<bool, image::ImageError> {
        if self.closed {
            return Ok(false);
        }
        let Some(region) = self.region() else {
            log::debug!("Crop confirm ignored: nothing selected");
            return Ok(false);
        };

        let (x, y, width, height) = region.as_tuple();
        let cropped = imageops::crop_imm(&self.pixels, x, y, width, height).to_image();

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(cropped).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        log::info!("Cropped {width}x{height} at ({x}, {y})");
        self.closed = true;
        host.on_cropped(CroppedImage { region, png });
        Ok(true)
    }

    /// Dismiss the tool without output.
    pub fn cancel<H: CropHost + ?Sized>(&mut self, host: &mut H) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.selection.reset();
        host.on_closed();
    }

    /// Dispatch one host event.
    pub fn handle<H: CropHost + ?Sized>(
        &mut self,
        message: CropMessage,
        host: &mut H,
    ) -> Result<(), image::ImageError> {
        match message {
            CropMessage::DragStart { x, y } => self.begin(Point::new(x, y)),
            CropMessage::DragMove { x, y } => {
                self.update(Point::new(x, y));
            }
            CropMessage::DragEnd => self.end(),
            CropMessage::Resize {
                left,
                top,
                width,
                height,
            } => self.set_display(left, top, width, height),
            CropMessage::Apply => {
                self.confirm(host)?;
            }
            CropMessage::Cancel => self.cancel(host),
        }
        Ok(())
    }
}
