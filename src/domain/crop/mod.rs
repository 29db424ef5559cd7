// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/crop/mod.rs
//
// Crop geometry: pointer state, selection rectangle, display mapping.

mod mapping;
mod region;
mod selection;

pub use mapping::{DisplayMapping, Point};
pub use region::CropRegion;
pub use selection::{CropSelection, SelectionRect};
