// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/message.rs
//
// Crop tool messages: pointer events and user actions from the host.

/// Event delivered to a [`crate::app::cropper::CropTool`].
///
/// Coordinates are in the host's pointer space; the tool maps them to
/// image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropMessage {
    // Pointer.
    DragStart { x: f32, y: f32 },
    DragMove { x: f32, y: f32 },
    DragEnd,

    // Layout.
    Resize {
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    },

    // Actions.
    Apply,
    Cancel,
}

impl CropMessage {
    /// Pointer events for one press-move-release gesture.
    pub fn drag(from: (f32, f32), via: &[(f32, f32)], to: (f32, f32)) -> Vec<Self> {
        let mut messages = Vec::with_capacity(via.len() + 3);
        messages.push(Self::DragStart {
            x: from.0,
            y: from.1,
        });
        messages.extend(via.iter().map(|&(x, y)| Self::DragMove { x, y }));
        messages.push(Self::DragMove { x: to.0, y: to.1 });
        messages.push(Self::DragEnd);
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_expands_to_press_moves_release() {
        let messages = CropMessage::drag((1.0, 2.0), &[(3.0, 4.0)], (5.0, 6.0));
        assert_eq!(
            messages,
            vec![
                CropMessage::DragStart { x: 1.0, y: 2.0 },
                CropMessage::DragMove { x: 3.0, y: 4.0 },
                CropMessage::DragMove { x: 5.0, y: 6.0 },
                CropMessage::DragEnd,
            ]
        );
    }
}
