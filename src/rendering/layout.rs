//! Placement of the composition layers inside the square

use crate::FrameGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The frame fills the square; the avatar sits centered on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub frame: Rect,
    pub avatar: Rect,
}

impl FrameLayout {
    pub fn new(geometry: FrameGeometry) -> Self {
        let inset = geometry.avatar_inset();
        let avatar = geometry.avatar_size();
        FrameLayout {
            frame: Rect {
                x: 0,
                y: 0,
                width: geometry.size,
                height: geometry.size,
            },
            avatar: Rect {
                x: inset,
                y: inset,
                width: avatar,
                height: avatar,
            },
        }
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }
}
