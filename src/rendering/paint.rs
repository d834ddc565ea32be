//! Paint commands produced from a settled scene

use std::sync::Arc;

use image::{Rgba, RgbaImage};

use super::layout::{FrameLayout, Rect};
use super::scene::{Layer, Scene};
use crate::{Error, Result};

pub const SPINNER_TRACK: Rgba<u8> = Rgba([229, 231, 235, 255]);
pub const SPINNER_ARC: Rgba<u8> = Rgba([17, 24, 39, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    None,
    Circle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Draw an image object-cover into `rect`
    Image {
        rect: Rect,
        image: Arc<RgbaImage>,
        clip: Clip,
    },
    /// Loading indicator ring
    Spinner {
        rect: Rect,
        track: Rgba<u8>,
        arc: Rgba<u8>,
    },
}

fn command_for(layer: &Layer, rect: Rect, name: &str) -> Result<PaintCommand> {
    match layer {
        Layer::Ready(image) => Ok(PaintCommand::Image {
            rect,
            image: Arc::clone(image),
            clip: Clip::Circle,
        }),
        Layer::Spinner => Ok(PaintCommand::Spinner {
            rect,
            track: SPINNER_TRACK,
            arc: SPINNER_ARC,
        }),
        Layer::Pending(_) => Err(Error::RenderError(format!("{} layer is not decoded yet", name))),
        Layer::Broken(_, reason) => Err(Error::RenderError(format!("{} layer failed: {}", name, reason))),
    }
}

/// Frame first, avatar on top.
pub fn display_list(scene: &Scene, layout: &FrameLayout) -> Result<Vec<PaintCommand>> {
    Ok(vec![
        command_for(&scene.frame, layout.frame, "frame")?,
        command_for(&scene.avatar, layout.avatar, "avatar")?,
    ])
}
