//! Layer state of the on-screen composition

use std::sync::Arc;

use image::RgbaImage;

use super::assets::{AvatarSource, ImageRef};

/// One layer of the composition
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// Source assigned, image not decoded yet
    Pending(ImageRef),
    Ready(Arc<RgbaImage>),
    /// Source could not be loaded or decoded; kept so it can be retried
    Broken(ImageRef, String),
    Spinner,
}

impl Layer {
    pub fn is_pending(&self) -> bool {
        matches!(self, Layer::Pending(_))
    }
}

/// Frame and avatar layers
#[derive(Debug, Clone)]
pub struct Scene {
    pub frame: Layer,
    pub avatar: Layer,
}

impl Scene {
    pub fn new(frame: ImageRef) -> Self {
        Scene {
            frame: Layer::Pending(frame),
            avatar: Layer::Pending(ImageRef::Placeholder),
        }
    }

    /// Show `source`, or the placeholder when there is none.
    pub fn set_avatar(&mut self, source: Option<&AvatarSource>) {
        let image = match source {
            Some(src) => ImageRef::Avatar(src.clone()),
            None => ImageRef::Placeholder,
        };
        self.avatar = Layer::Pending(image);
    }

    pub fn show_spinner(&mut self) {
        self.avatar = Layer::Spinner;
    }

    /// Put every broken layer back to pending. Returns how many were reset.
    pub fn retry_broken(&mut self) -> usize {
        let mut reset = 0;
        for layer in self.layers_mut() {
            if let Layer::Broken(source, _) = layer {
                let source = source.clone();
                *layer = Layer::Pending(source);
                reset += 1;
            }
        }
        reset
    }

    /// No layer waits on a decode.
    pub fn is_settled(&self) -> bool {
        !self.frame.is_pending() && !self.avatar.is_pending()
    }

    pub(crate) fn layers_mut(&mut self) -> [&mut Layer; 2] {
        [&mut self.frame, &mut self.avatar]
    }
}
