//! Composition rendering
//!
//! The on-screen composition is a [`Scene`] of two layers (frame, avatar).
//! Changing the avatar leaves its layer pending until it is decoded, the way
//! an `<img>` is not painted until its source loads. Export therefore
//! happens in two steps:
//!
//! 1. [`Compositor::settle`] decodes pending layers pass by pass until none
//!    is left pending, which is the signal that the scene is stable. Layers
//!    that failed are retried on the next [`Compositor::render`].
//! 2. [`Compositor::capture`] paints the settled scene once and encodes it
//!    as PNG.

pub mod assets;
pub mod layout;
pub mod paint;
pub mod raster;
pub mod scene;

pub use assets::{AssetLoader, AvatarSource, HttpAssetLoader, ImageRef};
pub use layout::{FrameLayout, Rect};
pub use scene::{Layer, Scene};

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::RgbaImage;
use sha2::{Digest, Sha256};

use crate::{ComposerConfig, Error, Result};

/// A rasterized composition
#[derive(Debug, Clone)]
pub struct Capture {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Capture {
    pub fn is_empty(&self) -> bool {
        self.png_data.is_empty()
    }

    /// Hex SHA-256 of the PNG bytes.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.png_data))
    }
}

pub struct Compositor {
    layout: FrameLayout,
    loader: Box<dyn AssetLoader>,
    cache_bust: bool,
    max_settle_passes: usize,
}

impl Compositor {
    pub fn new(config: &ComposerConfig, loader: Box<dyn AssetLoader>) -> Self {
        Self {
            layout: FrameLayout::new(config.geometry),
            loader,
            cache_bust: config.cache_bust,
            max_settle_passes: config.max_settle_passes.max(1),
        }
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    fn decode(&self, source: &ImageRef, target: Rect) -> Result<RgbaImage> {
        let bytes = match source {
            ImageRef::ThemedFrame => return Ok(assets::themed_frame(target.width)),
            ImageRef::Placeholder => return Ok(assets::placeholder_portrait(target.width)),
            ImageRef::File(path) => std::fs::read(path).map_err(|e| {
                Error::RenderError(format!("cannot read {}: {}", path.display(), e))
            })?,
            ImageRef::Avatar(AvatarSource::DataUri(uri)) => assets::decode_data_uri(uri)?.1,
            ImageRef::Avatar(AvatarSource::Remote(url)) => {
                if self.cache_bust {
                    let stamp = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map(|d| d.as_millis())
                        .unwrap_or_default();
                    self.loader.fetch(&assets::cache_busted(url, stamp)?)?
                } else {
                    self.loader.fetch(url)?
                }
            }
        };
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }

    /// Decode every pending layer once. Returns whether anything changed.
    fn settle_pass(&self, scene: &mut Scene) -> bool {
        let rects = [self.layout.frame, self.layout.avatar];
        let mut changed = false;
        for (layer, rect) in scene.layers_mut().into_iter().zip(rects) {
            let Layer::Pending(source) = layer else {
                continue;
            };
            let source = source.clone();
            *layer = match self.decode(&source, rect) {
                Ok(decoded) => Layer::Ready(Arc::new(decoded)),
                Err(e) => {
                    log::warn!("layer failed to decode: {}", e);
                    Layer::Broken(source, e.to_string())
                }
            };
            changed = true;
        }
        changed
    }

    /// Run settle passes until no layer is pending. Returns the number of
    /// passes it took.
    pub fn settle(&self, scene: &mut Scene) -> Result<usize> {
        for pass in 1..=self.max_settle_passes {
            let changed = self.settle_pass(scene);
            if scene.is_settled() {
                log::debug!("scene settled after {} pass(es), changed: {}", pass, changed);
                return Ok(pass);
            }
        }
        Err(Error::ExportError(format!(
            "composition did not settle within {} passes",
            self.max_settle_passes
        )))
    }

    /// Paint a settled scene once.
    pub fn capture(&self, scene: &Scene) -> Result<Capture> {
        if !scene.is_settled() {
            return Err(Error::ExportError("composition is still loading".into()));
        }
        let commands = paint::display_list(scene, &self.layout)
            .map_err(|e| Error::ExportError(e.to_string()))?;
        let canvas = raster::rasterize(self.layout.width(), self.layout.height(), &commands);
        let capture = Capture {
            width: canvas.width(),
            height: canvas.height(),
            png_data: raster::encode_png(&canvas)?,
        };
        if capture.is_empty() {
            return Err(Error::ExportError("capture produced no image data".into()));
        }
        Ok(capture)
    }

    /// Retry broken layers, settle, then capture.
    pub fn render(&self, scene: &mut Scene) -> Result<Capture> {
        let retried = scene.retry_broken();
        if retried > 0 {
            log::debug!("retrying {} broken layer(s)", retried);
        }
        self.settle(scene)?;
        self.capture(scene)
    }
}
