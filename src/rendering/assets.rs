//! Image sources for the composition layers
//!
//! Covers the avatar reference itself ([`AvatarSource`]), decoding of data
//! URIs, fetching of remote images through an [`AssetLoader`], and the two
//! built-in images: the themed frame and the placeholder portrait.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::path::PathBuf;

use base64::Engine as _;
use image::{Rgba, RgbaImage};
use reqwest::blocking::Client;

use crate::{Error, Result};

/// The currently displayed avatar: an embedded upload or a remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarSource {
    DataUri(String),
    Remote(String),
}

impl AvatarSource {
    /// Classify a `src` value.
    pub fn parse(src: &str) -> Self {
        if src.starts_with("data:") {
            AvatarSource::DataUri(src.to_string())
        } else {
            AvatarSource::Remote(src.to_string())
        }
    }

    /// Build the data URI a file reader would produce for these bytes.
    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Self {
        let mime = if mime.is_empty() { "application/octet-stream" } else { mime };
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        AvatarSource::DataUri(format!("data:{};base64,{}", mime, payload))
    }

    pub fn as_str(&self) -> &str {
        match self {
            AvatarSource::DataUri(s) | AvatarSource::Remote(s) => s,
        }
    }
}

/// Split a base64 data URI into its MIME type and decoded bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::RenderError("not a data URI".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| Error::RenderError("data URI has no payload".into()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| Error::RenderError("only base64 data URIs are supported".into()))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| Error::RenderError(format!("bad base64 payload: {}", e)))?;
    Ok((mime.to_string(), bytes))
}

/// What a layer shows before it is decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    ThemedFrame,
    Placeholder,
    File(PathBuf),
    Avatar(AvatarSource),
}

/// Fetches remote image bytes
pub trait AssetLoader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpAssetLoader {
    client: Client,
}

impl HttpAssetLoader {
    pub fn new(user_agent: &str, timeout_ms: Option<u64>) -> Result<Self> {
        let client = crate::http_client(user_agent, timeout_ms, &HashMap::new())?;
        Ok(Self { client })
    }
}

impl AssetLoader for HttpAssetLoader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("fetching image {}", url);
        let res = self.client.get(url).send()?;
        if !res.status().is_success() {
            return Err(Error::RenderError(format!(
                "image request answered HTTP {}",
                res.status().as_u16()
            )));
        }
        let bytes = res.bytes()?;
        Ok(bytes.to_vec())
    }
}

/// Append a cache-busting parameter so an image cached without CORS headers
/// is fetched again.
pub fn cache_busted(url: &str, stamp: u128) -> Result<String> {
    let mut parsed = url::Url::parse(url)
        .map_err(|e| Error::RenderError(format!("bad image URL {:?}: {}", url, e)))?;
    parsed
        .query_pairs_mut()
        .append_pair("cacheBust", &stamp.to_string());
    Ok(parsed.into())
}

const RED: Rgba<u8> = Rgba([237, 32, 36, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GREEN: Rgba<u8> = Rgba([39, 142, 67, 255]);
const GOLD: Rgba<u8> = Rgba([254, 189, 17, 255]);

const SUN_RAYS: f32 = 21.0;

/// Red / white / green bands with a golden sun in the middle.
pub fn themed_frame(size: u32) -> RgbaImage {
    let s = size.max(1) as f32;
    let c = (s - 1.0) / 2.0;
    let core = s * 0.12;
    let rays = s * 0.2;
    RgbaImage::from_fn(size, size, |x, y| {
        let dx = x as f32 - c;
        let dy = y as f32 - c;
        let dist = (dx * dx + dy * dy).sqrt();
        let turn = (dy.atan2(dx) + PI) / (2.0 * PI);
        if dist <= core || (dist <= rays && (turn * SUN_RAYS).fract() < 0.5) {
            return GOLD;
        }
        match y * 3 / size.max(1) {
            0 => RED,
            1 => WHITE,
            _ => GREEN,
        }
    })
}

const PLACEHOLDER_BG: Rgba<u8> = Rgba([229, 231, 235, 255]);
pub const PLACEHOLDER_FG: Rgba<u8> = Rgba([156, 163, 175, 255]);

/// A neutral head-and-shoulders silhouette.
pub fn placeholder_portrait(size: u32) -> RgbaImage {
    let s = size.max(1) as f32;
    RgbaImage::from_fn(size, size, |x, y| {
        let u = (x as f32 + 0.5) / s;
        let v = (y as f32 + 0.5) / s;
        let head = (u - 0.5).powi(2) + (v - 0.4).powi(2) <= 0.2f32.powi(2);
        let shoulders = ((u - 0.5) / 0.38).powi(2) + ((v - 1.0) / 0.32).powi(2) <= 1.0;
        if head || shoulders {
            PLACEHOLDER_FG
        } else {
            PLACEHOLDER_BG
        }
    })
}
