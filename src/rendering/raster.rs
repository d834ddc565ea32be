//! Rasterizer: paint commands → RGBA canvas → PNG bytes

use std::f32::consts::PI;

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ColorType, ImageEncoder, Rgba, RgbaImage};

use super::layout::Rect;
use super::paint::{Clip, PaintCommand};
use crate::{Error, Result};

/// Share of the ring the spinner arc covers
const SPINNER_SWEEP: f32 = 0.25;

/// Paint `commands` in order onto a transparent canvas.
pub fn rasterize(width: u32, height: u32, commands: &[PaintCommand]) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    for cmd in commands {
        match cmd {
            PaintCommand::Image { rect, image, clip } => {
                if rect.is_empty() || image.width() == 0 || image.height() == 0 {
                    continue;
                }
                let mut fitted = cover(image, rect.width, rect.height);
                if *clip == Clip::Circle {
                    clip_circle(&mut fitted);
                }
                overlay_alpha(&mut canvas, &fitted, rect.x, rect.y);
            }
            PaintCommand::Spinner { rect, track, arc } => {
                paint_spinner(&mut canvas, *rect, *track, *arc);
            }
        }
    }
    canvas
}

/// Center-crop to the target aspect ratio, then scale to fill it exactly.
pub fn cover(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (iw, ih) = image.dimensions();
    if width == 0 || height == 0 || iw == 0 || ih == 0 {
        return RgbaImage::new(width, height);
    }
    if (iw, ih) == (width, height) {
        return image.clone();
    }
    let (cw, ch) = if iw as u64 * height as u64 > ih as u64 * width as u64 {
        (((ih as u64 * width as u64) / height as u64).max(1) as u32, ih)
    } else {
        (iw, ((iw as u64 * height as u64) / width as u64).max(1) as u32)
    };
    let left = (iw - cw) / 2;
    let top = (ih - ch) / 2;
    let cropped = imageops::crop_imm(image, left, top, cw, ch).to_image();
    if cropped.dimensions() == (width, height) {
        return cropped;
    }
    imageops::resize(&cropped, width, height, FilterType::Lanczos3)
}

/// Source-over blend of `over` onto `base` at (`x`, `y`), clipped to `base`.
pub fn overlay_alpha(base: &mut RgbaImage, over: &RgbaImage, x: u32, y: u32) {
    for (ox, oy, p) in over.enumerate_pixels() {
        let (bx, by) = (x + ox, y + oy);
        if bx >= base.width() || by >= base.height() {
            continue;
        }
        match p.0[3] {
            0 => continue,
            255 => base.put_pixel(bx, by, *p),
            a => {
                let dst = base.get_pixel_mut(bx, by);
                let sa = a as f32 / 255.0;
                let da = dst.0[3] as f32 / 255.0;
                let out_a = sa + da * (1.0 - sa);
                for i in 0..3 {
                    let c = (p.0[i] as f32 * sa + dst.0[i] as f32 * da * (1.0 - sa)) / out_a;
                    dst.0[i] = c.round().clamp(0.0, 255.0) as u8;
                }
                dst.0[3] = (out_a * 255.0).round() as u8;
            }
        }
    }
}

/// Make everything outside the inscribed circle transparent.
pub fn clip_circle(image: &mut RgbaImage) {
    let (w, h) = image.dimensions();
    let cx = (w as f32 - 1.0) / 2.0;
    let cy = (h as f32 - 1.0) / 2.0;
    let r = w.min(h) as f32 / 2.0;
    for (x, y, p) in image.enumerate_pixels_mut() {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        if (dx * dx + dy * dy).sqrt() > r {
            p.0[3] = 0;
        }
    }
}

fn paint_spinner(canvas: &mut RgbaImage, rect: Rect, track: Rgba<u8>, arc: Rgba<u8>) {
    if rect.is_empty() {
        return;
    }
    let cx = rect.x as f32 + (rect.width as f32 - 1.0) / 2.0;
    let cy = rect.y as f32 + (rect.height as f32 - 1.0) / 2.0;
    let outer = rect.width.min(rect.height) as f32 / 2.0;
    let inner = outer - (outer / 6.0).max(1.0);
    let x_end = (rect.x + rect.width).min(canvas.width());
    let y_end = (rect.y + rect.height).min(canvas.height());
    for y in rect.y..y_end {
        for x in rect.x..x_end {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > outer || dist < inner {
                continue;
            }
            // clockwise from twelve o'clock
            let turn = (dx.atan2(-dy) + 2.0 * PI) % (2.0 * PI) / (2.0 * PI);
            let color = if turn < SPINNER_SWEEP { arc } else { track };
            canvas.put_pixel(x, y, color);
        }
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(image.as_raw(), image.width(), image.height(), ColorType::Rgba8)
        .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;
    Ok(out)
}
