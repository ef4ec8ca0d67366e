//! Texture I/O functionality for reading, converting and writing texture images.

use std::fs;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

#[derive(Debug, thiserror::Error)]
pub enum Err {
    #[error("IO Error: {0}")]
    IoError(String),
    #[error("Decode Error: {0}")]
    DecodeError(String),
    #[error("Encode Error: {0}")]
    EncodeError(String),
}

/// Reads and decodes the image at `path`. The format is guessed from the content.
pub fn read_texture_image(path: &Path) -> Result<RgbaImage, Err> {
    let data = fs::read(path).map_err(|e| {
        Err::IoError(format!("Failed to read texture file {:?}: {}", path, e))
    })?;
    let image = image::load_from_memory(&data).map_err(|e| {
        Err::DecodeError(format!("Failed to decode texture file {:?}: {}", path, e))
    })?;
    Ok(image.to_rgba8())
}

/// Writes `image` to `path` as png.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), Err> {
    image.save_with_format(path, ImageFormat::Png)
        .map_err(|e| Err::EncodeError(format!("Failed to write {:?}: {}", path, e)))
}

/// Rebuilds a three-channel normal map from the two-channel layout, where X is
/// stored in alpha and Y in green. Z is recomputed from the unit length, and the
/// result is opaque.
pub fn reconstruct_normal_map(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        *pixel = reconstruct_normal(*pixel);
    }
}

fn reconstruct_normal(pixel: Rgba<u8>) -> Rgba<u8> {
    let [_, g, _, a] = pixel.0;
    let x = to_unit(a) * 2.0 - 1.0;
    let y = to_unit(g) * 2.0 - 1.0;
    let z = (1.0 - (x * x + y * y).clamp(0.0, 1.0)).sqrt();
    Rgba([
        from_unit(x * 0.5 + 0.5),
        from_unit(y * 0.5 + 0.5),
        from_unit(z * 0.5 + 0.5),
        u8::MAX,
    ])
}

fn to_unit(v: u8) -> f32 {
    v as f32 / 255.0
}

fn from_unit(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
