use std::path::Path;

use crate::assets::buffer::{ImageBuffer, Matte};
use crate::foundation::error::{FramepopError, FramepopResult};

/// Decode encoded image bytes into a straight-alpha RGBA8 image buffer.
pub fn decode_image(bytes: &[u8]) -> FramepopResult<ImageBuffer> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FramepopError::asset_load(format!("decode image from memory: {e}")))?;
    ImageBuffer::new(dyn_img.to_rgba8())
}

/// Decode a precomputed matte.
///
/// Files with an alpha channel are taken as-is. Opaque files (grayscale or RGB) are read as
/// luminance-encoded coverage and converted so that alpha carries the coverage.
pub fn decode_matte(bytes: &[u8]) -> FramepopResult<Matte> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FramepopError::asset_load(format!("decode matte from memory: {e}")))?;
    if dyn_img.color().has_alpha() {
        return Matte::new(dyn_img.to_rgba8());
    }
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let rgba = image::RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([255, 255, 255, luma.get_pixel(x, y)[0]])
    });
    Matte::new(rgba)
}

pub fn load_image(path: impl AsRef<Path>) -> FramepopResult<ImageBuffer> {
    let bytes = read_asset(path.as_ref())?;
    decode_image(&bytes)
}

pub fn load_matte(path: impl AsRef<Path>) -> FramepopResult<Matte> {
    let bytes = read_asset(path.as_ref())?;
    decode_matte(&bytes)
}

fn read_asset(p: &Path) -> FramepopResult<Vec<u8>> {
    std::fs::read(p).map_err(|e| {
        FramepopError::asset_load(format!("failed to read asset '{}': {e}", p.display()))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
