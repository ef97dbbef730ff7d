use std::sync::Arc;

use image::{GrayImage, Rgba, RgbaImage};

use crate::foundation::core::Extent;
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::foundation::math::Fnv1a64;

/// Immutable straight-alpha RGBA8 source photo.
///
/// Cloning is cheap; the pixel grid is shared.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    pixels: Arc<RgbaImage>,
}

impl ImageBuffer {
    pub fn new(pixels: RgbaImage) -> FramepopResult<Self> {
        let (w, h) = pixels.dimensions();
        Extent::non_empty(w, h)?;
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    pub fn extent(&self) -> Extent {
        let (w, h) = self.pixels.dimensions();
        Extent::new(w, h)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// True when both handles share the same pixel allocation.
    pub fn same_buffer(&self, other: &ImageBuffer) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Content fingerprint, stable across clones and reloads of identical pixels.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u32(self.pixels.width());
        h.write_u32(self.pixels.height());
        h.write_bytes(self.pixels.as_raw());
        h.finish()
    }
}

/// How a scalar coverage value is written into a matte pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatteEncoding {
    /// `r = g = b = a = value`; used for intermediate stage masks.
    Luma,
    /// `r = g = b = 255`, `a = value`; used for the final matte.
    Alpha,
}

/// Per-pixel foreground confidence grid.
///
/// Its resolution is independent of the image it describes; callers rescale matte coordinates
/// by separate X and Y ratios.
#[derive(Clone, Debug)]
pub struct Matte {
    pixels: Arc<RgbaImage>,
}

impl Matte {
    pub fn new(pixels: RgbaImage) -> FramepopResult<Self> {
        let (w, h) = pixels.dimensions();
        Extent::non_empty(w, h)?;
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    /// A matte of uniform alpha (`r = g = b = 255`).
    pub fn filled(extent: Extent, alpha: u8) -> Self {
        Self {
            pixels: Arc::new(RgbaImage::from_pixel(
                extent.width.max(1),
                extent.height.max(1),
                Rgba([255, 255, 255, alpha]),
            )),
        }
    }

    /// Build a matte from row-major coverage values in `[0, 1]`; out-of-range values clamp.
    pub fn from_coverage(
        extent: Extent,
        coverage: &[f32],
        encoding: MatteEncoding,
    ) -> FramepopResult<Self> {
        let expected = (extent.width as usize).saturating_mul(extent.height as usize);
        if coverage.len() != expected {
            return Err(FramepopError::shape_mismatch(format!(
                "coverage has {} values, expected {expected} for {}x{}",
                coverage.len(),
                extent.width,
                extent.height
            )));
        }
        let mut raw = Vec::with_capacity(expected * 4);
        for &c in coverage {
            let v = coverage_to_u8(c);
            match encoding {
                MatteEncoding::Luma => raw.extend_from_slice(&[v, v, v, v]),
                MatteEncoding::Alpha => raw.extend_from_slice(&[255, 255, 255, v]),
            }
        }
        let pixels = RgbaImage::from_raw(extent.width, extent.height, raw)
            .ok_or_else(|| FramepopError::shape_mismatch("matte buffer size mismatch"))?;
        Self::new(pixels)
    }

    pub fn extent(&self) -> Extent {
        let (w, h) = self.pixels.dimensions();
        Extent::new(w, h)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.pixels.get_pixel(x, y)[3]
    }

    /// Brightest color channel; how stage masks are read back as model inputs.
    pub fn intensity(&self, x: u32, y: u32) -> u8 {
        let p = self.pixels.get_pixel(x, y);
        p[0].max(p[1]).max(p[2])
    }

    /// Alpha channel as a grayscale image.
    pub fn alpha_plane(&self) -> GrayImage {
        let (w, h) = self.pixels.dimensions();
        GrayImage::from_fn(w, h, |x, y| image::Luma([self.alpha(x, y)]))
    }

    pub fn same_buffer(&self, other: &Matte) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

fn coverage_to_u8(c: f32) -> u8 {
    if c.is_nan() {
        return 0;
    }
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/assets/buffer.rs"]
mod tests;
