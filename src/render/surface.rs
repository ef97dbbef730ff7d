use image::RgbaImage;

use crate::foundation::core::{Extent, Rgba8Premul};
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;

/// Premultiplied RGBA8 render target.
pub struct FrameSurface {
    extent: Extent,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for FrameSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSurface")
            .field("extent", &self.extent)
            .finish_non_exhaustive()
    }
}

impl FrameSurface {
    pub fn new(extent: Extent) -> FramepopResult<Self> {
        let (w, h) = surface_dims(extent)?;
        Ok(Self {
            extent,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Reallocate for a new screen size; contents are discarded.
    pub fn resize(&mut self, extent: Extent) -> FramepopResult<()> {
        if extent != self.extent {
            *self = Self::new(extent)?;
        }
        Ok(())
    }

    pub fn clear(&mut self, color: Rgba8Premul) {
        let rgba = color.to_array();
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Raw premultiplied bytes, row-major.
    pub fn premul_bytes(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Premultiplied pixel at `(x, y)`; `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.extent.width || y >= self.extent.height {
            return None;
        }
        let i = ((y as usize) * (self.extent.width as usize) + (x as usize)) * 4;
        let px = self.premul_bytes().get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy out as a straight-alpha image, e.g. for PNG export.
    pub fn to_rgba_image(&self) -> FramepopResult<RgbaImage> {
        let mut bytes = self.premul_bytes().to_vec();
        unpremultiply_rgba8_in_place(&mut bytes);
        RgbaImage::from_raw(self.extent.width, self.extent.height, bytes)
            .ok_or_else(|| FramepopError::render("surface byte length mismatch"))
    }

    pub(crate) fn dims_u16(&self) -> (u16, u16) {
        (self.pixmap.width(), self.pixmap.height())
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }
}

pub(crate) fn surface_dims(extent: Extent) -> FramepopResult<(u16, u16)> {
    let Extent { width, height } = Extent::non_empty(extent.width, extent.height)?;
    let w: u16 = width
        .try_into()
        .map_err(|_| FramepopError::render("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FramepopError::render("surface height exceeds u16"))?;
    Ok((w, h))
}
