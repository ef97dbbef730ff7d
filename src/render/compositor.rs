use std::sync::Arc;

use image::imageops::{self, FilterType};
use rayon::prelude::*;

use crate::animation::engine::FrameTransforms;
use crate::assets::buffer::{ImageBuffer, Matte};
use crate::config::scene::SceneConfig;
use crate::foundation::core::{Affine, BezPath, Extent, Point, Rgba8Premul, Vec2};
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::foundation::math::{mul_div255_u8, premultiply_rgba8_in_place};
use crate::geometry::subject::UnifiedGeometry;
use crate::render::surface::{FrameSurface, surface_dims};
use crate::shape::path::{ShapeKind, icon_path, path_for};

/// Everything one frame reads. Buffers are borrowed, never copied per frame.
#[derive(Clone, Copy, Debug)]
pub struct FrameInputs<'a> {
    pub image: &'a ImageBuffer,
    pub matte: Option<&'a Matte>,
    pub geometry: &'a UnifiedGeometry,
    pub transforms: &'a FrameTransforms,
    pub config: &'a SceneConfig,
}

struct ImagePaint {
    image: ImageBuffer,
    paint: vello_cpu::Image,
}

struct CutoutPaint {
    image: ImageBuffer,
    matte: Matte,
    paint: vello_cpu::Image,
}

/// Draws the clipped photo and the depth-pop layer into a [`FrameSurface`].
///
/// Paints are rebuilt only when a different image or matte buffer is handed in.
#[derive(Default)]
pub struct FrameCompositor {
    image_paint: Option<ImagePaint>,
    cutout: Option<CutoutPaint>,
}

impl std::fmt::Debug for FrameCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCompositor")
            .field("image_paint", &self.image_paint.is_some())
            .field("cutout", &self.cutout.is_some())
            .finish()
    }
}

impl FrameCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, surface: &mut FrameSurface, frame: &FrameInputs<'_>) -> FramepopResult<()> {
        let cfg = frame.config;
        let t = frame.transforms;
        let background = cfg.background();
        surface.clear(background);

        let (sw, sh) = surface.dims_u16();
        let mut ctx = vello_cpu::RenderContext::new(sw, sh);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        let [r, g, b, a] = straight_background(cfg.background_color);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(sw),
            f64::from(sh),
        ));

        let mut clip = path_for(cfg.shape_kind, frame.geometry.shape_bounds_rel);
        clip.apply_affine(Affine::translate(Vec2::new(0.0, t.shift_y)) * t.shape);

        let image_extent = frame.image.extent();
        let image_rect = vello_cpu::kurbo::Rect::new(0.0, 0.0, image_extent.w(), image_extent.h());

        ctx.push_clip_layer(&bezpath_to_cpu(&clip));
        ctx.set_transform(affine_to_cpu(t.body));
        ctx.set_paint(self.image_paint_for(frame.image)?);
        ctx.fill_rect(&image_rect);
        ctx.pop_layer();

        if cfg.depth_pop_enabled
            && t.alpha > 0
            && let Some(matte) = frame.matte
        {
            let paint = self.cutout_paint_for(frame.image, matte)?;
            ctx.set_transform(affine_to_cpu(t.pop));
            ctx.set_paint(paint);
            let opacity = f32::from(t.alpha) / 255.0;
            if t.alpha < 255 {
                ctx.push_opacity_layer(opacity);
            }
            ctx.fill_rect(&image_rect);
            if t.alpha < 255 {
                ctx.pop_layer();
            }
        }

        ctx.flush();
        ctx.render_to_pixmap(surface.pixmap_mut());
        Ok(())
    }

    fn image_paint_for(&mut self, image: &ImageBuffer) -> FramepopResult<vello_cpu::Image> {
        if let Some(cached) = &self.image_paint
            && cached.image.same_buffer(image)
        {
            return Ok(cached.paint.clone());
        }
        let mut bytes = image.pixels().as_raw().clone();
        let row = image.extent().width as usize * 4;
        bytes
            .par_chunks_mut(row)
            .for_each(premultiply_rgba8_in_place);
        let paint = pixmap_paint(premul_pixmap(&bytes, image.extent())?);
        self.image_paint = Some(ImagePaint {
            image: image.clone(),
            paint: paint.clone(),
        });
        Ok(paint)
    }

    fn cutout_paint_for(
        &mut self,
        image: &ImageBuffer,
        matte: &Matte,
    ) -> FramepopResult<vello_cpu::Image> {
        if let Some(cached) = &self.cutout
            && cached.image.same_buffer(image)
            && cached.matte.same_buffer(matte)
        {
            return Ok(cached.paint.clone());
        }
        let bytes = cutout_premul(image, matte);
        let paint = pixmap_paint(premul_pixmap(&bytes, image.extent())?);
        tracing::debug!(
            image = ?image.extent(),
            matte = ?matte.extent(),
            "depth-pop cutout rebuilt"
        );
        self.cutout = Some(CutoutPaint {
            image: image.clone(),
            matte: matte.clone(),
            paint: paint.clone(),
        });
        Ok(paint)
    }
}

/// Rasterize the `size`-pixel icon for `kind` in `argb` on a transparent square surface.
pub fn render_icon(kind: ShapeKind, size: u32, argb: u32) -> FramepopResult<FrameSurface> {
    let mut surface = FrameSurface::new(Extent::new(size, size))?;
    surface.clear(Rgba8Premul::transparent());
    let (w, h) = surface.dims_u16();
    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    let [r, g, b, a] = straight_background(argb);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.fill_path(&bezpath_to_cpu(&icon_path(kind, f64::from(size))));
    ctx.flush();
    ctx.render_to_pixmap(surface.pixmap_mut());
    Ok(surface)
}

/// Image kept only where the matte is opaque (source-in), premultiplied, at image resolution.
pub(crate) fn cutout_premul(image: &ImageBuffer, matte: &Matte) -> Vec<u8> {
    let e = image.extent();
    let mut alpha = matte.alpha_plane();
    if alpha.dimensions() != (e.width, e.height) {
        alpha = imageops::resize(&alpha, e.width, e.height, FilterType::Triangle);
    }

    let mut bytes = image.pixels().as_raw().clone();
    bytes
        .par_chunks_exact_mut(4)
        .zip(alpha.as_raw().par_iter())
        .for_each(|(px, &m)| {
            let a = mul_div255_u8(u16::from(px[3]), u16::from(m));
            for c in &mut px[..3] {
                *c = mul_div255_u8(u16::from(*c), u16::from(a));
            }
            px[3] = a;
        });
    bytes
}

fn straight_background(argb: u32) -> [u8; 4] {
    let [a, r, g, b] = argb.to_be_bytes();
    [r, g, b, a]
}

fn premul_pixmap(rgba8_premul: &[u8], extent: Extent) -> FramepopResult<vello_cpu::Pixmap> {
    let (w, h) = surface_dims(extent)?;
    if rgba8_premul.len() != extent.width as usize * extent.height as usize * 4 {
        return Err(FramepopError::render("premultiplied byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<_> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn pixmap_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
