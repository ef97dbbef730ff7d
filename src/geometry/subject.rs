use crate::assets::buffer::Matte;
use crate::config::scene::SceneConfig;
use crate::foundation::core::{Extent, Point, Rect, Vec2};
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::foundation::tunables::{
    DEGENERATE_SIDE_FRACTION, DEGENERATE_SIDE_PX, MATTE_ALPHA_THRESHOLD,
};

/// Padded square around the subject, in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SubjectBounds {
    /// Square, centered on `center`, with side `2 * half_size`.
    pub rect: Rect,
    pub center: Point,
    pub half_size: f64,
    /// False when no matte pixel qualified and the centered fallback was used.
    pub detected: bool,
}

/// Shared sizing/anchoring descriptor consumed by the shape clipper and the animation engine.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct UnifiedGeometry {
    pub image: Extent,
    pub screen: Extent,
    /// Scale that makes the image cover the screen without letterboxing.
    pub base_scale: f64,
    /// Offset moving the subject center onto the image center; zero unless centering is on.
    pub shift: Vec2,
    pub subject_center: Point,
    /// Always square, in image space.
    pub shape_bounds_rel: Rect,
}

/// Locate the subject in `matte` and return a padded square in image coordinates.
///
/// Pixels qualify when their alpha is strictly above 40/255. The min/max coordinates of the
/// qualifying pixels are rescaled to the image with independent X and Y ratios, so a single
/// qualifying pixel yields a zero-sized subject. With no qualifying pixel the result is a
/// centered square of side `min(w, h) * padding`.
pub fn calculate_subject_bounds(matte: &Matte, image: Extent, padding: f64) -> SubjectBounds {
    let Some(raw) = scan_matte(matte) else {
        return centered_fallback(image, padding);
    };

    let m = matte.extent();
    let rx = image.w() / m.w();
    let ry = image.h() / m.h();
    let scaled = Rect::new(raw.x0 * rx, raw.y0 * ry, raw.x1 * rx, raw.y1 * ry);

    let center = scaled.center();
    let half_size = scaled.width().max(scaled.height()) * padding / 2.0;
    SubjectBounds {
        rect: square_around(center, half_size),
        center,
        half_size,
        detected: true,
    }
}

/// Derive the unified geometry for one image/screen/matte/config combination.
#[tracing::instrument(skip(matte, cfg), fields(has_matte = matte.is_some()))]
pub fn derive_unified_geometry(
    image: Extent,
    screen: Extent,
    matte: Option<&Matte>,
    cfg: &SceneConfig,
) -> FramepopResult<UnifiedGeometry> {
    if image.is_empty() || screen.is_empty() {
        return Err(FramepopError::degenerate(format!(
            "image {}x{} / screen {}x{} must be non-empty",
            image.width, image.height, screen.width, screen.height
        )));
    }
    let padding = cfg.subject_padding_scale;

    let bounds = match matte {
        Some(m) => calculate_subject_bounds(m, image, padding),
        None => centered_fallback(image, padding),
    };

    let base_scale = (screen.w() / image.w()).max(screen.h() / image.h());
    let shift = if cfg.centering_enabled {
        image.center() - bounds.center
    } else {
        Vec2::ZERO
    };

    let mut side = bounds.half_size * 2.0;
    if side < DEGENERATE_SIDE_PX {
        tracing::debug!(side, "subject bounds degenerate; using half image width");
        side = image.w() * DEGENERATE_SIDE_FRACTION;
    }

    Ok(UnifiedGeometry {
        image,
        screen,
        base_scale,
        shift,
        subject_center: bounds.center,
        shape_bounds_rel: square_around(bounds.center, side / 2.0),
    })
}

/// Min/max coordinates of qualifying matte pixels, in matte coordinates.
fn scan_matte(matte: &Matte) -> Option<Rect> {
    let pixels = matte.pixels();
    let width = pixels.width() as usize;
    let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
    let (mut max_x, mut max_y) = (0usize, 0usize);
    let mut any = false;

    for (i, px) in pixels.as_raw().chunks_exact(4).enumerate() {
        if px[3] <= MATTE_ALPHA_THRESHOLD {
            continue;
        }
        let (x, y) = (i % width, i / width);
        any = true;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    any.then(|| Rect::new(min_x as f64, min_y as f64, max_x as f64, max_y as f64))
}

fn centered_fallback(image: Extent, padding: f64) -> SubjectBounds {
    let center = image.center();
    let half_size = image.w().min(image.h()) * padding / 2.0;
    SubjectBounds {
        rect: square_around(center, half_size),
        center,
        half_size,
        detected: false,
    }
}

fn square_around(center: Point, half: f64) -> Rect {
    Rect::new(
        center.x - half,
        center.y - half,
        center.x + half,
        center.y + half,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/subject.rs"]
mod tests;
