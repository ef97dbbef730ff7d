use kurbo::{Circle, Point, Rect, RoundedRect, RoundedRectRadii, Shape};

use crate::foundation::core::BezPath;
use crate::foundation::error::{FramepopError, FramepopResult};
use crate::foundation::tunables::{
    ARCH_RADIUS_FRACTION, BADGE_AMPLITUDE_FRACTION, BADGE_LOBES, BADGE_STEPS,
    CLOVER_CENTER_RADIUS_DIVISOR, CLOVER_LOBE_OFFSET_DIVISOR, CLOVER_LOBE_RADIUS_DIVISOR,
    SQUIRCLE_RADIUS_FRACTION,
};

/// Flattening tolerance for arc-based kurbo shapes.
const PATH_TOLERANCE: f64 = 0.1;

/// Cubic control-point distance for a quarter circle of radius 1.
const KAPPA: f64 = 0.552_284_749_830_793_6;

/// Clip shapes available for framing the subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Inscribed ellipse.
    Circle,
    /// Rounded square.
    Squircle,
    /// Half-circle crown over a rectangle.
    Arch,
    /// Four lobes around a center disc.
    Clover,
    /// Scalloped disc.
    Badge,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Circle,
        ShapeKind::Squircle,
        ShapeKind::Arch,
        ShapeKind::Clover,
        ShapeKind::Badge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Squircle => "squircle",
            Self::Arch => "arch",
            Self::Clover => "clover",
            Self::Badge => "badge",
        }
    }

    pub fn parse(s: &str) -> FramepopResult<Self> {
        let k = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == k)
            .ok_or_else(|| FramepopError::validation(format!("unknown shape kind '{s}'")))
    }
}

/// Closed path for `kind` fitted to `rect`.
///
/// Pure and deterministic: the same inputs always produce the same elements. Used both for
/// render-time clipping and for icon previews.
pub fn path_for(kind: ShapeKind, rect: Rect) -> BezPath {
    let rect = rect.abs();
    let w = rect.width();
    match kind {
        ShapeKind::Circle => ellipse_path(rect),
        ShapeKind::Squircle => {
            RoundedRect::from_rect(rect, w * SQUIRCLE_RADIUS_FRACTION).to_path(PATH_TOLERANCE)
        }
        ShapeKind::Arch => {
            let r = w * ARCH_RADIUS_FRACTION;
            RoundedRect::from_rect(rect, RoundedRectRadii::new(r, r, 0.0, 0.0))
                .to_path(PATH_TOLERANCE)
        }
        ShapeKind::Clover => {
            let mut path = BezPath::new();
            for c in clover_circles(rect) {
                for &el in ellipse_path(c.bounding_box()).elements() {
                    path.push(el);
                }
            }
            path
        }
        ShapeKind::Badge => badge_path(rect),
    }
}

/// `path_for` fitted to a `size × size` square at the origin.
pub fn icon_path(kind: ShapeKind, size: f64) -> BezPath {
    path_for(kind, Rect::new(0.0, 0.0, size, size))
}

/// The five circles whose union forms the clover: four lobes, then the center disc.
pub fn clover_circles(rect: Rect) -> [Circle; 5] {
    let c = rect.center();
    let w = rect.width();
    let lobe_r = w / CLOVER_LOBE_RADIUS_DIVISOR;
    let off = w / CLOVER_LOBE_OFFSET_DIVISOR;
    [
        Circle::new(Point::new(c.x - off, c.y - off), lobe_r),
        Circle::new(Point::new(c.x + off, c.y - off), lobe_r),
        Circle::new(Point::new(c.x + off, c.y + off), lobe_r),
        Circle::new(Point::new(c.x - off, c.y + off), lobe_r),
        Circle::new(c, w / CLOVER_CENTER_RADIUS_DIVISOR),
    ]
}

/// Four cubic quarter-arcs whose on-curve points sit exactly on the rect's edge midpoints, so
/// the path's bounding box is the rect itself.
fn ellipse_path(rect: Rect) -> BezPath {
    let c = rect.center();
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;
    let kx = rx * KAPPA;
    let ky = ry * KAPPA;

    let mut p = BezPath::new();
    p.move_to((rect.x1, c.y));
    p.curve_to((rect.x1, c.y + ky), (c.x + kx, rect.y1), (c.x, rect.y1));
    p.curve_to((c.x - kx, rect.y1), (rect.x0, c.y + ky), (rect.x0, c.y));
    p.curve_to((rect.x0, c.y - ky), (c.x - kx, rect.y0), (c.x, rect.y0));
    p.curve_to((c.x + kx, rect.y0), (rect.x1, c.y - ky), (rect.x1, c.y));
    p.close_path();
    p
}

fn badge_path(rect: Rect) -> BezPath {
    let c = rect.center();
    let w = rect.width();
    let outer = w / 2.0;
    let amp = w * BADGE_AMPLITUDE_FRACTION;

    let mut p = BezPath::new();
    for i in 0..BADGE_STEPS {
        let theta = (i as f64 / BADGE_STEPS as f64) * std::f64::consts::TAU;
        let r = (outer - amp) + amp * (BADGE_LOBES * theta).cos();
        let pt = Point::new(c.x + r * theta.cos(), c.y + r * theta.sin());
        if i == 0 {
            p.move_to(pt);
        } else {
            p.line_to(pt);
        }
    }
    p.close_path();
    p
}

#[cfg(test)]
#[path = "../../tests/unit/shape/path.rs"]
mod tests;
