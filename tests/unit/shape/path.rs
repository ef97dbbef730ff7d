use super::*;

use kurbo::PathEl;

fn subpaths(path: &BezPath) -> Vec<BezPath> {
    let mut out = Vec::new();
    for &el in path.elements() {
        if matches!(el, PathEl::MoveTo(_)) {
            out.push(BezPath::new());
        }
        if let Some(cur) = out.last_mut() {
            cur.push(el);
        }
    }
    out
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn circle_bounding_box_is_the_rect() {
    for rect in [
        Rect::new(0.0, 0.0, 100.0, 100.0),
        Rect::new(13.5, -7.25, 211.0, 90.0),
        Rect::new(760.0, 160.0, 1240.0, 640.0),
    ] {
        assert_eq!(path_for(ShapeKind::Circle, rect).bounding_box(), rect);
    }
}

#[test]
fn every_shape_is_closed() {
    let rect = Rect::new(0.0, 0.0, 120.0, 120.0);
    for kind in ShapeKind::ALL {
        let path = path_for(kind, rect);
        for sub in subpaths(&path) {
            assert!(
                matches!(sub.elements().last(), Some(PathEl::ClosePath)),
                "{kind:?} has an open subpath"
            );
        }
    }
}

#[test]
fn clover_is_five_documented_circles() {
    let rect = Rect::new(10.0, 20.0, 350.0, 360.0);
    let w = rect.width();
    let c = rect.center();
    let path = path_for(ShapeKind::Clover, rect);
    let subs = subpaths(&path);
    assert_eq!(subs.len(), 5);

    let off = w / 6.5;
    let expected = [
        (Point::new(c.x - off, c.y - off), w / 3.4),
        (Point::new(c.x + off, c.y - off), w / 3.4),
        (Point::new(c.x + off, c.y + off), w / 3.4),
        (Point::new(c.x - off, c.y + off), w / 3.4),
        (c, w / 5.0),
    ];
    for (sub, (center, radius)) in subs.iter().zip(expected) {
        let bb = sub.bounding_box();
        assert!(approx(bb.center().x, center.x));
        assert!(approx(bb.center().y, center.y));
        assert!(approx(bb.width() / 2.0, radius));
        assert!(approx(bb.height() / 2.0, radius));
    }

    let circles = clover_circles(rect);
    assert!(approx(circles[0].radius, w / 3.4));
    assert!(approx(circles[4].radius, w / 5.0));
}

#[test]
fn badge_samples_full_turn_with_scallops() {
    let rect = Rect::new(0.0, 0.0, 200.0, 200.0);
    let path = path_for(ShapeKind::Badge, rect);
    let els = path.elements();
    assert_eq!(els.len(), 360 + 1);
    assert!(matches!(els[0], PathEl::MoveTo(_)));

    let c = rect.center();
    let outer = 100.0;
    let amp = 200.0 * 0.06;
    let mut min_r = f64::MAX;
    let mut max_r = f64::MIN;
    for el in els {
        let p = match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => p,
            _ => continue,
        };
        let r = (p - c).hypot();
        min_r = min_r.min(r);
        max_r = max_r.max(r);
    }
    assert!(approx(max_r, outer));
    // The deepest scallop falls between two samples.
    assert!(min_r >= outer - 2.0 * amp - 1e-9);
    assert!(min_r - (outer - 2.0 * amp) < 0.05);
}

#[test]
fn squircle_and_arch_stay_inside_rect() {
    let rect = Rect::new(5.0, 5.0, 105.0, 105.0);
    for kind in [ShapeKind::Squircle, ShapeKind::Arch] {
        let bb = path_for(kind, rect).bounding_box();
        assert!(bb.x0 >= rect.x0 - 1e-9 && bb.y0 >= rect.y0 - 1e-9);
        assert!(bb.x1 <= rect.x1 + 1e-9 && bb.y1 <= rect.y1 + 1e-9);
    }
}

#[test]
fn arch_has_square_bottom_corners() {
    let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
    let path = path_for(ShapeKind::Arch, rect);
    let has_point = |target: Point| {
        path.elements().iter().any(|el| match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => approx(p.x, target.x) && approx(p.y, target.y),
            PathEl::CurveTo(_, _, p) | PathEl::QuadTo(_, p) => {
                approx(p.x, target.x) && approx(p.y, target.y)
            }
            PathEl::ClosePath => false,
        })
    };
    assert!(has_point(Point::new(100.0, 100.0)));
    assert!(has_point(Point::new(0.0, 100.0)));
    assert!(!has_point(Point::new(0.0, 0.0)));
}

#[test]
fn paths_are_deterministic() {
    let rect = Rect::new(1.0, 2.0, 64.0, 65.0);
    for kind in ShapeKind::ALL {
        assert_eq!(path_for(kind, rect), path_for(kind, rect));
    }
}

#[test]
fn icon_path_fits_square_at_origin() {
    let bb = icon_path(ShapeKind::Circle, 48.0).bounding_box();
    assert_eq!(bb, Rect::new(0.0, 0.0, 48.0, 48.0));
}

#[test]
fn shape_names_parse_back() {
    for kind in ShapeKind::ALL {
        assert_eq!(ShapeKind::parse(kind.name()).unwrap(), kind);
    }
    assert_eq!(ShapeKind::parse(" Clover ").unwrap(), ShapeKind::Clover);
    assert!(ShapeKind::parse("hexagon").is_err());
}
