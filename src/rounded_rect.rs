use crate::error::{Error, Result};
use crate::ir::{Path, Point, Polarity, Shape, ShapeKind, Size, Stroke};
use crate::primitives::{ensure_point, ensure_size, ensure_stroke, rectangle};

pub fn rounded_rectangle(
    insert: Point,
    size: Size,
    corner_radius: f32,
    stroke: Stroke,
    polarity: Polarity,
) -> Result<Shape> {
    ensure_point(insert, "rounded rectangle insert")?;
    ensure_size(size, "rounded rectangle")?;
    ensure_stroke(&stroke)?;
    ensure_corner_radius(size, corner_radius)?;

    if corner_radius == 0.0 {
        return rectangle(insert, size, stroke);
    }

    let kind = match polarity {
        Polarity::Convex => ShapeKind::RoundedRectangle {
            insert,
            size,
            corner_radius,
            polarity,
        },
        Polarity::Concave => ShapeKind::Path(contour(insert, size, corner_radius, polarity)),
    };
    Ok(Shape::new(kind, stroke))
}

/// The outline of a rounded rectangle as an explicit closed path.
///
/// Walks clockwise from the top edge: each straight edge stops
/// `corner_radius` short of the corner, then one arc turns onto the next
/// edge. Convex arcs sweep clockwise around the inset fillet centre; concave
/// arcs sweep counter-clockwise around the box corner itself. A zero radius
/// yields the four straight edges only.
pub fn contour(insert: Point, size: Size, corner_radius: f32, polarity: Polarity) -> Path {
    let Point { x, y } = insert;
    let Size {
        width: w,
        height: h,
    } = size;
    let r = corner_radius;

    if r == 0.0 {
        return Path::new()
            .move_to(Point::new(x, y))
            .line_to(Point::new(x + w, y))
            .line_to(Point::new(x + w, y + h))
            .line_to(Point::new(x, y + h))
            .line_to(Point::new(x, y))
            .close();
    }

    let sweep = matches!(polarity, Polarity::Convex);
    Path::new()
        .move_to(Point::new(x + r, y))
        .line_to(Point::new(x + w - r, y))
        .arc_to(r, false, sweep, Point::new(x + w, y + r))
        .line_to(Point::new(x + w, y + h - r))
        .arc_to(r, false, sweep, Point::new(x + w - r, y + h))
        .line_to(Point::new(x + r, y + h))
        .arc_to(r, false, sweep, Point::new(x, y + h - r))
        .line_to(Point::new(x, y + r))
        .arc_to(r, false, sweep, Point::new(x + r, y))
        .close()
}

fn ensure_corner_radius(size: Size, corner_radius: f32) -> Result<()> {
    if !(corner_radius >= 0.0 && corner_radius.is_finite()) {
        return Err(Error::geometry(format!(
            "corner radius must be non-negative, got {corner_radius}"
        )));
    }
    let limit = size.min_side() / 2.0;
    if corner_radius > limit {
        return Err(Error::geometry(format!(
            "corner radius {corner_radius} exceeds half the smaller side ({limit})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::PathCommand;

    fn black() -> Stroke {
        Stroke::new("black", 0.5)
    }

    #[test]
    fn convex_keeps_rectangle_primitive_with_radius() {
        let shape = rounded_rectangle(
            Point::new(0.0, 0.0),
            Size::new(100.0, 50.0),
            8.0,
            black(),
            Polarity::Convex,
        )
        .unwrap();
        assert_eq!(
            shape.kind,
            ShapeKind::RoundedRectangle {
                insert: Point::new(0.0, 0.0),
                size: Size::new(100.0, 50.0),
                corner_radius: 8.0,
                polarity: Polarity::Convex,
            }
        );
        assert_eq!(shape.stroke, black());
    }

    #[test]
    fn concave_walks_edges_and_scoops_corners() {
        let shape = rounded_rectangle(
            Point::new(0.0, 0.0),
            Size::new(100.0, 50.0),
            8.0,
            black(),
            Polarity::Concave,
        )
        .unwrap();
        let path = shape.as_path().expect("concave outline is a path");
        assert_eq!(path.start(), Some(Point::new(8.0, 0.0)));
        assert_eq!(path.commands[1], PathCommand::LineTo(Point::new(92.0, 0.0)));
        assert_eq!(
            path.commands[2],
            PathCommand::ArcTo {
                radius: 8.0,
                large_arc: false,
                sweep: false,
                to: Point::new(100.0, 8.0),
            }
        );
        assert_eq!(path.arc_count(), 4);
        assert_eq!(path.line_count(), 4);
        assert!(path.is_closed());
        assert_eq!(path.points().last().copied(), Some(Point::new(8.0, 0.0)));
    }

    /// Centre of an SVG circular arc from `from` to `to` (endpoint
    /// parameterization, no axis rotation).
    fn arc_center(from: Point, to: Point, r: f32, large_arc: bool, sweep: bool) -> Point {
        let hx = (from.x - to.x) / 2.0;
        let hy = (from.y - to.y) / 2.0;
        let half_sq = hx * hx + hy * hy;
        let k = ((r * r - half_sq).max(0.0) / half_sq).sqrt();
        let sign = if large_arc != sweep { 1.0 } else { -1.0 };
        Point::new(
            sign * k * hy + (from.x + to.x) / 2.0,
            -sign * k * hx + (from.y + to.y) / 2.0,
        )
    }

    #[test]
    fn concave_arcs_are_centred_on_box_corners() {
        let insert = Point::new(5.0, 5.0);
        let size = Size::new(100.0, 150.0);
        let r = 8.0;
        let corners = [
            Point::new(105.0, 5.0),
            Point::new(105.0, 155.0),
            Point::new(5.0, 155.0),
            Point::new(5.0, 5.0),
        ];
        let fillets = [
            Point::new(97.0, 13.0),
            Point::new(97.0, 147.0),
            Point::new(13.0, 147.0),
            Point::new(13.0, 13.0),
        ];
        for (polarity, expected) in [(Polarity::Concave, corners), (Polarity::Convex, fillets)] {
            let path = contour(insert, size, r, polarity);
            let mut pen = path.start().unwrap();
            let mut centres = Vec::new();
            for cmd in &path.commands {
                if let PathCommand::ArcTo {
                    radius,
                    large_arc,
                    sweep,
                    to,
                } = *cmd
                {
                    centres.push(arc_center(pen, to, radius, large_arc, sweep));
                }
                if let Some(p) = cmd.end_point() {
                    pen = p;
                }
            }
            assert_eq!(centres.len(), 4);
            for (got, want) in centres.iter().zip(expected.iter()) {
                assert!(got.distance_to(*want) < 1e-3, "{polarity:?}: {got:?} != {want:?}");
            }
        }
    }

    #[test]
    fn both_contours_are_closed_with_four_arcs_and_lines() {
        for polarity in [Polarity::Convex, Polarity::Concave] {
            let path = contour(Point::new(2.0, 3.0), Size::new(40.0, 30.0), 5.0, polarity);
            assert!(path.is_closed());
            assert_eq!(path.arc_count(), 4);
            assert_eq!(path.line_count(), 4);
            let points = path.points();
            assert_eq!(points.first(), points.last());
        }
        let convex = contour(Point::new(0.0, 0.0), Size::new(10.0, 10.0), 2.0, Polarity::Convex);
        assert!(convex.commands.iter().all(|c| match c {
            PathCommand::ArcTo { sweep, large_arc, .. } => *sweep && !*large_arc,
            _ => true,
        }));
    }

    #[test]
    fn zero_radius_is_a_plain_rectangle() {
        let insert = Point::new(3.0, 4.0);
        let size = Size::new(20.0, 10.0);
        let plain = rectangle(insert, size, black()).unwrap();
        for polarity in [Polarity::Convex, Polarity::Concave] {
            let shape = rounded_rectangle(insert, size, 0.0, black(), polarity).unwrap();
            assert_eq!(shape, plain);
            assert_eq!(contour(insert, size, 0.0, polarity).arc_count(), 0);
        }
    }

    #[test]
    fn oversized_or_negative_radius_is_rejected() {
        let size = Size::new(20.0, 10.0);
        for r in [5.01, 12.0, -1.0, f32::INFINITY] {
            let err = rounded_rectangle(Point::new(0.0, 0.0), size, r, black(), Polarity::Concave)
                .unwrap_err();
            assert!(err.is_geometry(), "radius {r}");
        }
        assert!(
            rounded_rectangle(Point::new(0.0, 0.0), size, 5.0, black(), Polarity::Concave).is_ok()
        );
    }
}
