use crate::error::{Error, Result};
use crate::ir::{Path, Point, Shape, ShapeKind, Size, Stroke, TextRun, TextStyle};

pub fn circle(center: Point, radius: f32, stroke: Stroke) -> Result<Shape> {
    ensure_point(center, "circle center")?;
    ensure_positive(radius, "circle radius")?;
    ensure_stroke(&stroke)?;
    Ok(Shape::new(ShapeKind::Circle { center, radius }, stroke))
}

pub fn rectangle(insert: Point, size: Size, stroke: Stroke) -> Result<Shape> {
    ensure_point(insert, "rectangle insert")?;
    ensure_size(size, "rectangle")?;
    ensure_stroke(&stroke)?;
    Ok(Shape::new(ShapeKind::Rectangle { insert, size }, stroke))
}

/// A clockwise circular arc from `start_angle` to `end_angle` (degrees).
pub fn arc(
    center: Point,
    radius: f32,
    start_angle: f32,
    end_angle: f32,
    stroke: Stroke,
) -> Result<Shape> {
    ensure_point(center, "arc center")?;
    ensure_positive(radius, "arc radius")?;
    if !start_angle.is_finite() || !end_angle.is_finite() {
        return Err(Error::geometry(format!(
            "arc angles must be finite, got {start_angle}..{end_angle}"
        )));
    }
    ensure_stroke(&stroke)?;
    Ok(Shape::new(
        ShapeKind::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        },
        stroke,
    ))
}

/// True when the clockwise sweep from `start` to `end` exceeds a half turn.
pub fn large_arc_flag(start_angle: f32, end_angle: f32) -> bool {
    (end_angle - start_angle).rem_euclid(360.0) > 180.0
}

/// Explicit path for an arc shape: move to the start point, then one
/// clockwise arc command to the end point.
pub fn arc_path(center: Point, radius: f32, start_angle: f32, end_angle: f32) -> Path {
    Path::new()
        .move_to(center.polar(radius, start_angle))
        .arc_to(
            radius,
            large_arc_flag(start_angle, end_angle),
            true,
            center.polar(radius, end_angle),
        )
}

pub fn text(
    anchor: Point,
    content: impl Into<String>,
    stroke: Stroke,
    style: TextStyle,
) -> Result<Shape> {
    ensure_point(anchor, "text anchor")?;
    ensure_stroke(&stroke)?;
    if !(style.font_size.value > 0.0 && style.font_size.value.is_finite()) {
        return Err(Error::geometry(format!(
            "font size must be positive, got {}",
            style.font_size
        )));
    }
    if !style.rotation.is_finite() {
        return Err(Error::geometry("text rotation must be finite"));
    }
    Ok(Shape::new(
        ShapeKind::Text(TextRun {
            anchor,
            content: content.into(),
            style,
        }),
        stroke,
    ))
}

/// An open or closed path built by a caller.
pub fn path(path: Path, stroke: Stroke) -> Result<Shape> {
    if path.start().is_none() {
        return Err(Error::geometry("path must begin with a move command"));
    }
    for point in path.points() {
        ensure_point(point, "path point")?;
    }
    ensure_stroke(&stroke)?;
    Ok(Shape::new(ShapeKind::Path(path), stroke))
}

pub(crate) fn ensure_positive(value: f32, what: &str) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::geometry(format!("{what} must be positive, got {value}")))
    }
}

pub(crate) fn ensure_point(point: Point, what: &str) -> Result<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(Error::geometry(format!(
            "{what} must be finite, got ({}, {})",
            point.x, point.y
        )))
    }
}

pub(crate) fn ensure_size(size: Size, what: &str) -> Result<()> {
    ensure_positive(size.width, &format!("{what} width"))?;
    ensure_positive(size.height, &format!("{what} height"))
}

pub(crate) fn ensure_stroke(stroke: &Stroke) -> Result<()> {
    if stroke.width >= 0.0 && stroke.width.is_finite() {
        Ok(())
    } else {
        Err(Error::geometry(format!(
            "stroke width must be non-negative, got {}",
            stroke.width
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AnchorMode, PathCommand};

    fn black() -> Stroke {
        Stroke::new("black", 0.5)
    }

    #[test]
    fn circle_rejects_non_positive_radius() {
        assert!(circle(Point::new(0.0, 0.0), 0.0, black()).is_err());
        assert!(circle(Point::new(0.0, 0.0), -2.0, black()).is_err());
        assert!(circle(Point::new(0.0, 0.0), f32::NAN, black()).is_err());
        let ok = circle(Point::new(1.0, 2.0), 3.0, black()).unwrap();
        assert_eq!(
            ok.kind,
            ShapeKind::Circle {
                center: Point::new(1.0, 2.0),
                radius: 3.0
            }
        );
    }

    #[test]
    fn rectangle_rejects_empty_size() {
        assert!(rectangle(Point::new(0.0, 0.0), Size::new(0.0, 5.0), black()).is_err());
        assert!(rectangle(Point::new(0.0, 0.0), Size::new(5.0, -1.0), black()).is_err());
        assert!(rectangle(Point::new(0.0, 0.0), Size::new(5.0, 1.0), black()).is_ok());
    }

    #[test]
    fn negative_stroke_width_is_rejected() {
        let err = circle(Point::new(0.0, 0.0), 1.0, Stroke::new("black", -0.1)).unwrap_err();
        assert!(err.is_geometry());
    }

    #[test]
    fn large_arc_flag_tracks_clockwise_delta() {
        assert!(!large_arc_flag(0.0, 90.0));
        assert!(!large_arc_flag(0.0, 180.0));
        assert!(large_arc_flag(0.0, 181.0));
        assert!(large_arc_flag(0.0, 270.0));
        // 270 -> 0 is a quarter turn clockwise
        assert!(!large_arc_flag(270.0, 0.0));
        assert!(large_arc_flag(90.0, 0.0));
        assert!(!large_arc_flag(-45.0, 45.0));
        for start in (-720..720).step_by(15) {
            for end in (-720..720).step_by(35) {
                let (s, e) = (start as f32, end as f32);
                let delta = (e - s).rem_euclid(360.0);
                assert_eq!(large_arc_flag(s, e), delta > 180.0, "{s} -> {e}");
            }
        }
    }

    #[test]
    fn arc_path_uses_circular_endpoints_and_clockwise_sweep() {
        let path = arc_path(Point::new(10.0, 10.0), 5.0, 0.0, 90.0);
        let PathCommand::MoveTo(start) = path.commands[0] else {
            panic!("expected move");
        };
        assert!((start.x - 15.0).abs() < 1e-5 && (start.y - 10.0).abs() < 1e-5);
        let PathCommand::ArcTo {
            radius,
            large_arc,
            sweep,
            to,
        } = path.commands[1]
        else {
            panic!("expected arc");
        };
        assert_eq!(radius, 5.0);
        assert!(!large_arc);
        assert!(sweep);
        assert!((to.x - 10.0).abs() < 1e-5 && (to.y - 15.0).abs() < 1e-5);
    }

    #[test]
    fn factories_are_idempotent() {
        let style = TextStyle::default().with_anchor(AnchorMode::End);
        let a = text(Point::new(1.0, 1.0), "RCS", black(), style.clone()).unwrap();
        let b = text(Point::new(1.0, 1.0), "RCS", black(), style).unwrap();
        assert_eq!(a, b);

        let a = arc(Point::new(0.0, 0.0), 2.0, 10.0, 200.0, black()).unwrap();
        let b = arc(Point::new(0.0, 0.0), 2.0, 10.0, 200.0, black()).unwrap();
        assert_eq!(a, b);

        let a = circle(Point::new(18.75, 15.0), 2.5, black()).unwrap();
        let b = circle(Point::new(18.75, 15.0), 2.5, black()).unwrap();
        assert_eq!(a, b);

        let a = rectangle(Point::new(8.0, 75.5), Size::new(48.0, 71.5), black()).unwrap();
        let b = rectangle(Point::new(8.0, 75.5), Size::new(48.0, 71.5), black()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn text_rejects_zero_font_size() {
        let mut style = TextStyle::default();
        style.font_size.value = 0.0;
        assert!(text(Point::new(0.0, 0.0), "x", black(), style).is_err());
    }

    #[test]
    fn path_requires_leading_move() {
        let bad = Path::new().line_to(Point::new(1.0, 1.0));
        assert!(path(bad, black()).is_err());
    }
}
