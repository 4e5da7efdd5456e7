use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ir::{AnchorMode, Path, Point, Shape, Size, Stroke, TextStyle};
use crate::primitives::{circle, ensure_point, ensure_positive, ensure_size, path, text};
use crate::text_metrics::TextMeasure;

/// A border whose top edge is interrupted by a centred title.
///
/// Returns the text run followed by one open path. The path starts at the
/// right end of the gap, runs clockwise round the box and stops at the left
/// end of the gap, so the gap is exactly the measured width of the title.
pub fn bordered_text_block(
    center: Point,
    content: &str,
    border_size: Size,
    stroke: Stroke,
    style: TextStyle,
    metrics: &dyn TextMeasure,
) -> Result<Vec<Shape>> {
    ensure_point(center, "bordered text center")?;
    ensure_size(border_size, "bordered text border")?;

    let half_w = border_size.width / 2.0;
    let half_h = border_size.height / 2.0;
    let top = center.y - half_h;
    let bottom = center.y + half_h;
    let left = center.x - half_w;
    let right = center.x + half_w;

    let text_width = metrics.measure_width(
        content,
        &style.font_family,
        style.font_size.user_units(),
    )?;
    if text_width >= border_size.width {
        return Err(Error::geometry(format!(
            "title '{content}' ({text_width:.2} wide) does not fit a {} wide border",
            border_size.width
        )));
    }
    let gap = text_width / 2.0;

    let title = text(
        Point::new(center.x, top),
        content,
        stroke.clone(),
        style.with_anchor(AnchorMode::Middle),
    )?;
    let outline = Path::new()
        .move_to(Point::new(center.x + gap, top))
        .line_to(Point::new(right, top))
        .line_to(Point::new(right, bottom))
        .line_to(Point::new(left, bottom))
        .line_to(Point::new(left, top))
        .line_to(Point::new(center.x - gap, top));
    Ok(vec![title, path(outline, stroke)?])
}

/// A closed rectangular border centred on `center`, drawn from the middle
/// of the top edge.
pub fn border(center: Point, size: Size, stroke: Stroke) -> Result<Shape> {
    ensure_point(center, "border center")?;
    ensure_size(size, "border")?;
    let half_w = size.width / 2.0;
    let half_h = size.height / 2.0;
    let top = center.y - half_h;
    let outline = Path::new()
        .move_to(Point::new(center.x, top))
        .line_to(Point::new(center.x + half_w, top))
        .line_to(Point::new(center.x + half_w, center.y + half_h))
        .line_to(Point::new(center.x - half_w, center.y + half_h))
        .line_to(Point::new(center.x - half_w, top))
        .line_to(Point::new(center.x, top));
    path(outline, stroke)
}

/// One copy of `shape` per layer, each shifted right by that layer's offset.
pub fn through_layer_feature(shape: &Shape, layer_offsets: &[f32]) -> Vec<Shape> {
    layer_offsets
        .iter()
        .map(|offset| shape.translated(*offset, 0.0))
        .collect()
}

/// Four holes inset from the corners of a panel at `origin`, in the order
/// top-left, top-right, bottom-left, bottom-right.
pub fn mounting_holes(
    origin: Point,
    panel: Size,
    inset: f32,
    radius: f32,
    stroke: Stroke,
) -> Result<Vec<Shape>> {
    ensure_size(panel, "panel")?;
    if !(inset >= radius && inset * 2.0 <= panel.min_side()) {
        return Err(Error::geometry(format!(
            "mounting hole inset {inset} must clear the hole radius {radius} and fit the panel"
        )));
    }
    let near_x = origin.x + inset;
    let far_x = origin.x + panel.width - inset;
    let near_y = origin.y + inset;
    let far_y = origin.y + panel.height - inset;
    [
        Point::new(near_x, near_y),
        Point::new(far_x, near_y),
        Point::new(near_x, far_y),
        Point::new(far_x, far_y),
    ]
    .into_iter()
    .map(|center| circle(center, radius, stroke.clone()))
    .collect()
}

/// Engraved text on the face layer with a backlight hole behind it on every
/// backing layer. `position` is relative to a layer's origin.
#[allow(clippy::too_many_arguments)]
pub fn backlit_label(
    position: Point,
    content: &str,
    face_offset: f32,
    backlight_offsets: &[f32],
    backlight_radius: f32,
    text_stroke: Stroke,
    hole_stroke: Stroke,
    style: TextStyle,
) -> Result<Vec<Shape>> {
    let mut shapes = Vec::with_capacity(1 + backlight_offsets.len());
    shapes.push(text(
        position.offset(face_offset, 0.0),
        content,
        text_stroke,
        style,
    )?);
    let hole = circle(position, backlight_radius, hole_stroke)?;
    shapes.extend(through_layer_feature(&hole, backlight_offsets));
    Ok(shapes)
}

/// Optional labels on each side of a switch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchLabels {
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub bottom: Option<String>,
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
}

/// A switch hole through every layer with backlit labels around it.
///
/// Shapes come out as the holes (backing layers first, face last), then one
/// [`backlit_label`] group per label in top, bottom, left, right order. Side
/// labels grow away from the hole.
#[allow(clippy::too_many_arguments)]
pub fn switch(
    position: Point,
    hole_radius: f32,
    labels: &SwitchLabels,
    text_offset: f32,
    face_offset: f32,
    backlight_offsets: &[f32],
    backlight_radius: f32,
    text_stroke: Stroke,
    hole_stroke: Stroke,
    style: TextStyle,
) -> Result<Vec<Shape>> {
    ensure_positive(text_offset, "switch label offset")?;
    let hole = circle(position, hole_radius, hole_stroke.clone())?;
    let layers: Vec<f32> = backlight_offsets
        .iter()
        .copied()
        .chain(std::iter::once(face_offset))
        .collect();
    let mut shapes = through_layer_feature(&hole, &layers);

    let sides = [
        (&labels.top, 0.0, -text_offset, AnchorMode::Middle),
        (&labels.bottom, 0.0, text_offset, AnchorMode::Middle),
        (&labels.left, -text_offset, 0.0, AnchorMode::End),
        (&labels.right, text_offset, 0.0, AnchorMode::Start),
    ];
    for (content, dx, dy, anchor) in sides {
        let Some(content) = content else {
            continue;
        };
        shapes.extend(backlit_label(
            position.offset(dx, dy),
            content,
            face_offset,
            backlight_offsets,
            backlight_radius,
            text_stroke.clone(),
            hole_stroke.clone(),
            style.clone().with_anchor(anchor),
        )?);
    }
    Ok(shapes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FontSize, PathCommand, ShapeKind};

    struct FixedAdvance;

    impl TextMeasure for FixedAdvance {
        fn measure_width(&self, text: &str, _family: &str, font_size: f32) -> Result<f32> {
            Ok(text.chars().count() as f32 * font_size)
        }
    }

    fn red() -> Stroke {
        Stroke::new("red", 0.5)
    }

    fn px(size: f32) -> TextStyle {
        TextStyle {
            font_size: FontSize::px(size),
            ..TextStyle::default()
        }
    }

    #[test]
    fn bordered_block_leaves_text_wide_gap() {
        let shapes = bordered_text_block(
            Point::new(50.0, 20.0),
            "MODE",
            Size::new(40.0, 20.0),
            red(),
            px(2.0),
            &FixedAdvance,
        )
        .unwrap();
        assert_eq!(shapes.len(), 2);

        let title = shapes[0].as_text().unwrap();
        assert_eq!(title.anchor, Point::new(50.0, 10.0));
        assert_eq!(title.style.anchor_mode, AnchorMode::Middle);

        let outline = shapes[1].as_path().unwrap();
        assert!(!outline.is_closed());
        let points = outline.points();
        assert_eq!(points.first(), Some(&Point::new(54.0, 10.0)));
        assert_eq!(points.last(), Some(&Point::new(46.0, 10.0)));
        assert_eq!(points[1], Point::new(70.0, 10.0));
        assert_eq!(points[2], Point::new(70.0, 30.0));
        assert_eq!(points[3], Point::new(30.0, 30.0));
        assert_eq!(points[4], Point::new(30.0, 10.0));
        let gap = points.first().unwrap().x - points.last().unwrap().x;
        assert_eq!(gap, 8.0);
    }

    #[test]
    fn bordered_block_rejects_title_wider_than_border() {
        let err = bordered_text_block(
            Point::new(0.0, 0.0),
            "A VERY LONG TITLE",
            Size::new(10.0, 10.0),
            red(),
            px(2.0),
            &FixedAdvance,
        )
        .unwrap_err();
        assert!(err.is_geometry());
    }

    #[test]
    fn border_is_closed_from_top_centre() {
        let shape = border(Point::new(10.0, 10.0), Size::new(8.0, 4.0), red()).unwrap();
        let path = shape.as_path().unwrap();
        assert_eq!(path.commands.first(), Some(&PathCommand::MoveTo(Point::new(10.0, 8.0))));
        assert_eq!(path.points().last(), Some(&Point::new(10.0, 8.0)));
        assert_eq!(path.line_count(), 5);
    }

    #[test]
    fn through_layer_copies_follow_offset_order() {
        let hole = circle(Point::new(18.75, 15.0), 2.5, Stroke::new("black", 0.5)).unwrap();
        let copies = through_layer_feature(&hole, &[5.0, 110.0, 215.0]);
        let centers: Vec<Point> = copies
            .iter()
            .map(|shape| match shape.kind {
                ShapeKind::Circle { center, radius } => {
                    assert_eq!(radius, 2.5);
                    center
                }
                _ => panic!("expected circle"),
            })
            .collect();
        assert_eq!(
            centers,
            vec![
                Point::new(23.75, 15.0),
                Point::new(128.75, 15.0),
                Point::new(233.75, 15.0),
            ]
        );
        assert!(through_layer_feature(&hole, &[]).is_empty());
    }

    #[test]
    fn mounting_holes_sit_in_each_corner() {
        let holes = mounting_holes(
            Point::new(5.0, 5.0),
            Size::new(100.0, 150.0),
            4.0,
            1.5,
            Stroke::new("black", 0.5),
        )
        .unwrap();
        let centers: Vec<Point> = holes
            .iter()
            .filter_map(|shape| match shape.kind {
                ShapeKind::Circle { center, .. } => Some(center),
                _ => None,
            })
            .collect();
        assert_eq!(
            centers,
            vec![
                Point::new(9.0, 9.0),
                Point::new(101.0, 9.0),
                Point::new(9.0, 151.0),
                Point::new(101.0, 151.0),
            ]
        );
        assert!(
            mounting_holes(
                Point::new(0.0, 0.0),
                Size::new(10.0, 10.0),
                1.0,
                1.5,
                Stroke::default()
            )
            .is_err()
        );
    }

    #[test]
    fn backlit_label_puts_text_on_face_and_holes_behind() {
        let shapes = backlit_label(
            Point::new(18.75, 35.0),
            "RCS",
            215.0,
            &[5.0, 110.0],
            1.5,
            red(),
            Stroke::new("black", 0.5),
            TextStyle::default(),
        )
        .unwrap();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[0].as_text().unwrap().anchor, Point::new(233.75, 35.0));
        assert!(matches!(
            shapes[2].kind,
            ShapeKind::Circle { center, .. } if center == Point::new(128.75, 35.0)
        ));
    }

    #[test]
    fn switch_punches_every_layer_and_labels_each_side() {
        let labels = SwitchLabels {
            top: Some("ON".to_string()),
            left: Some("A".to_string()),
            right: Some("B".to_string()),
            ..SwitchLabels::default()
        };
        let shapes = switch(
            Point::new(40.0, 50.0),
            3.5,
            &labels,
            8.0,
            215.0,
            &[5.0, 110.0],
            1.5,
            red(),
            Stroke::new("black", 0.5),
            TextStyle::default(),
        )
        .unwrap();
        // 3 holes, then 3 labels of (text + 2 backlights)
        assert_eq!(shapes.len(), 3 + 3 * 3);
        let holes: Vec<Point> = shapes[..3]
            .iter()
            .map(|shape| match shape.kind {
                ShapeKind::Circle { center, radius } => {
                    assert_eq!(radius, 3.5);
                    center
                }
                _ => panic!("expected hole"),
            })
            .collect();
        assert_eq!(
            holes,
            vec![
                Point::new(45.0, 50.0),
                Point::new(150.0, 50.0),
                Point::new(255.0, 50.0),
            ]
        );

        let top = shapes[3].as_text().unwrap();
        assert_eq!(top.anchor, Point::new(255.0, 42.0));
        assert_eq!(top.style.anchor_mode, AnchorMode::Middle);
        let left = shapes[6].as_text().unwrap();
        assert_eq!(left.anchor, Point::new(247.0, 50.0));
        assert_eq!(left.style.anchor_mode, AnchorMode::End);
        let right = shapes[9].as_text().unwrap();
        assert_eq!(right.anchor, Point::new(263.0, 50.0));
        assert_eq!(right.style.anchor_mode, AnchorMode::Start);
    }

    #[test]
    fn switch_without_labels_is_just_holes() {
        let shapes = switch(
            Point::new(10.0, 10.0),
            2.5,
            &SwitchLabels::default(),
            8.0,
            110.0,
            &[5.0],
            1.5,
            red(),
            Stroke::default(),
            TextStyle::default(),
        )
        .unwrap();
        assert_eq!(shapes.len(), 2);
        assert!(
            switch(
                Point::new(10.0, 10.0),
                2.5,
                &SwitchLabels::default(),
                0.0,
                110.0,
                &[5.0],
                1.5,
                red(),
                Stroke::default(),
                TextStyle::default(),
            )
            .unwrap_err()
            .is_geometry()
        );
    }
}
