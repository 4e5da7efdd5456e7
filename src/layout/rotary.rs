use crate::config::RotaryConfig;
use crate::error::{Error, Result};
use crate::ir::{AnchorMode, Path, Point, TextStyle};
use crate::primitives::{circle, ensure_point, ensure_positive, path, text};
use crate::text_metrics::TextMeasure;

use super::{LabelPlacement, LabelSpec, RotaryGroup, RotaryLabel};

/// Normalizes an angle to `[0, 360)`.
pub fn normalize_angle(degrees: f32) -> f32 {
    let angle = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if angle >= 360.0 { 0.0 } else { angle }
}

/// Which edge of the text sits on the anchor for a label at `degrees`.
///
/// Straight up or down centres the text; anything on the left half grows
/// leftward from its right edge; the right half grows rightward.
pub fn anchor_mode_for(degrees: f32) -> AnchorMode {
    let angle = normalize_angle(degrees);
    if angle == 90.0 || angle == 270.0 {
        AnchorMode::Middle
    } else if angle > 90.0 && angle < 270.0 {
        AnchorMode::End
    } else {
        AnchorMode::Start
    }
}

/// Labels sit `padding` from the hole centre; each leader runs straight out
/// from the hole edge to `line_length`.
pub fn rotary_labels_middle(
    center: Point,
    hole_radius: f32,
    labels: &[LabelSpec],
    padding: f32,
    line_length: f32,
    config: &RotaryConfig,
) -> Result<RotaryGroup> {
    ensure_point(center, "rotary center")?;
    ensure_positive(hole_radius, "rotary hole radius")?;
    ensure_positive(line_length, "rotary leader length")?;
    if !(padding < line_length) {
        return Err(Error::geometry(format!(
            "rotary padding {padding} must be shorter than the leader length {line_length}"
        )));
    }

    let hole = circle(center, hole_radius, config.hole_stroke())?;
    let mut placed = Vec::with_capacity(labels.len());
    for label in labels {
        let angle = checked_angle(label)?;
        let anchor_mode = anchor_mode_for(angle);
        let text_anchor = center.polar(padding, angle);
        let leader_path = Path::new()
            .move_to(center.polar(hole_radius, angle))
            .line_to(center.polar(line_length, angle));
        tracing::debug!(label = %label.text, angle, ?anchor_mode, "placed rotary label");
        placed.push(finish_label(
            label,
            LabelPlacement {
                text_anchor,
                anchor_mode,
                leader_path,
            },
            config,
        )?);
    }

    Ok(RotaryGroup {
        hole,
        labels: placed,
    })
}

/// Labels sit `padding` from the hole centre and are underlined. The leader
/// drops from the hole edge to just beside the text, then runs under it for
/// the measured text width.
pub fn rotary_labels_low(
    center: Point,
    hole_radius: f32,
    labels: &[LabelSpec],
    padding: f32,
    config: &RotaryConfig,
    metrics: &dyn TextMeasure,
) -> Result<RotaryGroup> {
    ensure_point(center, "rotary center")?;
    ensure_positive(hole_radius, "rotary hole radius")?;
    if !padding.is_finite() {
        return Err(Error::geometry("rotary padding must be finite"));
    }

    let hole = circle(center, hole_radius, config.hole_stroke())?;
    let font_size = config.label_size.user_units();
    let drop = config.underline_drop;
    let lead = config.underline_lead;

    let mut placed = Vec::with_capacity(labels.len());
    for label in labels {
        let angle = checked_angle(label)?;
        let anchor_mode = anchor_mode_for(angle);
        let text_anchor = center.polar(padding, angle);
        let width = metrics.measure_width(&label.text, &config.font_family, font_size)?;

        // (where the underline starts, where it ends) relative to the anchor
        let (start_dx, end_dx) = match anchor_mode {
            AnchorMode::Start => (-lead, width),
            AnchorMode::End => (lead, -width),
            AnchorMode::Middle => (-width / 2.0, width / 2.0),
        };
        let leader_path = Path::new()
            .move_to(center.polar(hole_radius, angle))
            .line_to(text_anchor.offset(start_dx, drop))
            .line_to(text_anchor.offset(end_dx, drop));
        tracing::debug!(
            label = %label.text,
            angle,
            width,
            ?anchor_mode,
            "placed underlined rotary label"
        );
        placed.push(finish_label(
            label,
            LabelPlacement {
                text_anchor,
                anchor_mode,
                leader_path,
            },
            config,
        )?);
    }

    Ok(RotaryGroup {
        hole,
        labels: placed,
    })
}

fn checked_angle(label: &LabelSpec) -> Result<f32> {
    if label.angle_degrees.is_finite() {
        Ok(normalize_angle(label.angle_degrees))
    } else {
        Err(Error::geometry(format!(
            "label '{}' has a non-finite angle",
            label.text
        )))
    }
}

fn finish_label(
    label: &LabelSpec,
    placement: LabelPlacement,
    config: &RotaryConfig,
) -> Result<RotaryLabel> {
    let style = TextStyle {
        font_size: config.label_size,
        font_family: config.font_family.clone(),
        anchor_mode: placement.anchor_mode,
        rotation: 0.0,
    };
    let text = text(
        placement.text_anchor,
        label.text.clone(),
        config.label_stroke(),
        style,
    )?;
    let leader = path(placement.leader_path.clone(), config.label_stroke())?;
    Ok(RotaryLabel {
        placement,
        text,
        leader,
    })
}
