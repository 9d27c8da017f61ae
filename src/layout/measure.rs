use log::warn;

use crate::ir::{DescriptorCollection, MeasuredElement, Position, Rect};
use crate::provider::RectProvider;

use super::error::LayoutError;
use super::geometry::round;
use super::{ContainerRect, MeasureDict};

/// Reads every container element under the canvas root into canvas space.
///
/// Flags are OR-merged: either the prior descriptor or the element's marker
/// attribute is enough to set one. Elements without a key, or with
/// geometry that is not finite, are skipped with a warning.
pub fn measure<P: RectProvider + ?Sized>(
    provider: &P,
    prior: &DescriptorCollection,
    scale: f32,
) -> MeasureDict {
    let canvas = provider.canvas_rect();
    let mut measured = MeasureDict::new();
    for element in provider.elements() {
        let Some(key) = element.key.clone() else {
            warn!("container element without a key, skipping");
            continue;
        };
        match measure_element(&key, &element, &canvas, prior, scale) {
            Ok(rect) => {
                if measured.insert(key.clone(), rect).is_some() {
                    warn!("duplicate container key `{key}`, keeping the last one");
                }
            }
            Err(err) => warn!("{err}"),
        }
    }
    measured
}

fn measure_element(
    key: &str,
    element: &MeasuredElement,
    canvas: &Rect,
    prior: &DescriptorCollection,
    scale: f32,
) -> Result<ContainerRect, LayoutError> {
    if !element.rect.is_finite() {
        return Err(LayoutError::computation(key, "non-finite bounding rect"));
    }
    let previous = prior.get(key).cloned().unwrap_or_default();
    let flags = element.flags;

    Ok(ContainerRect {
        key: key.to_string(),
        offset: Position::new(
            round(element.rect.left - canvas.left),
            round(element.rect.top - canvas.top),
        ),
        width: round(element.rect.width / scale),
        height: round(element.rect.height / scale),
        style_left: element
            .style_left
            .filter(|v| v.is_finite())
            .map(|v| round(v / scale)),
        style_top: element
            .style_top
            .filter(|v| v.is_finite())
            .map(|v| round(v / scale)),
        extra: flags.extra || previous.extra,
        absolute: flags.absolute || previous.absolute,
        sticky: flags.sticky || previous.sticky,
        resizable: flags.resizable || previous.resizable,
        swappable: flags.swappable || previous.swappable,
        can_be_bound: flags.can_be_bound || previous.can_be_bound,
        stick_to: element.stick_to.clone().or(previous.stick_to),
    })
}
