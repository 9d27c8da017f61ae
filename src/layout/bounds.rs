use crate::ir::Rect;

use super::{ContainerRect, Extent, Padding};

/// Extra room kept past the furthest node, in pixels.
pub const PADDING_BUFFER: f32 = 64.0;

/// Furthest extent, in canvas-local screen pixels, of all measured
/// containers plus an optional overlay element. `min_*` start at `f32::MAX`
/// so an empty input yields no spurious negative bound.
pub fn bounding_extent<'a, I>(containers: I, extra: Option<&Rect>, scale: f32) -> Extent
where
    I: IntoIterator<Item = &'a ContainerRect>,
{
    let overlay = extra.map(|rect| (rect.left, rect.top, rect.width, rect.height));
    containers
        .into_iter()
        .map(|c| (c.offset.left, c.offset.top, c.width * scale, c.height * scale))
        .chain(overlay)
        .fold(
            Extent {
                max_left: 0.0,
                max_top: 0.0,
                min_left: f32::MAX,
                min_top: f32::MAX,
            },
            |acc, (left, top, width, height)| Extent {
                max_left: acc.max_left.max(left + width),
                max_top: acc.max_top.max(top + height),
                min_left: acc.min_left.min(left),
                min_top: acc.min_top.min(top),
            },
        )
}

/// Right/bottom padding that keeps everything up to `extent` reachable.
/// Top/left stay zero: the canvas origin is fixed.
pub fn padding_for(canvas: &Rect, extent: &Extent, buffer: f32) -> Padding {
    Padding {
        top: 0.0,
        left: 0.0,
        right: (extent.max_left - canvas.width + buffer).max(0.0),
        bottom: (extent.max_top - canvas.height + buffer).max(0.0),
    }
}
