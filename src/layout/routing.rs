use log::{debug, warn};

use crate::ir::{ConnectorDescriptor, MeasuredElement, Orientation, Position, Rect};
use crate::provider::RectProvider;

use super::error::LayoutError;
use super::geometry::{candidate_points, closest_pair, is_inside, rounded_coords};
use super::{ConnectorPoint, RoundedCoords, RoutedConnector};

/// Routes every connector between the closest attachment points of its two
/// containers. Connectors with a missing end are skipped with a warning;
/// connectors whose ends leave no usable attachment point are dropped.
pub fn route<P: RectProvider + ?Sized>(
    connectors: &[ConnectorDescriptor],
    provider: &P,
    scale: f32,
) -> Vec<RoutedConnector> {
    let canvas = provider.canvas_rect();
    let mut routed = Vec::with_capacity(connectors.len());
    for connector in connectors {
        match route_connector(connector, provider, &canvas, scale) {
            Ok(Some(result)) => routed.push(result),
            Ok(None) => debug!(
                "connector {} -> {} has no free attachment points",
                connector.from, connector.to
            ),
            Err(err) => warn!(
                "skipping connector {} -> {}: {err}",
                connector.from, connector.to
            ),
        }
    }
    routed
}

fn route_connector<P: RectProvider + ?Sized>(
    connector: &ConnectorDescriptor,
    provider: &P,
    canvas: &Rect,
    scale: f32,
) -> Result<Option<RoutedConnector>, LayoutError> {
    let from = provider
        .element(&connector.from)
        .ok_or_else(|| LayoutError::missing(&connector.from))?;
    let to = provider
        .element(&connector.to)
        .ok_or_else(|| LayoutError::missing(&connector.to))?;

    let from_coords = anchor_coords(&connector.from, &from, provider, canvas, scale)?;
    let to_coords = anchor_coords(&connector.to, &to, provider, canvas, scale)?;

    Ok(route_between(
        &connector.from,
        &connector.to,
        (&from_coords, from.orientation),
        (&to_coords, to.orientation),
    ))
}

/// Routes between two canvas-space rectangles.
pub fn route_between(
    from_key: &str,
    to_key: &str,
    from: (&RoundedCoords, Orientation),
    to: (&RoundedCoords, Orientation),
) -> Option<RoutedConnector> {
    let from_points = endpoint_candidates(from.0, from.1, to.0);
    let to_points = endpoint_candidates(to.0, to.1, from.0);
    let (start, end) = closest_pair(&from_points, &to_points)?;
    Some(connector_box(from_key, to_key, start, end))
}

/// Attachment points of `coords` allowed by `orientation` that are not hidden
/// behind `other`.
pub fn endpoint_candidates(
    coords: &RoundedCoords,
    orientation: Orientation,
    other: &RoundedCoords,
) -> Vec<ConnectorPoint> {
    candidate_points(coords)
        .into_iter()
        .filter(|point| point.vector.allowed_for(orientation))
        .filter(|point| !is_inside(point.x, point.y, other))
        .collect()
}

fn connector_box(
    from: &str,
    to: &str,
    start: ConnectorPoint,
    end: ConnectorPoint,
) -> RoutedConnector {
    let top = start.y.min(end.y);
    let left = start.x.min(end.x);
    RoutedConnector {
        from: from.to_string(),
        to: to.to_string(),
        top,
        left,
        w: (end.x - start.x).abs(),
        h: (end.y - start.y).abs(),
        start: ConnectorPoint::new(start.x - left, start.y - top, start.vector),
        end: ConnectorPoint::new(end.x - left, end.y - top, end.vector),
    }
}

/// Canvas-local, unscaled rect of `rect`.
pub(crate) fn to_canvas_space(rect: &Rect, canvas: &Rect, scale: f32) -> Rect {
    Rect::new(
        (rect.left - canvas.left) / scale,
        (rect.top - canvas.top) / scale,
        rect.width / scale,
        rect.height / scale,
    )
}

/// The rect a connector attaches to. Children of a group borrow the group's
/// extent on the axis their orientation names, so the line meets the side of
/// the group instead of the child.
fn anchor_coords<P: RectProvider + ?Sized>(
    key: &str,
    element: &MeasuredElement,
    provider: &P,
    canvas: &Rect,
    scale: f32,
) -> Result<RoundedCoords, LayoutError> {
    let own = finite_coords(key, &element.rect, canvas, scale)?;
    let Some(group_key) = element.group.as_deref() else {
        return Ok(own);
    };
    if element.orientation == Orientation::SelfRect {
        return Ok(own);
    }
    let Some(group) = provider.element(group_key) else {
        warn!("group `{group_key}` of `{key}` not found, attaching to the element");
        return Ok(own);
    };
    let group = finite_coords(group_key, &group.rect, canvas, scale)?;
    Ok(match element.orientation {
        Orientation::Horizontal => RoundedCoords {
            left: group.left,
            right: group.right,
            ..own
        },
        Orientation::Vertical => RoundedCoords {
            top: group.top,
            bottom: group.bottom,
            ..own
        },
        Orientation::Parent => group,
        Orientation::SelfRect => own,
    })
}

fn finite_coords(
    key: &str,
    rect: &Rect,
    canvas: &Rect,
    scale: f32,
) -> Result<RoundedCoords, LayoutError> {
    let local = to_canvas_space(rect, canvas, scale);
    if !local.is_finite() {
        return Err(LayoutError::computation(key, "non-finite bounding rect"));
    }
    Ok(rounded_coords(&local, Position::default()))
}
