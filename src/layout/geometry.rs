use crate::ir::{Position, Rect};

use super::{ConnectorPoint, RoundedCoords, Vector};

/// Default tolerance for two coordinates to count as the same edge. Absorbs
/// sub-pixel jitter and rounded corners.
pub const EDGE_EPSILON: f32 = 8.0;

pub fn round(n: f32) -> f32 {
    n.round()
}

pub fn floor(n: f32) -> f32 {
    n.floor()
}

pub fn ceil(n: f32) -> f32 {
    n.ceil()
}

pub fn eps_equal(a: f32, b: f32, delta: f32) -> bool {
    (a - b).abs() <= delta
}

/// Rounded edges of `rect`, translated into the space whose origin is `origin`.
pub fn rounded_coords(rect: &Rect, origin: Position) -> RoundedCoords {
    let left = round(rect.left - origin.left);
    let top = round(rect.top - origin.top);
    RoundedCoords {
        top,
        bottom: top + round(rect.height),
        left,
        right: left + round(rect.width),
    }
}

pub fn classify_attachment(x: f32, y: f32, coords: &RoundedCoords) -> Vector {
    classify_attachment_with(x, y, coords, EDGE_EPSILON)
}

/// Corners are checked before edges; a point matching nothing is `Top`.
pub fn classify_attachment_with(x: f32, y: f32, coords: &RoundedCoords, delta: f32) -> Vector {
    let on_top = eps_equal(y, coords.top, delta);
    let on_bottom = eps_equal(y, coords.bottom, delta);
    let on_left = eps_equal(x, coords.left, delta);
    let on_right = eps_equal(x, coords.right, delta);

    if on_top && on_left {
        Vector::TopLeft
    } else if on_top && on_right {
        Vector::TopRight
    } else if on_bottom && on_left {
        Vector::BottomLeft
    } else if on_bottom && on_right {
        Vector::BottomRight
    } else if on_top {
        Vector::Top
    } else if on_bottom {
        Vector::Bottom
    } else if on_left {
        Vector::Left
    } else if on_right {
        Vector::Right
    } else {
        Vector::Top
    }
}

/// The eight boundary points of a 3×3 grid over `coords`, row by row from the
/// top-left corner. The centre has no boundary vector and is left out.
pub fn candidate_points(coords: &RoundedCoords) -> Vec<ConnectorPoint> {
    // Small rects would otherwise classify their midpoints as corners.
    let delta = EDGE_EPSILON
        .min(coords.width().abs() / 4.0)
        .min(coords.height().abs() / 4.0);
    let xs = [
        coords.left,
        round((coords.left + coords.right) / 2.0),
        coords.right,
    ];
    let ys = [
        coords.top,
        round((coords.top + coords.bottom) / 2.0),
        coords.bottom,
    ];

    let mut points = Vec::with_capacity(8);
    for (row, &y) in ys.iter().enumerate() {
        for (col, &x) in xs.iter().enumerate() {
            if row == 1 && col == 1 {
                continue;
            }
            let vector = classify_attachment_with(x, y, coords, delta);
            points.push(ConnectorPoint::new(x, y, vector));
        }
    }
    points
}

pub fn is_inside(x: f32, y: f32, coords: &RoundedCoords) -> bool {
    x >= coords.left && x <= coords.right && y >= coords.top && y <= coords.bottom
}

/// Closest `(from, to)` pair by Euclidean distance; the first pair found wins
/// ties. Pairs with a NaN distance never win.
pub fn closest_pair(
    from: &[ConnectorPoint],
    to: &[ConnectorPoint],
) -> Option<(ConnectorPoint, ConnectorPoint)> {
    let mut best: Option<(ConnectorPoint, ConnectorPoint, f32)> = None;
    for a in from {
        for b in to {
            let dist = a.distance(b);
            if dist.is_nan() {
                continue;
            }
            match best {
                Some((_, _, best_dist)) if dist >= best_dist => {}
                _ => best = Some((*a, *b, dist)),
            }
        }
    }
    best.map(|(a, b, _)| (a, b))
}
