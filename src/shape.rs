use serde::Serialize;

use crate::config::ConnectorConfig;
use crate::layout::{ConnectorPoint, RoutedConnector};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConnectorPath {
    Line {
        from: (f32, f32),
        to: (f32, f32),
    },
    Bezier {
        from: (f32, f32),
        c1: (f32, f32),
        c2: (f32, f32),
        to: (f32, f32),
    },
}

impl ConnectorPath {
    pub fn svg_path_data(&self) -> String {
        match self {
            ConnectorPath::Line { from, to } => {
                format!("M{} {} L{} {}", from.0, from.1, to.0, to.1)
            }
            ConnectorPath::Bezier { from, c1, c2, to } => format!(
                "M{} {} C{} {} {} {} {} {}",
                from.0, from.1, c1.0, c1.1, c2.0, c2.1, to.0, to.1
            ),
        }
    }
}

/// Drawing surface geometry for one connector: a box positioned at
/// (`left`, `top`) in canvas space and a path in the box's own coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorShape {
    pub from: String,
    pub to: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub path: ConnectorPath,
}

/// Pads the connector's box and picks a straight line for nearly flat
/// connectors, a cubic bezier leaving each end along its attachment vector
/// otherwise.
pub fn connector_shape(connector: &RoutedConnector, config: &ConnectorConfig) -> ConnectorShape {
    let pad = config.padding;
    let from = (connector.start.x + pad, connector.start.y + pad);
    let to = (connector.end.x + pad, connector.end.y + pad);

    let path = if connector.h < config.line_threshold {
        ConnectorPath::Line { from, to }
    } else {
        let arm = connector.w.max(connector.h) * config.curvature;
        ConnectorPath::Bezier {
            from,
            c1: control_point(from, &connector.start, arm),
            c2: control_point(to, &connector.end, arm),
            to,
        }
    };

    ConnectorShape {
        from: connector.from.clone(),
        to: connector.to.clone(),
        left: connector.left - pad,
        top: connector.top - pad,
        width: connector.w + pad * 2.0,
        height: connector.h + pad * 2.0,
        path,
    }
}

fn control_point(anchor: (f32, f32), point: &ConnectorPoint, arm: f32) -> (f32, f32) {
    let (dx, dy) = point.vector.direction();
    (anchor.0 + dx * arm, anchor.1 + dy * arm)
}
