use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ir::{Orientation, Position};

/// Attachment direction of a point on a rectangle's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Vector {
    Top,
    Bottom,
    Left,
    Right,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Vector {
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Vector::TopLeft | Vector::TopRight | Vector::BottomLeft | Vector::BottomRight
        )
    }

    pub fn is_horizontal_edge(self) -> bool {
        matches!(self, Vector::Left | Vector::Right)
    }

    pub fn is_vertical_edge(self) -> bool {
        matches!(self, Vector::Top | Vector::Bottom)
    }

    /// Unit direction pointing away from the rectangle.
    pub fn direction(self) -> (f32, f32) {
        const D: f32 = std::f32::consts::FRAC_1_SQRT_2;
        match self {
            Vector::Top => (0.0, -1.0),
            Vector::Bottom => (0.0, 1.0),
            Vector::Left => (-1.0, 0.0),
            Vector::Right => (1.0, 0.0),
            Vector::TopLeft => (-D, -D),
            Vector::TopRight => (D, -D),
            Vector::BottomLeft => (-D, D),
            Vector::BottomRight => (D, D),
        }
    }

    /// Whether a connector ending here may use this point.
    pub fn allowed_for(self, orientation: Orientation) -> bool {
        match orientation {
            Orientation::Horizontal => self.is_horizontal_edge(),
            Orientation::Vertical => self.is_vertical_edge(),
            Orientation::SelfRect | Orientation::Parent => !self.is_corner(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectorPoint {
    pub x: f32,
    pub y: f32,
    pub vector: Vector,
}

impl ConnectorPoint {
    pub fn new(x: f32, y: f32, vector: Vector) -> Self {
        Self { x, y, vector }
    }

    pub fn distance(&self, other: &ConnectorPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Edges of a rectangle, rounded to whole pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundedCoords {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl RoundedCoords {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// A routed connector, ready to be drawn. `start` and `end` are relative to
/// the connector's own bounding box at (`left`, `top`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutedConnector {
    pub from: String,
    pub to: String,
    pub top: f32,
    pub left: f32,
    pub w: f32,
    pub h: f32,
    pub start: ConnectorPoint,
    pub end: ConnectorPoint,
}

/// One measured container in canvas space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRect {
    pub key: String,
    /// Canvas-local offset in screen pixels at the current scale.
    pub offset: Position,
    /// Unscaled size.
    pub width: f32,
    pub height: f32,
    /// Explicit CSS position, unscaled. `None` for `auto`.
    pub style_left: Option<f32>,
    pub style_top: Option<f32>,
    pub extra: bool,
    pub absolute: bool,
    pub sticky: bool,
    pub resizable: bool,
    pub swappable: bool,
    pub can_be_bound: bool,
    pub stick_to: Option<String>,
}

pub type MeasureDict = BTreeMap<String, ContainerRect>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    pub max_left: f32,
    pub max_top: f32,
    pub min_left: f32,
    pub min_top: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Feature tags collected for every container under the pointer at drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneTag {
    Container,
    Sticky,
    Extra,
    Absolute,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropHit {
    pub key: String,
    pub tags: Vec<ZoneTag>,
}

impl DropHit {
    pub fn is_container(&self) -> bool {
        self.tags.contains(&ZoneTag::Container)
    }
}
