use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f32,
    pub top: f32,
}

impl Position {
    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }
}

/// Geometry of the container a node was attached to when it was last reconciled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedCoords {
    pub key: String,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl AttachedCoords {
    pub fn position(&self) -> Position {
        Position::new(self.left, self.top)
    }
}

/// Persisted and derived state of one canvas node.
///
/// `relative` is kept in unscaled module units and is the only position the
/// host has to persist. `offset` is the measured canvas-local offset in
/// screen pixels at the current scale; `width`/`height` are unscaled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerDescriptor {
    pub key: String,
    pub relative: Option<Position>,
    pub offset: Position,
    pub width: f32,
    pub height: f32,
    pub extra: bool,
    pub absolute: bool,
    pub sticky: bool,
    pub resizable: bool,
    pub swappable: bool,
    pub stick_to: Option<String>,
    pub parent: Option<Rect>,
    pub bound_to_container: Option<String>,
    pub can_be_bound: bool,
    #[serde(
        rename = "lastKnownAttachedToCoords",
        alias = "_lastKnownAttachedToCoords"
    )]
    pub last_known_attached_to: Option<AttachedCoords>,
}

impl ContainerDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn relative_or_default(&self) -> Position {
        self.relative.unwrap_or_default()
    }

    /// The container this node follows: a drag-established binding wins over
    /// a declared `stick_to` parent.
    pub fn attachment_target(&self) -> Option<&str> {
        self.bound_to_container
            .as_deref()
            .or(self.stick_to.as_deref())
    }
}

pub type DescriptorCollection = BTreeMap<String, ContainerDescriptor>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    pub from: String,
    pub to: String,
}

impl ConnectorDescriptor {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Which side of a group a child's connectors attach to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Horizontal,
    Vertical,
    #[default]
    #[serde(rename = "self")]
    SelfRect,
    Parent,
}

/// Marker attributes read from a rendered container element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementFlags {
    /// The element accepts dropped nodes as bound children.
    pub drop_zone: bool,
    pub extra: bool,
    pub absolute: bool,
    pub sticky: bool,
    pub resizable: bool,
    pub swappable: bool,
    pub can_be_bound: bool,
}

/// One container element as the render host reports it, in viewport pixels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasuredElement {
    pub key: Option<String>,
    pub rect: Rect,
    /// Computed CSS `left`; `None` when the style is `auto`.
    #[serde(deserialize_with = "css_position")]
    pub style_left: Option<f32>,
    /// Computed CSS `top`; `None` when the style is `auto`.
    #[serde(deserialize_with = "css_position")]
    pub style_top: Option<f32>,
    pub flags: ElementFlags,
    pub stick_to: Option<String>,
    /// Key of the group container this element is drawn inside.
    pub group: Option<String>,
    pub orientation: Orientation,
    /// Named drop zone, reported as a tag on drag hit-tests.
    pub zone: Option<String>,
}

impl MeasuredElement {
    pub fn new(key: impl Into<String>, rect: Rect) -> Self {
        Self {
            key: Some(key.into()),
            rect,
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    /// Pixel value of a computed style; `auto` and anything unparsable is
    /// "no explicit position", never zero.
    fn as_px(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => {
                let trimmed = val.trim();
                trimmed
                    .strip_suffix("px")
                    .unwrap_or(trimmed)
                    .trim()
                    .parse::<f32>()
                    .ok()
            }
        }
    }
}

fn css_position<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(NumberOrString::as_px))
}

/// A complete canvas snapshot: rendered elements, persisted descriptors and
/// the connectors to route between them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scene {
    pub canvas: Rect,
    pub elements: Vec<MeasuredElement>,
    /// Optional overlay element measured separately from the containers.
    pub extra: Option<Rect>,
    pub descriptors: DescriptorCollection,
    pub connectors: Vec<ConnectorDescriptor>,
}

impl Scene {
    pub fn new(canvas: Rect) -> Self {
        Self {
            canvas,
            ..Default::default()
        }
    }

    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_accepts_underscored_snapshot_name() {
        let json = r#"{
            "key": "a",
            "relative": {"left": 4, "top": 8},
            "boundToContainer": "group",
            "_lastKnownAttachedToCoords": {"key": "group", "left": 0, "top": 0, "width": 10, "height": 10}
        }"#;
        let descriptor: ContainerDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.relative, Some(Position::new(4.0, 8.0)));
        assert_eq!(descriptor.attachment_target(), Some("group"));
        assert_eq!(
            descriptor.last_known_attached_to.as_ref().map(|c| c.width),
            Some(10.0)
        );
    }

    #[test]
    fn css_auto_is_not_zero() {
        let json = r#"{"key": "a", "styleLeft": "auto", "styleTop": "12px"}"#;
        let element: MeasuredElement = serde_json::from_str(json).unwrap();
        assert_eq!(element.style_left, None);
        assert_eq!(element.style_top, Some(12.0));

        let element: MeasuredElement = serde_json::from_str(r#"{"styleLeft": 0}"#).unwrap();
        assert_eq!(element.style_left, Some(0.0));
        assert_eq!(element.key, None);
    }

    #[test]
    fn binding_wins_over_stick_to() {
        let mut descriptor = ContainerDescriptor::new("a");
        descriptor.stick_to = Some("parent".to_string());
        assert_eq!(descriptor.attachment_target(), Some("parent"));
        descriptor.bound_to_container = Some("box".to_string());
        assert_eq!(descriptor.attachment_target(), Some("box"));
    }

    #[test]
    fn orientation_uses_lowercase_names() {
        let parsed: Orientation = serde_json::from_str("\"self\"").unwrap();
        assert_eq!(parsed, Orientation::SelfRect);
        let parsed: Orientation = serde_json::from_str("\"horizontal\"").unwrap();
        assert_eq!(parsed, Orientation::Horizontal);
    }
}
