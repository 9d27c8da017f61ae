use log::warn;
use serde::{Deserialize, Serialize};

use crate::ir::{ConnectorDescriptor, DescriptorCollection, Position};
use crate::layout::LayoutError;

/// Host-owned canvas state, changed only through [`reduce`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasState {
    pub containers: DescriptorCollection,
    pub connectors: Vec<ConnectorDescriptor>,
    pub size: Option<CanvasSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

/// Partial update of one descriptor. Only the persisted fields can be
/// patched; geometry comes from measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DescriptorPatch {
    pub key: Option<String>,
    pub relative: Option<Position>,
    /// `Some(None)` clears the binding.
    #[serde(with = "double_option", skip_serializing_if = "Option::is_none")]
    pub bound_to_container: Option<Option<String>>,
    #[serde(with = "double_option", skip_serializing_if = "Option::is_none")]
    pub stick_to: Option<Option<String>>,
    pub can_be_bound: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum CanvasEvent {
    Replace(DescriptorCollection),
    Patch(Vec<DescriptorPatch>),
    Delete(Vec<String>),
    Resize(CanvasSize),
}

pub fn reduce(state: &CanvasState, event: CanvasEvent) -> CanvasState {
    let mut next = state.clone();
    match event {
        CanvasEvent::Replace(containers) => {
            next.containers = containers
                .into_iter()
                .filter_map(|(key, mut descriptor)| {
                    if key.is_empty() {
                        warn!(
                            "{}",
                            LayoutError::MalformedDescriptor {
                                reason: "replace entry without a key".to_string()
                            }
                        );
                        return None;
                    }
                    descriptor.key = key.clone();
                    Some((key, descriptor))
                })
                .collect();
        }
        CanvasEvent::Patch(patches) => {
            for patch in patches {
                apply_patch(&mut next.containers, patch);
            }
        }
        CanvasEvent::Delete(keys) => {
            for key in keys {
                next.containers.remove(&key);
                next.connectors
                    .retain(|connector| connector.from != key && connector.to != key);
            }
        }
        CanvasEvent::Resize(size) => {
            next.size = Some(size);
        }
    }
    next
}

fn apply_patch(containers: &mut DescriptorCollection, patch: DescriptorPatch) {
    let Some(key) = patch.key.filter(|key| !key.is_empty()) else {
        warn!(
            "{}",
            LayoutError::MalformedDescriptor {
                reason: "patch without a key".to_string()
            }
        );
        return;
    };
    let Some(descriptor) = containers.get_mut(&key) else {
        warn!("patch ignored: {}", LayoutError::missing(&key));
        return;
    };
    if let Some(relative) = patch.relative {
        descriptor.relative = Some(relative);
    }
    if let Some(bound) = patch.bound_to_container {
        descriptor.bound_to_container = bound;
    }
    if let Some(stick_to) = patch.stick_to {
        descriptor.stick_to = stick_to;
    }
    if let Some(can_be_bound) = patch.can_be_bound {
        descriptor.can_be_bound = can_be_bound;
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<String>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Option<String>>, D::Error> {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}
