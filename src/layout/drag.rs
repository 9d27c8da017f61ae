use std::collections::BTreeSet;

use log::{debug, warn};

use crate::config::LayoutConfig;
use crate::ir::{DescriptorCollection, MeasuredElement, Position, Rect};
use crate::provider::RectProvider;

use super::error::LayoutError;
use super::geometry::{ceil, floor};
use super::{DropHit, ZoneTag};

/// The element a pointer-down landed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerHit {
    pub key: Option<String>,
    /// True only when the element itself is a container, not one of its
    /// descendants.
    pub is_container: bool,
}

impl PointerHit {
    pub fn container(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            is_container: true,
        }
    }

    pub fn descendant(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            is_container: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        key: String,
        /// Pointer position at drag start, viewport pixels.
        origin: Position,
        /// Dragged element at drag start, canvas-local screen pixels.
        target_rect: Rect,
    },
}

/// Result of a committed drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragOutcome {
    pub key: String,
    /// Snapped delta in unscaled module units.
    pub delta: Position,
    pub descriptors: DescriptorCollection,
    /// Containers under the pointer at drop, in document order.
    pub hits: Vec<DropHit>,
    pub bound_to: Option<String>,
}

/// Tracks one pointer drag: Idle → Dragging → Idle. Mouse-leave is delivered
/// as a drag end.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
    placeholder: Option<Rect>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Floating placeholder rect in canvas-local screen pixels, shown while
    /// dragging.
    pub fn placeholder(&self) -> Option<Rect> {
        self.placeholder
    }

    pub fn on_drag_start<P: RectProvider + ?Sized>(
        &mut self,
        pointer: Position,
        hit: &PointerHit,
        provider: &P,
    ) -> bool {
        if !hit.is_container {
            return false;
        }
        let Some(key) = hit.key.as_deref() else {
            return false;
        };
        let Some(element) = provider.element(key) else {
            warn!("drag start ignored: {}", LayoutError::missing(key));
            return false;
        };
        if self.is_dragging() {
            debug!("replacing an abandoned drag");
        }
        let canvas = provider.canvas_rect();
        let target_rect = element.rect.translate(-canvas.left, -canvas.top);
        self.state = DragState::Dragging {
            key: key.to_string(),
            origin: pointer,
            target_rect,
        };
        self.placeholder = Some(target_rect);
        true
    }

    pub fn on_drag_move(&mut self, pointer: Position, config: &LayoutConfig) -> Option<Rect> {
        let DragState::Dragging {
            origin,
            target_rect,
            ..
        } = &self.state
        else {
            return None;
        };
        let delta = drag_delta(*origin, pointer, config);
        let placeholder =
            target_rect.translate(delta.left * config.scale, delta.top * config.scale);
        self.placeholder = Some(placeholder);
        Some(placeholder)
    }

    /// Commits the drag: moves the dragged node and its bound children by the
    /// snapped delta and, for bindable nodes, rebinds it to the container
    /// under the pointer.
    pub fn on_drag_end<P: RectProvider + ?Sized>(
        &mut self,
        pointer: Position,
        descriptors: &DescriptorCollection,
        provider: &P,
        config: &LayoutConfig,
    ) -> Option<DragOutcome> {
        let DragState::Dragging { key, origin, .. } = std::mem::take(&mut self.state) else {
            return None;
        };
        self.placeholder = None;

        let delta = drag_delta(origin, pointer, config);
        let mut next = descriptors.clone();
        let mut moved: BTreeSet<String> = BTreeSet::new();
        for descriptor in next.values_mut() {
            let is_dragged = descriptor.key == key;
            let is_child = descriptor.bound_to_container.as_deref() == Some(key.as_str());
            if !(is_dragged || is_child) {
                continue;
            }
            let relative = descriptor.relative_or_default();
            descriptor.relative = Some(Position::new(
                relative.left + delta.left,
                relative.top + delta.top,
            ));
            // The container will be measured at its new place; shift the
            // snapshot too so the child is not moved a second time.
            if is_child {
                if let Some(snapshot) = descriptor.last_known_attached_to.as_mut() {
                    if snapshot.key == key {
                        snapshot.left += delta.left;
                        snapshot.top += delta.top;
                    }
                }
            }
            moved.insert(descriptor.key.clone());
        }
        if !moved.contains(&key) {
            warn!("drag end: {}", LayoutError::missing(&key));
        }

        let element = provider.element(&key);
        let can_be_bound = next.get(&key).map(|d| d.can_be_bound).unwrap_or(false)
            || element
                .as_ref()
                .map(|e| e.flags.can_be_bound)
                .unwrap_or(false);

        let mut hits = Vec::new();
        let mut bound_to = next.get(&key).and_then(|d| d.bound_to_container.clone());
        if can_be_bound {
            if element.is_some() {
                hits = drop_hits(pointer, provider, &moved);
            } else {
                debug!("`{key}` vanished before drop, no container found");
            }
            bound_to = hits
                .iter()
                .find(|hit| hit.is_container())
                .map(|hit| hit.key.clone());
            if let Some(descriptor) = next.get_mut(&key) {
                descriptor.bound_to_container = bound_to.clone();
            }
        }
        debug!(
            "dropped `{key}` by ({}, {}), bound to {:?}",
            delta.left, delta.top, bound_to
        );

        Some(DragOutcome {
            key,
            delta,
            descriptors: next,
            hits,
            bound_to,
        })
    }

    /// Drops an abandoned drag (e.g. the canvas went away mid-gesture).
    /// Returns whether a drag was in progress.
    pub fn abandon(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = DragState::Idle;
        self.placeholder = None;
        was_dragging
    }
}

/// Snaps one axis toward zero to a multiple of `module_size`.
pub fn snap_delta(raw: f32, module_size: f32) -> f32 {
    let snapped = if raw >= 0.0 {
        floor(raw / module_size) * module_size
    } else {
        ceil(raw / module_size) * module_size
    };
    // normalise -0.0
    snapped + 0.0
}

/// Pointer movement converted to unscaled units and snapped per axis.
fn drag_delta(origin: Position, pointer: Position, config: &LayoutConfig) -> Position {
    Position::new(
        snap_delta((pointer.left - origin.left) / config.scale, config.module_size),
        snap_delta((pointer.top - origin.top) / config.scale, config.module_size),
    )
}

/// Containers under `pointer`, excluding the dragged subtree.
pub fn drop_hits<P: RectProvider + ?Sized>(
    pointer: Position,
    provider: &P,
    exclude: &BTreeSet<String>,
) -> Vec<DropHit> {
    provider
        .elements()
        .into_iter()
        .filter_map(|element| {
            let key = element.key.clone()?;
            if exclude.contains(&key) || !contains_pointer(&element.rect, pointer) {
                return None;
            }
            Some(DropHit {
                key,
                tags: zone_tags(&element),
            })
        })
        .collect()
}

/// Half-open hit test: a pointer on the right or bottom edge is outside.
fn contains_pointer(rect: &Rect, pointer: Position) -> bool {
    pointer.left >= rect.left
        && pointer.left < rect.right()
        && pointer.top >= rect.top
        && pointer.top < rect.bottom()
}

fn zone_tags(element: &MeasuredElement) -> Vec<ZoneTag> {
    let mut tags = Vec::new();
    if element.flags.drop_zone {
        tags.push(ZoneTag::Container);
    }
    if element.flags.sticky {
        tags.push(ZoneTag::Sticky);
    }
    if element.flags.extra {
        tags.push(ZoneTag::Extra);
    }
    if element.flags.absolute {
        tags.push(ZoneTag::Absolute);
    }
    if let Some(zone) = &element.zone {
        tags.push(ZoneTag::Named(zone.clone()));
    }
    tags
}
