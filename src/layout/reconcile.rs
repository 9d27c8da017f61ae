use std::collections::BTreeSet;

use log::{debug, warn};

use crate::ir::{AttachedCoords, ContainerDescriptor, DescriptorCollection, Position, Rect};

use super::error::LayoutError;
use super::geometry::round;
use super::{ContainerRect, MeasureDict};

/// Merges freshly measured containers into the prior descriptors.
///
/// Measured geometry always replaces stored geometry; `relative` is user
/// intent and survives from the prior state. Nodes bound to (or sticking
/// to) another container follow it: they are seeded at its position on
/// first attachment and re-anchored when its snapshot goes stale.
///
/// Prior descriptors that were not measured in this batch are carried
/// forward untouched, so a node that is briefly not rendered keeps its
/// persisted state. A node whose geometry cannot be computed keeps its prior
/// descriptor as well.
pub fn reconcile(rects: &MeasureDict, prior: &DescriptorCollection, scale: f32) -> DescriptorCollection {
    let mut next = DescriptorCollection::new();
    for (key, rect) in rects {
        match reconcile_node(rect, prior.get(key), rects, scale) {
            Ok(descriptor) => {
                next.insert(key.clone(), descriptor);
            }
            Err(err) => warn!("{err}"),
        }
    }
    for (key, descriptor) in prior {
        if !next.contains_key(key) {
            next.insert(key.clone(), descriptor.clone());
        }
    }
    next
}

fn reconcile_node(
    rect: &ContainerRect,
    previous: Option<&ContainerDescriptor>,
    batch: &MeasureDict,
    scale: f32,
) -> Result<ContainerDescriptor, LayoutError> {
    if !(rect.offset.left.is_finite()
        && rect.offset.top.is_finite()
        && rect.width.is_finite()
        && rect.height.is_finite())
    {
        return Err(LayoutError::computation(&rect.key, "non-finite geometry"));
    }

    let mut descriptor = previous
        .cloned()
        .unwrap_or_else(|| ContainerDescriptor::new(rect.key.clone()));
    descriptor.key = rect.key.clone();
    descriptor.offset = rect.offset;
    descriptor.width = rect.width;
    descriptor.height = rect.height;
    descriptor.extra = rect.extra;
    descriptor.absolute = rect.absolute;
    descriptor.sticky = rect.sticky;
    descriptor.resizable = rect.resizable;
    descriptor.swappable = rect.swappable;
    descriptor.can_be_bound = rect.can_be_bound;
    descriptor.stick_to = rect.stick_to.clone();

    if let Some(parent_key) = descriptor.stick_to.as_deref() {
        if let Some(parent) = batch.get(parent_key) {
            descriptor.parent = Some(attached_rect(parent, scale));
        }
    }

    if let Some(target_key) = descriptor.attachment_target().map(str::to_string) {
        if target_key == rect.key {
            warn!("`{target_key}` is attached to itself, ignoring");
        } else {
            match batch.get(&target_key) {
                Some(target) => follow_target(&mut descriptor, rect, target, scale),
                None => warn!(
                    "`{}` is attached to `{target_key}`: {}",
                    rect.key,
                    LayoutError::missing(&target_key)
                ),
            }
        }
    }

    if descriptor.relative.is_none() {
        descriptor.relative = Some(initial_relative(rect));
    }
    Ok(descriptor)
}

fn follow_target(
    descriptor: &mut ContainerDescriptor,
    rect: &ContainerRect,
    target: &ContainerRect,
    scale: f32,
) {
    let current = attached_coords(target, scale);
    match (descriptor.relative, descriptor.last_known_attached_to.as_ref()) {
        (None, _) => {
            debug!("seeding `{}` at `{}`", descriptor.key, current.key);
            descriptor.relative = Some(current.position());
        }
        (Some(relative), Some(last)) if last.key == current.key && *last != current => {
            let rendered = Position::new(
                round(rect.offset.left / scale),
                round(rect.offset.top / scale),
            );
            let moved = reanchor(relative, rendered, last, &current);
            debug!(
                "`{}` follows `{}`: ({}, {}) -> ({}, {})",
                descriptor.key, current.key, relative.left, relative.top, moved.left, moved.top
            );
            descriptor.relative = Some(moved);
        }
        _ => {}
    }
    descriptor.last_known_attached_to = Some(current);
}

/// Keeps a child where it was inside a container that moved or resized.
///
/// `rendered` is the child's unscaled canvas position as last drawn. Its
/// distance from the container origin scales with the container's size on
/// each axis and the container's new origin is added back; `relative` is
/// then shifted by however far that moves the child.
pub fn reanchor(
    relative: Position,
    rendered: Position,
    before: &AttachedCoords,
    after: &AttachedCoords,
) -> Position {
    fn ratio(new: f32, old: f32) -> f32 {
        if old.abs() < f32::EPSILON {
            1.0
        } else {
            new / old
        }
    }
    let rx = ratio(after.width, before.width);
    let ry = ratio(after.height, before.height);
    let left = after.left + (rendered.left - before.left) * rx;
    let top = after.top + (rendered.top - before.top) * ry;
    Position::new(
        round(relative.left + left - rendered.left),
        round(relative.top + top - rendered.top),
    )
}

/// Starting relative offset of a node with no recorded intent: an explicit
/// CSS position for absolutely placed nodes, the origin otherwise.
fn initial_relative(rect: &ContainerRect) -> Position {
    if rect.absolute && (rect.style_left.is_some() || rect.style_top.is_some()) {
        Position::new(
            rect.style_left.unwrap_or(0.0),
            rect.style_top.unwrap_or(0.0),
        )
    } else {
        Position::default()
    }
}

fn attached_rect(target: &ContainerRect, scale: f32) -> Rect {
    Rect::new(
        round(target.offset.left / scale),
        round(target.offset.top / scale),
        target.width,
        target.height,
    )
}

fn attached_coords(target: &ContainerRect, scale: f32) -> AttachedCoords {
    let rect = attached_rect(target, scale);
    AttachedCoords {
        key: target.key.clone(),
        left: rect.left,
        top: rect.top,
        width: rect.width,
        height: rect.height,
    }
}

/// Whether `new` differs from `old` in any key or any field.
///
/// This is what breaks the measure → reconcile → re-render loop: two
/// structurally equal collections never need an update, whatever their
/// identity.
pub fn needs_update(old: &DescriptorCollection, new: &DescriptorCollection) -> bool {
    old.len() != new.len() || old.iter().any(|(key, descriptor)| new.get(key) != Some(descriptor))
}

/// Keys that were added, removed or changed between `old` and `new`.
pub fn changed_keys(old: &DescriptorCollection, new: &DescriptorCollection) -> Vec<String> {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    keys.into_iter()
        .filter(|key| old.get(*key) != new.get(*key))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(key: &str, left: f32, top: f32, width: f32, height: f32) -> ContainerRect {
        ContainerRect {
            key: key.to_string(),
            offset: Position::new(left, top),
            width,
            height,
            ..Default::default()
        }
    }

    fn dict(rects: Vec<ContainerRect>) -> MeasureDict {
        rects.into_iter().map(|r| (r.key.clone(), r)).collect()
    }

    fn ten_nodes() -> DescriptorCollection {
        let rects = dict(
            (0..10)
                .map(|i| rect(&format!("n{i}"), i as f32 * 120.0, 0.0, 100.0, 50.0))
                .collect(),
        );
        reconcile(&rects, &DescriptorCollection::new(), 1.0)
    }

    #[test]
    fn reconcile_is_idempotent_without_geometry_change() {
        let mut child = rect("child", 10.0, 60.0, 40.0, 20.0);
        child.stick_to = Some("box".to_string());
        let rects = dict(vec![rect("box", 0.0, 0.0, 200.0, 200.0), child]);
        let first = reconcile(&rects, &DescriptorCollection::new(), 1.0);
        let second = reconcile(&rects, &first, 1.0);
        assert!(!needs_update(&first, &second));
    }

    #[test]
    fn measured_geometry_wins_and_relative_survives() {
        let mut prior = DescriptorCollection::new();
        let mut stale = ContainerDescriptor::new("a");
        stale.relative = Some(Position::new(12.0, 16.0));
        stale.width = 1.0;
        stale.offset = Position::new(999.0, 999.0);
        prior.insert("a".to_string(), stale);

        let next = reconcile(&dict(vec![rect("a", 5.0, 6.0, 70.0, 30.0)]), &prior, 1.0);
        let a = &next["a"];
        assert_eq!(a.relative, Some(Position::new(12.0, 16.0)));
        assert_eq!(a.offset, Position::new(5.0, 6.0));
        assert_eq!(a.width, 70.0);
    }

    #[test]
    fn new_node_defaults_to_origin() {
        let next = reconcile(
            &dict(vec![rect("a", 5.0, 6.0, 70.0, 30.0)]),
            &DescriptorCollection::new(),
            1.0,
        );
        assert_eq!(next["a"].relative, Some(Position::default()));
    }

    #[test]
    fn absolute_node_starts_at_css_position() {
        let mut a = rect("a", 0.0, 0.0, 70.0, 30.0);
        a.absolute = true;
        a.style_left = Some(24.0);
        let next = reconcile(&dict(vec![a]), &DescriptorCollection::new(), 1.0);
        assert_eq!(next["a"].relative, Some(Position::new(24.0, 0.0)));
    }

    #[test]
    fn first_attachment_seeds_from_target() {
        let mut prior = DescriptorCollection::new();
        let mut child = ContainerDescriptor::new("child");
        child.bound_to_container = Some("box".to_string());
        prior.insert("child".to_string(), child);

        let rects = dict(vec![
            rect("box", 40.0, 80.0, 200.0, 100.0),
            rect("child", 0.0, 0.0, 20.0, 20.0),
        ]);
        let next = reconcile(&rects, &prior, 2.0);
        let child = &next["child"];
        assert_eq!(child.relative, Some(Position::new(20.0, 40.0)));
        let snapshot = child.last_known_attached_to.as_ref().unwrap();
        assert_eq!(snapshot.key, "box");
        assert_eq!((snapshot.left, snapshot.top), (20.0, 40.0));
    }

    #[test]
    fn moved_target_drags_child_along() {
        let mut child = rect("child", 50.0, 50.0, 20.0, 20.0);
        child.stick_to = Some("box".to_string());
        let before = dict(vec![rect("box", 0.0, 0.0, 100.0, 100.0), child.clone()]);
        let mut prior = reconcile(&before, &DescriptorCollection::new(), 1.0);
        prior.get_mut("child").unwrap().relative = Some(Position::new(30.0, 40.0));

        let after = dict(vec![rect("box", 20.0, 10.0, 100.0, 100.0), child]);
        let next = reconcile(&after, &prior, 1.0);
        assert_eq!(next["child"].relative, Some(Position::new(50.0, 50.0)));
        assert_eq!(
            next["child"].parent,
            Some(Rect::new(20.0, 10.0, 100.0, 100.0))
        );
        assert!(needs_update(&prior, &next));
    }

    #[test]
    fn reanchor_scales_with_target_size() {
        let before = AttachedCoords {
            key: "box".to_string(),
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let after = AttachedCoords {
            left: 10.0,
            width: 200.0,
            ..before.clone()
        };
        let moved = reanchor(
            Position::new(8.0, 4.0),
            Position::new(50.0, 50.0),
            &before,
            &after,
        );
        assert_eq!(moved, Position::new(68.0, 4.0));
    }

    #[test]
    fn dropped_child_stays_inside_widened_container() {
        // Dropped from far right: its relative offset is unrelated to where
        // the container sits.
        let mut child = rect("child", 60.0, 180.0, 160.0, 60.0);
        child.can_be_bound = true;
        let before = dict(vec![rect("box", 0.0, 0.0, 240.0, 320.0), child.clone()]);
        let mut prior = DescriptorCollection::new();
        let mut stored = ContainerDescriptor::new("child");
        stored.bound_to_container = Some("box".to_string());
        stored.relative = Some(Position::new(-380.0, 116.0));
        prior.insert("child".to_string(), stored);
        let settled = reconcile(&before, &prior, 1.0);
        assert_eq!(
            settled["child"].relative,
            Some(Position::new(-380.0, 116.0))
        );

        let after = dict(vec![rect("box", 0.0, 0.0, 480.0, 320.0), child]);
        let next = reconcile(&after, &settled, 1.0);
        let relative = next["child"].relative.unwrap();
        assert_eq!(relative, Position::new(-320.0, 116.0));
        // Drawn position moves by the same amount as relative.
        let drawn = 60.0 + (relative.left + 380.0);
        assert!((0.0..480.0).contains(&drawn), "x={drawn} outside 0..480");
    }

    #[test]
    fn missing_target_keeps_relationship() {
        let mut prior = DescriptorCollection::new();
        let mut child = ContainerDescriptor::new("child");
        child.bound_to_container = Some("gone".to_string());
        child.relative = Some(Position::new(8.0, 8.0));
        prior.insert("child".to_string(), child);
        let next = reconcile(&dict(vec![rect("child", 0.0, 0.0, 20.0, 20.0)]), &prior, 1.0);
        assert_eq!(next["child"].bound_to_container.as_deref(), Some("gone"));
        assert_eq!(next["child"].relative, Some(Position::new(8.0, 8.0)));
    }

    #[test]
    fn broken_node_does_not_abort_batch() {
        let rects = dict(vec![
            rect("bad", f32::NAN, 0.0, 10.0, 10.0),
            rect("good", 0.0, 0.0, 10.0, 10.0),
        ]);
        let next = reconcile(&rects, &DescriptorCollection::new(), 1.0);
        assert!(next.contains_key("good"));
        assert!(!next.contains_key("bad"));
    }

    #[test]
    fn unmeasured_descriptors_are_carried_forward() {
        let mut prior = DescriptorCollection::new();
        prior.insert("hidden".to_string(), ContainerDescriptor::new("hidden"));
        let next = reconcile(&dict(vec![rect("a", 0.0, 0.0, 10.0, 10.0)]), &prior, 1.0);
        assert_eq!(next.len(), 2);
        assert_eq!(next["hidden"], prior["hidden"]);
    }

    #[test]
    fn equal_collections_need_no_update() {
        let a = ten_nodes();
        let b = ten_nodes();
        assert!(!needs_update(&a, &b));
        assert!(!needs_update(&a, &a.clone()));
    }

    #[test]
    fn any_single_field_change_is_detected_both_ways() {
        let base = ten_nodes();
        let edits: [fn(&mut ContainerDescriptor); 6] = [
            |d: &mut ContainerDescriptor| d.width += 1.0,
            |d: &mut ContainerDescriptor| d.offset.top += 1.0,
            |d: &mut ContainerDescriptor| d.relative = Some(Position::new(4.0, 0.0)),
            |d: &mut ContainerDescriptor| d.sticky = true,
            |d: &mut ContainerDescriptor| d.bound_to_container = Some("n0".to_string()),
            |d: &mut ContainerDescriptor| d.parent = Some(Rect::default()),
        ];
        for edit in edits {
            let mut changed = base.clone();
            edit(changed.get_mut("n7").unwrap());
            assert!(needs_update(&base, &changed));
            assert!(needs_update(&changed, &base));
            assert_eq!(changed_keys(&base, &changed), vec!["n7".to_string()]);
        }
    }

    #[test]
    fn key_set_changes_are_detected() {
        let base = ten_nodes();
        let mut fewer = base.clone();
        fewer.remove("n3");
        assert!(needs_update(&base, &fewer));
        assert!(needs_update(&fewer, &base));

        let mut swapped = fewer.clone();
        swapped.insert("other".to_string(), base["n3"].clone());
        assert!(needs_update(&base, &swapped));
        assert!(needs_update(&swapped, &base));
    }
}
