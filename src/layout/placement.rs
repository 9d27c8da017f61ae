use log::debug;

use crate::config::PlacementConfig;
use crate::ir::{DescriptorCollection, Position, Rect};

/// First position at or below `start` where a `width`×`height` box overlaps
/// none of `occupied`. Each overlap pushes the box below the rect it hit.
/// After `max_attempts` the last computed position is returned even if it
/// still overlaps.
pub fn find_free_slot(
    start: Position,
    width: f32,
    height: f32,
    occupied: &[Rect],
    config: &PlacementConfig,
) -> Position {
    let mut candidate = Rect::new(start.left, start.top, width, height);
    for _ in 0..config.max_attempts.max(1) {
        let Some(blocker) = occupied.iter().find(|rect| rect.intersects(&candidate)) else {
            return Position::new(candidate.left, candidate.top);
        };
        candidate.top = blocker.bottom() + config.gap;
    }
    debug!(
        "no free slot after {} attempts, placing at ({}, {})",
        config.max_attempts, candidate.left, candidate.top
    );
    Position::new(candidate.left, candidate.top)
}

/// Rects, in unscaled relative units, of every absolutely placed node except
/// `skip`.
pub fn occupied_rects(descriptors: &DescriptorCollection, skip: &str) -> Vec<Rect> {
    descriptors
        .values()
        .filter(|d| d.absolute && d.key != skip)
        .map(|d| {
            let relative = d.relative_or_default();
            Rect::new(relative.left, relative.top, d.width, d.height)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ContainerDescriptor;

    #[test]
    fn free_start_is_kept() {
        let slot = find_free_slot(
            Position::new(0.0, 0.0),
            50.0,
            50.0,
            &[Rect::new(100.0, 0.0, 50.0, 50.0)],
            &PlacementConfig::default(),
        );
        assert_eq!(slot, Position::new(0.0, 0.0));
    }

    #[test]
    fn moves_below_each_blocker() {
        let occupied = [
            Rect::new(0.0, 0.0, 100.0, 40.0),
            Rect::new(0.0, 56.0, 100.0, 40.0),
        ];
        let slot = find_free_slot(
            Position::new(10.0, 0.0),
            50.0,
            20.0,
            &occupied,
            &PlacementConfig::default(),
        );
        assert_eq!(slot, Position::new(10.0, 112.0));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let occupied: Vec<Rect> = (0..10)
            .map(|i| Rect::new(0.0, i as f32 * 20.0, 100.0, 20.0))
            .collect();
        let config = PlacementConfig {
            max_attempts: 2,
            gap: 0.0,
        };
        let slot = find_free_slot(Position::new(0.0, 0.0), 10.0, 10.0, &occupied, &config);
        assert_eq!(slot, Position::new(0.0, 40.0));
    }

    #[test]
    fn only_absolute_nodes_occupy_space() {
        let mut collection = DescriptorCollection::new();
        let mut a = ContainerDescriptor::new("a");
        a.absolute = true;
        a.width = 10.0;
        a.height = 10.0;
        a.relative = Some(Position::new(4.0, 4.0));
        collection.insert("a".to_string(), a);
        collection.insert("flow".to_string(), ContainerDescriptor::new("flow"));
        let rects = occupied_rects(&collection, "new");
        assert_eq!(rects, vec![Rect::new(4.0, 4.0, 10.0, 10.0)]);
        assert!(occupied_rects(&collection, "a").is_empty());
    }
}
