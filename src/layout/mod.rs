mod bounds;
mod drag;
mod error;
pub mod geometry;
mod measure;
mod placement;
mod reconcile;
mod routing;
pub(crate) mod types;
pub use bounds::*;
pub use drag::*;
pub use error::LayoutError;
pub use measure::measure;
pub use placement::*;
pub use reconcile::*;
pub use routing::{endpoint_candidates, route, route_between};
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{ConnectorDescriptor, DescriptorCollection, Rect};
use crate::provider::RectProvider;

/// Everything the host needs to lay out one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub measured: MeasureDict,
    pub descriptors: DescriptorCollection,
    pub connectors: Vec<RoutedConnector>,
    pub extent: Extent,
    pub padding: Padding,
    /// Whether `descriptors` differ from the prior collection.
    pub changed: bool,
}

/// One full pass: measure, reconcile against `prior`, route connectors and
/// size the canvas padding.
pub fn compute_frame<P: RectProvider + ?Sized>(
    provider: &P,
    prior: &DescriptorCollection,
    connectors: &[ConnectorDescriptor],
    extra: Option<&Rect>,
    config: &LayoutConfig,
) -> Frame {
    let measured = measure(provider, prior, config.scale);
    let descriptors = reconcile(&measured, prior, config.scale);
    let changed = needs_update(prior, &descriptors);
    let routed = route(connectors, provider, config.scale);
    let extent = bounding_extent(measured.values(), extra, config.scale);
    let padding = padding_for(&provider.canvas_rect(), &extent, config.padding_buffer);
    Frame {
        measured,
        descriptors,
        connectors: routed,
        extent,
        padding,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::MeasuredElement;
    use crate::provider::SceneProvider;

    #[test]
    fn second_frame_is_stable() {
        let provider = SceneProvider::new(
            Rect::new(0.0, 0.0, 400.0, 300.0),
            vec![
                MeasuredElement::new("start", Rect::new(0.0, 0.0, 100.0, 50.0)),
                MeasuredElement::new("end", Rect::new(300.0, 0.0, 100.0, 50.0)),
            ],
        );
        let connectors = [ConnectorDescriptor::new("start", "end")];
        let config = LayoutConfig::default();
        let first = compute_frame(
            &provider,
            &DescriptorCollection::new(),
            &connectors,
            None,
            &config,
        );
        assert!(first.changed);
        assert_eq!(first.connectors.len(), 1);
        assert_eq!(first.padding.right, 64.0);

        let second = compute_frame(&provider, &first.descriptors, &connectors, None, &config);
        assert!(!second.changed);
    }
}
