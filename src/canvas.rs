use log::{debug, warn};

use crate::config::LayoutConfig;
use crate::ir::{ContainerDescriptor, DescriptorCollection, Position, Rect};
use crate::layout::{
    DragController, DragOutcome, LayoutError, Padding, PointerHit, RoutedConnector,
    bounding_extent, changed_keys, find_free_slot, measure, needs_update, occupied_rects,
    padding_for, reconcile, route,
};
use crate::provider::RectProvider;
use crate::shape::{ConnectorShape, connector_shape};
use crate::state::{CanvasEvent, CanvasState, reduce};

pub type ChangeHandler = Box<dyn FnMut(&DescriptorCollection)>;

/// Host-side driver tying measurement, reconciliation, routing and drag
/// handling to one canvas.
///
/// Call [`Canvas::refresh`] after every render that may have moved or
/// resized a container. It only commits (and notifies the change handler)
/// when the reconciled descriptors actually differ, which keeps the
/// render → measure → commit cycle from looping.
pub struct Canvas<P: RectProvider> {
    provider: P,
    config: LayoutConfig,
    state: CanvasState,
    drag: DragController,
    on_change: Option<ChangeHandler>,
}

impl<P: RectProvider> Canvas<P> {
    pub fn new(provider: P, config: LayoutConfig) -> Self {
        Self {
            provider,
            config: config.sanitized(),
            state: CanvasState::default(),
            drag: DragController::new(),
            on_change: None,
        }
    }

    pub fn with_state(mut self, state: CanvasState) -> Self {
        self.state = state;
        self
    }

    pub fn on_change(mut self, handler: impl FnMut(&DescriptorCollection) + 'static) -> Self {
        self.on_change = Some(Box::new(handler));
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn descriptors(&self) -> &DescriptorCollection {
        &self.state.containers
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.config = self.config.clone().with_scale(scale);
    }

    /// Applies a host event. Returns whether the descriptors changed.
    pub fn dispatch(&mut self, event: CanvasEvent) -> bool {
        let next = reduce(&self.state, event);
        let changed = needs_update(&self.state.containers, &next.containers);
        let containers = next.containers.clone();
        self.state = next;
        if changed {
            self.notify(&containers);
        }
        changed
    }

    /// Re-measures the canvas and commits the reconciled descriptors if they
    /// changed.
    pub fn refresh(&mut self) -> bool {
        let measured = measure(&self.provider, &self.state.containers, self.config.scale);
        let next = reconcile(&measured, &self.state.containers, self.config.scale);
        if !needs_update(&self.state.containers, &next) {
            return false;
        }
        debug!("layout changed: {:?}", changed_keys(&self.state.containers, &next));
        self.commit(next);
        true
    }

    pub fn connectors(&self) -> Vec<RoutedConnector> {
        route(&self.state.connectors, &self.provider, self.config.scale)
    }

    pub fn connector_shapes(&self) -> Vec<ConnectorShape> {
        self.connectors()
            .iter()
            .map(|connector| connector_shape(connector, &self.config.connector))
            .collect()
    }

    /// Canvas padding keeping every container (and the optional overlay
    /// element) reachable.
    pub fn padding(&self, extra: Option<&Rect>) -> Padding {
        let measured = measure(&self.provider, &self.state.containers, self.config.scale);
        let extent = bounding_extent(measured.values(), extra, self.config.scale);
        padding_for(
            &self.provider.canvas_rect(),
            &extent,
            self.config.padding_buffer,
        )
    }

    pub fn pointer_down(&mut self, pointer: Position, hit: &PointerHit) -> bool {
        self.drag.on_drag_start(pointer, hit, &self.provider)
    }

    pub fn pointer_move(&mut self, pointer: Position) -> Option<Rect> {
        self.drag.on_drag_move(pointer, &self.config)
    }

    /// Ends the drag (pointer up or pointer leaving the canvas) and commits
    /// the moved descriptors. A click that moves and rebinds nothing commits
    /// nothing.
    pub fn pointer_up(&mut self, pointer: Position) -> Option<DragOutcome> {
        let outcome = self.drag.on_drag_end(
            pointer,
            &self.state.containers,
            &self.provider,
            &self.config,
        )?;
        if needs_update(&self.state.containers, &outcome.descriptors) {
            self.commit(outcome.descriptors.clone());
        }
        Some(outcome)
    }

    pub fn placeholder(&self) -> Option<Rect> {
        self.drag.placeholder()
    }

    /// Forgets an in-progress drag, e.g. when the canvas is torn down.
    pub fn abandon_drag(&mut self) -> bool {
        self.drag.abandon()
    }

    /// Registers an absolutely placed node of the given unscaled size at the
    /// first free slot from the origin.
    pub fn insert_absolute(&mut self, key: &str, width: f32, height: f32) -> Position {
        let occupied = occupied_rects(&self.state.containers, key);
        let slot = find_free_slot(
            Position::default(),
            width,
            height,
            &occupied,
            &self.config.placement,
        );
        let mut next = self.state.containers.clone();
        let descriptor = next
            .entry(key.to_string())
            .or_insert_with(|| ContainerDescriptor::new(key));
        descriptor.absolute = true;
        descriptor.width = width;
        descriptor.height = height;
        descriptor.relative = Some(slot);
        self.commit(next);
        slot
    }

    fn commit(&mut self, containers: DescriptorCollection) {
        self.notify(&containers);
        self.state.containers = containers;
    }

    fn notify(&mut self, containers: &DescriptorCollection) {
        match self.on_change.as_mut() {
            Some(handler) => handler(containers),
            None => warn!("{}", LayoutError::ConfigurationMissing("change")),
        }
    }
}
