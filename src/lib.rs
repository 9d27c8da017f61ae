pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod frame_dump;
pub mod ir;
pub mod layout;
pub mod provider;
pub mod shape;
pub mod state;

pub use canvas::Canvas;
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use ir::{
    ConnectorDescriptor, ContainerDescriptor, DescriptorCollection, MeasuredElement, Position,
    Rect, Scene,
};
pub use layout::{compute_frame, needs_update, reconcile, route};
pub use provider::{RectProvider, SceneProvider};
