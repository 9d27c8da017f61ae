use crate::config::LayoutConfig;
use crate::ir::DescriptorCollection;
use crate::layout::{DragOutcome, Extent, Frame, Padding, RoutedConnector};
use crate::shape::{ConnectorShape, connector_shape};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct FrameDump {
    pub changed: bool,
    pub descriptors: DescriptorCollection,
    pub connectors: Vec<ConnectorDump>,
    pub extent: Option<Extent>,
    pub padding: Padding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drag: Option<DragDump>,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    #[serde(flatten)]
    pub routed: RoutedConnector,
    pub shape: ConnectorShape,
    pub path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragDump {
    pub key: String,
    pub delta: [f32; 2],
    pub bound_to: Option<String>,
    pub hits: Vec<String>,
}

impl FrameDump {
    pub fn from_frame(frame: &Frame, config: &LayoutConfig) -> Self {
        let connectors = frame
            .connectors
            .iter()
            .map(|routed| {
                let shape = connector_shape(routed, &config.connector);
                ConnectorDump {
                    routed: routed.clone(),
                    path: shape.path.svg_path_data(),
                    shape,
                }
            })
            .collect();

        // Nothing folded in (no containers, no overlay) leaves the f32::MAX
        // sentinels, which JSON readers choke on.
        let extent = if frame.extent.min_left == f32::MAX {
            None
        } else {
            Some(frame.extent)
        };

        FrameDump {
            changed: frame.changed,
            descriptors: frame.descriptors.clone(),
            connectors,
            extent,
            padding: frame.padding,
            drag: None,
        }
    }

    pub fn with_drag(mut self, outcome: &DragOutcome) -> Self {
        self.changed = true;
        self.descriptors = outcome.descriptors.clone();
        self.drag = Some(DragDump {
            key: outcome.key.clone(),
            delta: [outcome.delta.left, outcome.delta.top],
            bound_to: outcome.bound_to.clone(),
            hits: outcome.hits.iter().map(|hit| hit.key.clone()).collect(),
        });
        self
    }

    pub fn to_json(&self, pretty: bool) -> anyhow::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

pub fn write_frame_dump(path: &Path, dump: &FrameDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}
