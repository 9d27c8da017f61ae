use flow_canvas::frame_dump::FrameDump;
use flow_canvas::{LayoutConfig, Scene, SceneProvider, compute_frame, route};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasOptions {
    scale: Option<f32>,
    module_size: Option<f32>,
    padding_buffer: Option<f32>,
}

fn build_layout_config(options: CanvasOptions) -> LayoutConfig {
    let mut config = LayoutConfig::default();
    if let Some(scale) = options.scale {
        config.scale = scale;
    }
    if let Some(module_size) = options.module_size {
        config.module_size = module_size;
    }
    if let Some(padding_buffer) = options.padding_buffer {
        config.padding_buffer = padding_buffer;
    }
    config.sanitized()
}

fn parse_inputs(
    scene_json: &str,
    options_json: Option<String>,
) -> Result<(Scene, LayoutConfig), String> {
    let scene = Scene::from_json(scene_json).map_err(|error| error.to_string())?;
    let options = match options_json {
        Some(raw_options) => serde_json::from_str::<CanvasOptions>(&raw_options)
            .map_err(|error| error.to_string())?,
        None => CanvasOptions::default(),
    };
    Ok((scene, build_layout_config(options)))
}

fn routed_json(scene_json: &str, options_json: Option<String>) -> Result<String, String> {
    let (scene, config) = parse_inputs(scene_json, options_json)?;
    let provider = SceneProvider::from_scene(&scene);
    let routed = route(&scene.connectors, &provider, config.scale);
    serde_json::to_string(&routed).map_err(|error| error.to_string())
}

fn frame_json(scene_json: &str, options_json: Option<String>) -> Result<String, String> {
    let (scene, config) = parse_inputs(scene_json, options_json)?;
    let provider = SceneProvider::from_scene(&scene);
    let frame = compute_frame(
        &provider,
        &scene.descriptors,
        &scene.connectors,
        scene.extra.as_ref(),
        &config,
    );
    FrameDump::from_frame(&frame, &config)
        .to_json(false)
        .map_err(|error| error.to_string())
}

/// Routes every connector of a scene snapshot; returns the routed connectors
/// as a JSON array.
#[wasm_bindgen]
pub fn route_connectors(scene_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    routed_json(scene_json, options_json).map_err(|error| JsValue::from_str(&error))
}

/// Measures and reconciles a scene snapshot against its stored descriptors;
/// returns the full frame (descriptors, connectors, extent, padding) as JSON.
#[wasm_bindgen]
pub fn reconcile_scene(scene_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    frame_json(scene_json, options_json).map_err(|error| JsValue::from_str(&error))
}
