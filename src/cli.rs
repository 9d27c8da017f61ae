use crate::config::load_config;
use crate::frame_dump::{FrameDump, write_frame_dump};
use crate::ir::{Position, Scene};
use crate::layout::{DragController, PointerHit, compute_frame};
use crate::provider::SceneProvider;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "fcanvas",
    version,
    about = "Reconcile canvas layouts and route connectors from a scene snapshot"
)]
pub struct Args {
    /// Scene file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Layout config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Zoom factor of the rendered canvas
    #[arg(short = 's', long = "scale")]
    pub scale: Option<f32>,

    /// Grid unit drags snap to
    #[arg(short = 'm', long = "moduleSize")]
    pub module_size: Option<f32>,

    /// Simulate a drag before dumping: KEY:X1,Y1:X2,Y2 in viewport pixels
    #[arg(short = 'd', long = "drag")]
    pub drag: Option<String>,

    /// Pretty-print JSON written to stdout
    #[arg(short = 'p', long = "pretty")]
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct DragSpec {
    key: String,
    from: Position,
    to: Position,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(scale) = args.scale {
        config.layout.scale = scale;
    }
    if let Some(module_size) = args.module_size {
        config.layout.module_size = module_size;
    }
    let layout_config = config.layout.sanitized();

    let input = read_input(args.input.as_deref())?;
    let scene = Scene::from_json(&input).context("invalid scene")?;
    let provider = SceneProvider::from_scene(&scene);

    let frame = compute_frame(
        &provider,
        &scene.descriptors,
        &scene.connectors,
        scene.extra.as_ref(),
        &layout_config,
    );
    let mut dump = FrameDump::from_frame(&frame, &layout_config);

    if let Some(raw) = args.drag.as_deref() {
        let spec = parse_drag(raw)?;
        let mut drag = DragController::new();
        if !drag.on_drag_start(spec.from, &PointerHit::container(spec.key.clone()), &provider) {
            return Err(anyhow::anyhow!("`{}` is not a container in the scene", spec.key));
        }
        drag.on_drag_move(spec.to, &layout_config);
        if let Some(outcome) =
            drag.on_drag_end(spec.to, &frame.descriptors, &provider, &layout_config)
        {
            dump = dump.with_drag(&outcome);
        }
    }

    match args.output.as_deref() {
        Some(path) => write_frame_dump(path, &dump)?,
        None => {
            let json = dump.to_json(args.pretty)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn parse_drag(raw: &str) -> Result<DragSpec> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(to), Some(from), Some(key)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(anyhow::anyhow!("drag must look like KEY:X1,Y1:X2,Y2"));
    };
    if key.is_empty() {
        return Err(anyhow::anyhow!("drag key is empty"));
    }
    Ok(DragSpec {
        key: key.to_string(),
        from: parse_point(from)?,
        to: parse_point(to)?,
    })
}

fn parse_point(raw: &str) -> Result<Position> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("point `{raw}` must look like X,Y"))?;
    Ok(Position::new(
        x.trim().parse().with_context(|| format!("bad x in `{raw}`"))?,
        y.trim().parse().with_context(|| format!("bad y in `{raw}`"))?,
    ))
}
