//! Replays a gesture script against a scene document and writes the
//! resulting scene.

mod script;

use clap::Parser;
use kurbo::Size;
use sketchboard_core::canvas::Canvas;
use sketchboard_core::config::CanvasConfig;
use sketchboard_core::document::{ApplyOptions, DocumentError};
use sketchboard_core::storage::{FileStorage, Storage, StorageError};
use sketchboard_render::{DisplayListRenderer, RenderContext, Renderer, RendererError};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RendererError),
}

#[derive(Parser, Debug)]
#[command(name = "sketchboard-replay", about = "Replay a gesture script against a Sketchboard scene")]
struct Cli {
    /// Scene document to start from, or `-` for stdin.
    scene: PathBuf,

    /// JSON array of script steps.
    script: PathBuf,

    /// Where to write the resulting scene; stdout when omitted.
    out: Option<PathBuf>,

    /// Canvas configuration (JSON, partial objects allowed).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport size as WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size, default_value = "1280x800")]
    viewport: Size,

    /// Also save the result into a scene store under this id.
    #[arg(long)]
    save_as: Option<String>,

    /// Scene store directory; the platform data directory by default.
    #[arg(long, requires = "save_as")]
    store: Option<PathBuf>,

    /// Timestamp written to `exportedAt` instead of the current time.
    #[arg(long)]
    exported_at: Option<String>,
}

fn parse_size(value: &str) -> Result<Size, String> {
    let (width, height) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let width: f64 = width.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: f64 = height.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok(Size::new(width, height))
}

fn read_input(path: &Path) -> Result<String, ReplayError> {
    let result = if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(path)
    };
    result.map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn run(cli: Cli) -> Result<(), ReplayError> {
    let config = match &cli.config {
        Some(path) => serde_json::from_str(&read_input(path)?)?,
        None => CanvasConfig::default(),
    };
    let mut canvas = Canvas::with_config(config);
    canvas.set_viewport_size(cli.viewport);

    let scene: serde_json::Value = serde_json::from_str(&read_input(&cli.scene)?)?;
    canvas.apply_scene(&scene, ApplyOptions::default())?;

    let steps: Vec<script::Step> = serde_json::from_str(&read_input(&cli.script)?)?;
    let applied = script::run(&mut canvas, &steps);
    log::info!("replayed {} steps, {} had an effect", steps.len(), applied);

    let mut renderer = DisplayListRenderer::new();
    renderer.build_scene(&RenderContext::new(&canvas, cli.viewport))?;
    log::info!("final frame has {} draw items", renderer.display_list().items.len());

    let document = match cli.exported_at {
        Some(stamp) => canvas.export_scene_at(stamp),
        None => canvas.export_scene(),
    };

    if let Some(id) = &cli.save_as {
        let storage = match cli.store {
            Some(dir) => FileStorage::new(dir)?,
            None => FileStorage::default_location()?,
        };
        pollster::block_on(storage.save(id, &document))?;
        log::info!("saved scene {id:?} under {}", storage.base_path().display());
    }

    let json = document.to_json()?;
    match cli.out {
        Some(path) => std::fs::write(&path, json).map_err(|source| ReplayError::Write { path, source })?,
        None => println!("{json}"),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        log::error!("{err}");
        eprintln!("sketchboard-replay: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        let size = parse_size("800x600").unwrap();
        assert_eq!(size, Size::new(800.0, 600.0));
        assert!(parse_size("800").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from([
            "sketchboard-replay",
            "-",
            "steps.json",
            "--viewport",
            "400x300",
            "--exported-at",
            "2024-01-01T00:00:00+00:00",
        ])
        .unwrap();
        assert_eq!(cli.scene, PathBuf::from("-"));
        assert!(cli.out.is_none());
        assert_eq!(cli.viewport, Size::new(400.0, 300.0));
    }

    #[test]
    fn test_store_requires_save_as() {
        let result = Cli::try_parse_from(["sketchboard-replay", "a.json", "b.json", "--store", "/tmp/x"]);
        assert!(result.is_err());
    }
}
