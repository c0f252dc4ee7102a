use std::path::PathBuf;

use clap::Parser;
use hexmap_client::config::{self, FALLBACK_GRID_RADIUS};
use hexmap_client::svg::{SvgOptions, render_scene};
use hexmap_client::{HeadlessHost, MapSurface, StoreRegistry, SurfaceConfig};
use hexmap_shared::influence::influence_assignments;
use hexmap_shared::{AxialCoord, MapDocument, OffsetCoord, coords_in_radius};
use tracing_subscriber::EnvFilter;

/// Render a hex map document to SVG.
#[derive(Parser, Debug)]
#[command(name = "hexmap-render")]
#[command(version)]
struct Args {
    /// JSON map document
    input: PathBuf,

    /// SVG output path (stdout when omitted)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Write the control legend as JSON
    #[arg(long)]
    legend: Option<PathBuf>,

    /// Bake overlay blending into plain fills
    #[arg(long)]
    flatten: bool,

    /// Omit cell labels
    #[arg(long)]
    no_labels: bool,
}

struct Rendered {
    svg: String,
    legend: String,
}

fn initial_cells(doc: &MapDocument) -> (OffsetCoord, Vec<OffsetCoord>) {
    if !doc.cells.is_empty() {
        return (doc.base(), doc.cells.clone());
    }
    let cells: Vec<OffsetCoord> = coords_in_radius(AxialCoord::new(0, 0), FALLBACK_GRID_RADIUS)
        .iter()
        .map(AxialCoord::to_offset)
        .collect();
    let base = OffsetCoord::new(
        cells.iter().map(|c| c.r).min().unwrap_or(0),
        cells.iter().map(|c| c.c).min().unwrap_or(0),
    );
    (base, cells)
}

fn render(doc: &MapDocument, mut config: SurfaceConfig, options: &SvgOptions) -> Result<Rendered, String> {
    if let Some(radius) = doc.radius.filter(|r| r.is_finite() && *r > 0.0) {
        config.radius = radius;
    }
    let (base, cells) = initial_cells(doc);
    let host = HeadlessHost::new(options.width, options.height);
    let mut surface = MapSurface::mount(host, config, base, cells)?;

    let mut registry = StoreRegistry::new();
    let stores = registry.stores_for("render", &doc.name);
    surface.bind_stores(&stores);

    for (coord, color) in doc.terrain_fills() {
        if !surface.set_fill(coord, color) {
            tracing::debug!(%coord, "terrain for a cell outside the grid");
        }
    }

    // Later layers win on shared cells.
    let zones = influence_assignments(&doc.locations);
    stores.influence.set_assignments(&zones);
    stores.control.set_assignments(&doc.control);
    stores.markers.set_assignments(&doc.markers);
    surface.refit();

    tracing::info!(
        cells = surface.scene().len(),
        control = stores.control.len(),
        markers = stores.markers.len(),
        influence = stores.influence.len(),
        "map rendered"
    );

    let svg = render_scene(&surface.scene(), options);
    let legend = serde_json::to_string_pretty(&stores.control.legend())
        .map_err(|e| format!("legend encode error: {e}"))?;
    surface.destroy();
    registry.reset_session("render");
    Ok(Rendered { svg, legend })
}

fn run(args: Args) -> Result<(), String> {
    let text = std::fs::read_to_string(&args.input)
        .map_err(|e| format!("failed to read {}: {e}", args.input.display()))?;
    let doc = MapDocument::from_json(&text)?;

    let (width, height) = config::surface_size();
    let options = SvgOptions {
        width,
        height,
        labels: !args.no_labels,
        flatten: args.flatten,
    };
    let rendered = render(&doc, SurfaceConfig::from_env(), &options)?;

    match &args.output {
        Some(path) => std::fs::write(path, &rendered.svg)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?,
        None => print!("{}", rendered.svg),
    }
    if let Some(path) = &args.legend {
        std::fs::write(path, &rendered.legend)
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!(error = %e, "render failed");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r##"{
        "name": "Sword Coast",
        "radius": 20,
        "cells": [{"r":0,"c":0},{"r":0,"c":1},{"r":1,"c":0},{"r":1,"c":1}],
        "terrain": {"0:0": "#C8E6C9", "bad": "#000000"},
        "control": [
            {"coord": {"r":0,"c":1}, "owner_id": "harpers", "owner_name": "Harpers"},
            {"coord": {"r":0,"c":1}, "owner_id": "zhents"},
            {"coord": {"r":0.5,"c":1}, "owner_id": "broken"}
        ],
        "markers": [
            {"coord": {"r":1,"c":1}, "location_name": "Phandalin", "location_type": "Dorf"}
        ],
        "locations": [
            {"name": "Phandalin", "type": "Dorf", "coordinates": "1,1", "owner_type": "npc", "owner_name": "Sildar"}
        ]
    }"##;

    fn options() -> SvgOptions {
        SvgOptions {
            width: 400.0,
            height: 300.0,
            labels: true,
            flatten: false,
        }
    }

    #[test]
    fn renders_every_layer() {
        let doc = MapDocument::from_json(DOCUMENT).expect("document");
        let rendered = render(&doc, SurfaceConfig::default(), &options()).expect("render");
        assert!(rendered.svg.contains("Phandalin"));
        assert!(rendered.svg.contains("Harpers"));
        assert!(rendered.svg.contains("mix-blend-mode:multiply"));
        // Influence grows the grid beyond the four declared cells.
        assert!(rendered.svg.matches("<polygon").count() > 4);
        assert!(rendered.legend.contains("\"harpers\""));
        assert!(!rendered.legend.contains("zhents"));
    }

    #[test]
    fn empty_document_uses_fallback_grid() {
        let doc = MapDocument::from_json("{}").expect("document");
        let rendered = render(&doc, SurfaceConfig::default(), &options()).expect("render");
        let expected = coords_in_radius(AxialCoord::new(0, 0), FALLBACK_GRID_RADIUS).len();
        assert_eq!(rendered.svg.matches("<polygon").count(), expected);
        assert_eq!(rendered.legend.trim(), "[]");
    }

    #[test]
    fn missing_input_is_reported() {
        let args = Args {
            input: PathBuf::from("/definitely/not/here.json"),
            output: None,
            legend: None,
            flatten: false,
            no_labels: false,
        };
        let err = run(args).expect_err("missing file");
        assert!(err.starts_with("failed to read"));
    }

    #[test]
    fn surface_size_comes_from_environment() {
        temp_env::with_vars(
            [
                ("HEXMAP_SURFACE_WIDTH", Some("640")),
                ("HEXMAP_SURFACE_HEIGHT", Some("480")),
            ],
            || assert_eq!(config::surface_size(), (640.0, 480.0)),
        );
    }
}
