use std::fmt::Write as _;

use crate::colors::brighten_hex;
use crate::scene::{BlendMode, HexCell, Scene};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgOptions {
    pub width: f64,
    pub height: f64,
    pub labels: bool,
    /// Bake multiply blending into plain fills for viewers without blend support.
    pub flatten: bool,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: crate::config::DEFAULT_SURFACE_WIDTH,
            height: crate::config::DEFAULT_SURFACE_HEIGHT,
            labels: true,
            flatten: false,
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn points_attr(cell: &HexCell) -> String {
    cell.points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_cell(out: &mut String, cell: &HexCell, options: &SvgOptions) {
    let style = cell.style();
    let flattened = if options.flatten { cell.composite_fill() } else { None };
    let (fill, fill_opacity, blend) = match flattened {
        Some(fill) => (fill, 1.0, BlendMode::Normal),
        None => (style.fill.clone(), style.fill_opacity, style.blend),
    };
    let _ = write!(
        out,
        r#"<polygon data-coord="{}" points="{}" fill="{}" fill-opacity="{:.3}" stroke="{}" stroke-width="{}" stroke-opacity="{}""#,
        cell.coord.key(),
        points_attr(cell),
        escape(&fill),
        fill_opacity,
        escape(&style.stroke),
        style.stroke_width,
        style.stroke_opacity,
    );
    if blend == BlendMode::Multiply {
        out.push_str(r#" style="mix-blend-mode:multiply""#);
    }
    match cell.overlay().and_then(|o| o.tooltip.as_deref()) {
        Some(tooltip) => {
            let _ = write!(out, "><title>{}</title></polygon>", escape(tooltip));
        }
        None => out.push_str("/>"),
    }
    out.push('\n');
}

/// Serializes the retained scene as a standalone SVG document.
pub fn render_scene(scene: &Scene, options: &SvgOptions) -> String {
    let mut out = String::new();
    let view_box = scene.view_box();
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}""#,
        options.width, options.height
    );
    if let Some(vb) = view_box {
        let _ = write!(
            out,
            r#" viewBox="{} {} {} {}" preserveAspectRatio="xMidYMid meet""#,
            vb.x, vb.y, vb.width, vb.height
        );
    }
    out.push_str(">\n<g class=\"cells\">\n");
    for cell in scene.cells() {
        write_cell(&mut out, cell, options);
    }
    out.push_str("</g>\n");

    if let Some(cell) = scene.selected().and_then(|coord| scene.cell(coord)) {
        let stroke = brighten_hex(&cell.style().stroke, 1.4);
        let _ = writeln!(
            out,
            r#"<polygon class="selection" points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            points_attr(cell),
            escape(&stroke),
            cell.style().stroke_width + 2.0,
        );
    }

    if options.labels {
        let font_size = (scene.layout().radius * 0.4).max(6.0);
        out.push_str("<g class=\"labels\" text-anchor=\"middle\" dominant-baseline=\"middle\">\n");
        for cell in scene.cells() {
            if let Some(label) = cell.style().label.as_deref() {
                let _ = writeln!(
                    out,
                    r#"<text x="{:.2}" y="{:.2}" font-size="{font_size:.1}">{}</text>"#,
                    cell.center.0,
                    cell.center.1,
                    escape(label),
                );
            }
        }
        out.push_str("</g>\n");
    }
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use hexmap_shared::{HexLayout, OffsetCoord};

    use super::*;
    use crate::scene::OverlayStyle;

    fn scene() -> Scene {
        Scene::new(
            HexLayout::new(10.0, OffsetCoord::new(0, 0), 4.0),
            [OffsetCoord::new(0, 0), OffsetCoord::new(0, 1)],
        )
    }

    #[test]
    fn one_polygon_per_cell() {
        let svg = render_scene(&scene(), &SvgOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox="));
        assert_eq!(svg.matches("<polygon").count(), 2);
        assert!(svg.contains(r#"data-coord="0:1""#));
        assert!(!svg.contains("mix-blend-mode"));
    }

    #[test]
    fn overlays_blend_and_labels_are_escaped() {
        let mut scene = scene();
        scene.set_overlay(
            OffsetCoord::new(0, 0),
            Some(OverlayStyle {
                color: "#FF0000".to_string(),
                stroke_width: 3.0,
                fill_opacity: 0.5,
                label: Some("Lords & Ladies".to_string()),
                tooltip: Some("<b>".to_string()),
            }),
        );
        let svg = render_scene(&scene, &SvgOptions::default());
        assert!(svg.contains("mix-blend-mode:multiply"));
        assert!(svg.contains("Lords &amp; Ladies"));
        assert!(svg.contains("<title>&lt;b&gt;</title>"));
    }

    #[test]
    fn flatten_bakes_composite_fill() {
        let mut scene = scene();
        let coord = OffsetCoord::new(0, 1);
        scene.set_fill(coord, "#FFFFFF");
        scene.set_overlay(
            coord,
            Some(OverlayStyle {
                color: "#00FF00".to_string(),
                stroke_width: 2.0,
                fill_opacity: 1.0,
                label: None,
                tooltip: None,
            }),
        );
        let options = SvgOptions {
            flatten: true,
            labels: false,
            ..SvgOptions::default()
        };
        let svg = render_scene(&scene, &options);
        assert!(svg.contains(r##"fill="#00FF00" fill-opacity="1.000""##));
        assert!(!svg.contains("mix-blend-mode"));
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn selection_is_outlined() {
        let mut scene = scene();
        scene.select(Some(OffsetCoord::new(0, 1)));
        let svg = render_scene(&scene, &SvgOptions::default());
        assert!(svg.contains(r#"class="selection""#));
    }
}
