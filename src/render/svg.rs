use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, CoordsIter, LineString, MultiPolygon};

use super::plan::{DrawCommand, LegendPosition, LegendSpec, RenderPlan};
use crate::select::Selections;

const MARGIN: f64 = 10.0;
const LEGEND_WIDTH: f64 = 150.0;
const TITLE_HEIGHT: f64 = 28.0;

/// Projection function: lon/lat -> SVG coords (x, y).
type Projection = dyn Fn(&Coord<f64>) -> (f64, f64);

struct SvgWriter {
    writer: BufWriter<File>,
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for SvgWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl SvgWriter {
    fn new(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        Ok(Self { writer: BufWriter::new(file) })
    }
}

/// Paint a render plan to an SVG file.
///
/// The plan decides everything; this function only translates commands to
/// SVG elements. Shapes are clipped to the plot extent via a clip path.
pub fn render_svg(
    path: &Path,
    plan: &RenderPlan,
    selections: &Selections,
    width: f64,
) -> Result<()> {
    let (x0, x1) = plan.extent.x_range;
    let (y0, y1) = plan.extent.y_range;
    let plot_width = width - 2.0 * MARGIN;
    let scale = plot_width / (x1 - x0);
    let plot_height = (y1 - y0) * scale;
    let title_offset = if plan.title.is_some() { TITLE_HEIGHT } else { 0.0 };
    let legend_offset = match plan.legend.as_ref().map(|l| l.position) {
        Some(LegendPosition::Right) | Some(LegendPosition::Left) => LEGEND_WIDTH,
        _ => 0.0,
    };
    let height = plot_height + 2.0 * MARGIN + title_offset + legend_extra_height(plan);
    let total_width = width + legend_offset;

    let plot_left = if matches!(
        plan.legend.as_ref().map(|l| l.position),
        Some(LegendPosition::Left)
    ) {
        LEGEND_WIDTH
    } else {
        0.0
    };

    let project = move |c: &Coord<f64>| -> (f64, f64) {
        (
            plot_left + MARGIN + (c.x - x0) * scale,
            title_offset + MARGIN + (y1 - c.y) * scale,
        )
    };

    let mut out = SvgWriter::new(path)?;
    writeln!(out, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(
        out,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{total_width}" height="{height}"
    viewBox="0 0 {total_width} {height}"
    data-lon-min="{x0}" data-lon-max="{x1}" data-lat-min="{y0}" data-lat-max="{y1}">"##
    )?;
    writeln!(out, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    write_defs(
        &mut out,
        plot_left + MARGIN,
        title_offset + MARGIN,
        plot_width,
        plot_height,
    )?;

    if let Some(title) = &plan.title {
        let cx = plot_left + MARGIN + plot_width / 2.0;
        writeln!(
            out,
            r##"<text x="{cx:.1}" y="{y:.1}" text-anchor="middle" font-family="sans-serif" font-size="16">{title}</text>"##,
            y = TITLE_HEIGHT - 8.0,
        )?;
    }

    writeln!(out, r##"<g clip-path="url(#plot)">"##)?;
    for command in &plan.commands {
        match command {
            DrawCommand::Fill { level, ids, colors } => {
                if let Some(selection) = selections.get(*level) {
                    for (id, color) in ids.iter().zip(colors) {
                        if let Some(shape) = shape_for(selection, id) {
                            writeln!(
                                out,
                                r##"<path d="{}" fill="{color}" stroke="none"/>"##,
                                multipolygon_to_path(shape, &project)
                            )?;
                        }
                    }
                }
            }
            DrawCommand::Hatch { level, ids } => {
                if let Some(selection) = selections.get(*level) {
                    for id in ids {
                        if let Some(shape) = shape_for(selection, id) {
                            writeln!(
                                out,
                                r##"<path d="{}" fill="url(#hatch)" stroke="none"/>"##,
                                multipolygon_to_path(shape, &project)
                            )?;
                        }
                    }
                }
            }
            DrawCommand::Border { level, color, width } => {
                if let Some(selection) = selections.get(*level) {
                    for shape in &selection.shapes {
                        writeln!(
                            out,
                            r##"<path d="{}" fill="none" stroke="{color}" stroke-width="{width}"/>"##,
                            multipolygon_to_path(shape, &project)
                        )?;
                    }
                }
            }
        }
    }
    writeln!(out, "</g>")?;

    if let Some(legend) = &plan.legend {
        write_legend(&mut out, legend, plot_left, width, plot_height, title_offset)?;
    }

    writeln!(out, "</svg>")?;
    out.flush()?;
    Ok(())
}

fn legend_extra_height(plan: &RenderPlan) -> f64 {
    match plan.legend.as_ref() {
        Some(legend) if legend.position == LegendPosition::Bottom => {
            let rows = legend.labels.len().div_ceil(legend.columns.max(1));
            rows as f64 * 18.0 + MARGIN
        }
        _ => 0.0,
    }
}

fn write_defs(
    out: &mut SvgWriter,
    clip_x: f64,
    clip_y: f64,
    clip_w: f64,
    clip_h: f64,
) -> Result<()> {
    writeln!(out, "<defs>")?;
    writeln!(
        out,
        r##"<clipPath id="plot"><rect x="{clip_x:.1}" y="{clip_y:.1}" width="{clip_w:.1}" height="{clip_h:.1}"/></clipPath>"##
    )?;
    // Diagonal hatch used for the significance overlay.
    writeln!(
        out,
        r##"<pattern id="hatch" width="6" height="6" patternTransform="rotate(45)" patternUnits="userSpaceOnUse">
  <line x1="0" y1="0" x2="0" y2="6" stroke="#333333" stroke-width="1"/>
</pattern>"##
    )?;
    writeln!(out, "</defs>")?;
    Ok(())
}

fn write_legend(
    out: &mut SvgWriter,
    legend: &LegendSpec,
    plot_left: f64,
    width: f64,
    plot_height: f64,
    title_offset: f64,
) -> Result<()> {
    let (x, mut y) = match legend.position {
        LegendPosition::Right => (plot_left + width, title_offset + MARGIN),
        LegendPosition::Left => (MARGIN, title_offset + MARGIN),
        LegendPosition::Bottom => (plot_left + MARGIN, title_offset + plot_height + 2.0 * MARGIN),
    };
    for (label, color) in legend.labels.iter().zip(&legend.colors) {
        writeln!(
            out,
            r##"<rect x="{x:.1}" y="{y:.1}" width="12" height="12" fill="{color}" stroke="#000000" stroke-width="0.5"/>"##
        )?;
        writeln!(
            out,
            r##"<text x="{tx:.1}" y="{ty:.1}" font-family="sans-serif" font-size="11">{label}</text>"##,
            tx = x + 16.0,
            ty = y + 10.0,
        )?;
        y += 18.0;
    }
    Ok(())
}

fn shape_for<'a>(
    selection: &'a crate::select::LevelSelection,
    id: &str,
) -> Option<&'a MultiPolygon<f64>> {
    selection
        .ids
        .iter()
        .position(|candidate| &**candidate == id)
        .map(|i| &selection.shapes[i])
}

/// Build a compact SVG path string for a MultiPolygon (exteriors + holes).
fn multipolygon_to_path(shape: &MultiPolygon<f64>, project: &Projection) -> String {
    let mut out = String::new();
    for polygon in &shape.0 {
        ring_to_path(polygon.exterior(), project, &mut out);
        for interior in polygon.interiors() {
            ring_to_path(interior, project, &mut out);
        }
    }
    out
}

/// Append a ring as an SVG subpath: "M x,y L x,y ... Z"
fn ring_to_path(ring: &LineString<f64>, project: &Projection, out: &mut String) {
    let mut coords = ring.coords_iter().map(|coord| project(&coord));
    if let Some((x, y)) = coords.next() {
        out.push_str(&format!(" M{x:.3},{y:.3}"));
        for (x, y) in coords {
            out.push_str(&format!(" L{x:.3},{y:.3}"));
        }
        out.push('Z');
    }
}
