use std::sync::Arc;

use ahash::AHashMap;

use crate::categorize::Categorized;
use crate::extent::Extent;
use crate::record::LocationRecord;
use crate::select::Selections;
use crate::types::GeoLevel;

/// Border stroke for one overlay level. Line weight grows with coarseness
/// so state and region outlines read over the finer layers.
#[derive(Debug, Clone, Copy)]
pub struct BorderStyle {
    pub color: &'static str,
    pub width: f64,
}

pub fn border_style(level: GeoLevel) -> BorderStyle {
    match level {
        GeoLevel::Tract => BorderStyle { color: "#b0b0b0", width: 0.4 },
        GeoLevel::County => BorderStyle { color: "#808080", width: 0.6 },
        GeoLevel::Hsa => BorderStyle { color: "#606060", width: 0.9 },
        GeoLevel::Registry => BorderStyle { color: "#404040", width: 1.2 },
        GeoLevel::State => BorderStyle { color: "#202020", width: 1.5 },
        GeoLevel::Region => BorderStyle { color: "#000000", width: 1.8 },
    }
}

/// One paint operation, in paint order within the plan.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Fill the data-level shapes with their category colors.
    Fill {
        level: GeoLevel,
        ids: Vec<Arc<str>>,
        colors: Vec<String>,
    },
    /// Hatch the statistically-significant shapes.
    Hatch { level: GeoLevel, ids: Vec<Arc<str>> },
    /// Stroke an overlay level's outlines.
    Border {
        level: GeoLevel,
        color: String,
        width: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    Left,
    #[default]
    Right,
    Bottom,
}

#[derive(Debug, Clone)]
pub struct LegendSpec {
    pub labels: Vec<String>,
    pub colors: Vec<String>,
    pub columns: usize,
    pub position: LegendPosition,
}

/// Everything the renderer needs: ordered commands, extent, legend, title.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub commands: Vec<DrawCommand>,
    pub extent: Extent,
    pub legend: Option<LegendSpec>,
    pub title: Option<String>,
}

/// Assemble the paint sequence: data fill, hatch overlay, then borders
/// fine to coarse, for every active level.
pub fn build_render_plan(
    data_level: GeoLevel,
    selections: &Selections,
    records: &[LocationRecord],
    categorized: &Categorized,
    extent: Extent,
    legend_position: LegendPosition,
    title: Option<String>,
) -> RenderPlan {
    let mut commands = Vec::new();

    // Category color per data id. Records and categories are parallel.
    let color_by_id: AHashMap<&str, &str> = records
        .iter()
        .zip(&categorized.category)
        .map(|(record, &cat)| (&*record.canonical_id, categorized.colors[cat].as_str()))
        .collect();

    if let Some(data) = selections.get(data_level) {
        let ids = data.ids.clone();
        let colors = ids
            .iter()
            .map(|id| color_by_id.get(&**id).unwrap_or(&"#ffffff").to_string())
            .collect();
        commands.push(DrawCommand::Fill { level: data_level, ids, colors });

        let hatched: Vec<Arc<str>> = records
            .iter()
            .filter(|r| r.significant)
            .map(|r| r.canonical_id.clone())
            .filter(|id| data.ids.contains(id))
            .collect();
        if !hatched.is_empty() {
            commands.push(DrawCommand::Hatch { level: data_level, ids: hatched });
        }
    }

    // Borders fine to coarse, each layer painted over the previous.
    for level in GeoLevel::order().into_iter().rev() {
        if let Some(selection) = selections.get(level) {
            if selection.go {
                let style = border_style(level);
                commands.push(DrawCommand::Border {
                    level,
                    color: style.color.to_string(),
                    width: style.width,
                });
            }
        }
    }

    let legend = Some(LegendSpec {
        labels: categorized.labels.clone(),
        colors: categorized.colors.clone(),
        columns: 1,
        position: legend_position,
    });

    RenderPlan { commands, extent, legend, title }
}
