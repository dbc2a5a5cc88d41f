//! Final plot extent from per-level bounding boxes and the clip policy.

use anyhow::{Context, Result};
use geo::{Coord, Rect};

use crate::report::{Report, Warning};
use crate::resolve::ClipPolicy;
use crate::select::Selections;
use crate::types::GeoLevel;

/// The plot extent: x/y ranges plus the aspect ratio for layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl Extent {
    pub fn aspect(&self) -> f64 {
        (self.x_range.1 - self.x_range.0) / (self.y_range.1 - self.y_range.0)
    }

    fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            x_range: (rect.min().x, rect.max().x),
            y_range: (rect.min().y, rect.max().y),
        }
    }
}

fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// Union the bounding boxes the clip policy names.
///
/// A clip level at or below the data level is meaningless (no geometry
/// exists below the data level) and downgrades to DATA with a warning. A
/// clip level whose overlay is inactive this run contributes nothing, so
/// the extent falls back to the data box alone.
pub fn compute_extent(
    selections: &Selections,
    clip: ClipPolicy,
    data_level: GeoLevel,
    report: &mut Report,
) -> Result<Extent> {
    let effective = match clip.level() {
        Some(level) if level >= data_level => {
            report.push(Warning::ClipDowngraded { requested: clip.to_string() });
            ClipPolicy::Data
        }
        _ => clip,
    };

    let data_box = selections
        .get(data_level)
        .and_then(|s| s.bbox)
        .context("internal error: data level has no bounding box")?;

    let combined = match effective {
        ClipPolicy::Data => data_box,
        ClipPolicy::None => {
            let mut combined = data_box;
            for level in GeoLevel::order() {
                if let Some(selection) = selections.get(level) {
                    if selection.go {
                        if let Some(bbox) = selection.bbox {
                            combined = union(combined, bbox);
                        }
                    }
                }
            }
            combined
        }
        other => match other.level() {
            Some(level) => {
                match selections.get(level).filter(|s| s.go).and_then(|s| s.bbox) {
                    Some(bbox) => union(data_box, bbox),
                    None => data_box,
                }
            }
            None => data_box,
        },
    };

    Ok(Extent::from_rect(combined))
}
