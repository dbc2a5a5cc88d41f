//! Renderer boundary.
//!
//! Decision-making stays in the core: `build_render_plan` turns a run's
//! selections into an ordered list of draw commands plus legend and title
//! specs. The SVG emitter then paints the commands without making any
//! further choices.

mod plan;
mod svg;

pub use plan::{
    border_style, build_render_plan, BorderStyle, DrawCommand, LegendPosition, LegendSpec,
    RenderPlan,
};
pub use svg::render_svg;
