#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, OutputFormat};
pub use error::{DiagramError, DiagramResult};
pub use ir::{Branch, BranchName, BranchRegistry, Diagram, Step, StepKind, StepSequence};
pub use layout::{Layout, compute_layout};
pub use render::{DrawingSurface, render_svg};
pub use theme::Theme;

/// Lays out `diagram` with `config` and encodes it in `format`.
pub fn render_diagram(
    diagram: &mut Diagram,
    config: &Config,
    format: OutputFormat,
) -> anyhow::Result<Vec<u8>> {
    let metrics = text_metrics::SystemFontMetrics::new(config.theme.font_family.clone());
    let layout = compute_layout(diagram, &config.theme, &config.layout, &metrics)?;
    render::render(&layout, format)
}
