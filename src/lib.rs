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
pub use config::{Config, LayoutConfig, RenderConfig};
pub use error::DialogError;
pub use ir::{DialogFlow, GraphNode, QuestionKind};
pub use layout::{GraphLayout, compute_layout, layout_flow};
pub use theme::Theme;

/// Options for the one-call helpers below.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

impl RenderOptions {
    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            layout: LayoutConfig::default(),
        }
    }

    pub fn classic() -> Self {
        Self {
            theme: Theme::classic(),
            layout: LayoutConfig::default(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::modern()
    }
}

/// Parses a dialog description, lays it out and returns the SVG.
pub fn render(input: &str) -> anyhow::Result<String> {
    render_with_options(input, RenderOptions::default())
}

pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let flow = parser::parse_dialog(input, &options.theme, &options.layout)?;
    let layout = layout_flow(&flow, &options.layout);
    Ok(render::render_svg(&layout, &options.theme, &options.layout))
}
