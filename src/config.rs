use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeSizeConfig {
    pub min_width: f32,
    pub min_height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Vertical gap between a choice row and the branch it leads to.
    pub element_interval_y: f32,
    /// Horizontal gap between neighbouring columns and choices.
    pub branch_interval_x: f32,
    /// Vertical step used for baselines under the question.
    pub branch_interval_y: f32,
    /// Extra height under the branch row of plain branching layouts.
    pub branch_padding_bottom: f32,
    pub simple_question_width: f32,
    pub simple_question_height: f32,
    pub node_padding_x: f32,
    pub node_padding_y: f32,
    pub label_line_height: f32,
    pub max_label_width_chars: usize,
    pub fast_text_metrics: bool,
    pub question: NodeSizeConfig,
    pub choice: NodeSizeConfig,
    pub branch: NodeSizeConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            element_interval_y: 48.0,
            branch_interval_x: 80.0,
            branch_interval_y: 24.0,
            branch_padding_bottom: 200.0,
            simple_question_width: 300.0,
            simple_question_height: 286.0,
            node_padding_x: 16.0,
            node_padding_y: 10.0,
            label_line_height: 1.5,
            max_label_width_chars: 28,
            fast_text_metrics: false,
            question: NodeSizeConfig {
                min_width: 240.0,
                min_height: 64.0,
            },
            choice: NodeSizeConfig {
                min_width: 96.0,
                min_height: 32.0,
            },
            branch: NodeSizeConfig {
                min_width: 180.0,
                min_height: 56.0,
            },
        }
    }
}

/// Fallback canvas size for PNG output. Colours come from the theme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::modern(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    question_fill: Option<String>,
    question_border: Option<String>,
    question_text: Option<String>,
    choice_fill: Option<String>,
    choice_border: Option<String>,
    choice_text: Option<String>,
    branch_fill: Option<String>,
    branch_border: Option<String>,
    branch_text: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeSizeConfigFile {
    min_width: Option<f32>,
    min_height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    element_interval_y: Option<f32>,
    branch_interval_x: Option<f32>,
    branch_interval_y: Option<f32>,
    branch_padding_bottom: Option<f32>,
    simple_question_width: Option<f32>,
    simple_question_height: Option<f32>,
    node_padding_x: Option<f32>,
    node_padding_y: Option<f32>,
    label_line_height: Option<f32>,
    max_label_width_chars: Option<usize>,
    fast_text_metrics: Option<bool>,
    question: Option<NodeSizeConfigFile>,
    choice: Option<NodeSizeConfigFile>,
    branch: Option<NodeSizeConfigFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    match parsed.theme.as_deref() {
        Some("classic") | Some("default") => config.theme = Theme::classic(),
        Some("modern") | None => {}
        Some(other) => log::warn!("unknown theme {other:?}; keeping the modern theme"),
    }

    if let Some(vars) = parsed.theme_variables {
        apply_theme_variables(&mut config.theme, vars);
    }

    if let Some(layout) = parsed.layout {
        apply_layout_overrides(&mut config.layout, layout);
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }

    Ok(config)
}

fn apply_theme_variables(theme: &mut Theme, vars: ThemeVariables) {
    let overrides = [
        (vars.question_fill, &mut theme.question_fill),
        (vars.question_border, &mut theme.question_border),
        (vars.question_text, &mut theme.question_text),
        (vars.choice_fill, &mut theme.choice_fill),
        (vars.choice_border, &mut theme.choice_border),
        (vars.choice_text, &mut theme.choice_text),
        (vars.branch_fill, &mut theme.branch_fill),
        (vars.branch_border, &mut theme.branch_border),
        (vars.branch_text, &mut theme.branch_text),
        (vars.line_color, &mut theme.line_color),
        (vars.background, &mut theme.background),
        (vars.font_family, &mut theme.font_family),
    ];
    for (value, slot) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if let Some(v) = vars.font_size {
        theme.font_size = v;
    }
}

fn apply_layout_overrides(layout: &mut LayoutConfig, file: LayoutConfigFile) {
    let overrides = [
        (file.element_interval_y, &mut layout.element_interval_y),
        (file.branch_interval_x, &mut layout.branch_interval_x),
        (file.branch_interval_y, &mut layout.branch_interval_y),
        (file.branch_padding_bottom, &mut layout.branch_padding_bottom),
        (file.simple_question_width, &mut layout.simple_question_width),
        (file.simple_question_height, &mut layout.simple_question_height),
        (file.node_padding_x, &mut layout.node_padding_x),
        (file.node_padding_y, &mut layout.node_padding_y),
        (file.label_line_height, &mut layout.label_line_height),
    ];
    for (value, slot) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if let Some(v) = file.max_label_width_chars {
        layout.max_label_width_chars = v;
    }
    if let Some(v) = file.fast_text_metrics {
        layout.fast_text_metrics = v;
    }
    for (size, slot) in [
        (file.question, &mut layout.question),
        (file.choice, &mut layout.choice),
        (file.branch, &mut layout.branch),
    ] {
        let Some(size) = size else { continue };
        if let Some(v) = size.min_width {
            slot.min_width = v;
        }
        if let Some(v) = size.min_height {
            slot.min_height = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.branch_interval_x, 80.0);
        assert_eq!(config.layout.branch_padding_bottom, 200.0);
    }

    #[test]
    fn parses_theme_and_layout_overrides() {
        let config = parse_config(
            r##"{
                "theme": "classic",
                "themeVariables": { "lineColor": "#FF0000", "fontSize": 18 },
                "layout": { "branchIntervalX": 60, "choice": { "minWidth": 120 } },
                "render": { "width": 640 }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.line_color, "#FF0000");
        assert_eq!(config.theme.font_size, 18.0);
        assert_eq!(config.theme.question_border, Theme::classic().question_border);
        assert_eq!(config.layout.branch_interval_x, 60.0);
        assert_eq!(config.layout.choice.min_width, 120.0);
        assert_eq!(config.layout.choice.min_height, 32.0);
        assert_eq!(config.render.width, 640.0);
        assert_eq!(config.render.height, 800.0);
        assert_eq!(config.theme.background, Theme::classic().background);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_config("{ theme: ").is_err());
    }
}
