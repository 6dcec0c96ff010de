use dialog_flow_layout::layout_dump::LayoutDump;
use dialog_flow_layout::parser::parse_dialog;
use dialog_flow_layout::{RenderOptions, layout_flow, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DialogRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
}

fn build_render_options(options: DialogRenderOptions) -> RenderOptions {
    let mut render_options = match options.theme.as_deref() {
        Some("classic") | Some("default") => RenderOptions::classic(),
        _ => RenderOptions::modern(),
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    // No system fonts inside wasm; the width table is the only option there.
    render_options.layout.fast_text_metrics = options.fast_text.unwrap_or(cfg!(target_arch = "wasm32"));

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<DialogRenderOptions, String> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| error.to_string()),
        None => Ok(DialogRenderOptions::default()),
    }
}

fn layout_json(input: &str, options: RenderOptions) -> Result<String, String> {
    let flow = parse_dialog(input, &options.theme, &options.layout).map_err(|error| error.to_string())?;
    let layout = layout_flow(&flow, &options.layout);
    serde_json::to_string(&LayoutDump::from_layout(&layout)).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn render_dialog_svg(input: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    render_with_options(input, build_render_options(options))
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn layout_dialog_json(input: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    layout_json(input, build_render_options(options)).map_err(|error| JsValue::from_str(&error))
}

#[cfg(test)]
mod tests {
    use dialog_flow_layout::render_with_options;

    use crate::{DialogRenderOptions, build_render_options, layout_json, parse_options};

    const FLOW: &str = r#"{
        question: { id: "q", type: "choice", label: "Pick a plan" },
        choices: [
            { id: "basic", choiceId: "basic", label: "Basic" },
            { id: "team", choiceId: "team", label: "Team", gotoChoice: "basic" },
            { id: "pro", choiceId: "pro", label: "Pro" },
        ],
        branches: [
            { id: "b-basic", choiceId: "basic", label: "Checkout" },
            { id: "b-team", choiceId: "team", label: "Talk to sales" },
            { id: "b-pro", choiceId: "pro", label: "Trial" },
        ],
    }"#;

    fn fast() -> DialogRenderOptions {
        DialogRenderOptions {
            fast_text: Some(true),
            ..DialogRenderOptions::default()
        }
    }

    #[test]
    fn renders_converging_choice_flow() {
        let svg = render_with_options(FLOW, build_render_options(fast()))
            .expect("choice flow should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Checkout"));
        assert!(svg.contains("Trial"));
        assert!(!svg.contains("Talk to sales"));
    }

    #[test]
    fn layout_json_marks_unreachable_branch_hidden() {
        let json = layout_json(FLOW, build_render_options(fast())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let team = value["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|node| node["id"] == "b-team")
            .unwrap();
        assert_eq!(team["hidden"], true);
    }

    #[test]
    fn classic_theme_and_font_overrides() {
        let options = parse_options(Some(r#"{"theme":"classic","fontSize":20}"#.to_string())).unwrap();
        let render_options = build_render_options(options);
        assert_eq!(render_options.theme.font_size, 20.0);
        assert_eq!(
            render_options.theme.line_color,
            dialog_flow_layout::Theme::classic().line_color
        );
    }

    #[test]
    fn bad_options_are_reported() {
        assert!(parse_options(Some("{".to_string())).is_err());
        assert!(layout_json("{ choices: [", build_render_options(fast())).is_err());
    }
}
