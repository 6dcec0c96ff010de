use crate::config::LayoutConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::ir::GraphNode;
use crate::layout::text::measure_label;
use crate::layout::{Edge, GraphLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const CANVAS_PADDING: f32 = 16.0;
const MIN_CANVAS_SIZE: f32 = 200.0;

#[derive(Debug, Clone, Copy)]
enum NodeRole {
    Question,
    Choice,
    Branch,
}

struct NodeStyle<'a> {
    fill: &'a str,
    stroke: &'a str,
    text: &'a str,
    radius: f32,
}

impl NodeRole {
    fn style<'a>(self, node: &GraphNode, theme: &'a Theme) -> NodeStyle<'a> {
        match self {
            Self::Question => NodeStyle {
                fill: &theme.question_fill,
                stroke: &theme.question_border,
                text: &theme.question_text,
                radius: 6.0,
            },
            Self::Choice => NodeStyle {
                fill: &theme.choice_fill,
                stroke: &theme.choice_border,
                text: &theme.choice_text,
                radius: node.boundary.height / 2.0,
            },
            Self::Branch => NodeStyle {
                fill: &theme.branch_fill,
                stroke: &theme.branch_border,
                text: &theme.branch_text,
                radius: 4.0,
            },
        }
    }
}

pub fn render_svg(layout: &GraphLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let (min_x, min_y, max_x, max_y) = canvas_bounds(layout);
    let view_x = min_x - CANVAS_PADDING;
    let view_y = min_y - CANVAS_PADDING;
    let width = (max_x - min_x + CANVAS_PADDING * 2.0).max(MIN_CANVAS_SIZE);
    let height = (max_y - min_y + CANVAS_PADDING * 2.0).max(MIN_CANVAS_SIZE);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{view_x:.2} {view_y:.2} {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect x=\"{view_x:.2}\" y=\"{view_y:.2}\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    for edge in &layout.edges {
        svg.push_str(&edge_svg(edge, theme));
    }

    let nodes = &layout.node_map;
    let roles = nodes
        .question
        .iter()
        .map(|node| (node, NodeRole::Question))
        .chain(nodes.choices.iter().map(|node| (node, NodeRole::Choice)))
        .chain(nodes.branches.iter().map(|node| (node, NodeRole::Branch)));
    for (node, role) in roles {
        if node.hidden || !nodes.is_placed(node) {
            continue;
        }
        svg.push_str(&node_svg(node, role, theme, config));
    }

    svg.push_str("</svg>");
    svg
}

/// Union of the layout boundary and every visible placed node box.
fn canvas_bounds(layout: &GraphLayout) -> (f32, f32, f32, f32) {
    let mut min_x = layout.origin.x;
    let mut min_y = layout.origin.y;
    let mut max_x = layout.origin.x + layout.boundary.width;
    let mut max_y = layout.origin.y + layout.boundary.height;
    for node in layout.node_map.placed().filter(|node| !node.hidden) {
        min_x = min_x.min(node.offset.x);
        min_y = min_y.min(node.offset.y);
        max_x = max_x.max(node.offset.x + node.boundary.width);
        max_y = max_y.max(node.offset.y + node.boundary.height);
    }
    (min_x, min_y, max_x, max_y)
}

fn edge_svg(edge: &Edge, theme: &Theme) -> String {
    let (x1, y1) = edge.start();
    let (x2, y2) = edge.end();
    let mut markers = String::new();
    if let Some(options) = &edge.options {
        if options.arrow_start {
            markers.push_str(" marker-start=\"url(#arrow)\"");
        }
        if options.arrow_end {
            markers.push_str(" marker-end=\"url(#arrow)\"");
        }
    }
    let title = edge
        .label()
        .map(|label| format!("<title>{}</title>", escape_xml(label)))
        .unwrap_or_default();
    format!(
        "<line id=\"{}\" x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{}\" stroke-width=\"1.4\"{markers}>{title}</line>",
        escape_xml(&edge.id),
        theme.line_color
    )
}

fn node_svg(node: &GraphNode, role: NodeRole, theme: &Theme, config: &LayoutConfig) -> String {
    let style = role.style(node, theme);
    let mut out = format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
        node.offset.x,
        node.offset.y,
        node.boundary.width,
        node.boundary.height,
        style.radius,
        style.radius,
        style.fill,
        style.stroke
    );
    if node.data.label.is_empty() {
        return out;
    }

    let block = measure_label(&node.data.label, theme, config);
    let line_height = theme.font_size * config.label_line_height;
    let x = node.center_x();
    let center_y = node.offset.y + node.boundary.height / 2.0;
    let start_y = center_y - block.height / 2.0 + line_height / 2.0;
    out.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        theme.font_size,
        style.text
    ));
    for (idx, line) in block.lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        out.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    out.push_str("</text>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, svg)?,
        None => print!("{svg}"),
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(family) = theme.font_family.split(',').next() {
        opt.font_family = family.trim().trim_matches('"').to_string();
    }
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    log::info!("wrote {}x{} png to {}", size.width(), size.height(), output.display());
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Boundary, NodeData, QuestionKind};
    use crate::layout::compute_layout;

    fn config() -> LayoutConfig {
        LayoutConfig {
            fast_text_metrics: true,
            ..LayoutConfig::default()
        }
    }

    fn node(id: &str, label: &str, choice_id: &str, goto: Option<&str>) -> GraphNode {
        let data = NodeData {
            label: label.to_string(),
            choice_id: Some(choice_id.to_string()),
            goto_choice: goto.map(str::to_string),
            ..NodeData::default()
        };
        GraphNode::new(id, Boundary::new(120.0, 40.0), data)
    }

    #[test]
    fn render_svg_draws_nodes_and_edges() {
        let mut question = node("q", "Ready to <order>?", "", None);
        question.data.kind = Some(QuestionKind::Confirm);
        let choices = vec![node("yes", "Yes", "y", None), node("no", "No", "n", None)];
        let branches = vec![node("by", "Checkout", "y", None), node("bn", "Browse", "n", None)];
        let layout = compute_layout(Some(&question), &choices, &branches, &config());
        let svg = render_svg(&layout, &Theme::modern(), &config());

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Ready to &lt;order&gt;?"));
        assert!(svg.contains("Checkout"));
        assert_eq!(svg.matches("<line ").count(), layout.edges.len());
        assert!(svg.contains("<title>Yes</title>"));
        assert!(svg.contains("marker-end=\"url(#arrow)\""));
    }

    #[test]
    fn hidden_branches_are_not_drawn() {
        let mut question = node("q", "Size?", "", None);
        question.data.kind = Some(QuestionKind::Choice);
        let choices = vec![node("s", "Small", "s", Some("l")), node("l", "Large", "l", None)];
        let branches = vec![node("bs", "Small path", "s", None), node("bl", "Large path", "l", None)];
        let layout = compute_layout(Some(&question), &choices, &branches, &config());
        let svg = render_svg(&layout, &Theme::modern(), &config());

        assert!(!svg.contains("Small path"));
        assert!(svg.contains("Large path"));
        assert!(svg.contains("marker-start=\"url(#arrow)\""));
    }

    #[test]
    fn unplaced_nodes_are_not_drawn() {
        let mut confirm = node("q", "Proceed?", "", None);
        confirm.data.kind = Some(QuestionKind::Confirm);
        let choices = vec![node("yes", "Yes", "y", None), node("no", "No", "n", None)];
        let branches = vec![
            node("by", "Checkout", "y", None),
            node("bn", "Browse", "n", None),
            node("bx", "Orphan branch", "x", None),
        ];
        let layout = compute_layout(Some(&confirm), &choices, &branches, &config());
        let svg = render_svg(&layout, &Theme::modern(), &config());
        assert!(svg.contains("Browse"));
        assert!(!svg.contains("Orphan branch"));

        let mut choice = node("q", "Which?", "", None);
        choice.data.kind = Some(QuestionKind::Choice);
        let choices = vec![
            node("a", "First", "a", Some("b")),
            node("b", "Second", "b", None),
            node("c", "Orphan choice", "c", None),
        ];
        let branches = vec![node("ba", "Path A", "a", None), node("bb", "Path B", "b", None)];
        let layout = compute_layout(Some(&choice), &choices, &branches, &config());
        let svg = render_svg(&layout, &Theme::modern(), &config());
        assert!(svg.contains("Second"));
        assert!(svg.contains("Path B"));
        assert!(!svg.contains("Orphan choice"));
    }

    #[test]
    fn background_comes_from_theme() {
        let mut theme = Theme::modern();
        theme.background = "#123456".to_string();
        let svg = render_svg(&GraphLayout::empty(), &theme, &config());
        assert!(svg.contains("fill=\"#123456\""));
    }

    #[test]
    fn empty_layout_renders_blank_canvas() {
        let svg = render_svg(&GraphLayout::empty(), &Theme::modern(), &config());
        assert!(svg.contains("width=\"200.00\""));
        assert!(!svg.contains("<line"));
    }
}
