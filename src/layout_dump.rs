use crate::layout::{EdgeDirection, GraphLayout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub origin: [f32; 2],
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub role: &'static str,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub axis_x: f32,
    pub hidden: bool,
    /// False when the layout gave the node no position.
    pub placed: bool,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub direction: EdgeDirection,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub length: f32,
    pub label: Option<String>,
    pub arrow_start: bool,
    pub arrow_end: bool,
}

impl LayoutDump {
    pub fn from_layout(layout: &GraphLayout) -> Self {
        let map = &layout.node_map;
        let nodes = map
            .question
            .iter()
            .map(|node| ("question", node))
            .chain(map.choices.iter().map(|node| ("choice", node)))
            .chain(map.branches.iter().map(|node| ("branch", node)))
            .map(|(role, node)| NodeDump {
                id: node.id.clone(),
                role,
                x: node.offset.x,
                y: node.offset.y,
                width: node.boundary.width,
                height: node.boundary.height,
                axis_x: node.boundary.axis_x,
                hidden: node.hidden,
                placed: map.is_placed(node),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| {
                let (x1, y1) = edge.start();
                let (x2, y2) = edge.end();
                let options = edge.options.clone().unwrap_or_default();
                EdgeDump {
                    id: edge.id.clone(),
                    direction: edge.direction,
                    start: [x1, y1],
                    end: [x2, y2],
                    length: edge.length,
                    label: options.label,
                    arrow_start: options.arrow_start,
                    arrow_end: options.arrow_end,
                }
            })
            .collect();

        LayoutDump {
            width: layout.boundary.width,
            height: layout.boundary.height,
            origin: [layout.origin.x, layout.origin.y],
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &GraphLayout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    log::debug!("layout dump written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::{Boundary, GraphNode, NodeData, QuestionKind};
    use crate::layout::compute_layout;

    fn node(id: &str, choice_id: &str, width: f32, height: f32) -> GraphNode {
        let data = NodeData {
            choice_id: Some(choice_id.to_string()),
            label: id.to_string(),
            ..NodeData::default()
        };
        GraphNode::new(id, Boundary::new(width, height), data)
    }

    #[test]
    fn dump_lists_roles_and_edge_endpoints() {
        let mut question = node("q", "", 240.0, 64.0);
        question.data.kind = Some(QuestionKind::Confirm);
        let choices = vec![node("yes", "y", 96.0, 32.0), node("no", "n", 96.0, 32.0)];
        let branches = vec![node("by", "y", 180.0, 56.0), node("bn", "n", 180.0, 56.0)];
        let layout = compute_layout(Some(&question), &choices, &branches, &LayoutConfig::default());
        let dump = LayoutDump::from_layout(&layout);

        let roles: Vec<&str> = dump.nodes.iter().map(|n| n.role).collect();
        assert_eq!(roles, vec!["question", "choice", "choice", "branch", "branch"]);
        assert_eq!(dump.width, layout.boundary.width);
        assert_eq!(dump.edges.len(), layout.edges.len());
        assert_eq!(dump.edges[0].start, [120.0, 64.0]);
        assert_eq!(dump.edges[0].label.as_deref(), Some("yes"));
        assert!(dump.edges[0].arrow_end);

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["edges"][0]["direction"], "Down");
        assert_eq!(json["nodes"][0]["axis_x"], 120.0);
        assert!(dump.nodes.iter().all(|n| n.placed));
    }

    #[test]
    fn unpaired_branch_is_flagged_unplaced() {
        let mut question = node("q", "", 240.0, 64.0);
        question.data.kind = Some(QuestionKind::Confirm);
        let choices = vec![node("yes", "y", 96.0, 32.0)];
        let branches = vec![node("by", "y", 180.0, 56.0), node("bn", "n", 180.0, 56.0)];
        let layout = compute_layout(Some(&question), &choices, &branches, &LayoutConfig::default());
        let dump = LayoutDump::from_layout(&layout);

        let flags: Vec<(&str, bool, bool)> = dump
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.placed, n.hidden))
            .collect();
        assert_eq!(
            flags,
            vec![("q", true, false), ("yes", true, false), ("by", true, false), ("bn", false, false)]
        );
    }

    #[test]
    fn empty_layout_dumps_nothing() {
        let dump = LayoutDump::from_layout(&GraphLayout::empty());
        assert!(dump.nodes.is_empty());
        assert!(dump.edges.is_empty());
        assert_eq!(dump.origin, [0.0, 0.0]);
    }
}
