use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::config::{LayoutConfig, NodeSizeConfig};
use crate::error::{DialogError, Result};
use crate::ir::{Boundary, DialogFlow, GraphNode, NodeData, Offset, QuestionKind};
use crate::layout::text::measure_label;
use crate::theme::Theme;

#[derive(Debug, Deserialize)]
struct DialogFile {
    question: Option<NodeSpec>,
    #[serde(default)]
    choices: Vec<NodeSpec>,
    #[serde(default)]
    branches: Vec<NodeSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeSpec {
    id: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    choice_id: Option<String>,
    goto_choice: Option<String>,
    #[serde(default)]
    label: String,
    width: Option<f32>,
    height: Option<f32>,
    #[serde(default)]
    hidden: bool,
}

#[derive(Debug, Clone, Copy)]
enum Role {
    Question,
    Choice,
    Branch,
}

impl Role {
    fn name(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Choice => "choice",
            Self::Branch => "branch",
        }
    }

    fn size(self, config: &LayoutConfig) -> NodeSizeConfig {
        match self {
            Self::Question => config.question,
            Self::Choice => config.choice,
            Self::Branch => config.branch,
        }
    }
}

/// Parses a JSON or JSON5 dialog description and sizes every node.
pub fn parse_dialog(input: &str, theme: &Theme, config: &LayoutConfig) -> Result<DialogFlow> {
    let file: DialogFile = json5::from_str(input)?;
    let mut seen = HashSet::new();
    let mut build = |role: Role, index: usize, spec: NodeSpec| -> Result<GraphNode> {
        if spec.id.trim().is_empty() {
            return Err(DialogError::EmptyId {
                role: role.name(),
                index,
            });
        }
        if !seen.insert(spec.id.clone()) {
            return Err(DialogError::DuplicateId(spec.id));
        }
        Ok(build_node(role, spec, theme, config))
    };

    let question = file
        .question
        .map(|spec| build(Role::Question, 0, spec))
        .transpose()?;
    let choices = file
        .choices
        .into_iter()
        .enumerate()
        .map(|(idx, spec)| build(Role::Choice, idx, spec))
        .collect::<Result<Vec<_>>>()?;
    let branches = file
        .branches
        .into_iter()
        .enumerate()
        .map(|(idx, spec)| build(Role::Branch, idx, spec))
        .collect::<Result<Vec<_>>>()?;

    Ok(DialogFlow {
        question,
        choices,
        branches,
    })
}

pub fn parse_dialog_file(path: &Path, theme: &Theme, config: &LayoutConfig) -> Result<DialogFlow> {
    let input = std::fs::read_to_string(path)?;
    parse_dialog(&input, theme, config)
}

fn build_node(role: Role, spec: NodeSpec, theme: &Theme, config: &LayoutConfig) -> GraphNode {
    let kind = spec.kind.as_deref().and_then(|token| {
        let kind = QuestionKind::from_token(token);
        if kind.is_none() {
            log::warn!("node {}: unknown question type {token:?}", spec.id);
        }
        kind
    });
    let boundary = measure_node(role, &spec, theme, config);
    GraphNode {
        id: spec.id,
        offset: Offset::zero(),
        boundary,
        data: NodeData {
            kind,
            choice_id: spec.choice_id,
            goto_choice: spec.goto_choice,
            label: spec.label,
        },
        hidden: spec.hidden,
    }
}

fn measure_node(role: Role, spec: &NodeSpec, theme: &Theme, config: &LayoutConfig) -> Boundary {
    let size = role.size(config);
    let (width, height) = match (spec.width, spec.height) {
        (Some(width), Some(height)) => (width, height),
        (width, height) => {
            let block = measure_label(&spec.label, theme, config);
            let measured_w = (block.width + config.node_padding_x * 2.0).max(size.min_width).ceil();
            let measured_h = (block.height + config.node_padding_y * 2.0).max(size.min_height).ceil();
            (width.unwrap_or(measured_w), height.unwrap_or(measured_h))
        }
    };
    Boundary::new(width.max(0.0), height.max(0.0))
}
