use serde::{Deserialize, Serialize};

use crate::layout::GraphLayout;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Size of a layout element plus the vertical line it aligns on.
///
/// `axis_x` is relative to the boundary's own left edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Boundary {
    pub width: f32,
    pub height: f32,
    pub axis_x: f32,
}

impl Boundary {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            axis_x: width / 2.0,
        }
    }

    pub fn with_axis(width: f32, height: f32, axis_x: f32) -> Self {
        Self {
            width,
            height,
            axis_x,
        }
    }

    pub const fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            axis_x: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Choice,
    Confirm,
    Text,
    Number,
}

impl QuestionKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "choice" => Some(Self::Choice),
            "confirm" => Some(Self::Confirm),
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Choice => "choice",
            Self::Confirm => "confirm",
            Self::Text => "text",
            Self::Number => "number",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    /// Question type; only meaningful on the question node.
    pub kind: Option<QuestionKind>,
    pub choice_id: Option<String>,
    pub goto_choice: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub offset: Offset,
    pub boundary: Boundary,
    pub data: NodeData,
    pub hidden: bool,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, boundary: Boundary, data: NodeData) -> Self {
        Self {
            id: id.into(),
            offset: Offset::zero(),
            boundary,
            data,
            hidden: false,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.offset.x + self.boundary.axis_x
    }

    pub fn top(&self) -> f32 {
        self.offset.y
    }

    pub fn bottom(&self) -> f32 {
        self.offset.y + self.boundary.height
    }
}

/// Caller-owned node set for one question and its answers.
#[derive(Debug, Clone, Default)]
pub struct DialogFlow {
    pub question: Option<GraphNode>,
    pub choices: Vec<GraphNode>,
    pub branches: Vec<GraphNode>,
}

impl DialogFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        usize::from(self.question.is_some()) + self.choices.len() + self.branches.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.question
            .iter()
            .chain(self.choices.iter())
            .chain(self.branches.iter())
    }

    fn nodes_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
        self.question
            .iter_mut()
            .chain(self.choices.iter_mut())
            .chain(self.branches.iter_mut())
    }

    /// Writes computed offsets and hidden flags back onto the caller's nodes.
    pub fn apply_layout(&mut self, layout: &GraphLayout) {
        let offsets = layout.offsets();
        let hidden = layout.hidden_ids();
        for node in self.nodes_mut() {
            if let Some(offset) = offsets.get(&node.id) {
                node.offset = *offset;
            }
            if hidden.contains(node.id.as_str()) {
                node.hidden = true;
            }
        }
    }
}
