use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::ir::{Boundary, GraphNode, Offset};

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EdgeDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeOptions {
    pub label: Option<String>,
    pub arrow_start: bool,
    pub arrow_end: bool,
}

impl EdgeOptions {
    pub fn arrow_end() -> Self {
        Self {
            arrow_end: true,
            ..Self::default()
        }
    }

    pub fn arrow_start() -> Self {
        Self {
            arrow_start: true,
            ..Self::default()
        }
    }
}

/// One straight connector segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: String,
    pub direction: EdgeDirection,
    pub x: f32,
    pub y: f32,
    pub length: f32,
    pub options: Option<EdgeOptions>,
}

impl Edge {
    pub fn new(id: impl Into<String>, direction: EdgeDirection, x: f32, y: f32, length: f32) -> Self {
        Self {
            id: id.into(),
            direction,
            x,
            y,
            length,
            options: None,
        }
    }

    pub fn with_options(mut self, options: EdgeOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn start(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn end(&self) -> (f32, f32) {
        match self.direction {
            EdgeDirection::Up => (self.x, self.y - self.length),
            EdgeDirection::Down => (self.x, self.y + self.length),
            EdgeDirection::Left => (self.x - self.length, self.y),
            EdgeDirection::Right => (self.x + self.length, self.y),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.options.as_ref().and_then(|opts| opts.label.as_deref())
    }
}

/// Positioned copies of the input nodes, grouped by role.
#[derive(Debug, Clone, Default)]
pub struct NodeMap {
    pub question: Option<GraphNode>,
    pub choices: Vec<GraphNode>,
    pub branches: Vec<GraphNode>,
    /// Ids the composition gave no position; they keep their input offset.
    pub unplaced: BTreeSet<String>,
}

impl NodeMap {
    pub fn iter(&self) -> impl Iterator<Item = &GraphNode> {
        self.question
            .iter()
            .chain(self.choices.iter())
            .chain(self.branches.iter())
    }

    pub fn is_placed(&self, node: &GraphNode) -> bool {
        !self.unplaced.contains(&node.id)
    }

    pub fn placed(&self) -> impl Iterator<Item = &GraphNode> {
        self.iter().filter(|node| self.is_placed(node))
    }
}

#[derive(Debug, Clone)]
pub struct GraphLayout {
    pub boundary: Boundary,
    /// Absolute top-left of `boundary`.
    pub origin: Offset,
    pub node_map: NodeMap,
    pub edges: Vec<Edge>,
    /// Reserved; always empty.
    pub nodes: Vec<GraphNode>,
}

impl GraphLayout {
    pub fn empty() -> Self {
        Self {
            boundary: Boundary::zero(),
            origin: Offset::zero(),
            node_map: NodeMap::default(),
            edges: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_map.question.is_none() && self.edges.is_empty()
    }

    /// Offsets of every placed node, keyed by id.
    pub fn offsets(&self) -> BTreeMap<String, Offset> {
        self.node_map
            .placed()
            .map(|node| (node.id.clone(), node.offset))
            .collect()
    }

    pub fn hidden_ids(&self) -> BTreeSet<&str> {
        self.node_map
            .iter()
            .filter(|node| node.hidden)
            .map(|node| node.id.as_str())
            .collect()
    }
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self::empty()
    }
}
