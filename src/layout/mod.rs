mod branching;
mod convergence;
pub(crate) mod coord;
pub(crate) mod text;
pub(crate) mod types;
pub use convergence::{CaseGroup, build_convergence_map, group_choices};
pub use types::*;
use branching::*;
use convergence::*;

use std::collections::BTreeSet;

use crate::config::LayoutConfig;
use crate::ir::{Boundary, DialogFlow, GraphNode, QuestionKind};
use coord::{Attach, CoordItem, GraphCoord, Placement, RowAxis, Slot};

/// Lays out one question with its choices and branches.
///
/// Inputs are never modified: the returned [`NodeMap`] holds positioned
/// copies. Use [`DialogFlow::apply_layout`] to write offsets back.
pub fn compute_layout(
    question: Option<&GraphNode>,
    choices: &[GraphNode],
    branches: &[GraphNode],
    config: &LayoutConfig,
) -> GraphLayout {
    let Some(question) = question else {
        return GraphLayout::empty();
    };
    log::debug!(
        "laying out question {} ({}): {} choices, {} branches",
        question.id,
        question.data.kind.map_or("untyped", QuestionKind::as_str),
        choices.len(),
        branches.len()
    );
    match question.data.kind {
        Some(QuestionKind::Choice) => compute_convergence_layout(question, choices, branches, config),
        Some(QuestionKind::Confirm) => compute_branching_layout(question, choices, branches, config),
        Some(QuestionKind::Text) | Some(QuestionKind::Number) | None => {
            compute_simple_layout(question, config)
        }
    }
}

pub fn layout_flow(flow: &DialogFlow, config: &LayoutConfig) -> GraphLayout {
    compute_layout(flow.question.as_ref(), &flow.choices, &flow.branches, config)
}

/// Fixed footprint for question kinds that do not branch.
fn compute_simple_layout(question: &GraphNode, config: &LayoutConfig) -> GraphLayout {
    GraphLayout {
        boundary: Boundary::new(config.simple_question_width, config.simple_question_height),
        origin: question.offset,
        node_map: NodeMap {
            question: Some(question.clone()),
            ..NodeMap::default()
        },
        edges: Vec::new(),
        nodes: Vec::new(),
    }
}

/// Slot numbering shared by the branching layouts: the question first,
/// then every choice, then every branch.
struct Slots {
    choice_count: usize,
}

impl Slots {
    const QUESTION: Slot = 0;

    fn new(choice_count: usize) -> Self {
        Self { choice_count }
    }

    fn choice(&self, idx: usize) -> Slot {
        1 + idx
    }

    fn branch(&self, idx: usize) -> Slot {
        1 + self.choice_count + idx
    }
}

/// Clones the inputs and moves every placed node to its absolute offset.
/// Nodes without a slot in `placement` are recorded in `unplaced`.
fn place_nodes(
    question: &GraphNode,
    choices: &[GraphNode],
    branches: &[GraphNode],
    slots: &Slots,
    placement: &Placement,
) -> NodeMap {
    let mut unplaced = BTreeSet::new();
    let mut place = |node: &GraphNode, slot: Slot| {
        let mut node = node.clone();
        match placement.get(slot) {
            Some(offset) => node.offset = offset,
            None => {
                unplaced.insert(node.id.clone());
            }
        }
        node
    };
    let question = place(question, Slots::QUESTION);
    let choices: Vec<GraphNode> = choices
        .iter()
        .enumerate()
        .map(|(idx, node)| place(node, slots.choice(idx)))
        .collect();
    let branches: Vec<GraphNode> = branches
        .iter()
        .enumerate()
        .map(|(idx, node)| place(node, slots.branch(idx)))
        .collect();
    if !unplaced.is_empty() {
        log::debug!("{} nodes left unplaced: {unplaced:?}", unplaced.len());
    }
    NodeMap {
        question: Some(question),
        choices,
        branches,
        unplaced,
    }
}

/// Puts the question on top of `content` and anchors it at the origin.
fn anchor_question(
    question: &GraphNode,
    content: GraphCoord,
    config: &LayoutConfig,
) -> (GraphCoord, Placement) {
    let root = GraphCoord::attach(
        content.into(),
        vec![(
            CoordItem::node(Slots::QUESTION, question.boundary),
            Attach::above(config.branch_interval_y * 2.0),
        )],
    );
    let placement = root.move_to(Slots::QUESTION, crate::ir::Offset::zero());
    (root, placement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{NodeData, Offset};

    pub(super) fn node(id: &str, width: f32, height: f32) -> GraphNode {
        GraphNode::new(id, Boundary::new(width, height), NodeData::default())
    }

    pub(super) fn question(kind: Option<QuestionKind>) -> GraphNode {
        let mut q = node("q", 240.0, 64.0);
        q.data.kind = kind;
        q
    }

    pub(super) fn choice(id: &str, choice_id: &str, goto: Option<&str>) -> GraphNode {
        let mut c = node(id, 96.0, 32.0);
        c.data.choice_id = Some(choice_id.to_string());
        c.data.goto_choice = goto.map(str::to_string);
        c.data.label = id.to_uppercase();
        c
    }

    pub(super) fn branch(id: &str, choice_id: &str) -> GraphNode {
        let mut b = node(id, 180.0, 56.0);
        b.data.choice_id = Some(choice_id.to_string());
        b
    }

    #[test]
    fn missing_question_yields_empty_layout() {
        let choices = vec![choice("a", "a", None)];
        let branches = vec![branch("ba", "a")];
        let layout = compute_layout(None, &choices, &branches, &LayoutConfig::default());
        assert_eq!(layout.boundary, Boundary::zero());
        assert!(layout.edges.is_empty());
        assert!(layout.nodes.is_empty());
        assert!(layout.node_map.question.is_none());
    }

    #[test]
    fn simple_kinds_use_fixed_footprint() {
        let choices = vec![choice("a", "a", None), choice("b", "b", None)];
        let branches = vec![branch("ba", "a"), branch("bb", "b")];
        for kind in [Some(QuestionKind::Text), Some(QuestionKind::Number), None] {
            let mut q = question(kind);
            q.offset = Offset::new(5.0, 7.0);
            let layout = compute_layout(Some(&q), &choices, &branches, &LayoutConfig::default());
            assert_eq!(layout.boundary.width, 300.0);
            assert_eq!(layout.boundary.height, 286.0);
            assert!(layout.edges.is_empty());
            assert!(layout.node_map.choices.is_empty());
            assert!(layout.node_map.branches.is_empty());
            assert_eq!(layout.node_map.question.as_ref().map(|n| n.offset), Some(q.offset));
        }
    }

    #[test]
    fn slots_do_not_overlap() {
        let slots = Slots::new(3);
        assert_eq!(slots.choice(0), 1);
        assert_eq!(slots.choice(2), 3);
        assert_eq!(slots.branch(0), 4);
    }

    #[test]
    fn apply_layout_writes_offsets_back() {
        let mut flow = DialogFlow {
            question: Some(question(Some(QuestionKind::Confirm))),
            choices: vec![choice("yes", "yes", None), choice("no", "no", None)],
            branches: vec![branch("b-yes", "yes"), branch("b-no", "no")],
        };
        let layout = layout_flow(&flow, &LayoutConfig::default());
        flow.apply_layout(&layout);
        let offsets = layout.offsets();
        for node in flow.nodes() {
            assert_eq!(Some(&node.offset), offsets.get(&node.id), "node {}", node.id);
        }
        assert_eq!(flow.question.as_ref().map(|q| q.offset), Some(Offset::zero()));
    }
}
