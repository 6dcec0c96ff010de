use super::*;

/// One column per (choice, branch) pair, question centred over the first.
pub(super) fn compute_branching_layout(
    question: &GraphNode,
    choices: &[GraphNode],
    branches: &[GraphNode],
    config: &LayoutConfig,
) -> GraphLayout {
    if branches.is_empty() {
        return GraphLayout::empty();
    }
    let pairs = choices.len().min(branches.len());
    if pairs == 0 {
        log::warn!("question {} has branches but no choices to pair them with", question.id);
        return GraphLayout::empty();
    }
    if choices.len() != branches.len() {
        log::warn!(
            "question {}: {} choices vs {} branches, laying out the first {pairs} pairs",
            question.id,
            choices.len(),
            branches.len()
        );
    }

    let slots = Slots::new(choices.len());
    let columns: Vec<CoordItem> = (0..pairs)
        .map(|idx| {
            GraphCoord::attach(
                CoordItem::node(slots.choice(idx), choices[idx].boundary),
                vec![(
                    CoordItem::node(slots.branch(idx), branches[idx].boundary),
                    Attach::below(config.element_interval_y),
                )],
            )
            .into()
        })
        .collect();
    let mut row = GraphCoord::row(columns, config.branch_interval_x, RowAxis::First);
    // HACK: keeps nodes added under the question from overlapping the branches.
    // TODO: remove once question nodes can only be created at the end of a flow.
    row.pad_bottom(config.branch_padding_bottom);

    let (root, placement) = anchor_question(question, row, config);
    let node_map = place_nodes(question, choices, branches, &slots, &placement);
    let edges = match &node_map.question {
        Some(q) => branching_edges(
            q,
            &node_map.choices[..pairs],
            &node_map.branches[..pairs],
            branches.len(),
            config,
        ),
        None => Vec::new(),
    };

    GraphLayout {
        boundary: root.boundary(),
        origin: placement.origin,
        node_map,
        edges,
        nodes: Vec::new(),
    }
}

/// Question-to-branch connectors plus the shared baseline.
///
/// The first column shares the question's axis, so its connector runs
/// straight from the question; the rest drop from the baseline. The
/// baseline is emitted whenever the question has more than one branch,
/// spanning the placed columns only.
pub(super) fn branching_edges(
    question: &GraphNode,
    choices: &[GraphNode],
    branches: &[GraphNode],
    branch_count: usize,
    config: &LayoutConfig,
) -> Vec<Edge> {
    let baseline_y = question.bottom() + config.branch_interval_y;
    let mut edges = Vec::with_capacity(branches.len() + 1);

    for (idx, (choice, branch)) in choices.iter().zip(branches).enumerate() {
        let start_y = if idx == 0 { question.bottom() } else { baseline_y };
        let options = EdgeOptions {
            label: Some(choice.data.label.clone()).filter(|label| !label.is_empty()),
            ..EdgeOptions::arrow_end()
        };
        edges.push(
            Edge::new(
                format!("{}->{}", question.id, branch.id),
                EdgeDirection::Down,
                branch.center_x(),
                start_y,
                branch.top() - start_y,
            )
            .with_options(options),
        );
    }

    if branch_count > 1 {
        if let (Some(first), Some(last)) = (branches.first(), branches.last()) {
            edges.push(Edge::new(
                format!("{}/baseline", question.id),
                EdgeDirection::Right,
                first.center_x(),
                baseline_y,
                last.center_x() - first.center_x(),
            ));
        }
    }

    edges
}
