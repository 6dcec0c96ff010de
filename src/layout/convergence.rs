use std::collections::BTreeMap;

use super::*;

/// Choices that share one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseGroup {
    /// Index into the branch list.
    pub case: usize,
    /// Indices into the choice list, in input order.
    pub choices: Vec<usize>,
}

impl CaseGroup {
    pub fn is_reachable(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn is_converged(&self) -> bool {
        self.choices.len() > 1
    }
}

/// Maps choice index to branch index for every choice whose `goto_choice`
/// points at another choice's branch. Unresolvable targets are dropped.
pub fn build_convergence_map(choices: &[GraphNode], branches: &[GraphNode]) -> BTreeMap<usize, usize> {
    let mut map = BTreeMap::new();
    for (idx, choice) in choices.iter().enumerate() {
        let Some(target) = choice.data.goto_choice.as_deref() else {
            continue;
        };
        if choice.data.choice_id.as_deref() == Some(target) {
            continue;
        }
        match branches
            .iter()
            .position(|branch| branch.data.choice_id.as_deref() == Some(target))
        {
            Some(case) => {
                map.insert(idx, case);
            }
            None => log::warn!(
                "choice {} goes to unknown choice {target:?}; keeping its own branch",
                choice.id
            ),
        }
    }
    map
}

/// One group per branch, in branch order. A choice without a redirect
/// belongs to the branch at its own index; choices whose index has no
/// branch are left out. Groups with no choices are unreachable.
pub fn group_choices(map: &BTreeMap<usize, usize>, choice_count: usize, branch_count: usize) -> Vec<CaseGroup> {
    let mut groups: Vec<CaseGroup> = (0..branch_count)
        .map(|case| CaseGroup {
            case,
            choices: Vec::new(),
        })
        .collect();
    for idx in 0..choice_count {
        let case = map.get(&idx).copied().unwrap_or(idx);
        if let Some(group) = groups.get_mut(case) {
            group.choices.push(idx);
        }
    }
    groups
}

pub(super) fn compute_convergence_layout(
    question: &GraphNode,
    choices: &[GraphNode],
    branches: &[GraphNode],
    config: &LayoutConfig,
) -> GraphLayout {
    let map = build_convergence_map(choices, branches);
    if map.is_empty() {
        return compute_branching_layout(question, choices, branches, config);
    }
    let groups = group_choices(&map, choices.len(), branches.len());
    log::debug!(
        "question {}: {} redirects, {} reachable branches",
        question.id,
        map.len(),
        groups.iter().filter(|g| g.is_reachable()).count()
    );

    let slots = Slots::new(choices.len());
    let columns: Vec<CoordItem> = groups
        .iter()
        .filter(|group| group.is_reachable())
        .map(|group| {
            let items: Vec<CoordItem> = group
                .choices
                .iter()
                .map(|&idx| CoordItem::node(slots.choice(idx), choices[idx].boundary))
                .collect();
            let row = GraphCoord::row(items, config.branch_interval_x, RowAxis::Centered);
            GraphCoord::attach(
                row.into(),
                vec![(
                    CoordItem::node(slots.branch(group.case), branches[group.case].boundary),
                    Attach::below(config.element_interval_y),
                )],
            )
            .into()
        })
        .collect();
    let content = GraphCoord::row(columns, config.branch_interval_x, RowAxis::First);

    let (root, placement) = anchor_question(question, content, config);
    let mut node_map = place_nodes(question, choices, branches, &slots, &placement);
    for group in groups.iter().filter(|group| !group.is_reachable()) {
        if let Some(branch) = node_map.branches.get_mut(group.case) {
            branch.hidden = true;
        }
    }
    let edges = match &node_map.question {
        Some(q) => convergence_edges(q, &node_map.choices, &node_map.branches, &groups, config),
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

fn convergence_edges(
    question: &GraphNode,
    choices: &[GraphNode],
    branches: &[GraphNode],
    groups: &[CaseGroup],
    config: &LayoutConfig,
) -> Vec<Edge> {
    let step = config.branch_interval_y;
    let gap = config.element_interval_y;
    let baseline_y = question.bottom() + step;
    let mut edges = Vec::new();

    edges.push(Edge::new(
        format!("{}/down", question.id),
        EdgeDirection::Down,
        question.center_x(),
        question.bottom(),
        step,
    ));

    let placed: Vec<&GraphNode> = groups
        .iter()
        .flat_map(|group| group.choices.iter())
        .filter_map(|&idx| choices.get(idx))
        .collect();
    let left = placed.iter().map(|c| c.center_x()).reduce(f32::min);
    let right = placed.iter().map(|c| c.center_x()).reduce(f32::max);
    if let (Some(left), Some(right)) = (left, right) {
        edges.push(Edge::new(
            format!("{}/baseline", question.id),
            EdgeDirection::Right,
            left,
            baseline_y,
            right - left,
        ));
    }

    for group in groups.iter().filter(|group| group.is_reachable()) {
        let Some(branch) = branches.get(group.case) else {
            continue;
        };
        let converged = group.is_converged();
        let tail = if converged { gap / 2.0 } else { gap };

        for choice in group.choices.iter().filter_map(|&idx| choices.get(idx)) {
            edges.push(Edge::new(
                format!("{}/baseline->{}", question.id, choice.id),
                EdgeDirection::Down,
                choice.center_x(),
                baseline_y,
                step,
            ));
            let out = Edge::new(
                format!("{}->{}", choice.id, branch.id),
                EdgeDirection::Down,
                choice.center_x(),
                choice.bottom(),
                tail,
            );
            edges.push(if converged { out } else { out.with_options(EdgeOptions::arrow_end()) });
        }

        if !converged {
            continue;
        }
        let first = group.choices.first().and_then(|&idx| choices.get(idx));
        let last = group.choices.last().and_then(|&idx| choices.get(idx));
        let (Some(first), Some(last)) = (first, last) else {
            continue;
        };
        edges.push(
            Edge::new(
                format!("{}/merge", branch.id),
                EdgeDirection::Up,
                branch.center_x(),
                branch.top(),
                step,
            )
            .with_options(EdgeOptions::arrow_start()),
        );
        edges.push(Edge::new(
            format!("{}/merge-line", branch.id),
            EdgeDirection::Right,
            first.center_x(),
            first.bottom() + gap / 2.0,
            last.center_x() - first.center_x(),
        ));
    }

    edges
}
