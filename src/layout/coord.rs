//! Relative composition of node boxes.
//!
//! A [`GraphCoord`] is built bottom-up from nodes positioned against their
//! own local origin. Composing never reads a node's current offset, so the
//! same inputs always compose to the same tree; absolute offsets are only
//! produced by [`GraphCoord::move_to`].

use std::collections::BTreeMap;

use crate::ir::{Boundary, Offset};

/// Index identifying a node inside one layout pass.
pub(crate) type Slot = usize;

#[derive(Debug, Clone)]
pub(crate) enum CoordItem {
    Node { slot: Slot, boundary: Boundary },
    Coord(GraphCoord),
}

impl CoordItem {
    pub(crate) fn node(slot: Slot, boundary: Boundary) -> Self {
        Self::Node { slot, boundary }
    }

    pub(crate) fn boundary(&self) -> Boundary {
        match self {
            Self::Node { boundary, .. } => *boundary,
            Self::Coord(coord) => coord.boundary,
        }
    }

    fn find(&self, target: Slot, at: Offset) -> Option<Offset> {
        match self {
            Self::Node { slot, .. } => (*slot == target).then_some(at),
            Self::Coord(coord) => coord.find(target, at),
        }
    }

    fn collect(&self, at: Offset, out: &mut BTreeMap<Slot, Offset>) {
        match self {
            Self::Node { slot, .. } => {
                out.insert(*slot, at);
            }
            Self::Coord(coord) => coord.collect(at, out),
        }
    }
}

impl From<GraphCoord> for CoordItem {
    fn from(coord: GraphCoord) -> Self {
        Self::Coord(coord)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Top,
    Bottom,
}

/// Where a dependent element sits relative to the primary one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Attach {
    pub side: Side,
    pub gap: f32,
}

impl Attach {
    pub(crate) fn above(gap: f32) -> Self {
        Self {
            side: Side::Top,
            gap,
        }
    }

    pub(crate) fn below(gap: f32) -> Self {
        Self {
            side: Side::Bottom,
            gap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RowAxis {
    /// Row aligns on its first element.
    First,
    /// Row aligns midway between its first and last element axes.
    Centered,
}

#[derive(Debug, Clone)]
pub(crate) struct GraphCoord {
    boundary: Boundary,
    children: Vec<(Offset, CoordItem)>,
}

/// Absolute offsets produced by [`GraphCoord::move_to`].
#[derive(Debug, Clone, Default)]
pub(crate) struct Placement {
    pub origin: Offset,
    pub offsets: BTreeMap<Slot, Offset>,
}

impl Placement {
    pub(crate) fn get(&self, slot: Slot) -> Option<Offset> {
        self.offsets.get(&slot).copied()
    }
}

impl GraphCoord {
    /// Stacks dependents above or below `primary`, all centred on one
    /// vertical axis. Dependents on the same side stack outward in order.
    pub(crate) fn attach(primary: CoordItem, dependents: Vec<(CoordItem, Attach)>) -> Self {
        let primary_box = primary.boundary();
        let mut axis = primary_box.axis_x;
        let mut right = primary_box.width - primary_box.axis_x;
        for (item, _) in &dependents {
            let b = item.boundary();
            axis = axis.max(b.axis_x);
            right = right.max(b.width - b.axis_x);
        }

        // y relative to the primary's top edge
        let mut placed: Vec<(f32, CoordItem)> = Vec::with_capacity(dependents.len() + 1);
        let mut top = 0.0_f32;
        let mut bottom = primary_box.height;
        placed.push((0.0, primary));
        for (item, attach) in dependents {
            let height = item.boundary().height;
            match attach.side {
                Side::Top => {
                    top -= attach.gap + height;
                    placed.push((top, item));
                }
                Side::Bottom => {
                    let y = bottom + attach.gap;
                    bottom = y + height;
                    placed.push((y, item));
                }
            }
        }

        let shift = -top;
        let children = placed
            .into_iter()
            .map(|(y, item)| {
                let x = axis - item.boundary().axis_x;
                (Offset::new(x, y + shift), item)
            })
            .collect();

        Self {
            boundary: Boundary::with_axis(axis + right, bottom + shift, axis),
            children,
        }
    }

    /// Top-aligns `items` left to right with `interval` between neighbours.
    pub(crate) fn row(items: Vec<CoordItem>, interval: f32, anchor: RowAxis) -> Self {
        let mut x = 0.0_f32;
        let mut height = 0.0_f32;
        let mut first_axis = None;
        let mut last_axis = 0.0_f32;
        let mut children = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            if idx > 0 {
                x += interval;
            }
            let b = item.boundary();
            let axis = x + b.axis_x;
            first_axis.get_or_insert(axis);
            last_axis = axis;
            height = height.max(b.height);
            children.push((Offset::new(x, 0.0), item));
            x += b.width;
        }

        let Some(first_axis) = first_axis else {
            return Self {
                boundary: Boundary::zero(),
                children,
            };
        };
        let axis_x = match anchor {
            RowAxis::First => first_axis,
            RowAxis::Centered => (first_axis + last_axis) / 2.0,
        };
        Self {
            boundary: Boundary::with_axis(x, height, axis_x),
            children,
        }
    }

    pub(crate) fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub(crate) fn pad_bottom(&mut self, extra: f32) {
        self.boundary.height += extra;
    }

    /// Offset of `slot` relative to this coord's origin.
    pub(crate) fn relative_offset(&self, slot: Slot) -> Option<Offset> {
        self.find(slot, Offset::zero())
    }

    /// Translates the tree so that `slot`'s top-left lands on `target`.
    /// When `slot` is not part of the tree the root origin lands there.
    pub(crate) fn move_to(&self, slot: Slot, target: Offset) -> Placement {
        let anchor = self.relative_offset(slot).unwrap_or_default();
        let origin = Offset::new(target.x - anchor.x, target.y - anchor.y);
        let mut offsets = BTreeMap::new();
        self.collect(origin, &mut offsets);
        Placement { origin, offsets }
    }

    fn find(&self, target: Slot, at: Offset) -> Option<Offset> {
        self.children
            .iter()
            .find_map(|(offset, item)| item.find(target, at.translate(offset.x, offset.y)))
    }

    fn collect(&self, at: Offset, out: &mut BTreeMap<Slot, Offset>) {
        for (offset, item) in &self.children {
            item.collect(at.translate(offset.x, offset.y), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(slot: Slot, width: f32, height: f32) -> CoordItem {
        CoordItem::node(slot, Boundary::new(width, height))
    }

    #[test]
    fn attach_below_aligns_axes() {
        let coord = GraphCoord::attach(node(0, 100.0, 40.0), vec![(node(1, 60.0, 20.0), Attach::below(10.0))]);
        let b = coord.boundary();
        assert_eq!(b.width, 100.0);
        assert_eq!(b.height, 70.0);
        assert_eq!(b.axis_x, 50.0);
        assert_eq!(coord.relative_offset(0), Some(Offset::new(0.0, 0.0)));
        assert_eq!(coord.relative_offset(1), Some(Offset::new(20.0, 50.0)));
    }

    #[test]
    fn attach_above_shifts_primary_down() {
        let coord = GraphCoord::attach(node(0, 40.0, 40.0), vec![(node(1, 80.0, 30.0), Attach::above(5.0))]);
        let b = coord.boundary();
        assert_eq!(b.width, 80.0);
        assert_eq!(b.height, 75.0);
        assert_eq!(coord.relative_offset(1), Some(Offset::new(0.0, 0.0)));
        assert_eq!(coord.relative_offset(0), Some(Offset::new(20.0, 35.0)));
    }

    #[test]
    fn row_uses_first_axis_when_not_centered() {
        let coord = GraphCoord::row(
            vec![node(0, 40.0, 10.0), node(1, 60.0, 30.0)],
            20.0,
            RowAxis::First,
        );
        let b = coord.boundary();
        assert_eq!(b.width, 120.0);
        assert_eq!(b.height, 30.0);
        assert_eq!(b.axis_x, 20.0);
        assert_eq!(coord.relative_offset(1), Some(Offset::new(60.0, 0.0)));
    }

    #[test]
    fn centered_row_axis_sits_between_outer_axes() {
        let coord = GraphCoord::row(
            vec![node(0, 40.0, 10.0), node(1, 40.0, 10.0), node(2, 40.0, 10.0)],
            10.0,
            RowAxis::Centered,
        );
        // axes at 20, 70, 120
        assert_eq!(coord.boundary().axis_x, 70.0);
    }

    #[test]
    fn empty_row_is_zero_sized() {
        let coord = GraphCoord::row(Vec::new(), 10.0, RowAxis::First);
        assert_eq!(coord.boundary(), Boundary::zero());
    }

    #[test]
    fn pad_bottom_only_grows_height() {
        let mut coord = GraphCoord::row(vec![node(0, 40.0, 10.0)], 10.0, RowAxis::First);
        coord.pad_bottom(200.0);
        assert_eq!(coord.boundary().height, 210.0);
        assert_eq!(coord.boundary().width, 40.0);
    }

    #[test]
    fn move_to_anchors_requested_slot() {
        let inner = GraphCoord::row(vec![node(1, 40.0, 10.0), node(2, 40.0, 10.0)], 20.0, RowAxis::First);
        let root = GraphCoord::attach(inner.into(), vec![(node(0, 100.0, 20.0), Attach::above(8.0))]);
        let placement = root.move_to(0, Offset::zero());
        assert_eq!(placement.get(0), Some(Offset::zero()));
        // question axis 50 aligns with first child axis 20
        assert_eq!(placement.get(1), Some(Offset::new(30.0, 28.0)));
        assert_eq!(placement.get(2), Some(Offset::new(90.0, 28.0)));
        assert_eq!(placement.origin, Offset::new(0.0, 0.0));
    }
}
