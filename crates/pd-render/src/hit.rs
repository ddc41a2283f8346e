//! Hit testing: point → node lookup.
//!
//! Walks the document front-to-back (last painted = topmost). Rotated
//! nodes rotate about their top-left corner, so the query point is mapped
//! into the node's local frame before the box test.

use crate::layout::extent;
use kurbo::{Affine, Point, Vec2};
use pd_core::Document;
use pd_core::id::NodeId;
use pd_core::model::Node;
use pd_core::viewport;

/// Find the topmost node at `p` (base canvas space).
/// Returns `None` if no node is hit (background).
pub fn hit_test(doc: &Document, p: viewport::Point) -> Option<NodeId> {
    let target = Point::new(f64::from(p.x), f64::from(p.y));
    doc.iter().rev().find(|n| contains(n, target)).map(|n| n.id)
}

fn contains(node: &Node, target: Point) -> bool {
    let rect = extent(node);
    let origin = Vec2::new(rect.x0, rect.y0);
    let angle = f64::from(node.kind.rotation()).to_radians();
    let local = Affine::rotate(-angle) * (target - origin);
    local.x >= 0.0 && local.y >= 0.0 && local.x <= rect.width() && local.y <= rect.height()
}
