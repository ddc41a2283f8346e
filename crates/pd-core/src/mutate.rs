//! Document mutation engine.
//!
//! Every operation takes the current document by reference and returns a
//! new one; the input is never modified. Operations that target an id not
//! present in the document return an unchanged copy. A missing id is an
//! expected condition (the node may have been deleted between the event and
//! its handling), never an error.
//!
//! All single-node attribute edits funnel through [`update_node`]. The
//! carousel, Q&A and menu helpers compute a patch and apply it through the
//! same path.

use crate::document::Document;
use crate::id::NodeId;
use crate::model::*;
use crate::patch::AttrPatch;
use crate::registry::{self, DUPLICATE_OFFSET};
use crate::viewport::{Point, ViewportMapping};
use serde::Serialize;
use std::collections::HashMap;

// ─── Create / update / duplicate / delete ───────────────────────────────

/// Create a node of type `ty` dropped at `screen` (screen space).
///
/// The drop point is mapped into base canvas space, the registry template
/// is instantiated at the registry drop position, and the node is appended
/// on top. A singleton type replaces its existing node in place instead.
/// Returns the new document and the id to select.
pub fn create_node(
    doc: &Document,
    ty: NodeType,
    screen: Point,
    mapping: &ViewportMapping,
) -> (Document, NodeId) {
    let at = mapping.screen_to_document(screen);
    let (x, y) = registry::drop_position(ty, at);
    let node = Node::new(NodeId::fresh(), x, y, registry::defaults(ty, mapping.base));
    let id = node.id;

    let mut next = doc.clone();
    let existing = if ty.is_singleton() {
        doc.find_type(ty).map(|(idx, _)| idx)
    } else {
        None
    };
    match existing {
        Some(idx) => {
            log::debug!("create {ty}: replacing singleton at index {idx}");
            next.nodes_mut()[idx] = node;
        }
        None => {
            log::debug!("create {ty} {id} at ({x}, {y})");
            next.nodes_mut().push(node);
        }
    }
    (next, id)
}

/// Merge `patch` into the node `id`. Unknown ids leave the document as is.
pub fn update_node(doc: &Document, id: NodeId, patch: &AttrPatch) -> Document {
    let Some(idx) = doc.index_of(id) else {
        log::debug!("update: no node {id}");
        return doc.clone();
    };
    let mut next = doc.clone();
    let patched = next.nodes()[idx].apply_patch(patch);
    log::trace!("update {id}: {} field(s)", patch.len());
    next.nodes_mut()[idx] = patched;
    next
}

/// Duplicate `id` with the standard position offset.
pub fn duplicate_node(doc: &Document, id: NodeId) -> Option<(Document, NodeId)> {
    duplicate_node_with_offset(doc, id, DUPLICATE_OFFSET)
}

/// Copy every attribute of `id` under a fresh id, shifted by `offset` on
/// both axes, and append it on top. Nested Q&A item ids are refreshed too.
///
/// Returns `None` when the node is absent or is a singleton.
pub fn duplicate_node_with_offset(
    doc: &Document,
    id: NodeId,
    offset: f32,
) -> Option<(Document, NodeId)> {
    let source = doc.get(id)?;
    if source.node_type().is_singleton() {
        log::debug!("duplicate: {} is a singleton", source.node_type());
        return None;
    }

    let mut copy = source.clone();
    copy.id = NodeId::fresh();
    copy.x += offset;
    copy.y += offset;
    if let NodeKind::Qna(q) = &mut copy.kind {
        for item in &mut q.items {
            item.id = NodeId::fresh();
        }
    }

    let new_id = copy.id;
    let mut next = doc.clone();
    next.nodes_mut().push(copy);
    Some((next, new_id))
}

/// Remove `id`. Clearing a selection that pointed at it is the caller's job.
pub fn delete_node(doc: &Document, id: NodeId) -> Document {
    if !doc.contains(id) {
        log::debug!("delete: no node {id}");
        return doc.clone();
    }
    doc.iter().filter(|n| n.id != id).cloned().collect()
}

// ─── Reorder toggle ─────────────────────────────────────────────────────

/// Per-node state of the two-phase reorder toggle.
///
/// A node is "toggled" after its first press moved it one step back; the
/// remembered value is the index it started at. The state belongs to the
/// editing session, not the document: replacing the document from outside
/// (undo, redo, load) must [`clear`](Self::clear) it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReorderToggles {
    origin: HashMap<NodeId, usize>,
}

impl ReorderToggles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is in its second phase.
    pub fn is_toggled(&self, id: NodeId) -> bool {
        self.origin.contains_key(&id)
    }

    /// Drop the state of a deleted node.
    pub fn forget(&mut self, id: NodeId) {
        self.origin.remove(&id);
    }

    pub fn clear(&mut self) {
        self.origin.clear();
    }
}

/// Two-phase z-order nudge.
///
/// First press swaps the node with the one painted just before it and
/// remembers where it came from (nothing happens if it is already first).
/// Second press lifts it out and reinserts it at the remembered index,
/// clamped to the current bounds. The pinned header takes no part.
pub fn reorder_toggle(doc: &Document, toggles: &mut ReorderToggles, id: NodeId) -> Document {
    let Some(idx) = doc.index_of(id) else {
        log::debug!("reorder: no node {id}");
        toggles.forget(id);
        return doc.clone();
    };
    if doc.nodes()[idx].node_type() == NodeType::Header {
        return doc.clone();
    }

    let mut next = doc.clone();
    match toggles.origin.remove(&id) {
        None => {
            if idx == 0 {
                return next;
            }
            next.nodes_mut().swap(idx - 1, idx);
            toggles.origin.insert(id, idx);
        }
        Some(origin) => {
            let nodes = next.nodes_mut();
            let node = nodes.remove(idx);
            let at = origin.min(nodes.len());
            nodes.insert(at, node);
        }
    }
    next
}

// ─── Carousel ───────────────────────────────────────────────────────────

/// Append image references to a carousel. Anything else is left alone.
pub fn append_carousel_images<I, S>(doc: &Document, id: NodeId, urls: I) -> Document
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    patch_with(doc, id, |node| {
        let carousel = node.as_carousel()?;
        let mut images = carousel.images.clone();
        images.extend(urls.into_iter().map(Into::into));
        list_patch("images", &images)
    })
}

/// Step a carousel's active image by `direction`, wrapping in both
/// directions. A carousel without images is left alone.
pub fn cycle_carousel_index(doc: &Document, id: NodeId, direction: i32) -> Document {
    patch_with(doc, id, |node| {
        let carousel = node.as_carousel()?;
        let count = carousel.images.len();
        if count == 0 {
            return None;
        }
        // Reduce first: activeIndex is patchable and may be far out of range.
        let current = (carousel.active_index % count) as i64;
        let next = (current + i64::from(direction)).rem_euclid(count as i64);
        Some(AttrPatch::new().set("activeIndex", next))
    })
}

// ─── Q&A items ──────────────────────────────────────────────────────────

/// Append a question to a Q&A node.
pub fn add_qna_item(doc: &Document, id: NodeId, question: &str) -> Document {
    patch_with(doc, id, |node| {
        let NodeKind::Qna(q) = &node.kind else {
            return None;
        };
        let mut items = q.items.clone();
        items.push(QnaItem {
            id: NodeId::fresh(),
            question: question.to_string(),
            answer: String::new(),
        });
        list_patch("items", &items)
    })
}

pub fn remove_qna_item(doc: &Document, id: NodeId, item: NodeId) -> Document {
    patch_with(doc, id, |node| {
        let NodeKind::Qna(q) = &node.kind else {
            return None;
        };
        let items: Vec<QnaItem> = q.items.iter().filter(|i| i.id != item).cloned().collect();
        if items.len() == q.items.len() {
            return None;
        }
        list_patch("items", &items)
    })
}

/// Edit the question and/or answer of one Q&A item.
pub fn update_qna_item(
    doc: &Document,
    id: NodeId,
    item: NodeId,
    question: Option<&str>,
    answer: Option<&str>,
) -> Document {
    patch_with(doc, id, |node| {
        let NodeKind::Qna(q) = &node.kind else {
            return None;
        };
        let mut items = q.items.clone();
        let target = items.iter_mut().find(|i| i.id == item)?;
        if let Some(question) = question {
            target.question = question.to_string();
        }
        if let Some(answer) = answer {
            target.answer = answer.to_string();
        }
        list_patch("items", &items)
    })
}

// ─── Header menu ────────────────────────────────────────────────────────

pub fn add_menu_item(doc: &Document, id: NodeId, label: &str, href: &str) -> Document {
    patch_with(doc, id, |node| {
        let NodeKind::Header(h) = &node.kind else {
            return None;
        };
        let mut menu = h.menu.clone();
        menu.push(registry::menu_item(label, href));
        list_patch("menu", &menu)
    })
}

pub fn remove_menu_item(doc: &Document, id: NodeId, item: NodeId) -> Document {
    patch_with(doc, id, |node| {
        let NodeKind::Header(h) = &node.kind else {
            return None;
        };
        let menu: Vec<MenuItem> = h.menu.iter().filter(|m| m.id != item).cloned().collect();
        if menu.len() == h.menu.len() {
            return None;
        }
        list_patch("menu", &menu)
    })
}

pub fn update_menu_item(
    doc: &Document,
    id: NodeId,
    item: NodeId,
    label: Option<&str>,
    href: Option<&str>,
) -> Document {
    patch_with(doc, id, |node| {
        let NodeKind::Header(h) = &node.kind else {
            return None;
        };
        let mut menu = h.menu.clone();
        let target = menu.iter_mut().find(|m| m.id == item)?;
        if let Some(label) = label {
            target.label = label.to_string();
        }
        if let Some(href) = href {
            target.href = href.to_string();
        }
        list_patch("menu", &menu)
    })
}

// ─── Helpers ────────────────────────────────────────────────────────────

/// Compute a patch from the current node and apply it through
/// [`update_node`]. `None` from the closure means "nothing to do".
fn patch_with<F>(doc: &Document, id: NodeId, f: F) -> Document
where
    F: FnOnce(&Node) -> Option<AttrPatch>,
{
    match doc.get(id).and_then(f) {
        Some(patch) => update_node(doc, id, &patch),
        None => doc.clone(),
    }
}

fn list_patch<T: Serialize + ?Sized>(key: &str, list: &T) -> Option<AttrPatch> {
    match serde_json::to_value(list) {
        Ok(value) => Some(AttrPatch::new().set(key, value)),
        Err(e) => {
            log::warn!("could not encode {key}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{BASE_CANVAS, Bounds};
    use pretty_assertions::assert_eq;

    fn identity() -> ViewportMapping {
        ViewportMapping::identity(BASE_CANVAS)
    }

    fn doc_with(types: &[NodeType]) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let mut ids = Vec::new();
        for (i, ty) in types.iter().enumerate() {
            let (next, id) = create_node(&doc, *ty, Point::new(10.0 * i as f32, 0.0), &identity());
            doc = next;
            ids.push(id);
        }
        (doc, ids)
    }

    fn order(doc: &Document) -> Vec<NodeId> {
        doc.ids().collect()
    }

    #[test]
    fn create_maps_screen_to_document() {
        let mapping = ViewportMapping::new(
            BASE_CANVAS,
            Bounds {
                left: 20.0,
                top: 10.0,
                width: 600.0,
                height: 400.0,
            },
        );
        let (doc, id) =
            create_node(&Document::new(), NodeType::Rect, Point::new(120.0, 60.0), &mapping);
        let node = doc.get(id).unwrap();
        assert_eq!((node.x, node.y), (200.0, 100.0));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn create_appends_on_top() {
        let (doc, ids) = doc_with(&[NodeType::Rect, NodeType::Text]);
        assert_eq!(order(&doc), ids);
    }

    #[test]
    fn header_replaces_existing_header_in_place() {
        let (doc, ids) = doc_with(&[NodeType::Rect, NodeType::Header, NodeType::Text]);
        let (doc, new_header) =
            create_node(&doc, NodeType::Header, Point::new(500.0, 500.0), &identity());
        assert_eq!(doc.len(), 3);
        assert_eq!(order(&doc), vec![ids[0], new_header, ids[2]]);
        let headers = doc.iter().filter(|n| n.node_type() == NodeType::Header).count();
        assert_eq!(headers, 1);
        let header = doc.get(new_header).unwrap();
        assert_eq!((header.x, header.y), (0.0, 0.0));
    }

    #[test]
    fn update_missing_id_is_identity() {
        let (doc, _) = doc_with(&[NodeType::Rect]);
        let next = update_node(&doc, NodeId::intern("missing"), &AttrPatch::position(1.0, 1.0));
        assert_eq!(next, doc);
    }

    #[test]
    fn update_leaves_input_untouched() {
        let (doc, ids) = doc_with(&[NodeType::Rect]);
        let before = doc.clone();
        let next = update_node(&doc, ids[0], &AttrPatch::new().set("fill", "#ff0000"));
        assert_eq!(doc, before);
        assert_ne!(next, doc);
    }

    #[test]
    fn duplicate_offsets_and_appends() {
        let (doc, ids) = doc_with(&[NodeType::Card, NodeType::Rect]);
        let (next, copy_id) = duplicate_node(&doc, ids[0]).unwrap();
        assert_eq!(next.len(), doc.len() + 1);
        assert_eq!(next.index_of(copy_id), Some(2));
        assert_ne!(copy_id, ids[0]);

        let original = next.get(ids[0]).unwrap();
        let copy = next.get(copy_id).unwrap();
        assert_eq!(original, doc.get(ids[0]).unwrap());
        assert_eq!(copy.x, original.x + DUPLICATE_OFFSET);
        assert_eq!(copy.y, original.y + DUPLICATE_OFFSET);
        assert_eq!(copy.kind, original.kind);
    }

    #[test]
    fn duplicate_refreshes_qna_item_ids() {
        let (doc, ids) = doc_with(&[NodeType::Qna]);
        let (next, copy_id) = duplicate_node(&doc, ids[0]).unwrap();
        let item_ids = |id| match &next.get(id).unwrap().kind {
            NodeKind::Qna(q) => q.items.iter().map(|i| i.id).collect::<Vec<_>>(),
            _ => unreachable!(),
        };
        assert_ne!(item_ids(ids[0]), item_ids(copy_id));
    }

    #[test]
    fn duplicate_missing_or_singleton_is_none() {
        let (doc, ids) = doc_with(&[NodeType::Header]);
        assert!(duplicate_node(&doc, ids[0]).is_none());
        assert!(duplicate_node(&doc, NodeId::intern("nope")).is_none());
    }

    #[test]
    fn delete_removes_only_target() {
        let (doc, ids) = doc_with(&[NodeType::Rect, NodeType::Text, NodeType::Image]);
        let next = delete_node(&doc, ids[1]);
        assert_eq!(order(&next), vec![ids[0], ids[2]]);
        assert_eq!(delete_node(&next, ids[1]), next);
    }

    #[test]
    fn reorder_toggle_swaps_then_restores() {
        let (doc, ids) = doc_with(&[NodeType::Rect, NodeType::Rect, NodeType::Rect]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        let mut toggles = ReorderToggles::new();

        let once = reorder_toggle(&doc, &mut toggles, b);
        assert_eq!(order(&once), vec![b, a, c]);
        assert!(toggles.is_toggled(b));

        let twice = reorder_toggle(&once, &mut toggles, b);
        assert_eq!(order(&twice), vec![a, b, c]);
        assert!(!toggles.is_toggled(b));
    }

    #[test]
    fn reorder_toggle_first_node_stays_in_phase_one() {
        let (doc, ids) = doc_with(&[NodeType::Rect, NodeType::Rect]);
        let mut toggles = ReorderToggles::new();
        let next = reorder_toggle(&doc, &mut toggles, ids[0]);
        assert_eq!(next, doc);
        assert!(!toggles.is_toggled(ids[0]));
    }

    #[test]
    fn reorder_toggle_restore_clamps_to_bounds() {
        let (doc, ids) = doc_with(&[NodeType::Rect, NodeType::Rect, NodeType::Rect]);
        let mut toggles = ReorderToggles::new();
        let once = reorder_toggle(&doc, &mut toggles, ids[2]);
        assert_eq!(order(&once), vec![ids[0], ids[2], ids[1]]);

        // The neighbour disappears before the second press.
        let shrunk = delete_node(&once, ids[1]);
        let restored = reorder_toggle(&shrunk, &mut toggles, ids[2]);
        assert_eq!(order(&restored), vec![ids[0], ids[2]]);
    }

    #[test]
    fn reorder_toggle_ignores_header() {
        let (doc, ids) = doc_with(&[NodeType::Rect, NodeType::Header]);
        let mut toggles = ReorderToggles::new();
        assert_eq!(reorder_toggle(&doc, &mut toggles, ids[1]), doc);
    }

    #[test]
    fn carousel_append_and_cycle() {
        let (doc, ids) = doc_with(&[NodeType::Carousel, NodeType::Rect]);
        let carousel = ids[0];

        // No images: cycling is a no-op.
        assert_eq!(cycle_carousel_index(&doc, carousel, 1), doc);

        let doc = append_carousel_images(&doc, carousel, ["a.png", "b.png", "c.png"]);
        let active = |d: &Document| d.get(carousel).unwrap().as_carousel().unwrap().active_index;
        assert_eq!(d_images(&doc, carousel), 3);

        let fwd = cycle_carousel_index(&doc, carousel, 1);
        assert_eq!(active(&fwd), 1);
        let back = cycle_carousel_index(&doc, carousel, -1);
        assert_eq!(active(&back), 2);
        let wrapped = cycle_carousel_index(&back, carousel, 1);
        assert_eq!(active(&wrapped), 0);

        // Non-carousel targets are untouched.
        assert_eq!(append_carousel_images(&doc, ids[1], ["x.png"]), doc);
        assert_eq!(cycle_carousel_index(&doc, ids[1], 1), doc);
    }

    #[test]
    fn single_image_carousel_stays_at_zero() {
        let (doc, ids) = doc_with(&[NodeType::Carousel]);
        let mut doc = append_carousel_images(&doc, ids[0], ["only.png"]);
        for dir in [1, -1, 1, 1, -1] {
            doc = cycle_carousel_index(&doc, ids[0], dir);
        }
        assert_eq!(doc.get(ids[0]).unwrap().as_carousel().unwrap().active_index, 0);
    }

    #[test]
    fn cycle_reduces_out_of_range_index() {
        let (doc, ids) = doc_with(&[NodeType::Carousel]);
        let doc = append_carousel_images(&doc, ids[0], ["a.png", "b.png", "c.png"]);
        let huge = AttrPatch::new().set("activeIndex", usize::MAX as u64);
        let doc = update_node(&doc, ids[0], &huge);
        let active = |d: &Document| d.get(ids[0]).unwrap().as_carousel().unwrap().active_index;
        assert_eq!(active(&doc), usize::MAX);

        let expected_fwd = (usize::MAX % 3 + 1) % 3;
        assert_eq!(active(&cycle_carousel_index(&doc, ids[0], 1)), expected_fwd);
        let expected_back = (usize::MAX % 3 + 2) % 3;
        assert_eq!(active(&cycle_carousel_index(&doc, ids[0], -1)), expected_back);
    }

    fn d_images(doc: &Document, id: NodeId) -> usize {
        doc.get(id).unwrap().as_carousel().unwrap().images.len()
    }

    #[test]
    fn qna_items_add_update_remove() {
        let (doc, ids) = doc_with(&[NodeType::Qna]);
        let qna = ids[0];
        let items = |d: &Document| match &d.get(qna).unwrap().kind {
            NodeKind::Qna(q) => q.items.clone(),
            _ => unreachable!(),
        };

        let doc = add_qna_item(&doc, qna, "Why?");
        assert_eq!(items(&doc).len(), 2);
        let second = items(&doc)[1].id;

        let doc = update_qna_item(&doc, qna, second, None, Some("Because."));
        assert_eq!(items(&doc)[1].answer, "Because.");
        assert_eq!(items(&doc)[1].question, "Why?");

        let doc = remove_qna_item(&doc, qna, second);
        assert_eq!(items(&doc).len(), 1);
        assert_eq!(remove_qna_item(&doc, qna, second), doc);
    }

    #[test]
    fn header_menu_editing() {
        let (doc, ids) = doc_with(&[NodeType::Header]);
        let header = ids[0];
        let menu = |d: &Document| match &d.get(header).unwrap().kind {
            NodeKind::Header(h) => h.menu.to_vec(),
            _ => unreachable!(),
        };

        let doc = add_menu_item(&doc, header, "Blog", "/blog");
        assert_eq!(menu(&doc).len(), 4);
        let blog = menu(&doc)[3].id;

        let doc = update_menu_item(&doc, header, blog, Some("News"), None);
        assert_eq!(menu(&doc)[3].label, "News");
        assert_eq!(menu(&doc)[3].href, "/blog");

        let doc = remove_menu_item(&doc, header, blog);
        assert_eq!(menu(&doc).len(), 3);
    }
}
