//! Canvas gestures: drag, handle resize, and inline text editing.
//!
//! Gestures never touch the document directly. They turn raw pointer
//! input into [`AttrPatch`]es that the session commits through the normal
//! write path.

use pd_core::document::Document;
use pd_core::id::NodeId;
use pd_core::model::{Node, NodeKind};
use pd_core::patch::AttrPatch;
use pd_core::registry::{self, MIN_FONT_SIZE};
use pd_core::viewport::{Point, ViewportMapping};

/// Smallest font size a link button may be scaled down to.
const MIN_LINK_FONT_SIZE: f32 = 10.0;

// ─── Drag ───────────────────────────────────────────────────────────────

/// An in-progress node drag.
///
/// Positions are computed from the pointer's total travel since the drag
/// started, so dropped or coalesced move events never accumulate error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    id: NodeId,
    origin: (f32, f32),
    start: Point,
}

impl DragGesture {
    /// Start dragging `node` with the pointer at `pointer` (screen space).
    pub fn begin(node: &Node, pointer: Point) -> Self {
        Self {
            id: node.id,
            origin: (node.x, node.y),
            start: pointer,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Position patch for the pointer at `pointer`. With `constrain` the
    /// move is locked to the dominant axis.
    pub fn patch(&self, pointer: Point, mapping: &ViewportMapping, constrain: bool) -> AttrPatch {
        let (mut dx, mut dy) =
            mapping.delta_to_document(pointer.x - self.start.x, pointer.y - self.start.y);
        if constrain {
            if dx.abs() > dy.abs() {
                dy = 0.0;
            } else {
                dx = 0.0;
            }
        }
        AttrPatch::position(self.origin.0 + dx, self.origin.1 + dy)
    }
}

// ─── Resize ─────────────────────────────────────────────────────────────

/// Patch for a resize handle release. `scale_x`/`scale_y` are the visual
/// scale factors the handle applied; the caller resets the visual scale to
/// identity once the patch is committed.
///
/// Box sizes are floored at the registry minimum for the node type. Link
/// buttons also scale their label. Text is resized by font size instead
/// (see [`text_resize_patch`]).
pub fn resize_patch(node: &Node, scale_x: f32, scale_y: f32) -> AttrPatch {
    if let NodeKind::Text(text) = &node.kind {
        return text_resize_patch(text.font_size, scale_x, text.rotation);
    }
    let Some((width, height)) = node.kind.size() else {
        return AttrPatch::new();
    };
    let (min_w, min_h) = registry::min_size(node.node_type()).unwrap_or((0.0, 0.0));
    let mut patch = AttrPatch::new()
        .set("width", (width * scale_x).max(min_w))
        .set("height", (height * scale_y).max(min_h));
    if let NodeKind::Link(link) = &node.kind {
        let font = (link.font_size * scale_x.min(scale_y)).max(MIN_LINK_FONT_SIZE);
        patch.insert("fontSize", font);
    }
    patch
}

/// Text handle resize: the horizontal scale becomes a whole-pixel font
/// size, floored at [`MIN_FONT_SIZE`]. Rotation is carried through.
pub fn text_resize_patch(font_size: f32, scale_x: f32, rotation: f32) -> AttrPatch {
    let font = (font_size * scale_x).round().max(MIN_FONT_SIZE);
    AttrPatch::new()
        .set("fontSize", font)
        .set("rotation", rotation)
}

// ─── Inline text editing ────────────────────────────────────────────────

/// Inline text editing state for text nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TextEditState {
    #[default]
    Idle,
    Selected(NodeId),
    Editing {
        id: NodeId,
        draft: String,
    },
}

/// Events that drive [`TextEditState`].
#[derive(Debug, Clone, PartialEq)]
pub enum TextEditEvent {
    Click(NodeId),
    DoubleClick(NodeId),
    /// The overlay's full current value.
    Input(String),
    Enter {
        shift: bool,
    },
    Escape,
    Blur,
}

/// A text change to commit through the write path.
pub type TextCommit = (NodeId, AttrPatch);

impl TextEditState {
    pub fn editing(&self) -> Option<NodeId> {
        match self {
            Self::Editing { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Advance the machine. Returns a commit when editing ends by blur or
    /// Enter; Escape discards the draft. In preview everything falls back
    /// to `Idle` without committing.
    pub fn handle(
        &mut self,
        event: TextEditEvent,
        doc: &Document,
        preview: bool,
    ) -> Option<TextCommit> {
        if preview {
            *self = Self::Idle;
            return None;
        }

        let state = std::mem::take(self);
        let (next, commit) = match (state, event) {
            (Self::Editing { id, .. }, TextEditEvent::Input(text)) => {
                (Self::Editing { id, draft: text }, None)
            }
            (Self::Editing { id, mut draft }, TextEditEvent::Enter { shift: true }) => {
                draft.push('\n');
                (Self::Editing { id, draft }, None)
            }
            (
                Self::Editing { id, draft },
                TextEditEvent::Enter { shift: false } | TextEditEvent::Blur,
            ) => (Self::Idle, Some(commit_text(id, draft))),
            (Self::Editing { .. }, TextEditEvent::Escape) => (Self::Idle, None),
            (Self::Editing { id, draft }, TextEditEvent::Click(other)) => {
                let commit = commit_text(id, draft);
                if other == id {
                    (Self::Selected(id), Some(commit))
                } else {
                    (select(doc, other), Some(commit))
                }
            }
            (Self::Editing { id, draft }, TextEditEvent::DoubleClick(_)) => {
                (Self::Editing { id, draft }, None)
            }

            (Self::Selected(id), TextEditEvent::DoubleClick(target)) if target == id => {
                match text_of(doc, id) {
                    Some(text) => (Self::Editing { id, draft: text }, None),
                    None => (Self::Idle, None),
                }
            }
            (_, TextEditEvent::Click(target) | TextEditEvent::DoubleClick(target)) => {
                (select(doc, target), None)
            }
            (Self::Selected(_), TextEditEvent::Escape | TextEditEvent::Blur) => (Self::Idle, None),
            (state, _) => (state, None),
        };
        *self = next;
        commit
    }
}

fn select(doc: &Document, id: NodeId) -> TextEditState {
    if doc.get(id).is_some_and(|n| registry::is_inline_editable(n.node_type())) {
        TextEditState::Selected(id)
    } else {
        TextEditState::Idle
    }
}

fn text_of(doc: &Document, id: NodeId) -> Option<String> {
    match &doc.get(id)?.kind {
        NodeKind::Text(t) => Some(t.text.clone()),
        _ => None,
    }
}

fn commit_text(id: NodeId, draft: String) -> TextCommit {
    (id, AttrPatch::new().set("text", draft))
}
