//! Editor session.
//!
//! [`Editor`] is the single owner of editing state: the document history,
//! the selection, the reorder-toggle state, preview and device flags, the
//! observed container, in-progress gestures, and the queues that talk to
//! the host (resource requests, autoplay). Collaborators (render surface,
//! properties panel, palette, header chrome, keyboard) only call the
//! `request_*` methods and read the views.

use crate::autoplay::Autoplay;
use crate::config::EditorConfig;
use crate::gesture::{DragGesture, TextEditEvent, TextEditState, resize_patch};
use crate::history::History;
use crate::input::InputEvent;
use crate::persist::{self, PersistError, Store};
use crate::resources::{self, Resolution, ResourceField, ResourceRequest, ResourceRequests};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use pd_core::document::Document;
use pd_core::id::NodeId;
use pd_core::model::{Node, NodeType};
use pd_core::mutate::{self, ReorderToggles};
use pd_core::patch::AttrPatch;
use pd_core::viewport::{Bounds, CanvasSize, Device, Point, ViewportMapping};
use pd_render::carousel::{CarouselSlot, carousel_slots};
use serde::Serialize;

pub struct Editor {
    config: EditorConfig,
    history: History<Document>,
    selected: Option<NodeId>,
    toggles: ReorderToggles,
    preview: bool,
    device: Device,
    container: Bounds,
    resources: ResourceRequests,
    autoplay: Autoplay,
    text_edit: TextEditState,
    drag: Option<DragGesture>,
    store: Box<dyn Store>,
}

impl Editor {
    /// Open a session on the document persisted in `store`. Unreadable
    /// state starts an empty document.
    pub fn new(config: EditorConfig, store: Box<dyn Store>) -> Self {
        let doc = persist::load_or_empty(store.as_ref(), &config.storage_key);
        Self::with_document(config, store, doc)
    }

    /// Open a session on `doc` with an empty history.
    pub fn with_document(config: EditorConfig, store: Box<dyn Store>, doc: Document) -> Self {
        let container = Bounds {
            left: 0.0,
            top: 0.0,
            width: config.base_canvas.width,
            height: config.base_canvas.height,
        };
        Self {
            history: History::with_max_depth(doc, config.history_depth),
            selected: None,
            toggles: ReorderToggles::new(),
            preview: false,
            device: config.initial_device,
            container,
            resources: ResourceRequests::new(),
            autoplay: Autoplay::new(config.autoplay_interval_ms),
            text_edit: TextEditState::Idle,
            drag: None,
            store,
            config,
        }
    }

    // ─── Views ──────────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        self.history.present()
    }

    pub fn nodes(&self) -> &[Node] {
        self.document().nodes()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected.and_then(|id| self.document().get(id))
    }

    pub fn preview(&self) -> bool {
        self.preview
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Emulated viewport size for the current device.
    pub fn viewport_size(&self) -> CanvasSize {
        self.device.size()
    }

    pub fn mapping(&self) -> ViewportMapping {
        ViewportMapping::new(self.config.base_canvas, self.container)
    }

    pub fn scale(&self) -> f32 {
        self.mapping().scale()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Rendered canvas height in screen units.
    pub fn content_height(&self) -> f32 {
        let lowest = pd_render::content_height(self.document(), self.config.base_canvas.height);
        self.mapping().scaled_content_height(lowest)
    }

    pub fn text_edit(&self) -> &TextEditState {
        &self.text_edit
    }

    pub fn pending_resources(&self) -> &[ResourceRequest] {
        self.resources.pending()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Everything the render surface needs for one frame.
    pub fn render_state(&self) -> RenderState<'_> {
        let carousels = self
            .nodes()
            .iter()
            .filter_map(|n| {
                n.as_carousel().map(|c| CarouselView {
                    id: n.id,
                    slots: carousel_slots(c),
                })
            })
            .collect();
        RenderState {
            nodes: self.document(),
            selected: self.selected,
            editing: self.text_edit.editing(),
            preview: self.preview,
            device: self.device,
            viewport: self.viewport_size(),
            scale: self.scale(),
            content_height: self.content_height(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            carousels,
        }
    }

    // ─── Selection, preview, device ─────────────────────────────────────

    /// Select `id`, or clear with `None`. Ids not in the document clear
    /// the selection. Ignored in preview.
    pub fn select(&mut self, id: Option<NodeId>) {
        if self.in_preview("select") {
            return;
        }
        self.selected = id.filter(|id| self.document().contains(*id));
        let event = match self.selected {
            Some(id) => TextEditEvent::Click(id),
            None => TextEditEvent::Blur,
        };
        self.text_event(event);
    }

    /// Enter or leave preview. Entering drops the selection and any
    /// in-progress gesture.
    pub fn set_preview(&mut self, preview: bool) {
        if preview == self.preview {
            return;
        }
        if preview {
            self.finish_drag();
            self.selected = None;
            self.text_edit = TextEditState::Idle;
        }
        self.preview = preview;
        log::debug!("preview {}", if preview { "on" } else { "off" });
    }

    pub fn set_device(&mut self, device: Device) {
        self.device = device;
    }

    /// Record the container's on-screen rectangle (from a resize
    /// observer). Drives the scale factor.
    pub fn observe_container(&mut self, bounds: Bounds) {
        self.container = bounds;
    }

    // ─── Mutation requests ──────────────────────────────────────────────

    /// Create a node dropped at `screen` and select it. Returns the new id.
    pub fn request_create(&mut self, ty: NodeType, screen: Point) -> Option<NodeId> {
        if self.in_preview("create") {
            return None;
        }
        let (next, id) = mutate::create_node(self.document(), ty, screen, &self.mapping());
        self.commit(next);
        self.reconcile();
        if let Some(request) = self.document().get(id).and_then(ResourceRequest::for_node) {
            self.resources.push(request);
        }
        self.select(Some(id));
        Some(id)
    }

    /// Merge `patch` into node `id`. Returns whether the document changed.
    pub fn request_patch(&mut self, id: NodeId, patch: &AttrPatch) -> bool {
        if self.in_preview("patch") {
            return false;
        }
        let next = mutate::update_node(self.document(), id, patch);
        self.commit(next)
    }

    /// Apply a resize handle release to node `id`.
    pub fn request_resize(&mut self, id: NodeId, scale_x: f32, scale_y: f32) -> bool {
        let Some(node) = self.document().get(id) else {
            return false;
        };
        let patch = resize_patch(node, scale_x, scale_y);
        self.request_patch(id, &patch)
    }

    /// Duplicate `id` and select the copy.
    pub fn request_duplicate(&mut self, id: NodeId) -> Option<NodeId> {
        if self.in_preview("duplicate") {
            return None;
        }
        let (next, copy) =
            mutate::duplicate_node_with_offset(self.document(), id, self.config.duplicate_offset)?;
        self.commit(next);
        self.select(Some(copy));
        Some(copy)
    }

    pub fn request_delete(&mut self, id: NodeId) -> bool {
        if self.in_preview("delete") {
            return false;
        }
        let next = mutate::delete_node(self.document(), id);
        let changed = self.commit(next);
        self.toggles.forget(id);
        self.reconcile();
        changed
    }

    pub fn request_reorder_toggle(&mut self, id: NodeId) -> bool {
        if self.in_preview("reorder") {
            return false;
        }
        let next = mutate::reorder_toggle(self.history.present(), &mut self.toggles, id);
        self.commit(next)
    }

    pub fn request_append_images(&mut self, id: NodeId, urls: Vec<String>) -> bool {
        if self.in_preview("append images") {
            return false;
        }
        let next = mutate::append_carousel_images(self.document(), id, urls);
        self.commit(next)
    }

    /// Step a carousel by `direction` (arrow buttons). Works in preview,
    /// where the step replaces the present like autoplay and leaves undo
    /// and redo untouched.
    pub fn request_cycle(&mut self, id: NodeId, direction: i32) -> bool {
        let next = mutate::cycle_carousel_index(self.document(), id, direction);
        if !self.preview {
            return self.commit(next);
        }
        if next == *self.history.present() {
            return false;
        }
        self.history.replace(next);
        true
    }

    pub fn request_add_qna_item(&mut self, id: NodeId, question: &str) -> bool {
        if self.in_preview("add question") {
            return false;
        }
        let next = mutate::add_qna_item(self.document(), id, question);
        self.commit(next)
    }

    pub fn request_remove_qna_item(&mut self, id: NodeId, item: NodeId) -> bool {
        if self.in_preview("remove question") {
            return false;
        }
        let next = mutate::remove_qna_item(self.document(), id, item);
        self.commit(next)
    }

    pub fn request_update_qna_item(
        &mut self,
        id: NodeId,
        item: NodeId,
        question: Option<&str>,
        answer: Option<&str>,
    ) -> bool {
        if self.in_preview("edit question") {
            return false;
        }
        let next = mutate::update_qna_item(self.document(), id, item, question, answer);
        self.commit(next)
    }

    pub fn request_add_menu_item(&mut self, id: NodeId, label: &str, href: &str) -> bool {
        if self.in_preview("add menu item") {
            return false;
        }
        let next = mutate::add_menu_item(self.document(), id, label, href);
        self.commit(next)
    }

    pub fn request_remove_menu_item(&mut self, id: NodeId, item: NodeId) -> bool {
        if self.in_preview("remove menu item") {
            return false;
        }
        let next = mutate::remove_menu_item(self.document(), id, item);
        self.commit(next)
    }

    pub fn request_update_menu_item(
        &mut self,
        id: NodeId,
        item: NodeId,
        label: Option<&str>,
        href: Option<&str>,
    ) -> bool {
        if self.in_preview("edit menu item") {
            return false;
        }
        let next = mutate::update_menu_item(self.document(), id, item, label, href);
        self.commit(next)
    }

    // ─── Resources ──────────────────────────────────────────────────────

    /// Ask the host for a resource for `id` (e.g. "replace image").
    pub fn request_resource(&mut self, id: NodeId, field: ResourceField) -> bool {
        if self.in_preview("resource request") {
            return false;
        }
        let applies = self.document().get(id).is_some_and(|n| field.applies_to(n));
        applies && self.resources.push(ResourceRequest { node: id, field })
    }

    /// Hand every pending resource request to the host.
    pub fn take_resource_requests(&mut self) -> Vec<ResourceRequest> {
        self.resources.drain()
    }

    /// Commit references the host obtained for `request`. A request whose
    /// node is gone, or an empty answer, changes nothing.
    pub fn resolve_resource(&mut self, request: ResourceRequest, urls: Vec<String>) -> bool {
        self.resources.complete(request);
        let Some(node) = self.document().get(request.node) else {
            log::debug!("resource for deleted node {}", request.node);
            return false;
        };
        if !request.field.applies_to(node) {
            return false;
        }
        let next = match resources::resolve(request, urls) {
            Some(Resolution::Patch(patch)) => {
                mutate::update_node(self.document(), request.node, &patch)
            }
            Some(Resolution::AppendImages(urls)) => {
                mutate::append_carousel_images(self.document(), request.node, urls)
            }
            None => return false,
        };
        self.commit(next)
    }

    // ─── History ────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.drag = None;
        let moved = self.history.undo();
        if moved {
            self.after_replace();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        self.drag = None;
        let moved = self.history.redo();
        if moved {
            self.after_replace();
        }
        moved
    }

    /// Group every commit until [`end_gesture`](Self::end_gesture) into
    /// one undo step.
    pub fn begin_gesture(&mut self) {
        self.history.begin_batch();
    }

    pub fn end_gesture(&mut self) {
        self.history.end_batch();
    }

    // ─── Persistence ────────────────────────────────────────────────────

    /// Write the current document to the store.
    pub fn publish(&mut self) -> Result<(), PersistError> {
        let key = self.config.storage_key.clone();
        persist::save(self.store.as_mut(), &key, self.history.present())
    }

    /// Replace the document with the persisted one and start a fresh
    /// history.
    pub fn load(&mut self) {
        let doc = persist::load_or_empty(self.store.as_ref(), &self.config.storage_key);
        self.drag = None;
        self.history.reset(doc);
        self.after_replace();
    }

    // ─── Input ──────────────────────────────────────────────────────────

    /// Handle a key press. Returns the action taken so the caller can
    /// suppress the browser default. Keys go to the text overlay while a
    /// text node is being edited. `in_field` is set when focus is in an
    /// editable host field (properties panel); only undo and redo apply
    /// there.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        in_field: bool,
    ) -> Option<ShortcutAction> {
        if self.text_edit.editing().is_some() {
            return None;
        }
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta)?;
        if in_field && action.targets_selection() {
            return None;
        }
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Duplicate => {
                if let Some(id) = self.selected {
                    self.request_duplicate(id);
                }
            }
            ShortcutAction::Delete => {
                if let Some(id) = self.selected {
                    self.request_delete(id);
                }
            }
            ShortcutAction::Deselect => self.select(None),
        }
        Some(action)
    }

    /// Handle a pointer event from the render surface. Returns true if
    /// anything visible changed.
    pub fn handle_pointer(&mut self, event: &InputEvent) -> bool {
        if self.preview {
            return false;
        }
        let pointer = event.position();
        match event {
            InputEvent::PointerDown { .. } => {
                self.finish_drag();
                let hit = self.hit(pointer);
                let before = self.selected;
                self.select(hit);
                let drag = hit
                    .and_then(|id| self.document().get(id))
                    .map(|node| DragGesture::begin(node, pointer));
                if drag.is_some() {
                    self.drag = drag;
                    self.history.begin_batch();
                }
                before != self.selected || hit.is_some()
            }
            InputEvent::PointerMove { modifiers, .. } => {
                let Some(drag) = self.drag else {
                    return false;
                };
                let patch = drag.patch(pointer, &self.mapping(), modifiers.shift);
                log::trace!("drag {} → {:?}", drag.id(), patch);
                let next = mutate::update_node(self.document(), drag.id(), &patch);
                self.commit(next)
            }
            InputEvent::PointerUp { .. } => self.finish_drag(),
            InputEvent::DoubleClick { .. } => match self.hit(pointer) {
                Some(id) => self.text_event(TextEditEvent::DoubleClick(id)),
                None => false,
            },
        }
    }

    /// Drive the inline text editor. Commits go through the write path.
    pub fn text_event(&mut self, event: TextEditEvent) -> bool {
        let before = self.text_edit.clone();
        let commit = self.text_edit.handle(event, self.history.present(), self.preview);
        let changed = match commit {
            Some((id, patch)) => {
                let next = mutate::update_node(self.document(), id, &patch);
                self.commit(next)
            }
            None => false,
        };
        changed || before != self.text_edit
    }

    // ─── Autoplay ───────────────────────────────────────────────────────

    /// Advance carousel autoplay to `now_ms`. Autoplay steps do not create
    /// undo steps. Returns true if any carousel moved.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.autoplay.sync(self.history.present(), now_ms);
        let due = self.autoplay.due(now_ms);
        if due.is_empty() {
            return false;
        }
        let mut doc = self.history.present().clone();
        for id in due {
            doc = mutate::cycle_carousel_index(&doc, id, 1);
        }
        self.history.replace(doc);
        true
    }

    // ─── Internals ──────────────────────────────────────────────────────

    fn in_preview(&self, what: &str) -> bool {
        if self.preview {
            log::debug!("preview: ignoring {what}");
        }
        self.preview
    }

    /// Push `next` as the new present unless nothing changed.
    fn commit(&mut self, next: Document) -> bool {
        if next == *self.history.present() {
            return false;
        }
        self.history.set(next);
        true
    }

    fn hit(&self, screen: Point) -> Option<NodeId> {
        let at = self.mapping().screen_to_document(screen);
        pd_render::hit_test(self.document(), at)
    }

    fn finish_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(_) => {
                self.history.end_batch();
                true
            }
            None => false,
        }
    }

    /// The document was replaced from outside the mutation engine.
    fn after_replace(&mut self) {
        self.toggles.clear();
        self.text_edit = TextEditState::Idle;
        self.reconcile();
    }

    /// Drop state that points at nodes no longer in the document.
    fn reconcile(&mut self) {
        let doc = self.history.present();
        if let Some(id) = self.selected
            && !doc.contains(id)
        {
            self.selected = None;
        }
        if let Some(id) = self.text_edit.editing()
            && !doc.contains(id)
        {
            self.text_edit = TextEditState::Idle;
        }
        if let TextEditState::Selected(id) = self.text_edit
            && !doc.contains(id)
        {
            self.text_edit = TextEditState::Idle;
        }
        self.resources.retain_present(doc);
    }
}

// ─── Render state ───────────────────────────────────────────────────────

/// A serializable frame snapshot for the render surface.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState<'a> {
    pub nodes: &'a Document,
    pub selected: Option<NodeId>,
    pub editing: Option<NodeId>,
    pub preview: bool,
    pub device: Device,
    pub viewport: CanvasSize,
    pub scale: f32,
    pub content_height: f32,
    pub can_undo: bool,
    pub can_redo: bool,
    pub carousels: Vec<CarouselView>,
}

#[derive(Debug, Serialize)]
pub struct CarouselView {
    pub id: NodeId,
    pub slots: Vec<CarouselSlot>,
}
