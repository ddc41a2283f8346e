//! WASM bridge exposing the PD editor session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The JS render surface,
//! palette, properties panel and header chrome all talk to one
//! [`PdCanvas`]. Structured values cross the boundary as JSON strings.

mod storage;

pub use storage::LocalStorageStore;

use pd_core::id::NodeId;
use pd_core::model::NodeType;
use pd_core::patch::AttrPatch;
use pd_core::viewport::{Bounds, Device, Point};
use pd_editor::gesture::TextEditEvent;
use pd_editor::input::{InputEvent, Modifiers};
use pd_editor::persist::Store;
use pd_editor::{Editor, EditorConfig, ResourceRequest, ShortcutAction};
use wasm_bindgen::prelude::*;

/// The main WASM-facing editor controller.
#[wasm_bindgen]
pub struct PdCanvas {
    editor: Editor,
}

#[wasm_bindgen]
impl PdCanvas {
    /// Open the editor on the document in `localStorage`. `config_json`
    /// may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Self {
        console_error_panic_hook_setup();
        Self::with_store(parse_config(config_json), Box::new(LocalStorageStore))
    }

    // ─── Views ──────────────────────────────────────────────────────────

    /// Frame snapshot for the render surface, as JSON.
    pub fn render_state(&self) -> String {
        serde_json::to_string(&self.editor.render_state()).unwrap_or_else(|e| {
            log::warn!("render state not serializable: {e}");
            "{}".to_string()
        })
    }

    pub fn selected(&self) -> Option<String> {
        self.editor.selected().map(|id| id.to_string())
    }

    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    pub fn scale(&self) -> f32 {
        self.editor.scale()
    }

    pub fn content_height(&self) -> f32 {
        self.editor.content_height()
    }

    // ─── Selection & modes ──────────────────────────────────────────────

    pub fn select(&mut self, id: Option<String>) {
        self.editor.select(id.as_deref().and_then(NodeId::parse));
    }

    pub fn set_preview(&mut self, preview: bool) {
        self.editor.set_preview(preview);
    }

    /// Switch the emulated device (`"mobile"`, `"tablet"`, `"desktop"`).
    /// Returns `false` for unknown names.
    pub fn set_device(&mut self, device: &str) -> bool {
        match device.parse::<Device>() {
            Ok(device) => {
                self.editor.set_device(device);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    /// Report the canvas container's bounding client rect.
    pub fn observe_container(&mut self, left: f32, top: f32, width: f32, height: f32) {
        self.editor.observe_container(Bounds {
            left,
            top,
            width,
            height,
        });
    }

    // ─── Requests ───────────────────────────────────────────────────────

    /// Palette drop: create a `kind` node at screen `(x, y)`. Returns the
    /// new id.
    pub fn create(&mut self, kind: &str, x: f32, y: f32) -> Option<String> {
        let ty = match kind.parse::<NodeType>() {
            Ok(ty) => ty,
            Err(e) => {
                log::warn!("{e}");
                return None;
            }
        };
        self.editor
            .request_create(ty, Point::new(x, y))
            .map(|id| id.to_string())
    }

    /// Merge a JSON object of attributes into `id`.
    pub fn patch(&mut self, id: &str, patch_json: &str) -> bool {
        match AttrPatch::from_json(patch_json) {
            Ok(patch) => self.editor.request_patch(NodeId::intern(id), &patch),
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    /// Resize handle released with the given visual scale.
    pub fn resize(&mut self, id: &str, scale_x: f32, scale_y: f32) -> bool {
        self.editor
            .request_resize(NodeId::intern(id), scale_x, scale_y)
    }

    pub fn duplicate(&mut self, id: &str) -> Option<String> {
        self.editor
            .request_duplicate(NodeId::intern(id))
            .map(|id| id.to_string())
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.editor.request_delete(NodeId::intern(id))
    }

    pub fn reorder_toggle(&mut self, id: &str) -> bool {
        self.editor.request_reorder_toggle(NodeId::intern(id))
    }

    pub fn cycle_carousel(&mut self, id: &str, direction: i32) -> bool {
        self.editor.request_cycle(NodeId::intern(id), direction)
    }

    /// Append a JSON array of image references to a carousel.
    pub fn append_carousel_images(&mut self, id: &str, urls_json: &str) -> bool {
        match serde_json::from_str::<Vec<String>>(urls_json) {
            Ok(urls) => self.editor.request_append_images(NodeId::intern(id), urls),
            Err(e) => {
                log::warn!("invalid image list: {e}");
                false
            }
        }
    }

    pub fn add_qna_item(&mut self, id: &str, question: &str) -> bool {
        self.editor.request_add_qna_item(NodeId::intern(id), question)
    }

    pub fn remove_qna_item(&mut self, id: &str, item: &str) -> bool {
        self.editor
            .request_remove_qna_item(NodeId::intern(id), NodeId::intern(item))
    }

    pub fn update_qna_item(
        &mut self,
        id: &str,
        item: &str,
        question: Option<String>,
        answer: Option<String>,
    ) -> bool {
        self.editor.request_update_qna_item(
            NodeId::intern(id),
            NodeId::intern(item),
            question.as_deref(),
            answer.as_deref(),
        )
    }

    pub fn add_menu_item(&mut self, id: &str, label: &str, href: &str) -> bool {
        self.editor
            .request_add_menu_item(NodeId::intern(id), label, href)
    }

    pub fn remove_menu_item(&mut self, id: &str, item: &str) -> bool {
        self.editor
            .request_remove_menu_item(NodeId::intern(id), NodeId::intern(item))
    }

    pub fn update_menu_item(
        &mut self,
        id: &str,
        item: &str,
        label: Option<String>,
        href: Option<String>,
    ) -> bool {
        self.editor.request_update_menu_item(
            NodeId::intern(id),
            NodeId::intern(item),
            label.as_deref(),
            href.as_deref(),
        )
    }

    // ─── Resources ──────────────────────────────────────────────────────

    /// Pending resource requests as a JSON array of `{node, field}`.
    pub fn take_resource_requests(&mut self) -> String {
        let requests = self.editor.take_resource_requests();
        serde_json::to_string(&requests).unwrap_or_else(|_| "[]".to_string())
    }

    /// Answer a request (`{node, field}` JSON) with a JSON array of
    /// references.
    pub fn resolve_resource(&mut self, request_json: &str, urls_json: &str) -> bool {
        let request = serde_json::from_str::<ResourceRequest>(request_json);
        let urls = serde_json::from_str::<Vec<String>>(urls_json);
        match (request, urls) {
            (Ok(request), Ok(urls)) => self.editor.resolve_resource(request, urls),
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("invalid resource answer: {e}");
                false
            }
        }
    }

    // ─── History & persistence ──────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn begin_gesture(&mut self) {
        self.editor.begin_gesture();
    }

    pub fn end_gesture(&mut self) {
        self.editor.end_gesture();
    }

    /// Write the document to `localStorage`.
    pub fn publish(&mut self) -> Result<(), JsValue> {
        self.editor
            .publish()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn load(&mut self) {
        self.editor.load();
    }

    // ─── Input ──────────────────────────────────────────────────────────

    /// Handle a keydown. Returns the action name, or `"none"`; the caller
    /// calls `preventDefault` for anything else. Pass `in_field` when the
    /// event target is an input, textarea or contenteditable.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        in_field: bool,
    ) -> String {
        self.editor
            .handle_key(key, ctrl, shift, alt, meta, in_field)
            .map_or("none", action_name)
            .to_string()
    }

    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.editor
            .handle_pointer(&InputEvent::from_pointer_down(x, y, mods))
    }

    pub fn handle_pointer_move(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.editor
            .handle_pointer(&InputEvent::from_pointer_move(x, y, mods))
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        self.editor
            .handle_pointer(&InputEvent::from_pointer_up(x, y))
    }

    pub fn handle_double_click(&mut self, x: f32, y: f32) -> bool {
        self.editor.handle_pointer(&InputEvent::DoubleClick { x, y })
    }

    /// Text overlay value changed.
    pub fn text_input(&mut self, value: &str) -> bool {
        self.editor
            .text_event(TextEditEvent::Input(value.to_string()))
    }

    pub fn text_enter(&mut self, shift: bool) -> bool {
        self.editor.text_event(TextEditEvent::Enter { shift })
    }

    pub fn text_escape(&mut self) -> bool {
        self.editor.text_event(TextEditEvent::Escape)
    }

    pub fn text_blur(&mut self) -> bool {
        self.editor.text_event(TextEditEvent::Blur)
    }

    /// Drive carousel autoplay from `requestAnimationFrame` or a timer.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.editor.tick(now_ms.max(0.0) as u64)
    }

    /// [`tick`](Self::tick) against the browser clock.
    pub fn tick_now(&mut self) -> bool {
        self.tick(js_sys::Date::now())
    }
}

impl PdCanvas {
    /// Build a controller over any store (used off the web).
    pub fn with_store(config: EditorConfig, store: Box<dyn Store>) -> Self {
        Self {
            editor: Editor::new(config, store),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }
}

fn parse_config(config_json: &str) -> EditorConfig {
    if config_json.trim().is_empty() {
        return EditorConfig::default();
    }
    EditorConfig::from_json(config_json).unwrap_or_else(|e| {
        log::warn!("{e}; using defaults");
        EditorConfig::default()
    })
}

fn action_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Duplicate => "duplicate",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Deselect => "deselect",
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("PD WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
