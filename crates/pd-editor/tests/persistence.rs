//! Integration tests: publish / load through the persistence port.

use pd_core::*;
use pd_editor::persist::{self, MemoryStore, PersistError, STORAGE_KEY, Store};
use pd_editor::{Editor, EditorConfig};
use pretty_assertions::assert_eq;

/// Store that shares its contents with the test through a handle.
#[derive(Clone, Default)]
struct SharedStore(std::rc::Rc<std::cell::RefCell<MemoryStore>>);

impl Store for SharedStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.0.borrow().load(key)
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), PersistError> {
        self.0.borrow_mut().save(key, blob)
    }
}

struct FailingStore;

impl Store for FailingStore {
    fn load(&self, _key: &str) -> Result<Option<String>, PersistError> {
        Err(PersistError::Backend("quota".into()))
    }

    fn save(&mut self, _key: &str, _blob: &str) -> Result<(), PersistError> {
        Err(PersistError::Backend("quota".into()))
    }
}

fn sample_editor(store: SharedStore) -> (Editor, Vec<NodeId>) {
    let mut ed = Editor::new(EditorConfig::default(), Box::new(store));
    let kinds = [
        NodeType::Header,
        NodeType::Text,
        NodeType::Carousel,
        NodeType::Qna,
        NodeType::ProfileCard,
        NodeType::Footer,
    ];
    let ids = kinds
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            ed.request_create(*ty, Point::new(20.0 * i as f32, 100.0 * i as f32))
                .unwrap()
        })
        .collect();
    (ed, ids)
}

#[test]
fn publish_then_reopen_restores_document() {
    let store = SharedStore::default();
    let (mut ed, _) = sample_editor(store.clone());
    ed.publish().unwrap();

    let reopened = Editor::new(EditorConfig::default(), Box::new(store));
    assert_eq!(reopened.document(), ed.document());
    assert!(!reopened.can_undo());
    assert!(!reopened.can_redo());
}

#[test]
fn load_discards_history_and_selection() {
    let store = SharedStore::default();
    let (mut ed, ids) = sample_editor(store.clone());
    ed.publish().unwrap();
    ed.request_delete(ids[1]);
    ed.select(Some(ids[2]));

    ed.load();
    assert_eq!(ed.document().len(), ids.len());
    assert!(!ed.can_undo());
    assert_eq!(ed.selected(), None);
}

#[test]
fn blob_is_versioned_envelope() {
    let store = SharedStore::default();
    let (mut ed, _) = sample_editor(store.clone());
    ed.publish().unwrap();

    let blob = store.0.borrow().get(STORAGE_KEY).unwrap().to_string();
    let value: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(value["version"], serde_json::json!(1));
    assert_eq!(value["nodes"].as_array().unwrap().len(), 6);
}

#[test]
fn legacy_bare_array_is_accepted() {
    let legacy = r##"[
        {"id": "r1", "type": "rect", "x": 10, "y": 20, "width": 150, "height": 100,
         "fill": "yellow", "rotation": 0},
        {"id": "t1", "type": "text", "x": 0, "y": 0, "text": "Hi", "fontSize": 24,
         "fontFamily": "Arial", "fill": "#000", "rotation": 0}
    ]"##;
    let doc = persist::decode(legacy).unwrap();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.nodes()[1].id, NodeId::intern("t1"));
}

#[test]
fn overflowing_patch_does_not_poison_the_page() {
    let store = SharedStore::default();
    let mut ed = Editor::new(EditorConfig::default(), Box::new(store.clone()));
    let text = ed.request_create(NodeType::Text, Point::new(0.0, 0.0)).unwrap();
    let rect = ed.request_create(NodeType::Rect, Point::new(40.0, 40.0)).unwrap();

    let huge = AttrPatch::from_json(r#"{"x": 1e39}"#).unwrap();
    assert!(!ed.request_patch(rect, &huge));
    assert!(ed.request_patch(rect, &AttrPatch::new().set("fill", "blue")));
    ed.publish().unwrap();

    let reopened = Editor::new(EditorConfig::default(), Box::new(store));
    assert_eq!(reopened.document(), ed.document());
    assert!(reopened.document().contains(text));
}

#[test]
fn invalid_state_falls_back_to_empty() {
    let duplicate_ids = r#"{"version": 1, "nodes": [
        {"id": "x", "type": "rect", "x": 0, "y": 0, "width": 1, "height": 1, "fill": "red", "rotation": 0},
        {"id": "x", "type": "rect", "x": 0, "y": 0, "width": 1, "height": 1, "fill": "red", "rotation": 0}
    ]}"#;
    assert!(matches!(persist::decode(duplicate_ids), Err(PersistError::Invalid(_))));

    let store = MemoryStore::with_entry(STORAGE_KEY, duplicate_ids);
    let ed = Editor::new(EditorConfig::default(), Box::new(store));
    assert!(ed.document().is_empty());
}

#[test]
fn backend_failures_surface_on_publish_only() {
    let mut ed = Editor::new(EditorConfig::default(), Box::new(FailingStore));
    assert!(ed.document().is_empty());
    ed.request_create(NodeType::Rect, Point::new(0.0, 0.0));
    assert_eq!(ed.publish(), Err(PersistError::Backend("quota".into())));
    assert_eq!(ed.document().len(), 1);
}

#[test]
fn custom_storage_key() {
    let config = EditorConfig::from_json(r#"{"storageKey": "draft"}"#).unwrap();
    let store = SharedStore::default();
    let mut ed = Editor::new(config, Box::new(store.clone()));
    ed.request_create(NodeType::Link, Point::new(0.0, 0.0));
    ed.publish().unwrap();
    assert!(store.0.borrow().get("draft").is_some());
    assert!(store.0.borrow().get(STORAGE_KEY).is_none());
}

#[test]
fn snapshot_round_trip() {
    let (ed, _) = sample_editor(SharedStore::default());
    let bytes = persist::encode_snapshot(ed.document()).unwrap();
    let restored = persist::decode_snapshot(&bytes).unwrap();
    assert_eq!(&restored, ed.document());
    assert!(persist::decode_snapshot(&[0xc1]).is_err());
}
