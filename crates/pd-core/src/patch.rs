//! Partial attribute patches.
//!
//! An [`AttrPatch`] is the payload of every single-node edit: property
//! panel fields, drag ends, resize handles, text commits, and resolved
//! uploads all arrive as a small map of attribute name → value.
//!
//! Merging is driven by the node's own serialized shape. A key is applied
//! only when the variant already has a field of that name and the registry
//! does not list it as fixed. Keys foreign to the variant are ignored.
//! A value of the wrong type, or a number too large to stay finite, is
//! dropped on its own without blocking the rest of the patch.

use crate::model::Node;
use crate::registry::fixed_fields;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A partial set of node attributes, keyed by serialized (camelCase) name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrPatch(Map<String, Value>);

impl AttrPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Shorthand for an `x, y` move.
    pub fn position(x: f32, y: f32) -> Self {
        Self::new().set("x", x).set("y", y)
    }

    /// Parse a JSON object. Anything other than an object is rejected.
    pub fn from_json(text: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(format!("attribute patch must be an object, got {other}")),
            Err(e) => Err(format!("invalid attribute patch: {e}")),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for AttrPatch {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Node {
    /// Return a copy of this node with `patch` merged in.
    ///
    /// `id`, `type`, and pinned geometry are never written. Keys the
    /// variant does not have are ignored; values that do not deserialize
    /// into the field's type, or overflow it to infinity, are dropped
    /// individually.
    pub fn apply_patch(&self, patch: &AttrPatch) -> Node {
        let fixed = fixed_fields(self.node_type());
        let mut base = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                log::warn!("node {} could not be serialized for patching", self.id);
                return self.clone();
            }
        };

        let applicable: Vec<(&String, &Value)> = patch
            .entries()
            .filter(|(key, _)| {
                let known = base.contains_key(key.as_str()) && !fixed.contains(&key.as_str());
                if !known {
                    log::trace!("patch {}: ignoring field {key:?}", self.id);
                }
                known
            })
            .collect();

        if applicable.is_empty() {
            return self.clone();
        }

        // Fast path: the whole patch fits the variant.
        let mut merged = base.clone();
        for (key, value) in &applicable {
            merged.insert((*key).clone(), (*value).clone());
        }
        if let Some(node) = rebuild(merged) {
            return node;
        }

        // Slow path: keep only the fields that deserialize.
        let mut node = self.clone();
        for (key, value) in applicable {
            let mut trial = base.clone();
            trial.insert(key.clone(), value.clone());
            match rebuild(trial.clone()) {
                Some(accepted) => {
                    base = trial;
                    node = accepted;
                }
                None => log::debug!("patch {}: dropping field {key:?} = {value}", self.id),
            }
        }
        node
    }
}

/// Deserialize a merged attribute map, refusing non-finite numbers.
fn rebuild(map: Map<String, Value>) -> Option<Node> {
    serde_json::from_value::<Node>(Value::Object(map))
        .ok()
        .filter(Node::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::NodeId;
    use crate::model::*;
    use crate::registry::defaults;
    use crate::viewport::BASE_CANVAS;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn node(ty: NodeType) -> Node {
        Node::new(NodeId::fresh(), 100.0, 50.0, defaults(ty, BASE_CANVAS))
    }

    #[test]
    fn merges_matching_fields() {
        let rect = node(NodeType::Rect);
        let patched = rect.apply_patch(&AttrPatch::new().set("fill", "#ff0000").set("x", 5));
        assert_eq!(patched.x, 5.0);
        match &patched.kind {
            NodeKind::Rect(r) => {
                assert_eq!(r.fill, "#ff0000");
                assert_eq!(r.width, 150.0);
            }
            other => panic!("expected rect, got {other:?}"),
        }
        // Source untouched.
        assert_eq!(rect.x, 100.0);
    }

    #[test]
    fn id_and_type_are_not_settable() {
        let rect = node(NodeType::Rect);
        let patched = rect.apply_patch(
            &AttrPatch::new()
                .set("id", "hijack")
                .set("type", "text")
                .set("text", "hello"),
        );
        assert_eq!(patched, rect);
    }

    #[test]
    fn foreign_fields_are_inert() {
        let text = node(NodeType::Text);
        let patched = text.apply_patch(
            &AttrPatch::new()
                .set("width", 999)
                .set("images", json!(["a.png"]))
                .set("fontSize", 32),
        );
        match &patched.kind {
            NodeKind::Text(t) => assert_eq!(t.font_size, 32.0),
            other => panic!("expected text, got {other:?}"),
        }
        assert_eq!(serde_json::to_value(&patched).unwrap().get("width"), None);
    }

    #[test]
    fn ill_typed_field_is_dropped_alone() {
        let rect = node(NodeType::Rect);
        let patched = rect.apply_patch(
            &AttrPatch::new()
                .set("width", "wide")
                .set("height", 40)
                .set("fill", json!(null)),
        );
        match &patched.kind {
            NodeKind::Rect(r) => {
                assert_eq!(r.width, 150.0);
                assert_eq!(r.height, 40.0);
                assert_eq!(r.fill, "yellow");
            }
            other => panic!("expected rect, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_number_is_dropped_alone() {
        let rect = node(NodeType::Rect);
        let patch = AttrPatch::from_json(r#"{"x": 1e39, "fill": "blue"}"#).unwrap();
        let patched = rect.apply_patch(&patch);
        assert_eq!(patched.x, 100.0);
        assert!(patched.is_finite());
        match &patched.kind {
            NodeKind::Rect(r) => assert_eq!(r.fill, "blue"),
            other => panic!("expected rect, got {other:?}"),
        }

        // The node stays patchable and serializable afterwards.
        let again = patched.apply_patch(&AttrPatch::new().set("fill", "green"));
        assert_eq!(serde_json::to_value(&again).unwrap()["x"], json!(100.0));
    }

    #[test]
    fn overflowing_font_size_is_dropped() {
        let text = node(NodeType::Text);
        let patched = text.apply_patch(&AttrPatch::from_json(r#"{"fontSize": -1e40}"#).unwrap());
        assert_eq!(patched, text);
    }

    #[test]
    fn optional_source_can_be_populated() {
        let image = node(NodeType::Image);
        let patched = image.apply_patch(&AttrPatch::new().set("src", "data:image/png;base64,AAAA"));
        match &patched.kind {
            NodeKind::Image(i) => assert_eq!(i.src.as_deref(), Some("data:image/png;base64,AAAA")),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn header_geometry_is_pinned() {
        let mut header = node(NodeType::Header);
        header.x = 0.0;
        header.y = 0.0;
        let patched = header.apply_patch(
            &AttrPatch::new()
                .set("x", 40)
                .set("y", 40)
                .set("width", 300)
                .set("height", 120)
                .set("logoText", "Acme"),
        );
        assert_eq!((patched.x, patched.y), (0.0, 0.0));
        match &patched.kind {
            NodeKind::Header(h) => {
                assert_eq!(h.width, BASE_CANVAS.width);
                assert_eq!(h.height, 120.0);
                assert_eq!(h.logo_text, "Acme");
            }
            other => panic!("expected header, got {other:?}"),
        }
    }

    #[test]
    fn from_json_requires_object() {
        assert!(AttrPatch::from_json(r#"{"x": 1}"#).is_ok());
        assert!(AttrPatch::from_json("[1, 2]").is_err());
        assert!(AttrPatch::from_json("{").is_err());
    }
}
