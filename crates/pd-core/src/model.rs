//! Core data model for PD documents.
//!
//! A document is an ordered list of [`Node`]s. Every node has an immutable
//! [`NodeId`], a top-left position in base canvas space, and a
//! [`NodeKind`] carrying the variant-specific attributes.
//!
//! The serialized shape is the attribute contract shared with the render
//! surface and properties panel: a flat object with a `type` tag and
//! camelCase field names, e.g.
//!
//! ```json
//! { "id": "…", "x": 40, "y": 60, "type": "rect",
//!   "width": 150, "height": 100, "fill": "yellow", "rotation": 0 }
//! ```
//!
//! Optional fields serialize as `null` rather than being skipped, so every
//! attribute of a variant is visible in its serialized form. Attribute
//! patches rely on this (see [`crate::patch`]).

use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};
use std::fmt;
use std::str::FromStr;

// ─── Node ────────────────────────────────────────────────────────────────

/// A single visual element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Left edge in base canvas units.
    pub x: f32,
    /// Top edge in base canvas units.
    pub y: f32,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, x: f32, y: f32, kind: NodeKind) -> Self {
        Self { id, x, y, kind }
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Whether position, size, rotation, font sizes and radii are all
    /// finite. JSON has no spelling for the others.
    pub fn is_finite(&self) -> bool {
        let (w, h) = self.kind.size().unwrap_or((0.0, 0.0));
        [self.x, self.y, w, h, self.kind.rotation()]
            .into_iter()
            .chain(self.kind.metrics())
            .all(f32::is_finite)
    }

    /// Borrow the carousel attributes, if this is a carousel.
    pub fn as_carousel(&self) -> Option<&CarouselProps> {
        match &self.kind {
            NodeKind::Carousel(c) => Some(c),
            _ => None,
        }
    }
}

// ─── Node kinds ──────────────────────────────────────────────────────────

/// The tagged union of every node variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Text(TextProps),
    Rect(RectProps),
    Image(ImageProps),
    Video(VideoProps),
    Link(LinkProps),
    Card(CardProps),
    ProfileCard(ProfileCardProps),
    Carousel(CarouselProps),
    Qna(QnaProps),
    Header(HeaderProps),
    Footer(FooterProps),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Rect(_) => NodeType::Rect,
            NodeKind::Image(_) => NodeType::Image,
            NodeKind::Video(_) => NodeType::Video,
            NodeKind::Link(_) => NodeType::Link,
            NodeKind::Card(_) => NodeType::Card,
            NodeKind::ProfileCard(_) => NodeType::ProfileCard,
            NodeKind::Carousel(_) => NodeType::Carousel,
            NodeKind::Qna(_) => NodeType::Qna,
            NodeKind::Header(_) => NodeType::Header,
            NodeKind::Footer(_) => NodeType::Footer,
        }
    }

    /// Explicit box size, if the variant has one. Text is sized by its
    /// content and returns `None`.
    pub fn size(&self) -> Option<(f32, f32)> {
        match self {
            NodeKind::Text(_) => None,
            NodeKind::Rect(p) => Some((p.width, p.height)),
            NodeKind::Image(p) => Some((p.width, p.height)),
            NodeKind::Video(p) => Some((p.width, p.height)),
            NodeKind::Link(p) => Some((p.width, p.height)),
            NodeKind::Card(p) => Some((p.width, p.height)),
            NodeKind::ProfileCard(p) => Some((p.width, p.height)),
            NodeKind::Carousel(p) => Some((p.width, p.height)),
            NodeKind::Qna(p) => Some((p.width, p.height)),
            NodeKind::Header(p) => Some((p.width, p.height)),
            NodeKind::Footer(p) => Some((p.width, p.height)),
        }
    }

    /// Font sizes and corner radii carried by the variant.
    pub fn metrics(&self) -> SmallVec<[f32; 2]> {
        match self {
            NodeKind::Text(p) => smallvec![p.font_size],
            NodeKind::Link(p) => smallvec![p.font_size, p.radius],
            NodeKind::Card(p) => smallvec![p.title_font_size, p.description_font_size],
            NodeKind::ProfileCard(p) => {
                p.name_font_size.into_iter().chain(p.role_font_size).collect()
            }
            _ => SmallVec::new(),
        }
    }

    /// Rotation in degrees, for variants that can rotate.
    pub fn rotation(&self) -> f32 {
        match self {
            NodeKind::Text(p) => p.rotation,
            NodeKind::Rect(p) => p.rotation,
            NodeKind::Image(p) => p.rotation,
            NodeKind::Video(p) => p.rotation,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProps {
    pub text: String,
    pub font_size: f32,
    pub font_family: String,
    pub fill: String,
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectProps {
    pub width: f32,
    pub height: f32,
    pub fill: String,
    pub rotation: f32,
}

/// Image node. `src` stays `None` until an upload resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    pub width: f32,
    pub height: f32,
    pub src: Option<String>,
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProps {
    pub width: f32,
    pub height: f32,
    pub src: Option<String>,
    pub rotation: f32,
    pub is_playing: Option<bool>,
    pub muted: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkProps {
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub href: String,
    pub font_size: f32,
    /// Button background.
    pub fill: String,
    pub text_color: String,
    /// Corner radius.
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardProps {
    pub width: f32,
    pub height: f32,
    pub image: Option<String>,
    pub title: String,
    pub description: String,
    pub title_font_size: f32,
    pub description_font_size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCardProps {
    pub width: f32,
    pub height: f32,
    pub profile_image: Option<String>,
    pub name: String,
    pub role: String,
    pub name_font_size: Option<f32>,
    pub role_font_size: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselProps {
    pub width: f32,
    pub height: f32,
    pub images: Vec<String>,
    pub active_index: usize,
    pub autoplay: Option<bool>,
    /// Autoplay interval in milliseconds.
    pub interval: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QnaItem {
    pub id: NodeId,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QnaProps {
    pub width: f32,
    pub height: f32,
    pub items: Vec<QnaItem>,
}

/// A navigation entry in a page header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: NodeId,
    pub label: String,
    pub href: String,
}

/// The pinned top band. Position is fixed at the origin and width at the
/// base canvas width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderProps {
    pub width: f32,
    pub height: f32,
    pub logo_text: String,
    pub menu: SmallVec<[MenuItem; 4]>,
    pub background: String,
}

/// Full-width bottom band. `x` and `width` are pinned; `y` is free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterProps {
    pub width: f32,
    pub height: f32,
    pub text: String,
    pub background: String,
}

// ─── Node type tags ──────────────────────────────────────────────────────

/// Fieldless discriminator for [`NodeKind`]. Its string form is the
/// `type` tag of the serialized node and the payload the palette attaches
/// to a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Text,
    Rect,
    Image,
    Video,
    Link,
    Card,
    ProfileCard,
    Carousel,
    Qna,
    Header,
    Footer,
}

impl NodeType {
    pub const ALL: [NodeType; 11] = [
        NodeType::Text,
        NodeType::Rect,
        NodeType::Image,
        NodeType::Video,
        NodeType::Link,
        NodeType::Card,
        NodeType::ProfileCard,
        NodeType::Carousel,
        NodeType::Qna,
        NodeType::Header,
        NodeType::Footer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Text => "text",
            NodeType::Rect => "rect",
            NodeType::Image => "image",
            NodeType::Video => "video",
            NodeType::Link => "link",
            NodeType::Card => "card",
            NodeType::ProfileCard => "profileCard",
            NodeType::Carousel => "carousel",
            NodeType::Qna => "qna",
            NodeType::Header => "header",
            NodeType::Footer => "footer",
        }
    }

    /// At most one node of this type may exist; creating another replaces it.
    pub fn is_singleton(self) -> bool {
        matches!(self, NodeType::Header | NodeType::Footer)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown node type: {s:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn node_serializes_flat_with_type_tag() {
        let node = Node::new(
            NodeId::intern("r1"),
            10.0,
            20.0,
            NodeKind::Rect(RectProps {
                width: 150.0,
                height: 100.0,
                fill: "yellow".into(),
                rotation: 0.0,
            }),
        );
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "r1",
                "x": 10.0,
                "y": 20.0,
                "type": "rect",
                "width": 150.0,
                "height": 100.0,
                "fill": "yellow",
                "rotation": 0.0
            })
        );
    }

    #[test]
    fn optional_fields_serialize_as_null() {
        let node = Node::new(
            NodeId::intern("img"),
            0.0,
            0.0,
            NodeKind::Image(ImageProps {
                width: 200.0,
                height: 150.0,
                src: None,
                rotation: 0.0,
            }),
        );
        let value = serde_json::to_value(&node).unwrap();
        assert!(value.as_object().unwrap().contains_key("src"));
        assert!(value["src"].is_null());
    }

    #[test]
    fn missing_optional_fields_deserialize_as_none() {
        let node: Node = serde_json::from_value(json!({
            "id": "v",
            "x": 0,
            "y": 0,
            "type": "video",
            "width": 320,
            "height": 180,
            "rotation": 0
        }))
        .unwrap();
        match node.kind {
            NodeKind::Video(v) => {
                assert_eq!(v.src, None);
                assert_eq!(v.muted, None);
            }
            other => panic!("expected video, got {other:?}"),
        }
    }

    #[test]
    fn node_type_tags_match_serde_tags() {
        for ty in NodeType::ALL {
            let tag = serde_json::to_value(ty).unwrap();
            assert_eq!(tag, json!(ty.as_str()));
            assert_eq!(ty.as_str().parse::<NodeType>(), Ok(ty));
        }
        assert!("circle".parse::<NodeType>().is_err());
    }

    #[test]
    fn singletons() {
        assert!(NodeType::Header.is_singleton());
        assert!(NodeType::Footer.is_singleton());
        assert!(!NodeType::Rect.is_singleton());
    }
}
