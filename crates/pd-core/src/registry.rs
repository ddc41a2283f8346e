//! Node type registry: creation templates, drop placement, fixed fields,
//! and resize floors for every [`NodeType`].
//!
//! Adding a node kind means extending [`NodeKind`] and the
//! [`defaults`] table below; the mutation engine has no other per-kind
//! knowledge.

use crate::id::NodeId;
use crate::model::*;
use crate::viewport::{CanvasSize, Point};
use smallvec::smallvec;

/// Fields no attribute patch may change, on any node.
pub const IMMUTABLE_FIELDS: [&str; 2] = ["id", "type"];

/// Position offset applied to duplicated nodes, in base canvas units.
pub const DUPLICATE_OFFSET: f32 = 10.0;

/// Smallest font size a text resize handle may produce.
pub const MIN_FONT_SIZE: f32 = 8.0;

/// Default carousel autoplay interval in milliseconds.
pub const DEFAULT_AUTOPLAY_INTERVAL_MS: u32 = 3000;

/// Creation template for a node type.
pub fn defaults(ty: NodeType, base: CanvasSize) -> NodeKind {
    match ty {
        NodeType::Text => NodeKind::Text(TextProps {
            text: "New Text".into(),
            font_size: 24.0,
            font_family: "Arial".into(),
            fill: "#000".into(),
            rotation: 0.0,
        }),
        NodeType::Rect => NodeKind::Rect(RectProps {
            width: 150.0,
            height: 100.0,
            fill: "yellow".into(),
            rotation: 0.0,
        }),
        NodeType::Image => NodeKind::Image(ImageProps {
            width: 200.0,
            height: 150.0,
            src: None,
            rotation: 0.0,
        }),
        NodeType::Video => NodeKind::Video(VideoProps {
            width: 320.0,
            height: 180.0,
            src: None,
            rotation: 0.0,
            is_playing: Some(false),
            muted: Some(true),
        }),
        NodeType::Link => NodeKind::Link(LinkProps {
            width: 160.0,
            height: 44.0,
            text: "Click me".into(),
            href: "https://".into(),
            font_size: 16.0,
            fill: "#2563eb".into(),
            text_color: "#ffffff".into(),
            radius: 6.0,
        }),
        NodeType::Card => NodeKind::Card(CardProps {
            width: 240.0,
            height: 300.0,
            image: None,
            title: "Card title".into(),
            description: "Card description".into(),
            title_font_size: 20.0,
            description_font_size: 14.0,
        }),
        NodeType::ProfileCard => NodeKind::ProfileCard(ProfileCardProps {
            width: 200.0,
            height: 260.0,
            profile_image: None,
            name: "Jane Doe".into(),
            role: "Designer".into(),
            name_font_size: Some(18.0),
            role_font_size: Some(14.0),
        }),
        NodeType::Carousel => NodeKind::Carousel(CarouselProps {
            width: 480.0,
            height: 240.0,
            images: Vec::new(),
            active_index: 0,
            autoplay: Some(false),
            interval: Some(DEFAULT_AUTOPLAY_INTERVAL_MS),
        }),
        NodeType::Qna => NodeKind::Qna(QnaProps {
            width: 300.0,
            height: 200.0,
            items: vec![QnaItem {
                id: NodeId::fresh(),
                question: "New Question?".into(),
                answer: String::new(),
            }],
        }),
        NodeType::Header => NodeKind::Header(HeaderProps {
            width: base.width,
            height: 80.0,
            logo_text: "Logo".into(),
            menu: smallvec![
                menu_item("Home", "#"),
                menu_item("About", "#about"),
                menu_item("Contact", "#contact"),
            ],
            background: "#111827".into(),
        }),
        NodeType::Footer => NodeKind::Footer(FooterProps {
            width: base.width,
            height: 60.0,
            text: "© All rights reserved".into(),
            background: "#111827".into(),
        }),
    }
}

/// A menu entry with a fresh id.
pub fn menu_item(label: &str, href: &str) -> MenuItem {
    MenuItem {
        id: NodeId::fresh(),
        label: label.into(),
        href: href.into(),
    }
}

/// Top-left placement for a node dropped at `at` (base canvas space).
pub fn drop_position(ty: NodeType, at: Point) -> (f32, f32) {
    match ty {
        NodeType::Header => (0.0, 0.0),
        NodeType::Footer => (0.0, at.y),
        _ => (at.x, at.y),
    }
}

/// Attributes a patch can never change on this node type: the immutable
/// identity fields plus any pinned geometry.
pub fn fixed_fields(ty: NodeType) -> &'static [&'static str] {
    match ty {
        NodeType::Header => &["id", "type", "x", "y", "width"],
        NodeType::Footer => &["id", "type", "x", "width"],
        _ => &IMMUTABLE_FIELDS,
    }
}

/// Resize floor `(min_width, min_height)` for handle-driven resizes.
/// Text is sized by font and returns `None`.
pub fn min_size(ty: NodeType) -> Option<(f32, f32)> {
    match ty {
        NodeType::Text => None,
        NodeType::Rect | NodeType::Image | NodeType::Video => Some((5.0, 5.0)),
        NodeType::Link => Some((80.0, 32.0)),
        NodeType::Card => Some((160.0, 180.0)),
        NodeType::ProfileCard => Some((150.0, 200.0)),
        NodeType::Carousel => Some((50.0, 50.0)),
        NodeType::Qna => Some((250.0, 150.0)),
        NodeType::Header | NodeType::Footer => Some((0.0, 40.0)),
    }
}

/// Whether a node type renders user-editable text in place on the canvas
/// (double-click to edit).
pub fn is_inline_editable(ty: NodeType) -> bool {
    matches!(ty, NodeType::Text)
}
