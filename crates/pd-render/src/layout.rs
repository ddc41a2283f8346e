//! Node extents in base canvas space.
//!
//! Boxed variants report their stored `width × height`. Text has no stored
//! box, so its extent is estimated from font size and content.

use kurbo::Rect;
use pd_core::Document;
use pd_core::model::{Node, NodeKind, TextProps};

/// Line height as a multiple of font size.
const LINE_HEIGHT: f64 = 1.2;

/// Average glyph advance as a multiple of font size.
const GLYPH_ADVANCE: f64 = 0.6;

/// Unrotated bounding box of a node, top-left at `(x, y)`.
pub fn extent(node: &Node) -> Rect {
    let (w, h) = match &node.kind {
        NodeKind::Text(text) => text_size(text),
        kind => {
            let (w, h) = kind.size().unwrap_or((0.0, 0.0));
            (f64::from(w), f64::from(h))
        }
    };
    let (x, y) = (f64::from(node.x), f64::from(node.y));
    Rect::new(x, y, x + w.max(0.0), y + h.max(0.0))
}

fn text_size(text: &TextProps) -> (f64, f64) {
    let font = f64::from(text.font_size);
    let lines = text.text.split('\n');
    let (count, longest) = lines.fold((0usize, 0usize), |(n, max), line| {
        (n + 1, max.max(line.chars().count()))
    });
    (
        GLYPH_ADVANCE * font * longest as f64,
        LINE_HEIGHT * font * count.max(1) as f64,
    )
}

/// Height of the scrollable canvas in base units: the base height, or the
/// lowest node bottom if something extends past it.
pub fn content_height(doc: &Document, base_height: f32) -> f32 {
    let lowest = doc
        .iter()
        .map(|n| extent(n).y1)
        .fold(f64::from(base_height), f64::max);
    lowest as f32
}
