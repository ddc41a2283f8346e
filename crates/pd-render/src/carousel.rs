//! Carousel slot layout.
//!
//! A carousel shows up to three images in a row. With three or more images
//! the active one sits in the middle between its wrap-around neighbours,
//! which are dimmed. Fewer images are shown side by side at full opacity,
//! and an empty carousel shows a placeholder (no slots).

use pd_core::model::CarouselProps;
use serde::Serialize;

/// Opacity of the neighbour slots around the active image.
pub const SIDE_OPACITY: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotRole {
    Previous,
    Current,
    Next,
    /// One of one or two images shown side by side.
    Plain,
}

/// One visible image position, left to right.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselSlot {
    /// Index into the carousel's image list.
    pub index: usize,
    pub src: String,
    pub role: SlotRole,
    pub opacity: f32,
}

/// Visible slots for a carousel, left to right. A stale `active_index`
/// (beyond the image list) wraps instead of indexing out of bounds.
pub fn carousel_slots(carousel: &CarouselProps) -> Vec<CarouselSlot> {
    let images = &carousel.images;
    let n = images.len();
    let slot = |index: usize, role, opacity| CarouselSlot {
        index,
        src: images[index].clone(),
        role,
        opacity,
    };

    match n {
        0 => Vec::new(),
        1 | 2 => (0..n).map(|i| slot(i, SlotRole::Plain, 1.0)).collect(),
        _ => {
            let current = carousel.active_index % n;
            let prev = (current + n - 1) % n;
            let next = (current + 1) % n;
            vec![
                slot(prev, SlotRole::Previous, SIDE_OPACITY),
                slot(current, SlotRole::Current, 1.0),
                slot(next, SlotRole::Next, SIDE_OPACITY),
            ]
        }
    }
}
