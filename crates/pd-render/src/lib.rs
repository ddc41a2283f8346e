pub mod carousel;
pub mod hit;
pub mod layout;

pub use carousel::{CarouselSlot, SlotRole, carousel_slots};
pub use hit::hit_test;
pub use layout::{content_height, extent};
