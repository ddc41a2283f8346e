pub mod document;
pub mod id;
pub mod model;
pub mod mutate;
pub mod patch;
pub mod registry;
pub mod viewport;

pub use document::Document;
pub use id::NodeId;
pub use model::*;
pub use mutate::{
    ReorderToggles, create_node, delete_node, duplicate_node, duplicate_node_with_offset,
    reorder_toggle, update_node,
};
pub use patch::AttrPatch;
pub use viewport::{BASE_CANVAS, Bounds, CanvasSize, Device, Point, ViewportMapping};
