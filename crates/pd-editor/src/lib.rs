pub mod autoplay;
pub mod config;
pub mod gesture;
pub mod history;
pub mod input;
pub mod persist;
pub mod resources;
pub mod session;
pub mod shortcuts;

pub use config::EditorConfig;
pub use history::History;
pub use persist::{MemoryStore, PersistError, STORAGE_KEY, Store};
pub use resources::{ResourceField, ResourceRequest};
pub use session::{Editor, RenderState};
pub use shortcuts::{ShortcutAction, ShortcutMap};
