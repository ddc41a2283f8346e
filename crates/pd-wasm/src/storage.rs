//! `window.localStorage` adapter for the persistence port.

use pd_editor::persist::{PersistError, Store};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// [`Store`] backed by the page's `localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Result<Storage, PersistError> {
        let window =
            web_sys::window().ok_or_else(|| PersistError::Backend("no window".into()))?;
        window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| PersistError::Backend("localStorage unavailable".into()))
    }
}

impl Store for LocalStorageStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        Self::storage()?.get_item(key).map_err(js_error)
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), PersistError> {
        Self::storage()?.set_item(key, blob).map_err(js_error)
    }
}

fn js_error(err: JsValue) -> PersistError {
    PersistError::Backend(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
