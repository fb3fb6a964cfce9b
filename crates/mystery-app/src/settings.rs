//! Configuration persisted in `localStorage`.

use wasm_bindgen::prelude::*;
use mystery_types::config::MysteryConfig;

const CONFIG_STORAGE_KEY: &str = "mystery:config";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// Restore config from storage, falling back to defaults.
pub fn load_config() -> MysteryConfig {
    let raw = local_storage().and_then(|s| s.get_item(CONFIG_STORAGE_KEY).ok().flatten());
    config_from_stored(raw.as_deref())
}

pub(crate) fn config_from_stored(raw: Option<&str>) -> MysteryConfig {
    let Some(json) = raw else {
        return MysteryConfig::default();
    };
    match MysteryConfig::from_json(json) {
        Ok(config) => {
            log::info!("Config restored from storage");
            config
        }
        Err(e) => {
            log::warn!("Ignoring stored config: {}", e);
            MysteryConfig::default()
        }
    }
}

/// Validate and store a config document; used by the next `ChatHandle`.
#[wasm_bindgen(js_name = saveConfig)]
pub fn save_config(json: &str) -> Result<(), JsValue> {
    let config = MysteryConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let normalized = config.to_json().map_err(|e| JsValue::from_str(&e.to_string()))?;
    let storage = local_storage().ok_or_else(|| JsValue::from_str("localStorage unavailable"))?;
    storage.set_item(CONFIG_STORAGE_KEY, &normalized)?;
    log::info!("Config saved to storage");
    Ok(())
}
