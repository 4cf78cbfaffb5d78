//! LocalStorage access
//!
//! Browsers without storage (private mode, sandboxed iframes) behave like an
//! empty store that drops writes. Natively every key is absent.

/// Raw string stored under `key`
#[cfg(target_arch = "wasm32")]
pub fn read(key: &str) -> Option<String> {
    let storage = web_sys::window()?.local_storage().ok().flatten()?;
    storage.get_item(key).ok().flatten()
}

/// Store `value` under `key`, returning whether it stuck
#[cfg(target_arch = "wasm32")]
pub fn write(key: &str, value: &str) -> bool {
    let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) else {
        return false;
    };
    match storage.set_item(key, value) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("LocalStorage write to {} failed: {:?}", key, e);
            false
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn read(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write(_key: &str, _value: &str) -> bool {
    false
}

/// Deserialize the JSON stored under `key`
///
/// Missing and unreadable values both come back as `None`.
pub fn read_json<T: serde::de::DeserializeOwned>(key: &str) -> Option<T> {
    let json = read(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring unreadable {}: {}", key, e);
            None
        }
    }
}

/// Serialize `value` as JSON under `key`
pub fn write_json<T: serde::Serialize>(key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => write(key, &json),
        Err(e) => {
            log::warn!("Could not serialize {}: {}", key, e);
            false
        }
    }
}
