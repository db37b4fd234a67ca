//! Game settings and preferences
//!
//! Persisted separately from the high score in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::STAR_COUNT;
use crate::error::StorageError;
use crate::sim::TickConfig;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Screen shake on impact
    pub screen_shake: bool,
    /// Impact particle bursts
    pub particles: bool,
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
    /// Background stars per session
    pub star_count: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            particles: true,
            reduced_motion: false,
            star_count: STAR_COUNT,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Shake magnitude to hand the renderer
    pub fn shake_for_render(&self, shake: f32) -> f32 {
        if self.effective_screen_shake() {
            shake
        } else {
            0.0
        }
    }

    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            particles: self.particles,
        }
    }

    /// Parse stored JSON; anything unreadable yields defaults
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed settings: {}", e);
            Self::default()
        })
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "star_dodge_settings";

    /// Encode and hand to `write(key, json)`. Returns whether it was stored.
    pub fn persist_with(
        &self,
        write: impl FnOnce(&str, &str) -> Result<(), StorageError>,
    ) -> bool {
        let result = serde_json::to_string(self)
            .map_err(|e| StorageError::Write(e.to_string()))
            .and_then(|json| write(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => {
                log::info!("Settings saved");
                true
            }
            Err(e) => {
                log::warn!("Failed to save settings: {}", e);
                false
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        self.persist_with(|key, json| {
            storage
                .ok_or(StorageError::Unavailable)?
                .set_item(key, json)
                .map_err(|e| StorageError::Write(format!("{:?}", e)))
        });
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_shake() {
        let mut settings = Settings::default();
        assert_eq!(settings.shake_for_render(12.0), 12.0);

        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());
        assert_eq!(settings.shake_for_render(12.0), 0.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{"particles": false}"#);
        assert!(!settings.particles);
        assert!(settings.screen_shake);
        assert_eq!(settings.star_count, STAR_COUNT);
        assert!(!settings.tick_config().particles);
    }

    #[test]
    fn test_persist_reports_write_outcome() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut written = None;
        assert!(settings.persist_with(|key, json| {
            written = Some((key.to_string(), json.to_string()));
            Ok(())
        }));
        let (key, json) = written.unwrap();
        assert_eq!(key, "star_dodge_settings");
        assert_eq!(Settings::from_json(&json), settings);

        assert!(!settings.persist_with(|_, _| Err(StorageError::Write("quota".to_string()))));
        assert!(!settings.persist_with(|_, _| Err(StorageError::Unavailable)));
    }

    #[test]
    fn test_garbage_json_yields_defaults() {
        assert_eq!(Settings::from_json("{{nope"), Settings::default());
    }
}
