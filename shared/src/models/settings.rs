//! Run-time settings document

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event settings document.
///
/// The server owns the schema; the console treats it as an opaque JSON
/// object and replaces it wholesale on save. Panels read and write the
/// sub-keys they understand through the typed views below, and may attach
/// additional top-level keys (the prize panel saves its list under
/// `prizes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(pub Value);

impl Settings {
    pub fn new() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Get a top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a top-level key, coercing a non-object document to an object
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }
        if let Some(map) = self.0.as_object_mut() {
            map.insert(key.into(), value);
        }
    }

    /// Typed view of the `lottery` sub-document (defaults when absent)
    pub fn lottery(&self) -> LotterySettings {
        self.get("lottery")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn set_lottery(&mut self, lottery: &LotterySettings) {
        if let Ok(value) = serde_json::to_value(lottery) {
            self.set("lottery", value);
        }
    }

    /// Typed view of the `system` sub-document (defaults when absent)
    pub fn system(&self) -> SystemSettings {
        self.get("system")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn set_system(&mut self, system: &SystemSettings) {
        if let Ok(value) = serde_json::to_value(system) {
            self.set("system", value);
        }
    }

    pub fn theme(&self) -> Option<&str> {
        self.get("theme").and_then(Value::as_str)
    }

    pub fn set_theme(&mut self, theme: impl Into<String>) {
        self.set("theme", Value::String(theme.into()));
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw behavior settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LotterySettings {
    /// Roll speed, 1-10
    pub speed: u32,
    pub show_department: bool,
    pub show_position: bool,
    pub show_number: bool,
    pub show_avatar: bool,
    /// Allow a participant to win more than once
    pub allow_repeat: bool,
    pub dept_limit: bool,
    pub position_limit: bool,
}

impl Default for LotterySettings {
    fn default() -> Self {
        Self {
            speed: 5,
            show_department: true,
            show_position: true,
            show_number: true,
            show_avatar: true,
            allow_repeat: false,
            dept_limit: false,
            position_limit: false,
        }
    }
}

/// Stage audio/visual settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemSettings {
    /// Background music volume, 0-100
    pub bgm_volume: u32,
    /// Effect volume, 0-100
    pub effect_volume: u32,
    /// Visual effect intensity, 1-10
    pub effect_intensity: u32,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            bgm_volume: 50,
            effect_volume: 80,
            effect_intensity: 7,
        }
    }
}
