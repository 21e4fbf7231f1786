//! Prize Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prize entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub id: Option<String>,
    pub name: String,
    /// Prize tier (e.g. "first", "second", "special")
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    /// Total units configured for the event
    pub count: u32,
    /// Units not yet drawn; equals `count` at creation
    pub remaining: u32,
    /// Nominal value in cents
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create prize payload
///
/// Carries no `remaining`; the server defaults it to `count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub count: u32,
    pub value: Option<i64>,
    pub order: Option<i32>,
}

/// Update prize payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrizeUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub count: Option<u32>,
    pub remaining: Option<u32>,
    pub value: Option<i64>,
    pub order: Option<i32>,
}

impl PrizeCreate {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            kind: None,
            description: None,
            image: None,
            count,
            value: None,
            order: None,
        }
    }
}
