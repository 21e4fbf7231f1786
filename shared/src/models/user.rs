//! Participant Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lottery participant entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<String>,
    /// Employee number, unique business key
    pub number: String,
    pub name: String,
    /// Department reference (code, not id)
    #[serde(default)]
    pub department: String,
    pub position: Option<String>,
    pub avatar: Option<String>,
    /// Whether the participant is in the draw pool
    #[serde(default = "default_participate")]
    pub participate_lottery: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_participate() -> bool {
    true
}

/// Create participant payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub number: String,
    pub name: String,
    pub department: String,
    pub position: Option<String>,
    pub avatar: Option<String>,
    pub participate_lottery: Option<bool>,
}

/// Update participant payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub number: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
    pub participate_lottery: Option<bool>,
}
