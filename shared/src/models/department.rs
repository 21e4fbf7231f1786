//! Department Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Department entity
///
/// `parent` is a soft reference to another department's `code`. The console
/// rejects writes that would close a parent cycle; existing data is taken
/// as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Option<String>,
    pub name: String,
    /// Unique department code
    pub code: String,
    pub parent: Option<String>,
    #[serde(default)]
    pub order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create department payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCreate {
    pub name: String,
    pub code: String,
    pub parent: Option<String>,
    pub order: Option<i32>,
}

/// Update department payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub parent: Option<String>,
    pub order: Option<i32>,
}
