//! Lottery Record Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Draw audit entry
///
/// Denormalized and append-only: prize and participant names are copied in
/// at draw time so the record survives later edits or deletions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotteryRecord {
    pub id: Option<String>,
    pub prize_id: String,
    pub user_id: String,
    pub prize_name: String,
    pub user_name: String,
    #[serde(default)]
    pub user_department: String,
    pub timestamp: DateTime<Utc>,
}

/// Create record payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotteryRecordCreate {
    pub prize_id: String,
    pub user_id: String,
    pub prize_name: String,
    pub user_name: String,
    pub user_department: Option<String>,
    /// Defaults to server time when absent
    pub timestamp: Option<DateTime<Utc>>,
}
