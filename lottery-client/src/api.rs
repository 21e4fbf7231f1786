//! Typed API surface of the lottery server
//!
//! One method per domain operation. `HttpClient` is the network-backed
//! implementation; tests substitute their own.

use crate::ClientResult;
use async_trait::async_trait;
use shared::models::{
    Department, DepartmentCreate, DepartmentUpdate, LotteryRecord, LotteryRecordCreate, Prize,
    PrizeCreate, PrizeUpdate, Settings, User, UserCreate, UserUpdate,
};

/// Remote access layer over the admin REST API
#[async_trait]
pub trait LotteryApi: Send + Sync {
    // ========== Prizes ==========
    async fn list_prizes(&self) -> ClientResult<Vec<Prize>>;
    async fn create_prize(&self, prize: &PrizeCreate) -> ClientResult<Prize>;
    async fn update_prize(&self, id: &str, prize: &PrizeUpdate) -> ClientResult<Prize>;
    async fn delete_prize(&self, id: &str) -> ClientResult<()>;

    // ========== Participants ==========
    async fn list_users(&self) -> ClientResult<Vec<User>>;
    async fn create_user(&self, user: &UserCreate) -> ClientResult<User>;
    async fn update_user(&self, id: &str, user: &UserUpdate) -> ClientResult<User>;
    async fn delete_user(&self, id: &str) -> ClientResult<()>;
    /// Flip a participant in or out of the draw pool
    async fn set_participation(&self, id: &str, participate: bool) -> ClientResult<User>;

    // ========== Departments ==========
    async fn list_departments(&self) -> ClientResult<Vec<Department>>;
    async fn create_department(&self, dept: &DepartmentCreate) -> ClientResult<Department>;
    async fn update_department(&self, id: &str, dept: &DepartmentUpdate)
    -> ClientResult<Department>;
    async fn delete_department(&self, id: &str) -> ClientResult<()>;

    // ========== Settings ==========
    async fn get_settings(&self) -> ClientResult<Settings>;
    /// Full-document replace; the server echoes the stored document
    async fn update_settings(&self, settings: &Settings) -> ClientResult<Settings>;

    // ========== Records ==========
    async fn list_records(&self) -> ClientResult<Vec<LotteryRecord>>;
    async fn create_record(&self, record: &LotteryRecordCreate) -> ClientResult<LotteryRecord>;
    /// Server-side export; returns the rendered document body
    async fn export_records(&self, format: &str) -> ClientResult<String>;

    // ========== Panel markup ==========
    /// Fetch a panel's HTML fragment for injection into the content region
    async fn fetch_fragment(&self, name: &str) -> ClientResult<String>;
}
