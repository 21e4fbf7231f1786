//! HTTP client for network-based API calls

use crate::{ClientConfig, ClientError, ClientResult, LotteryApi, SessionStore};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiError;
use shared::client::{LoginRequest, LoginResponse, TokenCheckResponse};
use shared::models::{
    Department, DepartmentCreate, DepartmentUpdate, LotteryRecord, LotteryRecordCreate, Prize,
    PrizeCreate, PrizeUpdate, Settings, User, UserCreate, UserUpdate,
};
use std::sync::Arc;

/// HTTP client for making authenticated requests to the lottery server
///
/// The bearer token is read from the session store on every call, so a
/// login (or logout) anywhere in the process is picked up immediately.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// The session store backing this client
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, &url);

        if let Some(token) = self.session.token() {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token));
        }

        request
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.request(Method::GET, path).send().await?;
        self.parse_json(response).await
    }

    async fn get_text(&self, path: &str) -> ClientResult<String> {
        let response = self.request(Method::GET, path).send().await?;
        let response = self.check_status(response).await?;
        Ok(response.text().await?)
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        self.parse_json(response).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ClientResult<T> {
        let response = self.request(Method::PUT, path).json(body).send().await?;
        self.parse_json(response).await
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        self.check_status(response).await?;
        Ok(())
    }

    async fn parse_json<T: DeserializeOwned>(&self, response: reqwest::Response) -> ClientResult<T> {
        let response = self.check_status(response).await?;
        response.json().await.map_err(Into::into)
    }

    /// Map non-2xx statuses into `ClientError`. A 401 invalidates the local
    /// session token before surfacing; the caller-side redirect is the
    /// error reporter's job so it happens exactly once.
    async fn check_status(&self, response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body: ApiError = response
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_else(|| ApiError::new(status.as_u16()));
        body.status = status.as_u16();
        let message = body.message.unwrap_or_default();

        tracing::debug!(status = status.as_u16(), %message, "request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => {
                self.session.clear();
                ClientError::Unauthorized
            }
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            s if s.is_server_error() => ClientError::Server {
                status: s.as_u16(),
                message,
            },
            s => ClientError::Unexpected {
                status: s.as_u16(),
                message,
            },
        })
    }

    // ========== Auth API ==========

    /// Login; on success the token is written to the session store, with a
    /// seven-day remember-me window when requested
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        remember: bool,
    ) -> ClientResult<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            remember,
        };

        let response: LoginResponse = self.post("/api/login", &request).await?;

        match (response.success, &response.token) {
            (true, Some(token)) => {
                self.session.set_token(token.clone(), remember)?;
                tracing::info!(username, remember, "logged in");
            }
            (true, None) => {
                return Err(ClientError::InvalidResponse(
                    "login succeeded without a token".to_string(),
                ));
            }
            _ => {}
        }

        Ok(response)
    }

    /// Logout and drop the local session
    pub async fn logout(&self) -> ClientResult<()> {
        let result: ClientResult<serde_json::Value> =
            self.post("/api/logout", &serde_json::json!({})).await;
        self.session.clear();
        result.map(|_| ())
    }

    /// Ask the server whether the current token is still valid
    pub async fn check_token(&self) -> ClientResult<TokenCheckResponse> {
        self.get("/api/check-token").await
    }
}

#[async_trait]
impl LotteryApi for HttpClient {
    async fn list_prizes(&self) -> ClientResult<Vec<Prize>> {
        self.get("/api/prizes").await
    }

    async fn create_prize(&self, prize: &PrizeCreate) -> ClientResult<Prize> {
        self.post("/api/prizes", prize).await
    }

    async fn update_prize(&self, id: &str, prize: &PrizeUpdate) -> ClientResult<Prize> {
        self.put(&format!("/api/prizes/{}", id), prize).await
    }

    async fn delete_prize(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("/api/prizes/{}", id)).await
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get("/api/users").await
    }

    async fn create_user(&self, user: &UserCreate) -> ClientResult<User> {
        self.post("/api/users", user).await
    }

    async fn update_user(&self, id: &str, user: &UserUpdate) -> ClientResult<User> {
        self.put(&format!("/api/users/{}", id), user).await
    }

    async fn delete_user(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("/api/users/{}", id)).await
    }

    async fn set_participation(&self, id: &str, participate: bool) -> ClientResult<User> {
        self.put(
            &format!("/api/users/{}/participation", id),
            &serde_json::json!({ "participate": participate }),
        )
        .await
    }

    async fn list_departments(&self) -> ClientResult<Vec<Department>> {
        self.get("/api/departments").await
    }

    async fn create_department(&self, dept: &DepartmentCreate) -> ClientResult<Department> {
        self.post("/api/departments", dept).await
    }

    async fn update_department(
        &self,
        id: &str,
        dept: &DepartmentUpdate,
    ) -> ClientResult<Department> {
        self.put(&format!("/api/departments/{}", id), dept).await
    }

    async fn delete_department(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("/api/departments/{}", id)).await
    }

    async fn get_settings(&self) -> ClientResult<Settings> {
        self.get("/api/settings").await
    }

    async fn update_settings(&self, settings: &Settings) -> ClientResult<Settings> {
        self.put("/api/settings", settings).await
    }

    async fn list_records(&self) -> ClientResult<Vec<LotteryRecord>> {
        self.get("/api/lottery/records").await
    }

    async fn create_record(&self, record: &LotteryRecordCreate) -> ClientResult<LotteryRecord> {
        self.post("/api/lottery/records", record).await
    }

    async fn export_records(&self, format: &str) -> ClientResult<String> {
        self.get_text(&format!("/api/lottery/records/export?format={}", format))
            .await
    }

    async fn fetch_fragment(&self, name: &str) -> ClientResult<String> {
        self.get_text(&format!("/admin/components/{}.html", name))
            .await
    }
}
