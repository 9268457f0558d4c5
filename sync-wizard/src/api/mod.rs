// Backend REST client
// Thin reqwest wrapper: bearer auth, JSON in/out, typed errors, GET retry.

pub mod dashboard;
pub mod integrations;
pub mod leads;
pub mod partners;
pub mod sync;

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

use crate::config::AppConfig;
use crate::models::requests::{SyncCreateRequest, SyncUpdateRequest};
use crate::models::responses::{RemoteList, SubAccount};
use crate::utils::logging::{mask_token, mask_url};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("{0}")]
    Backend(String),
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// REST client for the product backend. Cheap to clone; the inner reqwest
/// client pools connections across clones.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(cfg: &AppConfig) -> Self {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("sync-wizard/0.1")
            .build()
            .expect("Failed to build HTTP client");

        let base_url = cfg.base_url_trimmed().to_string();
        debug!(
            "[PHASE: api] [STEP: init] Client for {} (token {})",
            mask_url(&base_url),
            mask_token(&cfg.api_token)
        );

        Self {
            base_url,
            token: cfg.api_token.clone(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.token)
        }
    }

    /// GET with transient-failure retry. Only transport errors are retried;
    /// a non-2xx answer is a final answer.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("[PHASE: api] [STEP: get] GET {}", mask_url(&url));

        let strategy = FixedInterval::from_millis(500).take(2);
        let resp = Retry::spawn(strategy, || {
            self.authed(self.http.get(&url)).query(query).send()
        })
        .await?;

        Self::decode_json(resp).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("[PHASE: api] [STEP: post] POST {}", mask_url(&url));

        let resp = self
            .authed(self.http.post(&url))
            .query(query)
            .json(body)
            .send()
            .await?;
        Self::decode_json(resp).await
    }

    /// POST where only the status matters (backend answers 200/201 with an
    /// empty or irrelevant body).
    pub(crate) async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!("[PHASE: api] [STEP: post] POST {}", mask_url(&url));

        let resp = self
            .authed(self.http.post(&url))
            .query(query)
            .json(body)
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    pub(crate) async fn put_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!("[PHASE: api] [STEP: put] PUT {}", mask_url(&url));

        let resp = self
            .authed(self.http.put(&url))
            .query(query)
            .json(body)
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    /// POST that downloads a binary blob (CSV export).
    pub(crate) async fn post_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.url(path);
        debug!("[PHASE: api] [STEP: post] POST {} (binary)", mask_url(&url));

        let resp = self.authed(self.http.post(&url)).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }

    async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn expect_success(resp: reqwest::Response) -> Result<(), ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// The slice of the backend the wizard engine needs. The engine only ever
/// sees this trait, so tests drive it with a recording mock instead of a
/// network.
#[async_trait]
pub trait SyncBackend: Send + Sync {
    async fn fetch_lists(
        &self,
        service: &str,
        customer_id: Option<&str>,
    ) -> Result<Vec<RemoteList>, ApiError>;

    async fn fetch_sub_accounts(&self, service: &str) -> Result<Vec<SubAccount>, ApiError>;

    async fn create_remote_list(
        &self,
        service: &str,
        name: &str,
        customer_id: Option<&str>,
    ) -> Result<RemoteList, ApiError>;

    async fn create_sync(&self, service: &str, req: &SyncCreateRequest) -> Result<(), ApiError>;

    async fn update_sync(&self, service: &str, req: &SyncUpdateRequest) -> Result<(), ApiError>;
}

#[async_trait]
impl SyncBackend for ApiClient {
    async fn fetch_lists(
        &self,
        service: &str,
        customer_id: Option<&str>,
    ) -> Result<Vec<RemoteList>, ApiError> {
        self.get_channels(service, customer_id).await
    }

    async fn fetch_sub_accounts(&self, service: &str) -> Result<Vec<SubAccount>, ApiError> {
        self.customers_info(service).await
    }

    async fn create_remote_list(
        &self,
        service: &str,
        name: &str,
        customer_id: Option<&str>,
    ) -> Result<RemoteList, ApiError> {
        self.create_list(service, name, customer_id).await
    }

    async fn create_sync(&self, service: &str, req: &SyncCreateRequest) -> Result<(), ApiError> {
        sync::create_sync(self, service, req).await
    }

    async fn update_sync(&self, service: &str, req: &SyncUpdateRequest) -> Result<(), ApiError> {
        sync::update_sync(self, service, req).await
    }
}
