// Integration endpoints: available services, connected credentials,
// remote lists/channels, Google Ads sub-accounts, inline list creation.

use log::{info, warn};

use super::{ApiClient, ApiError};
use crate::models::requests::CreateListRequest;
use crate::models::responses::{
    ChannelsResponse, CreateListResponse, CustomersResponse, Integration, IntegrationCredential,
    RemoteList, SubAccount,
};

impl ApiClient {
    /// `GET /integrations/` — integration types the product offers.
    pub async fn list_integrations(&self) -> Result<Vec<Integration>, ApiError> {
        self.get_json("/integrations/", &[]).await
    }

    /// `GET /integrations/credentials/` — the user's connected accounts.
    pub async fn list_credentials(&self) -> Result<Vec<IntegrationCredential>, ApiError> {
        self.get_json("/integrations/credentials/", &[]).await
    }

    /// `GET /integrations/check-limit-reached` — plan-limit gate consulted
    /// before opening a create-mode wizard.
    pub async fn check_limit_reached(&self) -> Result<bool, ApiError> {
        self.get_json("/integrations/check-limit-reached", &[]).await
    }

    /// `GET /integrations/{service}/get-channels` — remote lists/channels,
    /// optionally scoped to a sub-account (`customer_id`).
    pub async fn get_channels(
        &self,
        service: &str,
        customer_id: Option<&str>,
    ) -> Result<Vec<RemoteList>, ApiError> {
        let path = format!("/integrations/{}/get-channels", service);
        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(id) = customer_id {
            query.push(("customer_id", id));
        }

        let resp: ChannelsResponse = self.get_json(&path, &query).await?;
        if resp.status == "error" {
            let message = resp
                .message
                .unwrap_or_else(|| "Failed to fetch lists".to_string());
            warn!(
                "[PHASE: api] [STEP: get_channels] Backend error for {}: {}",
                service, message
            );
            return Err(ApiError::Backend(message));
        }

        info!(
            "[PHASE: api] [STEP: get_channels] Fetched {} list(s) for {}",
            resp.lists.len(),
            service
        );
        Ok(resp.lists)
    }

    /// `GET /integrations/{service}/customers-info` — sub-accounts for
    /// services that scope lists per customer (Google Ads).
    pub async fn customers_info(&self, service: &str) -> Result<Vec<SubAccount>, ApiError> {
        let path = format!("/integrations/{}/customers-info", service);
        let resp: CustomersResponse = self.get_json(&path, &[]).await?;
        if resp.status == "error" {
            let message = resp
                .message
                .unwrap_or_else(|| "Failed to fetch sub-accounts".to_string());
            return Err(ApiError::Backend(message));
        }
        Ok(resp.customers)
    }

    /// `POST /integrations/sync/list/` — create a remote list on the
    /// third-party side. Used to resolve a pending (`"-1"`) selection at
    /// save time.
    pub async fn create_list(
        &self,
        service: &str,
        name: &str,
        customer_id: Option<&str>,
    ) -> Result<RemoteList, ApiError> {
        let body = CreateListRequest {
            name: name.to_string(),
            customer_id: customer_id.map(str::to_string),
        };

        let resp: CreateListResponse = self
            .post_json("/integrations/sync/list/", &[("service_name", service)], &body)
            .await?;

        let id = resp.list_id().ok_or_else(|| {
            ApiError::Decode("create-list response carried no id".to_string())
        })?;
        info!(
            "[PHASE: api] [STEP: create_list] Created list '{}' (id {}) on {}",
            name, id, service
        );

        Ok(RemoteList {
            id,
            name: name.to_string(),
        })
    }
}
