// Data-sync endpoints: the single create/update write the wizard ends in.

use log::info;

use super::{ApiClient, ApiError};
use crate::models::requests::{SyncCreateRequest, SyncUpdateRequest};

/// `POST /data-sync/sync` — persist a new sync configuration.
pub async fn create_sync(
    client: &ApiClient,
    service: &str,
    req: &SyncCreateRequest,
) -> Result<(), ApiError> {
    client
        .post_unit("/data-sync/sync", &[("service_name", service)], req)
        .await?;
    info!(
        "[PHASE: api] [STEP: create_sync] Created sync for {} -> list {} ({})",
        service, req.list_id, req.list_name
    );
    Ok(())
}

/// `PUT /data-sync/sync` — update an existing sync configuration.
pub async fn update_sync(
    client: &ApiClient,
    service: &str,
    req: &SyncUpdateRequest,
) -> Result<(), ApiError> {
    client
        .put_unit("/data-sync/sync", &[("service_name", service)], req)
        .await?;
    info!(
        "[PHASE: api] [STEP: update_sync] Updated sync {} for {}",
        req.integrations_users_sync_id, service
    );
    Ok(())
}
