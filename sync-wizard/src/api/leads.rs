// Lead export endpoint.

use log::info;

use super::{ApiClient, ApiError};
use crate::models::requests::DownloadLeadsRequest;

impl ApiClient {
    /// `POST /leads/download_leads` — export the given leads as a CSV blob.
    pub async fn download_leads(&self, leads_ids: &[String]) -> Result<Vec<u8>, ApiError> {
        let body = DownloadLeadsRequest {
            leads_ids: leads_ids.to_vec(),
        };
        let bytes = self.post_bytes("/leads/download_leads", &body).await?;
        info!(
            "[PHASE: api] [STEP: download_leads] Downloaded {} bytes for {} lead(s)",
            bytes.len(),
            leads_ids.len()
        );
        Ok(bytes)
    }
}
