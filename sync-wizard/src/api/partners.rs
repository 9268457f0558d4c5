// Partner rewards endpoint.

use super::{ApiClient, ApiError};
use crate::models::responses::RewardRow;

impl ApiClient {
    /// `GET /partners/rewards-history` — reward rows for one partner year.
    pub async fn rewards_history(
        &self,
        year: i32,
        partner_id: &str,
        is_master: bool,
    ) -> Result<Vec<RewardRow>, ApiError> {
        let year = year.to_string();
        let is_master = if is_master { "true" } else { "false" };
        self.get_json(
            "/partners/rewards-history",
            &[
                ("year", year.as_str()),
                ("partner_id", partner_id),
                ("is_master", is_master),
            ],
        )
        .await
    }
}
