// Dashboard aggregate endpoint.

use super::{ApiClient, ApiError};
use crate::models::responses::ContactCountsResponse;

impl ApiClient {
    /// `GET /dashboard/contact` — aggregate contact counts for a unix-seconds
    /// date range.
    pub async fn contact_counts(
        &self,
        from_date: i64,
        to_date: i64,
    ) -> Result<ContactCountsResponse, ApiError> {
        let from = from_date.to_string();
        let to = to_date.to_string();
        self.get_json(
            "/dashboard/contact",
            &[("from_date", from.as_str()), ("to_date", to.as_str())],
        )
        .await
    }
}
