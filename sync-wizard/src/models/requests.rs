// API request models
// Wire shapes for the data-sync backend (snake_case JSON).

use serde::{Deserialize, Serialize};

// =========================
// Field mapping
// =========================

/// One source-attribute -> destination-field association as the backend
/// expects it inside `data_map`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapEntry {
    pub source_field: String,
    pub destination_field: String,
}

// =========================
// Remote list creation
// =========================

/// Body for `POST /integrations/sync/list/` (query: `service_name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

// =========================
// Sync create / update
// =========================

/// Body for `POST /data-sync/sync` (query: `service_name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCreateRequest {
    pub list_id: String,
    pub list_name: String,
    pub leads_type: String,
    pub data_map: Vec<FieldMapEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

/// Body for `PUT /data-sync/sync` (query: `service_name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncUpdateRequest {
    pub integrations_users_sync_id: String,
    pub list_id: String,
    pub list_name: String,
    pub leads_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_map: Option<Vec<FieldMapEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
}

// =========================
// Leads export
// =========================

/// Body for `POST /leads/download_leads`; the response is a CSV blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLeadsRequest {
    pub leads_ids: Vec<String>,
}
