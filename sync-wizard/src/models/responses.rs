// API response models
// Wire shapes for the data-sync backend (snake_case JSON).

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Some remote services return list ids as JSON numbers, others as strings.
/// Normalize both to `String` so the UI never has to care.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

// =========================
// Integrations / credentials
// =========================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub service_name: String,
    #[serde(default)]
    pub data_sync: bool,
}

/// One connected third-party account. The backend enforces at most one
/// credential per `service_name` per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationCredential {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub service_name: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub is_failed: Option<bool>,
}

// =========================
// Remote lists / channels
// =========================

/// A named collection on the third-party service (Slack channel, Google Ads
/// customer list, ...). `id == "-1"` is the local "create on save" sentinel
/// and must never reach the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteList {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
}

/// `GET /integrations/{service}/get-channels`. Slack answers with `channels`,
/// the list-based services with `user_lists`; both land in `lists`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelsResponse {
    pub status: String,
    #[serde(default, alias = "user_lists", alias = "channels")]
    pub lists: Vec<RemoteList>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A Google Ads sub-account ("customer").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAccount {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub descriptive_name: String,
}

/// `GET /integrations/{service}/customers-info`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomersResponse {
    pub status: String,
    #[serde(default)]
    pub customers: Vec<SubAccount>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /integrations/sync/list/` answers either with the full created
/// channel or with a bare id, depending on the service.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateListResponse {
    #[serde(default)]
    pub channel: Option<RemoteList>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl CreateListResponse {
    /// Backend-assigned id of the created list, whichever field carried it.
    pub fn list_id(&self) -> Option<String> {
        if let Some(channel) = &self.channel {
            return Some(channel.id.clone());
        }
        match &self.id {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

// =========================
// Dashboard / partners
// =========================

/// `GET /dashboard/contact` aggregate counts, keyed by metric name
/// (e.g. "contacts", "visitors", "converted_sales").
#[derive(Debug, Clone, Deserialize)]
pub struct ContactCountsResponse {
    #[serde(default)]
    pub total_counts: HashMap<String, i64>,
}

/// One row of `GET /partners/rewards-history`.
#[derive(Debug, Clone, Deserialize)]
pub struct RewardRow {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub referred_customers: i64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub status: Option<String>,
}

// =============================================================================
// Unit tests: wire-shape tolerance
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_list_accepts_numeric_id() {
        let list: RemoteList = serde_json::from_str(r#"{"id": 42, "name": "Newsletter"}"#)
            .expect("numeric id should deserialize");
        assert_eq!(list.id, "42");
        assert_eq!(list.name, "Newsletter");
    }

    #[test]
    fn remote_list_accepts_string_id() {
        let list: RemoteList = serde_json::from_str(r##"{"id": "C024BE91L", "name": "#general"}"##)
            .expect("string id should deserialize");
        assert_eq!(list.id, "C024BE91L");
    }

    #[test]
    fn channels_response_reads_user_lists_field() {
        let raw = r#"{"status": "ok", "user_lists": [{"id": "1", "name": "A"}]}"#;
        let resp: ChannelsResponse = serde_json::from_str(raw).expect("user_lists shape");
        assert_eq!(resp.lists.len(), 1, "user_lists should land in lists: {:?}", resp.lists);
    }

    #[test]
    fn channels_response_reads_channels_field() {
        let raw = r##"{"status": "ok", "channels": [{"id": "1", "name": "#alerts"}]}"##;
        let resp: ChannelsResponse = serde_json::from_str(raw).expect("channels shape");
        assert_eq!(resp.lists.len(), 1, "channels should land in lists: {:?}", resp.lists);
    }

    #[test]
    fn channels_response_tolerates_missing_lists_and_message() {
        let resp: ChannelsResponse =
            serde_json::from_str(r#"{"status": "error"}"#).expect("minimal shape");
        assert!(resp.lists.is_empty());
        assert!(resp.message.is_none());
    }

    #[test]
    fn create_list_response_prefers_channel_id() {
        let raw = r#"{"channel": {"id": "C1", "name": "new"}, "id": "ignored"}"#;
        let resp: CreateListResponse = serde_json::from_str(raw).expect("channel shape");
        assert_eq!(resp.list_id().as_deref(), Some("C1"));
    }

    #[test]
    fn create_list_response_falls_back_to_bare_id() {
        let resp: CreateListResponse =
            serde_json::from_str(r#"{"id": 7}"#).expect("bare numeric id");
        assert_eq!(resp.list_id().as_deref(), Some("7"));

        let resp: CreateListResponse =
            serde_json::from_str(r#"{"id": "abc"}"#).expect("bare string id");
        assert_eq!(resp.list_id().as_deref(), Some("abc"));
    }

    #[test]
    fn create_list_response_without_id_yields_none() {
        let resp: CreateListResponse = serde_json::from_str(r#"{}"#).expect("empty shape");
        assert!(resp.list_id().is_none(), "no id anywhere should be None");
    }
}
