use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::recording::TranscodingStatus;

/// A member's recorded update for one standup day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub id: String,
    pub created_by: String,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcoded_file_key: Option<String>,
    #[serde(default)]
    pub transcoding_status: TranscodingStatus,
}
