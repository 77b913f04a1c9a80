use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel recording. Written by the transcoding pipeline, read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub id: String,
    pub workspace_id: String,
    pub channel_id: String,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscodingStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}
