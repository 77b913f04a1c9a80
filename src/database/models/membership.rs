use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Links a user to a standup. Stored under the standup's partition with the
/// user as sort key, so the inverted index yields "standups for user".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub standup_id: String,
    pub standup_name: String,
    pub user_id: String,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}
