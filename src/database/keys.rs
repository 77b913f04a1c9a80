//! Composite key convention for the single-table layout.
//!
//! Every item lives under a partition named after its parent chain
//! (`workspace#<ws>`, `workspace#<ws>#channel#<id>`, ...) and is addressed
//! inside that partition by `<child-type>#<child-id>`. Listing a parent's
//! children is a prefix query on `<child-type>#`.

use serde::{Deserialize, Serialize};

/// Primary key of a stored item. Doubles as the exclusive start key when
/// resuming a query.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Key {
    pub pk: String,
    pub sk: String,
}

impl Key {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

/// Partition key of a parent entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parent(String);

impl Parent {
    pub fn workspace(workspace_id: &str) -> Self {
        Self(format!("workspace#{}", workspace_id))
    }

    pub fn channel(workspace_id: &str, channel_id: &str) -> Self {
        Self(format!("workspace#{}#channel#{}", workspace_id, channel_id))
    }

    pub fn standup(workspace_id: &str, standup_id: &str) -> Self {
        Self(format!("workspace#{}#standup#{}", workspace_id, standup_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Full key of a child item under this parent.
    pub fn child(&self, sort_key: impl Into<String>) -> Key {
        Key::new(self.0.clone(), sort_key)
    }
}

impl std::fmt::Display for Parent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Child item types and their sort key prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Channel,
    Recording,
    Standup,
    Member,
    Update,
}

impl ChildKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ChildKind::Channel => "channel#",
            ChildKind::Recording => "recording#",
            ChildKind::Standup => "standup#",
            ChildKind::Member => "user#",
            ChildKind::Update => "update#",
        }
    }

    pub fn sort_key(self, id: &str) -> String {
        format!("{}{}", self.prefix(), id)
    }
}

/// Sort key prefix of every update recorded on `date` (`YYYY-MM-DD`).
pub fn update_date_prefix(date: &str) -> String {
    format!("{}{}#", ChildKind::Update.prefix(), date)
}

/// Sort key of a single update: `update#<date>#user#<userId>#<updateId>`.
pub fn update_sort_key(date: &str, user_id: &str, update_id: &str) -> String {
    format!(
        "{}{}#{}",
        update_date_prefix(date),
        ChildKind::Member.sort_key(user_id),
        update_id
    )
}

/// Partition of the inverted index for a member: `user#<userId>`.
pub fn member_partition(user_id: &str) -> String {
    ChildKind::Member.sort_key(user_id)
}

/// Inverted index sort prefix that selects a workspace's standups.
pub fn workspace_standups_prefix(workspace_id: &str) -> String {
    format!("{}#{}", Parent::workspace(workspace_id), ChildKind::Standup.prefix())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_parent_partitions() {
        assert_eq!(Parent::workspace("ws1").as_str(), "workspace#ws1");
        assert_eq!(Parent::channel("ws1", "ch1").as_str(), "workspace#ws1#channel#ch1");
        assert_eq!(Parent::standup("ws1", "s1").as_str(), "workspace#ws1#standup#s1");
    }

    #[test]
    fn builds_child_sort_keys() {
        assert_eq!(ChildKind::Channel.sort_key("abc"), "channel#abc");
        assert_eq!(ChildKind::Member.sort_key("user|1"), "user#user|1");
        assert_eq!(
            Parent::workspace("ws1").child(ChildKind::Standup.sort_key("s1")),
            Key::new("workspace#ws1", "standup#s1")
        );
    }

    #[test]
    fn update_keys_share_the_date_prefix() {
        let sk = update_sort_key("2020-01-28", "u1", "up1");
        assert_eq!(sk, "update#2020-01-28#user#u1#up1");
        assert!(sk.starts_with(&update_date_prefix("2020-01-28")));
        assert!(!sk.starts_with(&update_date_prefix("2020-01-2")));
    }

    #[test]
    fn inverted_index_prefix_matches_membership_partition() {
        let membership_pk = Parent::standup("ws1", "s1");
        assert!(membership_pk.as_str().starts_with(&workspace_standups_prefix("ws1")));
        assert!(!membership_pk.as_str().starts_with(&workspace_standups_prefix("ws2")));
        assert_eq!(member_partition("u1"), "user#u1");
    }
}
