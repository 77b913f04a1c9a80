use chrono::NaiveDate;

use crate::database::keys::{update_date_prefix, workspace_standups_prefix, ChildKind, Parent};
use crate::database::models::{new_id, now, Membership, Standup, Update};
use crate::database::{DatabaseError, Page, PageRequest, StorageService};
use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum StandupError {
    #[error("user {user_id} is not a member of standup {standup_id}")]
    NotMember { standup_id: String, user_id: String },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<StandupError> for ApiError {
    fn from(err: StandupError) -> Self {
        match err {
            // Non-members get the same answer as for a standup that does not exist.
            StandupError::NotMember { .. } => ApiError::not_found("standup"),
            StandupError::Database(err) => err.into(),
        }
    }
}

/// Standups and their members.
///
/// A standup lives under its workspace (`workspace#<ws>` / `standup#<id>`).
/// Each member has a record under the standup (`workspace#<ws>#standup#<id>` /
/// `user#<userId>`), which the inverted index turns into a per-user listing.
/// Only members can read a standup or anything under it.
#[derive(Clone)]
pub struct StandupService {
    storage: StorageService,
}

impl StandupService {
    pub fn new(storage: StorageService) -> Self {
        Self { storage }
    }

    /// Create a standup together with its creator's membership.
    pub async fn create(&self, workspace_id: &str, user_id: &str, name: String) -> Result<Standup, StandupError> {
        let ts = now();
        let standup = Standup {
            id: new_id(),
            created_by: user_id.to_string(),
            created_at: ts,
            updated_at: ts,
            name,
            is_private: true,
        };
        let membership = Membership {
            standup_id: standup.id.clone(),
            standup_name: standup.name.clone(),
            user_id: user_id.to_string(),
            created_at: ts,
        };

        let standup_key = Parent::workspace(workspace_id).child(ChildKind::Standup.sort_key(&standup.id));
        let membership_key = Parent::standup(workspace_id, &standup.id).child(ChildKind::Member.sort_key(user_id));
        self.storage
            .create_with_membership((standup_key, &standup), (membership_key, &membership))
            .await?;

        tracing::info!(workspace_id, standup_id = %standup.id, "Created standup");
        Ok(standup)
    }

    /// Standups of the workspace that `user_id` is a member of.
    pub async fn get_all(
        &self,
        workspace_id: &str,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<Membership>, StandupError> {
        Ok(self
            .storage
            .list_by_member(user_id, &workspace_standups_prefix(workspace_id), page)
            .await?)
    }

    pub async fn get(&self, workspace_id: &str, user_id: &str, standup_id: &str) -> Result<Option<Standup>, StandupError> {
        self.ensure_member(workspace_id, user_id, standup_id).await?;
        let key = Parent::workspace(workspace_id).child(ChildKind::Standup.sort_key(standup_id));
        Ok(self.storage.get_one(&key).await?)
    }

    /// Every update recorded on `date`.
    pub async fn get_updates(
        &self,
        workspace_id: &str,
        user_id: &str,
        standup_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<Update>, StandupError> {
        self.ensure_member(workspace_id, user_id, standup_id).await?;
        let prefix = update_date_prefix(&date.format("%Y-%m-%d").to_string());
        let page = self
            .storage
            .list_by_parent(&Parent::standup(workspace_id, standup_id), &prefix, PageRequest::unbounded())
            .await?;
        Ok(page.items)
    }

    pub async fn get_members(
        &self,
        workspace_id: &str,
        user_id: &str,
        standup_id: &str,
    ) -> Result<Vec<Membership>, StandupError> {
        self.ensure_member(workspace_id, user_id, standup_id).await?;
        let page = self
            .storage
            .list_by_parent(
                &Parent::standup(workspace_id, standup_id),
                ChildKind::Member.prefix(),
                PageRequest::unbounded(),
            )
            .await?;
        Ok(page.items)
    }

    async fn ensure_member(&self, workspace_id: &str, user_id: &str, standup_id: &str) -> Result<(), StandupError> {
        let parent = Parent::standup(workspace_id, standup_id);
        if self.storage.check_membership(&parent, user_id).await? {
            return Ok(());
        }
        tracing::debug!(standup_id, user_id, "Membership check failed");
        Err(StandupError::NotMember {
            standup_id: standup_id.to_string(),
            user_id: user_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::keys::update_sort_key;
    use crate::database::models::TranscodingStatus;
    use crate::database::store::memory::MemoryStore;
    use std::sync::Arc;

    fn storage() -> StorageService {
        StorageService::new(Arc::new(MemoryStore::new()))
    }

    fn update(id: &str, user_id: &str) -> Update {
        let ts = now();
        Update {
            id: id.to_string(),
            created_by: user_id.to_string(),
            created_at: ts,
            updated_at: ts,
            name: format!("update {}", id),
            transcoded_file_key: None,
            transcoding_status: TranscodingStatus::Pending,
        }
    }

    #[tokio::test]
    async fn create_makes_the_creator_a_member() {
        let service = StandupService::new(storage());
        let standup = service.create("w1", "u1", "Daily".to_string()).await.unwrap();
        assert!(standup.is_private);
        assert_eq!(standup.created_by, "u1");

        let members = service.get_members("w1", "u1", &standup.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, "u1");
        assert_eq!(members[0].standup_name, "Daily");

        let found = service.get("w1", "u1", &standup.id).await.unwrap();
        assert_eq!(found, Some(standup));
    }

    #[tokio::test]
    async fn get_all_lists_only_the_callers_standups_in_the_workspace() {
        let service = StandupService::new(storage());
        let mine = service.create("w1", "u1", "Mine".to_string()).await.unwrap();
        service.create("w1", "u2", "Theirs".to_string()).await.unwrap();
        service.create("w2", "u1", "Elsewhere".to_string()).await.unwrap();

        let page = service.get_all("w1", "u1", PageRequest::new(10, None)).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].standup_id, mine.id);
        assert!(page.next.is_none());
    }

    #[tokio::test]
    async fn non_members_cannot_tell_a_standup_exists() {
        let service = StandupService::new(storage());
        let standup = service.create("w1", "u1", "Daily".to_string()).await.unwrap();

        let err = service.get("w1", "u2", &standup.id).await.unwrap_err();
        assert!(matches!(err, StandupError::NotMember { .. }));
        let err = service.get_members("w1", "u2", "missing").await.unwrap_err();
        assert!(matches!(ApiError::from(err), ApiError::NotFound { resource: "standup" }));
    }

    #[tokio::test]
    async fn get_updates_is_scoped_to_one_date() {
        let storage = storage();
        let service = StandupService::new(storage.clone());
        let standup = service.create("w1", "u1", "Daily".to_string()).await.unwrap();

        let parent = Parent::standup("w1", &standup.id);
        for (date, id) in [("2020-01-28", "a"), ("2020-01-28", "b"), ("2020-01-29", "c")] {
            storage
                .insert(parent.child(update_sort_key(date, "u1", id)), update(id, "u1"))
                .await
                .unwrap();
        }

        let date = NaiveDate::from_ymd_opt(2020, 1, 28).unwrap();
        let updates = service.get_updates("w1", "u1", &standup.id, date).await.unwrap();
        let ids: Vec<_> = updates.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let err = service.get_updates("w1", "u2", &standup.id, date).await.unwrap_err();
        assert!(matches!(err, StandupError::NotMember { .. }));
    }
}
