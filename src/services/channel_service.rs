use crate::database::keys::{ChildKind, Parent};
use crate::database::models::{new_id, now, Channel};
use crate::database::{DatabaseError, Page, PageRequest, StorageService};

/// Channels of a workspace, stored under `workspace#<ws>` / `channel#<id>`.
#[derive(Clone)]
pub struct ChannelService {
    storage: StorageService,
}

impl ChannelService {
    pub fn new(storage: StorageService) -> Self {
        Self { storage }
    }

    /// Create a private channel owned by `user_id`.
    pub async fn create(&self, workspace_id: &str, user_id: &str, name: String) -> Result<Channel, DatabaseError> {
        let ts = now();
        let channel = Channel {
            id: new_id(),
            created_by: user_id.to_string(),
            created_at: ts,
            updated_at: ts,
            name,
            is_private: true,
        };

        let key = Parent::workspace(workspace_id).child(ChildKind::Channel.sort_key(&channel.id));
        let channel = self.storage.insert(key, channel).await?;
        tracing::info!(workspace_id, channel_id = %channel.id, "Created channel");
        Ok(channel)
    }

    pub async fn get_all(&self, workspace_id: &str, page: PageRequest) -> Result<Page<Channel>, DatabaseError> {
        self.storage
            .list_by_parent(&Parent::workspace(workspace_id), ChildKind::Channel.prefix(), page)
            .await
    }

    pub async fn get(&self, workspace_id: &str, channel_id: &str) -> Result<Option<Channel>, DatabaseError> {
        let key = Parent::workspace(workspace_id).child(ChildKind::Channel.sort_key(channel_id));
        self.storage.get_one(&key).await
    }
}
