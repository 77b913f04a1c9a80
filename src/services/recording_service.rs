use crate::database::keys::{ChildKind, Parent};
use crate::database::models::Recording;
use crate::database::{DatabaseError, Page, PageRequest, StorageService};

/// Read side of channel recordings. Recordings are written by the
/// transcoding pipeline, never through this service.
#[derive(Clone)]
pub struct RecordingService {
    storage: StorageService,
}

impl RecordingService {
    pub fn new(storage: StorageService) -> Self {
        Self { storage }
    }

    /// Recordings of one channel, most recent first.
    pub async fn get_all(
        &self,
        workspace_id: &str,
        channel_id: &str,
        page: PageRequest,
    ) -> Result<Page<Recording>, DatabaseError> {
        self.storage
            .list_by_parent(
                &Parent::channel(workspace_id, channel_id),
                ChildKind::Recording.prefix(),
                page.descending(),
            )
            .await
    }
}
