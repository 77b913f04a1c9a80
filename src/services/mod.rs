pub mod channel_service;
pub mod recording_service;
pub mod standup_service;

pub use channel_service::ChannelService;
pub use recording_service::RecordingService;
pub use standup_service::{StandupError, StandupService};
