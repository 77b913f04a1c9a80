pub mod channel;
pub mod membership;
pub mod recording;
pub mod standup;
pub mod timestamp;
pub mod update;

pub use channel::Channel;
pub use membership::Membership;
pub use recording::{Recording, TranscodingStatus};
pub use standup::Standup;
pub use update::Update;

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at millisecond precision, the resolution timestamps are
/// rendered with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Fresh item id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
