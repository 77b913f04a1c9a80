pub mod keys;
pub mod models;
pub mod storage;
pub mod store;

pub use keys::{ChildKind, Key, Parent};
pub use storage::{Page, PageRequest, StorageService};
pub use store::{DatabaseError, KeyValueStore, SortOrder};
