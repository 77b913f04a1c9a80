//! Response bodies shared by the listing endpoints.

use serde::Serialize;

use crate::api::page_cursor;
use crate::database::Page;

#[derive(Debug, Clone, Serialize)]
pub struct CursorBody {
    pub next: Option<String>,
}

/// `{items, cursor: {next}}`
#[derive(Debug, Clone, Serialize)]
pub struct PageBody<T: Serialize> {
    pub items: Vec<T>,
    pub cursor: CursorBody,
}

impl<T: Serialize> From<Page<T>> for PageBody<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            cursor: CursorBody {
                next: page_cursor::encode(page.next.as_ref()),
            },
        }
    }
}

/// `{items}` for listings that are returned whole.
#[derive(Debug, Clone, Serialize)]
pub struct ItemsBody<T: Serialize> {
    pub items: Vec<T>,
}

/// `{date, items}` for per-day listings.
#[derive(Debug, Clone, Serialize)]
pub struct DatedItemsBody<T: Serialize> {
    pub date: String,
    pub items: Vec<T>,
}
