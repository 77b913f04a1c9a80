pub mod format;
pub mod page_cursor;
