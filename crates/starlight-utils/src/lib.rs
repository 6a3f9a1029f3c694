//! # Starlight Utils
//!
//! Helpers for preparing the data a surface paginates:
//!
//! - [`search`]: multi-field filtering with equality, substring and fuzzy
//!   matching, over iterators or async streams
//! - [`collection`]: chunking and nested-list flattening
//! - [`text`]: shortening labels to a width

pub mod collection;
pub mod search;
pub mod text;

pub use collection::{Nested, chunked, flatten};
pub use search::{Contains, Equals, Fuzzy, Search, SearchFilter, quick_ratio, ratio};
pub use text::shorten;
