//! The pure gallery core: visible-set derivation and collection mutation.
//!
//! Nothing in here touches the terminal, the filesystem or the session. The
//! shell owns a `Vec<Photo>` and a [`FilterState`], hands them to these
//! functions on every event, and replaces its collection with whatever the
//! mutators return.

pub mod collection;
pub mod filter;

pub use collection::{add_photo, delete_photo, find, toggle_favorite};
pub use filter::{compute_category_counts, derive_visible, CategoryCounts, FilterState, ViewMode};
