//! Pagination over content resources.
//!
//! Two strategies share the same [`PageSource`](content_client::PageSource)
//! input and the same [`AccumulatedCollection`] output:
//!
//! - [`fetch_all`] walks every page up front, sequentially, and stops at the
//!   first failure with whatever it had so far.
//! - [`IncrementalPaginator`] loads one page per request, typically when the
//!   [`LoadTrigger`] sees the end of the list approaching.
//!
//! [`ResourceView`] puts a filter selection on top of either one.

pub mod exhaustive;
pub mod incremental;
pub mod trigger;
pub mod view;

pub use content_common::AccumulatedCollection;
pub use exhaustive::{fetch_all, Exhaustive, MAX_EXHAUSTIVE_PAGES};
pub use incremental::{IncrementalPaginator, LoadOutcome};
pub use trigger::{LoadTrigger, SentinelEntry, DEFAULT_ROOT_MARGIN};
pub use view::{ErrorInfo, NoSource, ResourceView, ViewSnapshot};
