//! The task feed: descriptors in, loaded work items out.
//!
//! # Data Flow
//!
//! ```text
//! effects.txt ──► TaskFeed ──► TaskDescriptor ──► WorkItems ──► WorkItem<I>
//!                 (JSON stream)                   (× each data dir, image loaded)
//! ```
//!
//! Order is preserved end to end: descriptors in file order, and for each
//! descriptor the data directories in configured order.

mod check;
mod descriptor;
mod work_item;

pub use check::{check_feed, FeedReport};
pub use descriptor::{FeedPolicy, TaskDescriptor, TaskFeed};
pub use work_item::{collect_work_items, DataLayout, WorkItem, WorkItems};
