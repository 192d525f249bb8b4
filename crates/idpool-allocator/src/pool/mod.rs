//! Bounded-range id pools with a reuse queue.
//!
//! Both pools keep a set of ids in use and a bounded FIFO of released ids.
//! They differ only in how a fresh id is produced when nothing is reused.

pub mod reuse;
pub mod room;
pub mod sequential;

pub use reuse::ReuseQueue;
pub use room::{RoomIdManager, RoomIdManagerBuilder};
pub use sequential::{SequentialIdManager, SequentialIdManagerBuilder};
