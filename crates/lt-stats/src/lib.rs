//! Local neighborhood statistics over disk windows.
//!
//! Both engines visit exactly the members of [`lt_core::DiskWindow`], so the
//! mean and standard deviation of a pixel are taken over the same set.
//!
//! Ordering:
//! - The mean grid must be complete before the standard deviation stage
//!   starts, because each window member is compared against its own local
//!   mean, read at the member position rather than at the center.
//! - Rows are processed in parallel. Every output cell is a pure function of
//!   its inputs with a fixed accumulation order, so results do not depend on
//!   the thread count.

mod mean;
mod stddev;

pub use mean::local_mean;
pub use stddev::{LocalStats, local_stats, local_std_dev};
