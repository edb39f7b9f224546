//! Scheduling domain models.
//!
//! The entities a lab scheduling episode is made of: jobs with deadlines
//! and urgency classes, single-capacity machines, and the waiting queue
//! between them.
//!
//! # Domain Mappings
//!
//! | u-labsched | Clinical lab | Manufacturing | Compute |
//! |------------|--------------|---------------|---------|
//! | Job | Sample / test order | Work order | Batch job |
//! | Urgency::Stat | STAT order | Rush order | High-priority job |
//! | Machine | Analyzer | Machine | Node |
//! | WaitingQueue | Accessioning backlog | WIP buffer | Pending queue |

mod job;
mod machine;
mod queue;

pub use job::{Job, JobId, Tick, Urgency};
pub use machine::{Machine, MachineId};
pub use queue::WaitingQueue;
