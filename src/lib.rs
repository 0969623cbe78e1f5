//! Start and stop tagged EC2 instances on a schedule and announce it over SNS.
//!
//! The same select, toggle and notify routine backs both Lambda functions;
//! [`model::Direction`] decides which instances qualify and what is sent.

pub mod aws;
pub mod config;
pub mod ec2;
pub mod error;
pub mod handler;
pub mod model;
pub mod scheduler;
pub mod sns;

#[cfg(test)]
pub(crate) mod fakes;

pub use config::SchedulerConfig;
pub use error::{AwsErrorKind, SchedulerError};
pub use model::{Direction, InvocationResult};
pub use scheduler::Scheduler;
