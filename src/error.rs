use thiserror::Error;

use crate::model::Direction;

/// Coarse classification of a failed AWS SDK call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AwsErrorKind {
    #[error("request throttled")]
    Throttled,

    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("service error: {0}")]
    Service(String),
}

impl AwsErrorKind {
    /// Inspects SDK error text for throttling, timeout and connection patterns.
    pub fn classify(error_str: &str) -> Self {
        let lower = error_str.to_lowercase();
        if lower.contains("throttl") || lower.contains("rate exceed") || lower.contains("too many")
        {
            AwsErrorKind::Throttled
        } else if lower.contains("timeout") || lower.contains("timed out") {
            AwsErrorKind::Timeout
        } else if lower.contains("connection")
            || lower.contains("connect")
            || lower.contains("dns")
            || lower.contains("network")
        {
            AwsErrorKind::Connection(error_str.to_owned())
        } else {
            AwsErrorKind::Service(error_str.to_owned())
        }
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("describe instances failed: {0}")]
    Query(AwsErrorKind),

    #[error("{direction} instances failed: {source}")]
    Mutation {
        direction: Direction,
        source: AwsErrorKind,
    },

    #[error("publish notification failed: {0}")]
    Publish(AwsErrorKind),

    #[error("refusing to {0} an empty set of instances")]
    EmptyCandidateSet(Direction),
}
