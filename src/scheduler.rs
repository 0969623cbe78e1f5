//! The select, toggle and notify routine shared by the start and stop functions.
//!
//! Every invocation is independent: the candidate set is rebuilt from a fresh
//! `DescribeInstances` query, and nothing is remembered between calls.

use tracing::{info, instrument};

use crate::ec2::ComputeApi;
use crate::error::SchedulerError;
use crate::model::{Direction, InvocationResult, NotificationMessage, StateChange, TagPredicate};
use crate::sns::NotificationApi;

/// Ids of tagged instances currently in `direction`'s pre-state, in the
/// order EC2 returned them.
pub async fn select_candidates<C: ComputeApi + ?Sized>(
    compute: &C,
    predicate: &TagPredicate,
    direction: Direction,
) -> Result<Vec<String>, SchedulerError> {
    let pre_state = direction.pre_state();

    let records = compute
        .describe_tagged(predicate)
        .await
        .map_err(SchedulerError::Query)?;

    Ok(records
        .into_iter()
        .filter(|record| predicate.matches(record) && record.state == pre_state)
        .map(|record| record.instance_id)
        .collect())
}

pub async fn toggle<C: ComputeApi + ?Sized>(
    compute: &C,
    direction: Direction,
    instance_ids: &[String],
) -> Result<Vec<StateChange>, SchedulerError> {
    if instance_ids.is_empty() {
        return Err(SchedulerError::EmptyCandidateSet(direction));
    }

    compute
        .change_power(direction, instance_ids)
        .await
        .map_err(|source| SchedulerError::Mutation { direction, source })
}

pub async fn notify<N: NotificationApi + ?Sized>(
    notifier: &N,
    topic_arn: &str,
    direction: Direction,
    instance_ids: &[String],
) -> Result<Option<String>, SchedulerError> {
    let message = NotificationMessage::for_instances(direction, instance_ids);

    notifier
        .publish(topic_arn, &message.subject, &message.body)
        .await
        .map_err(SchedulerError::Publish)
}

pub struct Scheduler<C, N> {
    compute: C,
    notifier: N,
    topic_arn: String,
    predicate: TagPredicate,
}

impl<C: ComputeApi, N: NotificationApi> Scheduler<C, N> {
    pub fn new(
        compute: C,
        notifier: N,
        topic_arn: impl Into<String>,
        predicate: TagPredicate,
    ) -> Self {
        Self {
            compute,
            notifier,
            topic_arn: topic_arn.into(),
            predicate,
        }
    }

    /// Runs one invocation: select, then toggle and notify when anything matched.
    #[instrument(skip(self), fields(tag = %self.predicate.key))]
    pub async fn run(&self, direction: Direction) -> Result<InvocationResult, SchedulerError> {
        let candidates = select_candidates(&self.compute, &self.predicate, direction).await?;

        if candidates.is_empty() {
            info!("No instances to {direction}.");
            return Ok(InvocationResult::new(direction, candidates));
        }

        let changes = toggle(&self.compute, direction, &candidates).await?;
        for change in &changes {
            info!(
                instance_id = %change.instance_id,
                previous = %change.previous,
                current = %change.current,
                "instance state change requested"
            );
        }

        let message_id = notify(&self.notifier, &self.topic_arn, direction, &candidates).await?;
        info!(
            count = candidates.len(),
            message_id = message_id.as_deref().unwrap_or("unknown"),
            "EC2 instances {} and notification published",
            direction.verb_past().to_lowercase()
        );

        Ok(InvocationResult::new(direction, candidates))
    }

    /// Selection only; nothing is started, stopped or published.
    pub async fn preview(&self, direction: Direction) -> Result<InvocationResult, SchedulerError> {
        let candidates = select_candidates(&self.compute, &self.predicate, direction).await?;
        info!(count = candidates.len(), %direction, "dry run, no changes made");
        Ok(InvocationResult::new(direction, candidates))
    }
}
