use async_trait::async_trait;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{Filter, Instance, InstanceStateChange};
use aws_sdk_ec2::Client as Ec2Client;
use tracing::{debug, error};

use crate::error::AwsErrorKind;
use crate::model::{Direction, PowerState, ResourceRecord, StateChange, TagPredicate};

/// The slice of the EC2 API the scheduler needs.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Every instance carrying the tag, across all result pages.
    async fn describe_tagged(
        &self,
        predicate: &TagPredicate,
    ) -> Result<Vec<ResourceRecord>, AwsErrorKind>;

    /// One bulk `StartInstances` or `StopInstances` call.
    async fn change_power(
        &self,
        direction: Direction,
        instance_ids: &[String],
    ) -> Result<Vec<StateChange>, AwsErrorKind>;
}

pub struct Ec2Compute {
    client: Ec2Client,
}

impl Ec2Compute {
    pub fn new(client: Ec2Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ComputeApi for Ec2Compute {
    async fn describe_tagged(
        &self,
        predicate: &TagPredicate,
    ) -> Result<Vec<ResourceRecord>, AwsErrorKind> {
        debug!(filter = %predicate.filter_name(), value = %predicate.value, "describing instances");

        let mut pages = self
            .client
            .describe_instances()
            .filters(
                Filter::builder()
                    .name(predicate.filter_name())
                    .values(predicate.value.clone())
                    .build(),
            )
            .into_paginator()
            .send();

        let mut records = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| classify_failure(&e, "describe_instances"))?;

            records.extend(
                page.reservations()
                    .iter()
                    .flat_map(|res| res.instances())
                    .filter_map(to_record),
            );
        }

        Ok(records)
    }

    async fn change_power(
        &self,
        direction: Direction,
        instance_ids: &[String],
    ) -> Result<Vec<StateChange>, AwsErrorKind> {
        debug!(%direction, instance_ids = ?instance_ids, "changing instance power state");

        let changes: Vec<StateChange> = match direction {
            Direction::Start => self
                .client
                .start_instances()
                .set_instance_ids(Some(instance_ids.to_vec()))
                .send()
                .await
                .map_err(|e| classify_failure(&e, "start_instances"))?
                .starting_instances()
                .iter()
                .map(to_state_change)
                .collect(),
            Direction::Stop => self
                .client
                .stop_instances()
                .set_instance_ids(Some(instance_ids.to_vec()))
                .send()
                .await
                .map_err(|e| classify_failure(&e, "stop_instances"))?
                .stopping_instances()
                .iter()
                .map(to_state_change)
                .collect(),
        };

        Ok(changes)
    }
}

fn classify_failure<E: std::error::Error>(err: &E, operation: &str) -> AwsErrorKind {
    let err_str = DisplayErrorContext(err).to_string();
    error!(error = %err_str, operation, "EC2 request failed");
    AwsErrorKind::classify(&err_str)
}

fn to_record(inst: &Instance) -> Option<ResourceRecord> {
    let instance_id = inst.instance_id()?;
    let state = inst
        .state()
        .and_then(|s| s.name())
        .map_or(PowerState::Unknown("unknown".into()), |name| {
            PowerState::from_name(name.as_str())
        });

    let tags = inst
        .tags()
        .iter()
        .filter_map(|tag| {
            Some((
                tag.key()?.to_string(),
                tag.value().unwrap_or_default().to_string(),
            ))
        })
        .collect();

    Some(ResourceRecord {
        instance_id: instance_id.to_string(),
        state,
        tags,
    })
}

fn to_state_change(change: &InstanceStateChange) -> StateChange {
    let state_of = |s: Option<&aws_sdk_ec2::types::InstanceState>| {
        s.and_then(|st| st.name())
            .map_or(PowerState::Unknown("unknown".into()), |name| {
                PowerState::from_name(name.as_str())
            })
    };

    StateChange {
        instance_id: change.instance_id().unwrap_or_default().to_string(),
        previous: state_of(change.previous_state()),
        current: state_of(change.current_state()),
    }
}
