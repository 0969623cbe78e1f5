//! In-memory stand-ins for EC2 and SNS used by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ec2::ComputeApi;
use crate::error::AwsErrorKind;
use crate::model::{Direction, PowerState, ResourceRecord, StateChange, TagPredicate};
use crate::sns::NotificationApi;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Describe,
    ChangePower(Direction, Vec<String>),
    Publish {
        topic_arn: String,
        subject: String,
        body: String,
    },
}

/// Ordered record of every call made against the fakes.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::ChangePower(..)))
            .count()
    }

    pub fn publish_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Publish { .. }))
            .count()
    }
}

/// Returns every record regardless of tags, like an API that ignored the
/// filter, and moves toggled instances into their transitional state.
pub struct FakeCompute {
    records: Mutex<Vec<ResourceRecord>>,
    journal: Journal,
    query_error: Option<AwsErrorKind>,
    mutation_error: Option<AwsErrorKind>,
}

impl FakeCompute {
    pub fn new(records: Vec<ResourceRecord>, journal: Journal) -> Self {
        Self {
            records: Mutex::new(records),
            journal,
            query_error: None,
            mutation_error: None,
        }
    }

    pub fn failing_query(mut self, kind: AwsErrorKind) -> Self {
        self.query_error = Some(kind);
        self
    }

    pub fn failing_mutation(mut self, kind: AwsErrorKind) -> Self {
        self.mutation_error = Some(kind);
        self
    }
}

#[async_trait]
impl ComputeApi for FakeCompute {
    async fn describe_tagged(
        &self,
        _predicate: &TagPredicate,
    ) -> Result<Vec<ResourceRecord>, AwsErrorKind> {
        self.journal.push(Call::Describe);
        if let Some(kind) = &self.query_error {
            return Err(kind.clone());
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn change_power(
        &self,
        direction: Direction,
        instance_ids: &[String],
    ) -> Result<Vec<StateChange>, AwsErrorKind> {
        self.journal
            .push(Call::ChangePower(direction, instance_ids.to_vec()));
        if let Some(kind) = &self.mutation_error {
            return Err(kind.clone());
        }

        let next = match direction {
            Direction::Start => PowerState::Pending,
            Direction::Stop => PowerState::Stopping,
        };

        let mut records = self.records.lock().unwrap();
        Ok(records
            .iter_mut()
            .filter(|r| instance_ids.contains(&r.instance_id))
            .map(|r| {
                let previous = std::mem::replace(&mut r.state, next.clone());
                StateChange {
                    instance_id: r.instance_id.clone(),
                    previous,
                    current: next.clone(),
                }
            })
            .collect())
    }
}

pub struct FakeNotifier {
    journal: Journal,
    error: Option<AwsErrorKind>,
}

impl FakeNotifier {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            error: None,
        }
    }

    pub fn failing(mut self, kind: AwsErrorKind) -> Self {
        self.error = Some(kind);
        self
    }
}

#[async_trait]
impl NotificationApi for FakeNotifier {
    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        body: &str,
    ) -> Result<Option<String>, AwsErrorKind> {
        self.journal.push(Call::Publish {
            topic_arn: topic_arn.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        match &self.error {
            Some(kind) => Err(kind.clone()),
            None => Ok(Some("msg-0001".to_string())),
        }
    }
}
