use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Which way an invocation moves the power state of the selected instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Start,
    Stop,
}

impl Direction {
    /// State an instance must currently be in to be picked up.
    pub fn pre_state(self) -> PowerState {
        match self {
            Direction::Start => PowerState::Stopped,
            Direction::Stop => PowerState::Running,
        }
    }

    pub fn subject(self) -> &'static str {
        match self {
            Direction::Start => "EC2 Start Notification",
            Direction::Stop => "EC2 Stop Notification",
        }
    }

    pub fn verb_past(self) -> &'static str {
        match self {
            Direction::Start => "Started",
            Direction::Stop => "Stopped",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Start => "start",
            Direction::Stop => "stop",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// EC2 instance lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PowerState {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
    Unknown(String),
}

impl PowerState {
    /// Maps an EC2 instance-state name (`"running"`, `"shutting-down"`, ...).
    pub fn from_name(name: &str) -> Self {
        match name {
            "pending" => PowerState::Pending,
            "running" => PowerState::Running,
            "shutting-down" => PowerState::ShuttingDown,
            "terminated" => PowerState::Terminated,
            "stopping" => PowerState::Stopping,
            "stopped" => PowerState::Stopped,
            other => PowerState::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PowerState::Pending => "pending",
            PowerState::Running => "running",
            PowerState::ShuttingDown => "shutting-down",
            PowerState::Terminated => "terminated",
            PowerState::Stopping => "stopping",
            PowerState::Stopped => "stopped",
            PowerState::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one instance as reported by `DescribeInstances`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub instance_id: String,
    pub state: PowerState,
    pub tags: BTreeMap<String, String>,
}

impl ResourceRecord {
    pub fn new(instance_id: impl Into<String>, state: PowerState) -> Self {
        Self {
            instance_id: instance_id.into(),
            state,
            tags: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

/// Key/value tag condition an instance must satisfy to be managed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPredicate {
    pub key: String,
    pub value: String,
}

impl TagPredicate {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &ResourceRecord) -> bool {
        record.tags.get(&self.key).is_some_and(|v| *v == self.value)
    }

    /// Name of the `DescribeInstances` filter for this tag, e.g. `tag:AutoManage`.
    pub fn filter_name(&self) -> String {
        format!("tag:{}", self.key)
    }
}

impl Default for TagPredicate {
    fn default() -> Self {
        Self::new("AutoManage", "True")
    }
}

/// One entry of the `StartInstances`/`StopInstances` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub instance_id: String,
    pub previous: PowerState,
    pub current: PowerState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    /// Renders `EC2 Instances Started: ['i-1', 'i-2']` style messages.
    pub fn for_instances(direction: Direction, instance_ids: &[String]) -> Self {
        let listed = instance_ids
            .iter()
            .map(|id| format!("'{id}'"))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            subject: direction.subject().to_string(),
            body: format!("EC2 Instances {}: [{}]", direction.verb_past(), listed),
        }
    }
}

/// What an invocation hands back to Lambda: a single-key object such as
/// `{"StartedInstances": ["i-1"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum InvocationResult {
    #[serde(rename = "StartedInstances")]
    Started(Vec<String>),
    #[serde(rename = "StoppedInstances")]
    Stopped(Vec<String>),
}

impl InvocationResult {
    pub fn new(direction: Direction, instance_ids: Vec<String>) -> Self {
        match direction {
            Direction::Start => InvocationResult::Started(instance_ids),
            Direction::Stop => InvocationResult::Stopped(instance_ids),
        }
    }

    pub fn instance_ids(&self) -> &[String] {
        match self {
            InvocationResult::Started(ids) | InvocationResult::Stopped(ids) => ids,
        }
    }
}
