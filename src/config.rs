use std::fmt;

use crate::error::SchedulerError;
use crate::model::TagPredicate;

pub const ENV_REGION: &str = "AUTOPOWER_REGION";
pub const ENV_TOPIC_ARN: &str = "AUTOPOWER_TOPIC_ARN";
pub const ENV_TAG_KEY: &str = "AUTOPOWER_TAG_KEY";
pub const ENV_TAG_VALUE: &str = "AUTOPOWER_TAG_VALUE";
pub const ENV_ENDPOINT_URL: &str = "AUTOPOWER_ENDPOINT_URL";

/// Settings shared by the start and stop functions.
///
/// `region` left unset defers to the SDK's default region chain
/// (`AWS_REGION`, profile, IMDS).
#[derive(Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub region: Option<String>,
    pub topic_arn: String,
    pub tag: TagPredicate,
    pub endpoint_url: Option<String>,
}

impl fmt::Debug for SchedulerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerConfig")
            .field("region", &self.region)
            .field("topic_arn", &redact_account(&self.topic_arn))
            .field("tag", &self.tag)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl SchedulerConfig {
    pub fn new(topic_arn: impl Into<String>) -> Self {
        Self {
            region: None,
            topic_arn: topic_arn.into(),
            tag: TagPredicate::default(),
            endpoint_url: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tag = TagPredicate::new(key, value);
        self
    }

    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn from_env() -> Result<Self, SchedulerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SchedulerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let topic_arn = get(ENV_TOPIC_ARN).ok_or_else(|| {
            SchedulerError::Configuration(format!("{ENV_TOPIC_ARN} must be set"))
        })?;
        let defaults = TagPredicate::default();
        let tag_value = get(ENV_TAG_VALUE).unwrap_or(defaults.value);

        // EC2 expands these in filter values; the client-side check compares literally.
        if tag_value.contains(['*', '?']) {
            return Err(SchedulerError::Configuration(format!(
                "{ENV_TAG_VALUE} must be a literal value, wildcards are not supported: {tag_value}"
            )));
        }

        Ok(Self {
            region: get(ENV_REGION),
            topic_arn,
            tag: TagPredicate::new(get(ENV_TAG_KEY).unwrap_or(defaults.key), tag_value),
            endpoint_url: get(ENV_ENDPOINT_URL),
        })
    }
}

/// Hides the account id segment of an ARN (`arn:aws:sns:eu-west-2:<account>:Topic`).
fn redact_account(arn: &str) -> String {
    let mut parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() == 6 && !parts[4].is_empty() {
        parts[4] = "[REDACTED]";
    }
    parts.join(":")
}
