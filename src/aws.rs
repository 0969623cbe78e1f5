use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_types::region::Region;
use tracing::debug;

use crate::config::SchedulerConfig;

pub async fn configure_aws(config: &SchedulerConfig) -> aws_types::SdkConfig {
    let region_provider =
        RegionProviderChain::first_try(config.region.clone().map(Region::new)).or_default_provider();

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}
