use clap::{Args, Parser, Subcommand};
use ec2_autopower::config::{
    ENV_ENDPOINT_URL, ENV_REGION, ENV_TAG_KEY, ENV_TAG_VALUE, ENV_TOPIC_ARN,
};
use ec2_autopower::handler::build_scheduler;
use ec2_autopower::{Direction, SchedulerConfig, SchedulerError};

#[derive(Parser)]
#[command(name = "ec2-autopower", version, about = "Start or stop tagged EC2 instances and notify over SNS")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start every tagged instance that is currently stopped
    Start(RunArgs),
    /// Stop every tagged instance that is currently running
    Stop(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// AWS region, defaults to the SDK region chain
    #[arg(long, env = ENV_REGION)]
    region: Option<String>,

    /// SNS topic to notify
    #[arg(long, env = ENV_TOPIC_ARN)]
    topic_arn: Option<String>,

    /// Tag key that marks managed instances
    #[arg(long, env = ENV_TAG_KEY)]
    tag_key: Option<String>,

    /// Tag value that marks managed instances
    #[arg(long, env = ENV_TAG_VALUE)]
    tag_value: Option<String>,

    /// Endpoint override, e.g. http://localhost:4566 for LocalStack
    #[arg(long, env = ENV_ENDPOINT_URL)]
    endpoint_url: Option<String>,

    /// Only list the instances that would be affected
    #[arg(long)]
    dry_run: bool,
}

impl RunArgs {
    fn to_config(&self) -> Result<SchedulerConfig, SchedulerError> {
        SchedulerConfig::from_lookup(|key| {
            let value = match key {
                ENV_REGION => &self.region,
                ENV_TOPIC_ARN => &self.topic_arn,
                ENV_TAG_KEY => &self.tag_key,
                ENV_TAG_VALUE => &self.tag_value,
                ENV_ENDPOINT_URL => &self.endpoint_url,
                _ => return None,
            };
            value.clone()
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (direction, args) = match cli.command {
        Command::Start(args) => (Direction::Start, args),
        Command::Stop(args) => (Direction::Stop, args),
    };

    let config = args.to_config()?;
    let scheduler = build_scheduler(&config).await;

    let result = if args.dry_run {
        scheduler.preview(direction).await?
    } else {
        scheduler.run(direction).await?
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn run_args(argv: &[&str]) -> (Direction, RunArgs) {
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Start(args) => (Direction::Start, args),
            Command::Stop(args) => (Direction::Stop, args),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_build_the_config() {
        let (direction, args) = run_args(&[
            "ec2-autopower",
            "stop",
            "--region",
            "eu-west-2",
            "--topic-arn",
            "arn:aws:sns:eu-west-2:123456789012:EC2StartStopNotify",
            "--tag-key",
            "Schedule",
            "--tag-value",
            "nightly",
            "--dry-run",
        ]);

        assert_eq!(direction, Direction::Stop);
        assert!(args.dry_run);
        assert_eq!(
            args.to_config().unwrap(),
            SchedulerConfig::new("arn:aws:sns:eu-west-2:123456789012:EC2StartStopNotify")
                .with_region("eu-west-2")
                .with_tag("Schedule", "nightly")
        );
    }

    #[test]
    fn flags_are_backed_by_environment_variables() {
        let command = Cli::command();
        let start = command.find_subcommand("start").unwrap();
        let envs: Vec<_> = start
            .get_arguments()
            .filter_map(|arg| arg.get_env())
            .map(|env| env.to_string_lossy().into_owned())
            .collect();

        for name in [ENV_REGION, ENV_TOPIC_ARN, ENV_TAG_KEY, ENV_TAG_VALUE, ENV_ENDPOINT_URL] {
            assert!(envs.iter().any(|e| e == name), "{name} not wired");
        }
    }

    #[test]
    fn blank_flag_values_fall_back_to_defaults() {
        let (_, args) = run_args(&[
            "ec2-autopower",
            "start",
            "--topic-arn",
            "arn:aws:sns:eu-west-2:123456789012:EC2StartStopNotify",
            "--tag-key",
            " ",
        ]);

        assert_eq!(args.to_config().unwrap().tag.key, "AutoManage");
    }
}
