use ec2_autopower::handler::run_lambda;
use ec2_autopower::model::Direction;
use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    run_lambda(Direction::Start).await
}
