use std::process::ExitCode;

use mimalloc::MiMalloc;
use routemap_rs::{config::Config, runner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "routemap_rs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!("Starting with {:?}", config);

    match runner::run(&config).await {
        Ok(output) => {
            println!("{}", output.report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("Run failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
