use std::{io, process::ExitCode};

use aws_sdk_s3::error::DisplayErrorContext;
use s3_bucket_purge::{purge_bucket, PurgeConfig, S3};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout carries the progress report
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging();

    let config = match PurgeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let s3 = S3::default().await;
    let bucket = s3.bucket(config.bucket);
    info!(bucket = %bucket.name, "purging bucket");

    let mut stdout = io::stdout().lock();
    match purge_bucket(&bucket, &mut stdout).await {
        Ok(report) => {
            info!(
                bucket = %bucket.name,
                versioned = report.versioned,
                deleted = report.objects_deleted,
                "purge finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(bucket = %bucket.name, "{}", DisplayErrorContext(&err));
            ExitCode::FAILURE
        }
    }
}
