use aws_config::BehaviorVersion;
use tracing::debug;

use super::bucket::Bucket;

/// Entry point to the S3 API; hands out [`Bucket`] handles sharing one client.
pub struct S3 {
    client: aws_sdk_s3::Client,
}

impl S3 {
    /// Builds a client from the SDK's default provider chain: credentials,
    /// region and endpoint all come from the host environment.
    pub async fn default() -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        debug!(
            region = ?sdk_config.region(),
            endpoint = sdk_config.endpoint_url(),
            "loaded AWS configuration"
        );
        Self::with_aws_sdk_config(&sdk_config)
    }

    pub fn with_aws_sdk_config(config: &aws_config::SdkConfig) -> Self {
        Self::with_client(aws_sdk_s3::Client::new(config))
    }

    /// Wraps an already configured client, such as one built by a test harness.
    pub fn with_client(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    pub fn bucket(&self, name: impl Into<String>) -> Bucket {
        Bucket::new(name.into(), self.client.clone())
    }
}
