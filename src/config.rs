/// Environment variable naming the bucket to purge.
pub const BUCKET_ENV: &str = "S3_BUCKET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeConfig {
    pub bucket: String,
}

impl PurgeConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bucket = lookup(BUCKET_ENV)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingBucket)?;
        Ok(Self { bucket })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("S3_BUCKET is not set or empty")]
    MissingBucket,
}
