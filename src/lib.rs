//! Empties an S3 bucket, including every object version and delete marker,
//! and then deletes the bucket.

pub mod config;
pub mod purge;
pub mod resources;

pub use config::{ConfigError, PurgeConfig};
pub use purge::{purge_bucket, PurgeError, PurgeReport};
pub use resources::{
    Bucket, BucketOperationError, BucketOperations, ObjectIdentity, ObjectVersions, S3,
};
