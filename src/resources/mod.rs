mod bucket;
mod object;
mod s3;

pub use bucket::{Bucket, BucketOperationError, BucketOperations, MAX_DELETE_BATCH};
pub use object::{ObjectIdentity, ObjectVersions, NULL_VERSION_ID};
pub use s3::S3;
