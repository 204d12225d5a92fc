use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::{
    error::{BuildError, SdkError},
    operation::{
        delete_bucket::DeleteBucketError, delete_objects::DeleteObjectsError,
        get_bucket_versioning::GetBucketVersioningError,
        list_object_versions::ListObjectVersionsError, list_objects_v2::ListObjectsV2Error,
    },
    types::{BucketVersioningStatus, Delete, ObjectIdentifier},
};
use tracing::{debug, warn};

use super::object::{ObjectIdentity, ObjectVersions, NULL_VERSION_ID};

/// Upper bound S3 places on the identities of a single DeleteObjects request.
pub const MAX_DELETE_BATCH: usize = 1000;

/// The remote calls needed to empty and remove one bucket.
#[async_trait]
pub trait BucketOperations: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the bucket's versioning status is `Enabled`.
    async fn versioning_enabled(&self) -> Result<bool, BucketOperationError>;

    /// Keys of every current object, across all listing pages.
    async fn list_objects(&self) -> Result<Vec<String>, BucketOperationError>;

    /// Every version and delete marker, grouped by key, across all listing pages.
    async fn list_object_versions(&self) -> Result<ObjectVersions, BucketOperationError>;

    async fn delete_objects(&self, objects: &[ObjectIdentity]) -> Result<(), BucketOperationError>;

    /// Deletes the bucket itself. S3 refuses unless it is empty.
    async fn delete(&self) -> Result<(), BucketOperationError>;
}

pub struct Bucket {
    pub name: String,
    client: aws_sdk_s3::Client,
}

impl Bucket {
    pub(crate) fn new(name: String, client: aws_sdk_s3::Client) -> Self {
        Self { name, client }
    }

    async fn delete_batch(&self, delete: Delete) -> Result<(), BucketOperationError> {
        let response = self
            .client
            .delete_objects()
            .bucket(&self.name)
            .delete(delete)
            .send()
            .await?;
        for err in response.errors() {
            warn!(
                bucket = %self.name,
                key = err.key().unwrap_or_default(),
                version_id = err.version_id().unwrap_or_default(),
                code = err.code().unwrap_or_default(),
                "object was not deleted: {}",
                err.message().unwrap_or_default()
            );
        }
        Ok(())
    }
}

/// Splits `objects` into DeleteObjects payloads of at most [`MAX_DELETE_BATCH`]
/// identities each. No identities, no payloads.
fn delete_requests(objects: &[ObjectIdentity]) -> Result<Vec<Delete>, BuildError> {
    objects
        .chunks(MAX_DELETE_BATCH)
        .map(|batch| {
            let identifiers = batch
                .iter()
                .map(|object| {
                    ObjectIdentifier::builder()
                        .key(&object.key)
                        .set_version_id(object.version_id.clone())
                        .build()
                })
                .collect::<Result<Vec<_>, _>>()?;
            Delete::builder()
                .set_objects(Some(identifiers))
                .quiet(true)
                .build()
        })
        .collect()
}

#[async_trait]
impl BucketOperations for Bucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn versioning_enabled(&self) -> Result<bool, BucketOperationError> {
        let response = self
            .client
            .get_bucket_versioning()
            .bucket(&self.name)
            .send()
            .await?;
        Ok(response.status() == Some(&BucketVersioningStatus::Enabled))
    }

    async fn list_objects(&self) -> Result<Vec<String>, BucketOperationError> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.name)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page?;
            debug!(bucket = %self.name, count = page.contents().len(), "listed object page");
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .map(str::to_owned),
            );
        }
        Ok(keys)
    }

    async fn list_object_versions(&self) -> Result<ObjectVersions, BucketOperationError> {
        let mut versions = ObjectVersions::new();
        let mut key_marker: Option<String> = None;
        let mut version_id_marker: Option<String> = None;

        loop {
            let page = self
                .client
                .list_object_versions()
                .bucket(&self.name)
                .set_key_marker(key_marker.take())
                .set_version_id_marker(version_id_marker.take())
                .send()
                .await?;
            debug!(
                bucket = %self.name,
                versions = page.versions().len(),
                delete_markers = page.delete_markers().len(),
                "listed version page"
            );

            for version in page.versions() {
                if let Some(key) = version.key() {
                    versions.insert(key, version.version_id().unwrap_or(NULL_VERSION_ID));
                }
            }
            for marker in page.delete_markers() {
                if let Some(key) = marker.key() {
                    versions.insert(key, marker.version_id().unwrap_or(NULL_VERSION_ID));
                }
            }

            if !page.is_truncated().unwrap_or(false) {
                return Ok(versions);
            }
            match page.next_key_marker() {
                Some(next) => {
                    key_marker = Some(next.to_owned());
                    version_id_marker = page.next_version_id_marker().map(str::to_owned);
                }
                None => {
                    return Err(BucketOperationError::Other {
                        msg: "version listing was truncated without a next key marker".into(),
                        data: HashMap::from([("bucket_name".into(), self.name.clone())]),
                    })
                }
            }
        }
    }

    async fn delete_objects(&self, objects: &[ObjectIdentity]) -> Result<(), BucketOperationError> {
        for delete in delete_requests(objects)? {
            debug!(bucket = %self.name, count = delete.objects().len(), "deleting batch");
            self.delete_batch(delete).await?;
        }
        Ok(())
    }

    async fn delete(&self) -> Result<(), BucketOperationError> {
        self.client.delete_bucket().bucket(&self.name).send().await?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BucketOperationError {
    #[error(transparent)]
    GetBucketVersioning(#[from] SdkError<GetBucketVersioningError>),
    #[error(transparent)]
    ListObjects(#[from] SdkError<ListObjectsV2Error>),
    #[error(transparent)]
    ListObjectVersions(#[from] SdkError<ListObjectVersionsError>),
    #[error(transparent)]
    DeleteObjects(#[from] SdkError<DeleteObjectsError>),
    #[error(transparent)]
    DeleteBucket(#[from] SdkError<DeleteBucketError>),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("{msg}")]
    Other {
        msg: String,
        data: HashMap<String, String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identities(count: usize) -> Vec<ObjectIdentity> {
        (0..count)
            .map(|i| ObjectIdentity::versioned(format!("key-{i}"), format!("v{i}")))
            .collect()
    }

    #[test]
    fn no_identities_make_no_requests() {
        assert!(delete_requests(&[]).unwrap().is_empty());
    }

    #[test]
    fn full_batch_fits_one_request() {
        let requests = delete_requests(&identities(MAX_DELETE_BATCH)).unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].objects().len(), MAX_DELETE_BATCH);
    }

    #[test]
    fn overflow_spills_into_second_request() {
        let requests = delete_requests(&identities(MAX_DELETE_BATCH + 1)).unwrap();
        assert_eq!(
            requests.iter().map(|d| d.objects().len()).collect::<Vec<_>>(),
            vec![MAX_DELETE_BATCH, 1]
        );
        let last = &requests[1].objects()[0];
        assert_eq!(last.key(), "key-1000");
        assert_eq!(last.version_id(), Some("v1000"));
        assert_eq!(requests[0].quiet(), Some(true));
    }

    #[test]
    fn current_objects_carry_no_version_id() {
        let requests = delete_requests(&[ObjectIdentity::current("a.txt")]).unwrap();
        let object = &requests[0].objects()[0];
        assert_eq!(object.key(), "a.txt");
        assert_eq!(object.version_id(), None);
    }
}
