use std::io::{self, Write};

use tracing::{info, warn};

use crate::resources::{BucketOperationError, BucketOperations, ObjectIdentity, ObjectVersions};

/// What a completed purge did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub versioned: bool,
    /// Current objects seen by the initial listing.
    pub objects_listed: usize,
    /// Key/version pairs (or plain keys) sent for deletion.
    pub objects_deleted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    #[error(transparent)]
    Bucket(#[from] BucketOperationError),
    #[error("failed to write progress output")]
    Output(#[from] io::Error),
}

/// Empties `bucket` and deletes it, writing progress lines to `out`.
///
/// A failing versioning check counts as an unversioned bucket. Every other
/// failure aborts before the bucket is deleted.
pub async fn purge_bucket<B, W>(bucket: &B, out: &mut W) -> Result<PurgeReport, PurgeError>
where
    B: BucketOperations + ?Sized,
    W: Write,
{
    let mut report = PurgeReport::default();
    writeln!(out, ">>> Bucket from S3_BUCKET: {}", bucket.name())?;

    let objects = bucket.list_objects().await?;
    report.objects_listed = objects.len();
    info!(bucket = bucket.name(), count = objects.len(), "listed objects");
    if objects.is_empty() {
        writeln!(out, ">>> No objects in the bucket.")?;
    } else {
        writeln!(out, ">>> List objects in the bucket:")?;
        for key in &objects {
            writeln!(out, "{key}")?;
        }
    }

    report.versioned = match bucket.versioning_enabled().await {
        Ok(enabled) => enabled,
        Err(err) => {
            warn!(
                bucket = bucket.name(),
                error = %err,
                "versioning check failed, treating bucket as unversioned"
            );
            false
        }
    };

    if report.versioned {
        writeln!(out, ">>> Versioning is enabled.")?;
        let versions = bucket.list_object_versions().await?;
        info!(
            bucket = bucket.name(),
            keys = versions.len(),
            versions = versions.version_count(),
            "listed object versions"
        );
        if !versions.is_empty() {
            writeln!(out, ">>> List objects with versions:")?;
            write_versions(out, &versions)?;

            writeln!(out, ">>> Delete objects with versions.")?;
            let identities = versions.identities();
            bucket.delete_objects(&identities).await?;
            report.objects_deleted = identities.len();

            let remaining = bucket.list_object_versions().await?;
            if remaining.is_empty() {
                writeln!(out, ">>> No objects in the bucket after deletion.")?;
            } else {
                warn!(
                    bucket = bucket.name(),
                    versions = remaining.version_count(),
                    "versions remain after deletion"
                );
                writeln!(out, ">>> List objects with versions after deletion:")?;
                write_versions(out, &remaining)?;
            }
        }
    } else if !objects.is_empty() {
        writeln!(out, ">>> Delete objects.")?;
        let identities: Vec<_> = objects.into_iter().map(ObjectIdentity::current).collect();
        bucket.delete_objects(&identities).await?;
        report.objects_deleted = identities.len();
    }
    info!(bucket = bucket.name(), deleted = report.objects_deleted, "bucket emptied");

    writeln!(out, ">>> Delete the bucket.")?;
    bucket.delete().await?;
    info!(bucket = bucket.name(), "bucket deleted");

    Ok(report)
}

fn write_versions<W: Write>(out: &mut W, versions: &ObjectVersions) -> io::Result<()> {
    for (key, version_ids) in versions.iter() {
        writeln!(out, "{key}:")?;
        for version_id in version_ids {
            writeln!(out, "\t{version_id}")?;
        }
    }
    Ok(())
}
