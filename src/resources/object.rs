use std::collections::BTreeMap;

/// Version id S3 reports for objects stored before versioning was enabled.
pub const NULL_VERSION_ID: &str = "null";

/// One deletable unit of a bucket: a key, plus the version to remove when the
/// bucket is versioned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectIdentity {
    pub key: String,
    pub version_id: Option<String>,
}

impl ObjectIdentity {
    /// The current object stored under `key`.
    pub fn current(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: None,
        }
    }

    pub fn versioned(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
        }
    }
}

/// Version ids of a bucket grouped by object key.
///
/// Live versions and delete markers land in the same list; a key's ids keep
/// the order in which they were inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectVersions {
    entries: BTreeMap<String, Vec<String>>,
}

impl ObjectVersions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, version_id: impl Into<String>) {
        self.entries
            .entry(key.into())
            .or_default()
            .push(version_id.into());
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of key/version pairs across all keys.
    pub fn version_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, versions)| (key.as_str(), versions.as_slice()))
    }

    /// Flattens the mapping into one identity per key/version pair.
    pub fn identities(&self) -> Vec<ObjectIdentity> {
        self.iter()
            .flat_map(|(key, versions)| {
                versions
                    .iter()
                    .map(move |version_id| ObjectIdentity::versioned(key, version_id.as_str()))
            })
            .collect()
    }
}

impl<K, V> Extend<(K, V)> for ObjectVersions
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, version_id) in iter {
            self.insert(key, version_id);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ObjectVersions
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut versions = Self::new();
        versions.extend(iter);
        versions
    }
}
