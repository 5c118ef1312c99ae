//! Storage service implementation using Apache OpenDAL.

use std::path::Path;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::config::{FileKind, StorageConfig};
use super::error::StorageError;

/// Directory under the root used for in-flight writes.
const TEMP_DIR: &str = ".tmp";

/// A blob that has been written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Path relative to the storage root: `<namespace>/<file_name>`.
    pub path: String,
    /// Generated file name.
    pub file_name: String,
    /// Size in bytes.
    pub size: u64,
}

/// Storage service for attachment blobs.
#[derive(Debug)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be used.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let root = std::path::absolute(&config.root)
            .map_err(|e| StorageError::configuration(e.to_string()))?;
        let root = root
            .to_str()
            .ok_or_else(|| StorageError::configuration("invalid path"))?;
        let temp_dir = format!("{}/{TEMP_DIR}", root.trim_end_matches('/'));

        let builder = services::Fs::default().root(root).atomic_write_dir(&temp_dir);

        let operator = Operator::new(builder)
            .map_err(|e| StorageError::configuration(e.to_string()))?
            .finish();

        Ok(Self { operator, config })
    }

    /// Validate an upload against config constraints.
    ///
    /// Size is checked before content type.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is too large or its content type is not allowed.
    pub fn validate(&self, content_type: &str, size: u64) -> Result<FileKind, StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        self.config
            .classify(content_type)
            .ok_or_else(|| StorageError::unsupported_media_type(content_type))
    }

    /// Write `bytes` under `namespace` with a freshly generated name.
    ///
    /// The write goes through a temporary file and a rename, so a partial
    /// write is never reachable under the returned path.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is invalid or any I/O fails. The
    /// target path is removed (best-effort) before a write error is returned.
    pub async fn persist(
        &self,
        namespace: &str,
        entity_id: i64,
        original_name: &str,
        bytes: Bytes,
    ) -> Result<StoredBlob, StorageError> {
        let valid_namespace = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_namespace {
            return Err(StorageError::InvalidPath(format!(
                "invalid namespace '{namespace}'"
            )));
        }

        let file_name = generate_file_name(entity_id, original_name);
        let path = format!("{namespace}/{file_name}");
        let size = bytes.len() as u64;

        self.operator
            .create_dir(&format!("{namespace}/"))
            .await
            .map_err(|e| StorageError::operation(e.to_string()))?;

        if let Err(e) = self.operator.write(&path, bytes).await {
            self.remove(&path).await;
            return Err(StorageError::operation(e.to_string()));
        }

        tracing::debug!(storage_path = %path, size, "blob written");

        Ok(StoredBlob {
            path,
            file_name,
            size,
        })
    }

    /// Delete a blob. Failures are logged, never returned.
    pub async fn remove(&self, path: &str) {
        match self.operator.delete(path).await {
            Ok(()) => tracing::debug!(storage_path = %path, "blob removed"),
            Err(e) => tracing::warn!(storage_path = %path, error = %e, "failed to remove blob"),
        }
    }

    /// Read a whole blob.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the blob does not exist.
    pub async fn read(&self, path: &str) -> Result<Bytes, StorageError> {
        match self.operator.read(path).await {
            Ok(buffer) => Ok(buffer.to_bytes()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::not_found(path)),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    /// Check if a blob exists in storage.
    pub async fn exists(&self, path: &str) -> bool {
        self.operator.stat(path).await.is_ok()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Generate a collision-resistant file name: `<uuid-v7>_<entity_id><.ext>`.
///
/// The extension is taken from `original_name`, lower-cased and restricted
/// to ASCII alphanumerics; it is dropped if nothing is left.
#[must_use]
pub fn generate_file_name(entity_id: i64, original_name: &str) -> String {
    let stamp = Uuid::now_v7().simple();
    match sanitized_extension(original_name) {
        Some(ext) => format!("{stamp}_{entity_id}.{ext}"),
        None => format!("{stamp}_{entity_id}"),
    }
}

fn sanitized_extension(original_name: &str) -> Option<String> {
    let ext: String = Path::new(original_name)
        .extension()?
        .to_string_lossy()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!ext.is_empty()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service() -> (TempDir, StorageService) {
        let dir = tempfile::tempdir().unwrap();
        let service = StorageService::from_config(StorageConfig::new(dir.path())).unwrap();
        (dir, service)
    }

    #[test]
    fn test_generate_file_name() {
        let name = generate_file_name(7, "Site Photo.PNG");
        let (stamp, rest) = name.split_once('_').unwrap();
        assert_eq!(stamp.len(), 32);
        assert!(stamp.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(rest, "7.png");
    }

    #[test]
    fn test_generate_file_name_extension_rules() {
        assert!(generate_file_name(1, "README").ends_with("_1"));
        assert!(generate_file_name(1, "archive.tar.GZ").ends_with("_1.gz"));
        assert!(generate_file_name(1, "weird.p$d!f").ends_with("_1.pdf"));
        assert!(generate_file_name(1, "dots.$$").ends_with("_1"));
        assert!(generate_file_name(1, "../../etc/passwd.txt").ends_with("_1.txt"));
    }

    #[test]
    fn test_generated_names_are_unique() {
        let a = generate_file_name(3, "a.pdf");
        let b = generate_file_name(3, "a.pdf");
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_size_boundary() {
        let (_dir, service) = service();
        let max = StorageConfig::DEFAULT_MAX_FILE_SIZE;

        assert_eq!(
            service.validate("application/pdf", max).unwrap(),
            FileKind::Document
        );
        assert!(matches!(
            service.validate("application/pdf", max + 1),
            Err(StorageError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_validate_checks_size_before_type() {
        let (_dir, service) = service();
        assert!(matches!(
            service.validate("application/x-executable", 11 * 1024 * 1024),
            Err(StorageError::FileTooLarge { .. })
        ));
        assert!(matches!(
            service.validate("application/x-executable", 10),
            Err(StorageError::UnsupportedMediaType { .. })
        ));
    }

    #[tokio::test]
    async fn test_persist_read_remove() {
        let (dir, service) = service();
        let content = Bytes::from_static(b"%PDF-1.7 test");

        let blob = service
            .persist("project", 7, "plan.pdf", content.clone())
            .await
            .unwrap();

        assert!(blob.path.starts_with("project/"));
        assert!(blob.path.ends_with("_7.pdf"));
        assert_eq!(blob.path, format!("project/{}", blob.file_name));
        assert_eq!(blob.size, content.len() as u64);
        assert!(dir.path().join(&blob.path).is_file());

        assert_eq!(service.read(&blob.path).await.unwrap(), content);

        service.remove(&blob.path).await;
        assert!(!service.exists(&blob.path).await);
        assert!(matches!(
            service.read(&blob.path).await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_blob_is_quiet() {
        let (_dir, service) = service();
        service.remove("project/does-not-exist.png").await;
    }

    #[tokio::test]
    async fn test_persist_rejects_bad_namespace() {
        let (_dir, service) = service();
        for namespace in ["", "..", "a/b", "project/.."] {
            assert!(matches!(
                service
                    .persist(namespace, 1, "a.txt", Bytes::from_static(b"x"))
                    .await,
                Err(StorageError::InvalidPath(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_persist_failure_is_storage_failure() {
        let (dir, service) = service();
        // A regular file where the namespace directory should be.
        std::fs::write(dir.path().join("defect"), b"not a directory").unwrap();

        let result = service
            .persist("defect", 2, "photo.jpg", Bytes::from_static(b"jpeg"))
            .await;

        assert!(matches!(result, Err(StorageError::Operation(_))));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_file_size_validation(
            max_size in 1024u64..10_000_000,
            file_size in 0u64..20_000_000,
        ) {
            let dir = tempfile::tempdir().unwrap();
            let config = StorageConfig::new(dir.path()).with_max_file_size(max_size);
            let service = StorageService::from_config(config).unwrap();

            let result = service.validate("application/pdf", file_size);

            if file_size <= max_size {
                prop_assert!(result.is_ok(), "Expected Ok for valid file size");
            } else {
                let is_too_large = matches!(result, Err(StorageError::FileTooLarge { .. }));
                prop_assert!(is_too_large, "Expected FileTooLarge error");
            }
        }
    }

    proptest! {
        #[test]
        fn prop_media_type_validation(content_type in "[a-z]+/[a-z0-9.-]+") {
            let dir = tempfile::tempdir().unwrap();
            let config = StorageConfig::new(dir.path());
            let service = StorageService::from_config(config.clone()).unwrap();

            let result = service.validate(&content_type, 1024);

            match config.classify(&content_type) {
                Some(kind) => prop_assert_eq!(result.unwrap(), kind),
                None => {
                    let rejected = matches!(result, Err(StorageError::UnsupportedMediaType { .. }));
                    prop_assert!(rejected, "Expected UnsupportedMediaType error");
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_generated_name_is_path_safe(original in ".*", entity_id in any::<i64>()) {
            let name = generate_file_name(entity_id, &original);
            prop_assert!(!name.contains('/'));
            prop_assert!(!name.contains(".."));
            let suffix = format!("_{entity_id}");
            prop_assert!(name.contains(&suffix));
        }
    }
}
