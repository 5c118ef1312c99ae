//! Blob storage for attachments using Apache OpenDAL.
//!
//! Blobs live on the local filesystem under a configured root, one
//! subdirectory per owning entity kind:
//!
//! ```text
//! uploads/
//! ├── project/
//! │   └── 0192f7a3c1d97c0a8b3e5f1d2a4b6c8e_7.png
//! └── defect/
//!     └── 0192f7a3c5e17a2b9c4d6e8f0a1b3c5d_12.pdf
//! ```

mod config;
mod error;
mod service;

pub use config::{FileKind, StorageConfig};
pub use error::StorageError;
pub use service::{StorageService, StoredBlob, generate_file_name};
