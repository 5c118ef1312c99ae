//! Core business logic for SiteTrack.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence is reached only through the repository traits declared here and
//! implemented by the db crate.
//!
//! # Modules
//!
//! - `auth` - Password hashing, roles, the authorization gate, registration and login
//! - `storage` - Blob validation and persistence on the local filesystem
//! - `attachment` - Polymorphic file attachments for projects and defects

pub mod attachment;
pub mod auth;
pub mod storage;
