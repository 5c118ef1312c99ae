//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod attachment;
pub mod project;
pub mod user;

pub use attachment::AttachmentRepository;
pub use project::{
    CreateProjectInput, ProjectError, ProjectFilter, ProjectRepository, ProjectStatus,
    UpdateProjectInput,
};
pub use user::{RoleRepository, UserRepository};
