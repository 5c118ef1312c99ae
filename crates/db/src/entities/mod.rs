//! `SeaORM` entity definitions.

pub mod attachments;
pub mod projects;
pub mod roles;
pub mod users;

pub mod prelude {
    //! Entity re-exports.

    pub use super::attachments::Entity as Attachments;
    pub use super::projects::Entity as Projects;
    pub use super::roles::Entity as Roles;
    pub use super::users::Entity as Users;
}
