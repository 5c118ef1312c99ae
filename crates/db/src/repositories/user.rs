//! User and role repositories for database operations.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use sitetrack_core::auth::{
    AuthError, CredentialRepository, Identity, NewIdentity, Role, RoleCode,
};
use sitetrack_shared::types::{RoleId, UserId};

use crate::entities::{roles, users};

/// User repository backing the auth service.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_identity(&self, user: users::Model) -> Result<Identity, AuthError> {
        let role = roles::Entity::find_by_id(user.role_id)
            .one(&self.db)
            .await
            .map_err(repo_err)?
            .ok_or_else(|| {
                AuthError::repository(format!(
                    "user {} references missing role {}",
                    user.id, user.role_id
                ))
            })?;

        Ok(to_identity(user, to_role(role)?))
    }
}

impl CredentialRepository for UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        match user {
            Some(user) => self.load_identity(user).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<Identity>, AuthError> {
        let user = users::Entity::find_by_id(id.into_inner())
            .filter(users::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        match user {
            Some(user) => self.load_identity(user).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_role(&self, code: RoleCode) -> Result<Option<Role>, AuthError> {
        roles::Entity::find()
            .filter(roles::Column::Code.eq(code.as_str()))
            .one(&self.db)
            .await
            .map_err(repo_err)?
            .map(to_role)
            .transpose()
    }

    async fn create(&self, input: NewIdentity) -> Result<Identity, AuthError> {
        let now = Utc::now().into();
        let user = users::ActiveModel {
            email: Set(input.email.clone()),
            password_hash: Set(input.password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            phone: Set(input.phone),
            is_active: Set(true),
            role_id: Set(input.role_id.into_inner()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
            ..Default::default()
        };

        let model = user.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AuthError::EmailTaken(input.email)
            } else {
                repo_err(e)
            }
        })?;

        self.load_identity(model).await
    }
}

/// Role repository for seeding the closed role set.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    db: DatabaseConnection,
}

impl RoleRepository {
    /// Creates a new role repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Inserts any missing role from the closed set. Existing rows are untouched.
    ///
    /// Returns the number of roles inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn ensure_seeded(&self) -> Result<u64, DbErr> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let models = RoleCode::ALL.iter().map(|code| roles::ActiveModel {
            name: Set(code.display_name().to_string()),
            code: Set(code.as_str().to_string()),
            created_at: Set(now),
            ..Default::default()
        });

        roles::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(roles::Column::Code)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
    }
}

fn repo_err(e: DbErr) -> AuthError {
    AuthError::repository(e.to_string())
}

fn to_role(model: roles::Model) -> Result<Role, AuthError> {
    let code = RoleCode::parse(&model.code).ok_or_else(|| {
        AuthError::repository(format!("unknown role code in database: {}", model.code))
    })?;

    Ok(Role {
        id: RoleId(model.id),
        name: model.name,
        code,
    })
}

fn to_identity(user: users::Model, role: Role) -> Identity {
    Identity {
        id: UserId(user.id),
        email: user.email,
        password_hash: user.password_hash,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone,
        is_active: user.is_active,
        role,
        created_at: user.created_at.with_timezone(&Utc),
    }
}
