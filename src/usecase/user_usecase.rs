use crate::domain::{
    error::DomainError,
    models::{
        credential::HashedPassword,
        user::{UNSET_ID, User, UserField, UserFilter, UserId},
    },
    repositories::user_repository::UserRepository,
    services::password_service::{PasswordHasher, handle_password},
    validation::validate,
};

pub struct UserUsecase<R: UserRepository, P: PasswordHasher> {
    user_repository: R,
    password_hasher: P,
}

impl<R: UserRepository, P: PasswordHasher> UserUsecase<R, P> {
    pub fn new(user_repository: R, password_hasher: P) -> Self {
        Self {
            user_repository,
            password_hasher,
        }
    }

    /// Persist a new user. The returned user carries its assigned id and no
    /// credential.
    pub async fn create_user(&self, mut user: User) -> Result<User, DomainError>
    where
        R: Send + Sync,
        P: Send + Sync,
    {
        if user.is_persisted() {
            return Err(DomainError::InvalidInput(
                "ID must be null when creating a User".to_string(),
            ));
        }

        let errors = validate(&user);
        if !errors.is_empty() {
            return Err(DomainError::ValidationFailed(errors));
        }

        handle_password(&self.password_hasher, &mut user)?;

        let id = match self.user_repository.insert(&user).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(username = %user.username, error = %e, "user insert failed");
                return Err(e.into());
            }
        };
        user.id = id;
        user.clear_password();

        tracing::info!(id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Look users up by a whitelisted field name, or `all`.
    pub async fn get_users(
        &self,
        field: &str,
        value: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, DomainError>
    where
        R: Send + Sync,
        P: Send + Sync,
    {
        let field: UserField = field.parse()?;
        let filter = UserFilter::new(field, value)?;
        tracing::debug!(field = field.as_str(), limit, offset, "listing users");

        Ok(self.user_repository.find(&filter, limit, offset).await?)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, DomainError>
    where
        R: Send + Sync,
        P: Send + Sync,
    {
        self.user_repository
            .find(&UserFilter::Id(id), 1, 0)
            .await?
            .into_iter()
            .next()
            .ok_or(DomainError::NotFound)
    }

    /// Overwrite the user stored under `id`. An empty password keeps the
    /// stored credential.
    pub async fn update_user(&self, id: UserId, mut user: User) -> Result<User, DomainError>
    where
        R: Send + Sync,
        P: Send + Sync,
    {
        if user.id != id {
            return Err(DomainError::InvalidInput(
                "changing ID is not permitted".to_string(),
            ));
        }
        if user.id == UNSET_ID {
            return Err(DomainError::NotFound);
        }

        let errors = validate(&user);
        if !errors.is_empty() {
            return Err(DomainError::ValidationFailed(errors));
        }

        let password = if user.has_password() {
            handle_password(&self.password_hasher, &mut user)?;
            Some(HashedPassword::new(user.password.clone()))
        } else {
            None
        };

        let rows = self
            .user_repository
            .update(&user, password.as_ref())
            .await?;
        if rows == 0 {
            return Err(DomainError::NotFound);
        }
        user.clear_password();

        tracing::info!(id = user.id, password_changed = password.is_some(), "user updated");
        Ok(user)
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), DomainError>
    where
        R: Send + Sync,
        P: Send + Sync,
    {
        // an unset id can never match a stored row
        if id == UNSET_ID {
            return Err(DomainError::NotFound);
        }

        let rows = self.user_repository.delete(id).await?;
        if rows == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!(id, "user deleted");
        Ok(())
    }
}
