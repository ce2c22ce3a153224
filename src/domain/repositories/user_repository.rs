use crate::domain::{
    error::RepositoryError,
    models::{
        credential::HashedPassword,
        user::{User, UserFilter, UserId},
    },
};
use async_trait::async_trait;

/// Persistence seam for user records. Each call is a single round trip;
/// implementations translate store failures into `RepositoryError`.
#[async_trait]
pub trait UserRepository {
    /// Insert a user whose `password` already holds the encoded hash.
    /// Returns the store-assigned id.
    async fn insert(&self, user: &User) -> Result<UserId, RepositoryError>;

    /// Users matching `filter`, without credentials. `limit <= 0` means
    /// unbounded; `offset` only applies when positive.
    async fn find(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, RepositoryError>;

    async fn find_credentials(&self, username: &str) -> Result<HashedPassword, RepositoryError>;

    /// Overwrite every mutable column of `user.id`. The credential column is
    /// only touched when `password` is given. Returns affected rows.
    async fn update(
        &self,
        user: &User,
        password: Option<&HashedPassword>,
    ) -> Result<u64, RepositoryError>;

    /// Returns affected rows.
    async fn delete(&self, id: UserId) -> Result<u64, RepositoryError>;
}
