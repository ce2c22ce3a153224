use crate::domain::{
    models::credential::HashedPassword, repositories::user_repository::UserRepository,
    services::password_service::PasswordHasher,
};

const DECOY_PASSWORD: &str = "decoyPass000!!";

pub struct AuthenticateUsecase<U: UserRepository, P: PasswordHasher> {
    user_repository: U,
    password_hasher: P,
    // verified against when the username is unknown, so a miss costs a full hash check
    decoy_hash: Option<HashedPassword>,
}

impl<U: UserRepository, P: PasswordHasher> AuthenticateUsecase<U, P> {
    pub fn new(user_repository: U, password_hasher: P) -> Self {
        let decoy_hash = match password_hasher.hash(DECOY_PASSWORD) {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "could not prepare decoy hash");
                None
            }
        };

        Self {
            user_repository,
            password_hasher,
            decoy_hash,
        }
    }

    /// True only for a known username with a matching, nonempty password.
    /// Every failure looks the same to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> bool
    where
        U: Send + Sync,
        P: Send + Sync,
    {
        if password.is_empty() {
            return false;
        }

        let hashed_password = match self.user_repository.find_credentials(username).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::debug!(error = %e, "credential lookup failed");
                if let Some(decoy) = &self.decoy_hash {
                    self.password_hasher.verify(password, decoy);
                }
                return false;
            }
        };

        let verified = self.password_hasher.verify(password, &hashed_password);
        if !verified {
            tracing::debug!("authentication rejected");
        }
        verified
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        domain::{
            error::{DomainError, RepositoryError},
            models::user::{User, UserFilter, UserId},
        },
        infrastructure::argon2_password_hasher::Argon2PasswordHasher,
    };

    #[derive(Clone)]
    struct MockUserRepository {
        hash: HashedPassword,
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn insert(&self, _user: &User) -> Result<UserId, RepositoryError> {
            unreachable!("authentication never writes")
        }

        async fn find(
            &self,
            _filter: &UserFilter,
            _limit: i64,
            _offset: i64,
        ) -> Result<Vec<User>, RepositoryError> {
            unreachable!("authentication only reads credentials")
        }

        async fn find_credentials(
            &self,
            username: &str,
        ) -> Result<HashedPassword, RepositoryError> {
            match username {
                "johnny005" => Ok(self.hash.clone()),
                "brokenstore" => Err(RepositoryError::DatabaseError(
                    "connection reset".to_string(),
                )),
                _ => Err(RepositoryError::NotFound),
            }
        }

        async fn update(
            &self,
            _user: &User,
            _password: Option<&HashedPassword>,
        ) -> Result<u64, RepositoryError> {
            unreachable!("authentication never writes")
        }

        async fn delete(&self, _id: UserId) -> Result<u64, RepositoryError> {
            unreachable!("authentication never writes")
        }
    }

    fn usecase() -> AuthenticateUsecase<MockUserRepository, Argon2PasswordHasher> {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("goodPass034!!").unwrap();
        AuthenticateUsecase::new(MockUserRepository { hash }, hasher)
    }

    #[tokio::test]
    async fn accepts_matching_password() {
        assert!(usecase().authenticate("johnny005", "goodPass034!!").await);
    }

    #[tokio::test]
    async fn every_failure_is_just_false() {
        let usecase = usecase();

        assert!(!usecase.authenticate("johnny005", "wrongPass034!!").await);
        assert!(!usecase.authenticate("johnny005", "").await);
        assert!(!usecase.authenticate("nobody123", "goodPass034!!").await);
        assert!(!usecase.authenticate("brokenstore", "goodPass034!!").await);
    }

    #[derive(Clone, Default)]
    struct CountingHasher {
        verifications: Arc<AtomicUsize>,
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, plain_password: &str) -> Result<HashedPassword, DomainError> {
            Ok(HashedPassword::new(format!("hashed:{}", plain_password)))
        }

        fn verify(&self, plain_password: &str, hashed_password: &HashedPassword) -> bool {
            self.verifications.fetch_add(1, Ordering::SeqCst);
            hashed_password.as_str() == format!("hashed:{}", plain_password)
        }
    }

    #[tokio::test]
    async fn unknown_user_still_runs_a_hash_check() {
        let hasher = CountingHasher::default();
        let verifications = Arc::clone(&hasher.verifications);
        let repository = MockUserRepository {
            hash: hasher.hash("goodPass034!!").unwrap(),
        };
        let usecase = AuthenticateUsecase::new(repository, hasher);

        assert!(!usecase.authenticate("nobody123", "goodPass034!!").await);
        assert_eq!(verifications.load(Ordering::SeqCst), 1);

        assert!(!usecase.authenticate("brokenstore", "goodPass034!!").await);
        assert_eq!(verifications.load(Ordering::SeqCst), 2);

        assert!(usecase.authenticate("johnny005", "goodPass034!!").await);
        assert_eq!(verifications.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn decoy_password_does_not_open_unknown_accounts() {
        assert!(!usecase().authenticate("nobody123", DECOY_PASSWORD).await);
    }
}
