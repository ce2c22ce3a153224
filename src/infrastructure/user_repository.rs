use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Schema, Select,
    sea_query::TableCreateStatement,
};

use crate::{
    domain::{
        error::RepositoryError,
        models::{
            credential::HashedPassword,
            user::{User, UserFilter, UserId},
        },
        repositories::user_repository::UserRepository,
    },
    entity::users,
};

static DUPLICATE_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"duplicate key value violates unique constraint "([^"]*)""#).unwrap()
});

/// Public columns of a user row. The hash is never selected here.
const USER_COLUMNS: [users::Column; 7] = [
    users::Column::Id,
    users::Column::Username,
    users::Column::Firstname,
    users::Column::Middlename,
    users::Column::Lastname,
    users::Column::Email,
    users::Column::Telephone,
];

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: i32,
    username: String,
    firstname: String,
    middlename: Option<String>,
    lastname: String,
    email: String,
    telephone: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password: String::new(),
            first_name: row.firstname,
            middle_name: row.middlename,
            last_name: row.lastname,
            email: row.email,
            telephone: row.telephone,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CredentialRow {
    password_hash: String,
}

/// Map a driver error onto the repository's typed outcomes. This is the only
/// place that looks at error text.
pub fn translate_db_error(err: DbErr) -> RepositoryError {
    if matches!(err, DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated) {
        return RepositoryError::NotFound;
    }

    let message = err.to_string();
    match DUPLICATE_KEY_PATTERN.captures(&message) {
        Some(captures) => RepositoryError::DuplicateKey {
            constraint: captures[1].to_string(),
        },
        None => RepositoryError::DatabaseError(message),
    }
}

/// Build the filtered, paginated user listing.
pub fn select_users(filter: &UserFilter, limit: i64, offset: i64) -> Select<users::Entity> {
    let query = users::Entity::find()
        .select_only()
        .columns(USER_COLUMNS)
        .order_by_asc(users::Column::Id);

    let mut query = match filter {
        UserFilter::All => query,
        UserFilter::Id(id) => query.filter(users::Column::Id.eq(*id)),
        UserFilter::Username(value) => query.filter(users::Column::Username.eq(value.as_str())),
        UserFilter::FirstName(value) => query.filter(users::Column::Firstname.eq(value.as_str())),
        UserFilter::MiddleName(value) => {
            query.filter(users::Column::Middlename.eq(value.as_str()))
        }
        UserFilter::LastName(value) => query.filter(users::Column::Lastname.eq(value.as_str())),
        UserFilter::Email(value) => query.filter(users::Column::Email.eq(value.as_str())),
        UserFilter::Telephone(value) => query.filter(users::Column::Telephone.eq(value.as_str())),
    };

    // a non-positive limit means unbounded, so an OFFSET may stand alone
    if limit > 0 {
        query = query.limit(limit as u64);
    }
    // no OFFSET clause at all unless it moves the window
    if offset > 0 {
        query = query.offset(offset as u64);
    }

    query
}

/// DDL for the users table, derived from the entity.
pub fn users_table(backend: DatabaseBackend) -> TableCreateStatement {
    let mut table = Schema::new(backend).create_table_from_entity(users::Entity);
    table.if_not_exists();
    table
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    db: Arc<DatabaseConnection>,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Create the users table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        let backend = self.db.get_database_backend();
        let table = users_table(backend);

        self.db
            .as_ref()
            .execute(backend.build(&table))
            .await
            .map_err(translate_db_error)?;

        tracing::info!("users table ready");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: &User) -> Result<UserId, RepositoryError> {
        let user_model = users::ActiveModel {
            id: NotSet,
            username: Set(user.username.clone()),
            password_hash: Set(user.password.clone()),
            firstname: Set(user.first_name.clone()),
            middlename: Set(user.middle_name.clone()),
            lastname: Set(user.last_name.clone()),
            email: Set(user.email.clone()),
            telephone: Set(user.telephone.clone()),
        };

        let insert_result = users::Entity::insert(user_model)
            .exec(self.db.as_ref())
            .await
            .map_err(translate_db_error)?;

        Ok(insert_result.last_insert_id)
    }

    async fn find(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, RepositoryError> {
        tracing::debug!(?filter, limit, offset, "querying users");

        let rows = select_users(filter, limit, offset)
            .into_model::<UserRow>()
            .all(self.db.as_ref())
            .await
            .map_err(translate_db_error)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_credentials(&self, username: &str) -> Result<HashedPassword, RepositoryError> {
        let credential = users::Entity::find()
            .select_only()
            .column(users::Column::PasswordHash)
            .filter(users::Column::Username.eq(username))
            .into_model::<CredentialRow>()
            .one(self.db.as_ref())
            .await
            .map_err(translate_db_error)?
            .ok_or(RepositoryError::NotFound)?;

        Ok(HashedPassword::new(credential.password_hash))
    }

    async fn update(
        &self,
        user: &User,
        password: Option<&HashedPassword>,
    ) -> Result<u64, RepositoryError> {
        let changes = users::ActiveModel {
            id: NotSet,
            username: Set(user.username.clone()),
            password_hash: match password {
                Some(hash) => Set(hash.as_str().to_string()),
                None => NotSet,
            },
            firstname: Set(user.first_name.clone()),
            middlename: Set(user.middle_name.clone()),
            lastname: Set(user.last_name.clone()),
            email: Set(user.email.clone()),
            telephone: Set(user.telephone.clone()),
        };

        let result = users::Entity::update_many()
            .set(changes)
            .filter(users::Column::Id.eq(user.id))
            .exec(self.db.as_ref())
            .await
            .map_err(translate_db_error)?;

        Ok(result.rows_affected)
    }

    async fn delete(&self, id: UserId) -> Result<u64, RepositoryError> {
        let result = users::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(translate_db_error)?;

        Ok(result.rows_affected)
    }
}
