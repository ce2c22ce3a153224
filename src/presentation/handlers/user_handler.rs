use std::sync::Arc;

use crate::{
    domain::{
        error::DomainError,
        models::user::{User, UserId},
        repositories::user_repository::UserRepository,
        services::password_service::PasswordHasher,
    },
    usecase::{authenticate_usecase::AuthenticateUsecase, user_usecase::UserUsecase},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 100;
const DEFAULT_OFFSET: i64 = 0;

// Request

/// query string for listing users
#[derive(Serialize, Deserialize, Default)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

// Response

/// json body for plain messages and errors
#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// error carried out of a handler, rendered as `{"message": ...}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidInput(_) | DomainError::ValidationFailed(_) => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            DomainError::DuplicateKey(_) => {
                Self::new(StatusCode::CONFLICT, "Request violates uniqueness")
            }
            DomainError::NotFound => Self::new(StatusCode::NOT_FOUND, "Not found"),
            DomainError::Repository(_) | DomainError::Credential(_) => {
                tracing::error!(error = %err, "request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(MessageResponse::new(self.message))).into_response()
    }
}

/// helper function that parses an integer path or query value
fn parse_int(name: &str, raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("query \"{}\" only accepts integers: received {}", name, raw),
        )
    })
}

fn parse_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid ID {}", raw)))
}

/// helper function that extracts username and password from a Basic authorization header
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/* Router Function and Handler Function */

// User Router

/// function return Router object
/// Suppose to be nested by main router under /api/v1
pub fn create_user_router<
    U: UserRepository + Send + Sync + 'static + Clone,
    P: PasswordHasher + Send + Sync + 'static + Clone,
>(
    user_service: UserUsecase<U, P>,
    authenticate_service: AuthenticateUsecase<U, P>,
) -> Router {
    let state = AppState {
        user_service: Arc::new(user_service),
        authenticate_service: Arc::new(authenticate_service),
    };

    Router::new()
        .route("/user", get(list_users::<U, P>).post(create_user::<U, P>))
        .route("/user/auth", post(authenticate::<U, P>))
        .route(
            "/user/{id}",
            get(get_user::<U, P>)
                .put(update_user::<U, P>)
                .delete(delete_user::<U, P>),
        )
        .with_state(state)
}

pub struct AppState<U: UserRepository, P: PasswordHasher> {
    pub user_service: Arc<UserUsecase<U, P>>,
    pub authenticate_service: Arc<AuthenticateUsecase<U, P>>,
}

impl<U: UserRepository, P: PasswordHasher> Clone for AppState<U, P> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            authenticate_service: Arc::clone(&self.authenticate_service),
        }
    }
}

// handler function

/// handler function for listing users
async fn list_users<U: UserRepository + Send + Sync, P: PasswordHasher + Send + Sync>(
    State(state): State<AppState<U, P>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>, ApiError> {
    let limit = match params.limit.as_deref() {
        Some(raw) if !raw.is_empty() => parse_int("limit", raw)?,
        _ => DEFAULT_LIMIT,
    };
    let offset = match params.offset.as_deref() {
        Some(raw) if !raw.is_empty() => parse_int("offset", raw)?,
        _ => DEFAULT_OFFSET,
    };

    let users = state
        .user_service
        .get_users("all", "", limit, offset)
        .await?;
    Ok(Json(users))
}

/// handler function for creating a user
async fn create_user<U: UserRepository + Send + Sync, P: PasswordHasher + Send + Sync>(
    State(state): State<AppState<U, P>>,
    payload: Result<Json<User>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(payload) = payload?;
    let user = state.user_service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// handler function for reading one user
async fn get_user<U: UserRepository + Send + Sync, P: PasswordHasher + Send + Sync>(
    State(state): State<AppState<U, P>>,
    Path(raw_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&raw_id)?;
    match state.user_service.get_user(id).await {
        Ok(user) => Ok(Json(user)),
        Err(DomainError::NotFound) => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("No User with ID {} found", id),
        )),
        Err(e) => Err(e.into()),
    }
}

/// handler function for updating a user
async fn update_user<U: UserRepository + Send + Sync, P: PasswordHasher + Send + Sync>(
    State(state): State<AppState<U, P>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<User>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = parse_id(&raw_id)?;
    let Json(payload) = payload?;
    match state.user_service.update_user(id, payload).await {
        Ok(user) => Ok(Json(user)),
        Err(DomainError::NotFound) => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("no user with id {} found", id),
        )),
        Err(e) => Err(e.into()),
    }
}

/// handler function for deleting a user
async fn delete_user<U: UserRepository + Send + Sync, P: PasswordHasher + Send + Sync>(
    State(state): State<AppState<U, P>>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&raw_id)?;
    match state.user_service.delete_user(id).await {
        Ok(()) => Ok(Json(MessageResponse::new(format!("User ID {} deleted", id)))),
        Err(DomainError::NotFound) => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("No User with ID {} found", id),
        )),
        Err(e) => Err(e.into()),
    }
}

/// handler function for checking Basic credentials
async fn authenticate<U: UserRepository + Send + Sync, P: PasswordHasher + Send + Sync>(
    State(state): State<AppState<U, P>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let authenticated = match basic_credentials(&headers) {
        Some((username, password)) => {
            state
                .authenticate_service
                .authenticate(&username, &password)
                .await
        }
        None => false,
    };

    if authenticated {
        (StatusCode::OK, Json(MessageResponse::new("Success"))).into_response()
    } else {
        ApiError::new(StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reads_basic_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", STANDARD.encode("johnny005:goodPass034!!")))
                .unwrap(),
        );

        assert_eq!(
            basic_credentials(&headers),
            Some(("johnny005".to_string(), "goodPass034!!".to_string()))
        );
    }

    #[test]
    fn basic_scheme_is_case_insensitive() {
        let encoded = STANDARD.encode("johnny005:goodPass034!!");
        for scheme in ["basic", "BASIC", "bAsIc"] {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("{} {}", scheme, encoded)).unwrap(),
            );

            assert_eq!(
                basic_credentials(&headers),
                Some(("johnny005".to_string(), "goodPass034!!".to_string()))
            );
        }
    }

    #[test]
    fn rejects_malformed_authorization() {
        let mut headers = HeaderMap::new();
        assert_eq!(basic_credentials(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(basic_credentials(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic !!!"));
        assert_eq!(basic_credentials(&headers), None);
    }

    #[test]
    fn maps_domain_errors_to_status() {
        let cases = [
            (DomainError::InvalidInput("x".to_string()), StatusCode::BAD_REQUEST),
            (DomainError::ValidationFailed(vec!["x".to_string()]), StatusCode::BAD_REQUEST),
            (DomainError::DuplicateKey("users_email_key".to_string()), StatusCode::CONFLICT),
            (DomainError::NotFound, StatusCode::NOT_FOUND),
            (
                DomainError::Credential("x".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }
}
