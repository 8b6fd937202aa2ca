use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    extract::{AppJson, AppPath},
    to_datetime,
};
use crate::{
    auth::{check_credentials, hash_password, validate_password},
    db::{models::User, now_ts, users, DbPool},
    error::AppError,
};

const MAX_USERNAME_LEN: usize = 50;
const MAX_PHONE_LEN: usize = 15;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub phone_number: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CheckPasswordRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            phone_number: u.phone_number,
            is_active: u.is_active,
            created_at: to_datetime(u.created_at),
            updated_at: to_datetime(u.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub phone_number: Option<String>,
}

pub async fn signup(
    State(pool): State<DbPool>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let username = req.username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::validation("Username must be between 1 and 50 characters"));
    }

    let phone_number = req
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if phone_number.is_some_and(|p| p.chars().count() > MAX_PHONE_LEN) {
        return Err(AppError::validation("Phone number must be at most 15 characters"));
    }

    validate_password(&req.password)?;

    if users::find_user_by_username(&pool, username).await?.is_some() {
        return Err(AppError::validation("Username already taken"));
    }

    let password_hash = hash_password(&req.password)?;
    let user = users::insert_user(&pool, username, phone_number, &password_hash, now_ts()).await?;

    tracing::info!("Registered user {} ({})", user.id, user.username);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

pub async fn check_password(
    State(pool): State<DbPool>,
    AppJson(req): AppJson<CheckPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    check_credentials(&pool, &req.username, &req.password)
        .await?
        .ok_or_else(|| AppError::validation("Invalid credentials or password is not correct"))?;

    Ok(Json(MessageResponse {
        message: "Password is correct".to_string(),
    }))
}

pub async fn list_users(State(pool): State<DbPool>) -> Result<Json<UsersResponse>, AppError> {
    let all = users::list_users(&pool).await?;

    Ok(Json(UsersResponse {
        users: all.into_iter().map(UserResponse::from).collect(),
    }))
}

pub async fn get_user_by_username(
    State(pool): State<DbPool>,
    AppPath(username): AppPath<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = users::find_user_by_username(&pool, &username)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(user.into()))
}

pub async fn get_user(
    State(pool): State<DbPool>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<UserSummary>, AppError> {
    let user = users::find_active_user(&pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(UserSummary {
        id: user.id,
        username: user.username,
        phone_number: user.phone_number,
    }))
}

pub async fn deactivate_user(
    State(pool): State<DbPool>,
    AppPath(user_id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    if !users::deactivate_user(&pool, user_id, now_ts()).await? {
        return Err(AppError::not_found("User not found"));
    }

    tracing::info!("Deactivated user {}", user_id);
    Ok(StatusCode::NO_CONTENT)
}
