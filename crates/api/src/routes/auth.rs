//! Account route handlers: register, login, profile.

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::Json;
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Login request body. `username` accepts a username or an email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Token response for register and login.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub message: &'static str,
    pub user: User,
    pub token: String,
}

/// Profile response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// `POST /api/auth/register`
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    let (user, token) = AuthService::new(state.pool(), state.tokens())
        .register(Registration {
            username: &body.username,
            email: &body.email,
            password: &body.password,
            first_name: body.first_name.as_deref(),
            last_name: body.last_name.as_deref(),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            message: "User registered successfully",
            user,
            token,
        }),
    ))
}

/// `POST /api/auth/login`
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let (user, token) = AuthService::new(state.pool(), state.tokens())
        .login(&body.username, &body.password)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(SessionResponse {
        message: "Login successful",
        user,
        token,
    }))
}

/// `GET /api/auth/profile`
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<ProfileResponse> {
    Json(ProfileResponse { user })
}
