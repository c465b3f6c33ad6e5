//! Admin authentication handlers

use axum::{
    body::Bytes,
    extract::State,
    http::header::SET_COOKIE,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::SuccessResponse;
use crate::extract::{JsonBody, ValidatedJson};
use crate::AppState;
use yomitomo_common::{
    auth::{hash_password, verify_dummy_password, verify_password, CurrentSession},
    errors::{AppError, Result},
    metrics,
};

/// Login request; blank fields simply fail to match an account
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// New admin credentials
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAdminRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "username is required"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized {
        message: "Invalid credentials".to_string(),
    }
}

/// Authenticate and bind a new session to the admin
pub async fn login(
    State(state): State<AppState>,
    current: CurrentSession,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse> {
    let repo = state.repo();

    let admin = repo.find_admin_by_username(&request.username).await?;
    let stored_hash = admin.as_ref().map(|a| a.password_hash.clone());
    let password = request.password;

    let matches = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => verify_password(&password, &hash),
        None => verify_dummy_password(&password),
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("Password check panicked: {}", e),
    })?;

    let admin = match admin {
        Some(admin) if matches => admin,
        Some(admin) => {
            metrics::record_login(false);
            tracing::warn!(admin_id = admin.id, "Login with wrong password");
            return Err(invalid_credentials());
        }
        None => {
            metrics::record_login(false);
            tracing::warn!(username = %request.username, "Login for unknown admin");
            return Err(invalid_credentials());
        }
    };

    // A fresh token on every login; the previous one stops working
    if let Some(old_token) = current.token.as_deref() {
        state.sessions.end(old_token).await?;
    }

    let token = state.sessions.start(admin.id).await?;
    metrics::record_login(true);

    tracing::info!(admin_id = admin.id, "Admin logged in");

    Ok((
        [(SET_COOKIE, state.sessions.session_cookie(&token))],
        Json(LoginResponse {
            success: true,
            message: "Logged in successfully".to_string(),
        }),
    ))
}

/// Destroy the current session, if any
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<impl IntoResponse> {
    if let Some(token) = current.token.as_deref() {
        state.sessions.end(token).await?;
    }

    if let Some(admin_id) = current.admin_id {
        tracing::info!(admin_id, "Admin logged out");
    }

    Ok((
        [(SET_COOKIE, state.sessions.clear_cookie())],
        SuccessResponse::ok(),
    ))
}

/// Report whether the session is admin-bound
pub async fn status(current: CurrentSession) -> Json<StatusResponse> {
    Json(StatusResponse {
        is_admin: current.is_admin(),
    })
}

/// Create an admin.
///
/// Open to anyone while no admin exists (first-run setup); afterwards only an
/// admin session may add more.
pub async fn create_admin(
    State(state): State<AppState>,
    current: CurrentSession,
    body: Bytes,
) -> Result<Json<SuccessResponse>> {
    let repo = state.repo();

    // The gate comes before the body is even parsed
    if repo.count_admins().await? > 0 && !current.is_admin() {
        return Err(AppError::Forbidden {
            message: "Admin already exists".to_string(),
        });
    }

    let ValidatedJson(request) = ValidatedJson::<CreateAdminRequest>::from_bytes(&body)?;

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal {
            message: format!("Password hashing panicked: {}", e),
        })??;

    let admin = repo.create_admin(&request.username, password_hash).await?;

    tracing::info!(
        admin_id = admin.id,
        created_by = ?current.admin_id,
        "Admin created"
    );

    Ok(SuccessResponse::ok())
}
