//! API handlers module

pub mod admin;
pub mod chapters;
pub mod comments;
pub mod health;
pub mod manga;
pub mod pages;

use serde::Serialize;

/// Body for mutations that return no resource
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> axum::Json<Self> {
        axum::Json(Self { success: true })
    }
}
