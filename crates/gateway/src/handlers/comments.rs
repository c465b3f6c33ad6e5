//! Reader comment handler

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::extract::ValidatedJson;
use crate::AppState;
use yomitomo_common::{
    db::models::Comment,
    errors::{AppError, Result},
    metrics,
};

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("Username and comment are required".into());
        return Err(error);
    }
    Ok(())
}

/// New comment on a chapter
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub chapter_id: i32,

    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 64))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "not_blank"), length(max = 5000))]
    pub comment: String,
}

/// Post a comment; username and text must be non-blank
pub async fn post_comment(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    let repo = state.repo();

    if repo.find_chapter(request.chapter_id).await?.is_none() {
        return Err(AppError::not_found("Chapter", request.chapter_id));
    }

    let comment = repo
        .create_comment(
            request.chapter_id,
            request.username.trim().to_string(),
            request.comment.trim().to_string(),
        )
        .await?;

    metrics::record_created("comment", 1);
    tracing::debug!(
        comment_id = comment.id,
        chapter_id = comment.chapter_id,
        "Comment posted"
    );

    Ok((StatusCode::CREATED, Json(comment)))
}
