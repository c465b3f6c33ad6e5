//! Chapter handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::SuccessResponse;
use crate::extract::{MultipartForm, ValidatedJson};
use crate::AppState;
use yomitomo_common::{
    auth::AdminSession,
    db::{models::Chapter, ChapterDetail, NewChapter},
    errors::{AppError, Result},
    metrics,
};

/// Page image multipart field
const PAGES_FIELD: &str = "pages";

/// Chapter metadata update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateChapterRequest {
    pub chapter_number: f64,

    #[validate(length(min = 1, max = 500, message = "title is required"))]
    pub title: String,
}

/// Created chapter plus how many pages were stored
#[derive(Debug, Serialize)]
pub struct CreateChapterResponse {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub page_count: usize,
}

fn finite_chapter_number(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::Validation {
            message: "chapter_number must be a finite number".to_string(),
            field: Some("chapter_number".to_string()),
        })
    }
}

/// Create a chapter from uploaded pages.
///
/// Multipart fields: `manga_id`, `chapter_number`, `title` and up to
/// `uploads.max_pages` files under `pages`. Page numbers follow upload
/// order starting at 1. The chapter row is written before its pages and is
/// not rolled back if a page fails.
pub async fn create_chapter(
    State(state): State<AppState>,
    admin: AdminSession,
    form: MultipartForm,
) -> Result<(StatusCode, Json<CreateChapterResponse>)> {
    let manga_id: i32 = form.parse("manga_id")?;
    let chapter_number = finite_chapter_number(form.parse("chapter_number")?)?;
    let title = form.required_text("title")?.to_string();

    let pages: Vec<_> = form.files(PAGES_FIELD).collect();
    let max_pages = state.config.uploads.max_pages;
    if pages.len() > max_pages {
        return Err(AppError::Validation {
            message: format!("At most {} pages can be uploaded per chapter", max_pages),
            field: Some(PAGES_FIELD.to_string()),
        });
    }

    let repo = state.repo();
    if repo.find_manga(manga_id).await?.is_none() {
        return Err(AppError::not_found("Manga", manga_id));
    }

    let chapter = repo
        .create_chapter(NewChapter {
            manga_id,
            chapter_number,
            title,
        })
        .await?;

    for (index, page) in pages.iter().enumerate() {
        let stored = state
            .uploads
            .save(page.file_name.as_deref(), &page.data)
            .await?;
        metrics::record_upload(stored.size);

        repo.add_page(chapter.id, index as i32 + 1, stored.public_path)
            .await?;
    }

    metrics::record_created("chapter", 1);
    metrics::record_created("page", pages.len() as u64);
    tracing::info!(
        chapter_id = chapter.id,
        manga_id,
        pages = pages.len(),
        admin_id = admin.admin_id,
        "Chapter created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateChapterResponse {
            chapter,
            page_count: pages.len(),
        }),
    ))
}

/// Update chapter number and title; pages are left alone
pub async fn update_chapter(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(chapter_id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateChapterRequest>,
) -> Result<Json<SuccessResponse>> {
    let chapter_number = finite_chapter_number(request.chapter_number)?;

    let updated = state
        .repo()
        .update_chapter(chapter_id, chapter_number, request.title)
        .await?;

    if !updated {
        return Err(AppError::not_found("Chapter", chapter_id));
    }

    tracing::info!(chapter_id, admin_id = admin.admin_id, "Chapter updated");

    Ok(SuccessResponse::ok())
}

/// Delete a chapter with its pages and comments
pub async fn delete_chapter(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(chapter_id): Path<i32>,
) -> Result<Json<SuccessResponse>> {
    if !state.repo().delete_chapter(chapter_id).await? {
        return Err(AppError::not_found("Chapter", chapter_id));
    }

    tracing::info!(chapter_id, admin_id = admin.admin_id, "Chapter deleted");

    Ok(SuccessResponse::ok())
}

/// Get a chapter with manga title, pages and comments
pub async fn get_chapter(
    State(state): State<AppState>,
    Path(chapter_id): Path<i32>,
) -> Result<Json<ChapterDetail>> {
    let detail = state
        .repo()
        .chapter_detail(chapter_id)
        .await?
        .ok_or_else(|| AppError::not_found("Chapter", chapter_id))?;

    Ok(Json(detail))
}
