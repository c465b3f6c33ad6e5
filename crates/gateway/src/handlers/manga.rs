//! Manga handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::SuccessResponse;
use crate::extract::MultipartForm;
use crate::AppState;
use yomitomo_common::{
    auth::AdminSession,
    db::{models::Manga, MangaChanges, MangaDetail, NewManga},
    errors::{AppError, Result},
    metrics,
};

/// Cover image multipart field
const COVER_FIELD: &str = "cover";

/// Text fields of the create/update manga form
#[derive(Debug, Validate)]
struct MangaForm {
    #[validate(length(min = 1, max = 500, message = "title is required"))]
    title: String,
    description: Option<String>,
    author: Option<String>,
}

impl MangaForm {
    fn from_form(form: &MultipartForm) -> Result<Self> {
        let manga = Self {
            title: form.text("title").unwrap_or_default().trim().to_string(),
            description: form.text("description").map(str::to_string),
            author: form.text("author").map(str::to_string),
        };
        manga.validate()?;
        Ok(manga)
    }
}

/// Store the cover upload, if one was sent
async fn store_cover(state: &AppState, form: &MultipartForm) -> Result<Option<String>> {
    let Some(cover) = form.file(COVER_FIELD) else {
        return Ok(None);
    };

    let stored = state
        .uploads
        .save(cover.file_name.as_deref(), &cover.data)
        .await?;
    metrics::record_upload(stored.size);

    Ok(Some(stored.public_path))
}

/// List every manga, most recently updated first
pub async fn list_manga(State(state): State<AppState>) -> Result<Json<Vec<Manga>>> {
    let manga = state.repo().list_manga().await?;
    Ok(Json(manga))
}

/// Get a manga with its chapters
pub async fn get_manga(
    State(state): State<AppState>,
    Path(manga_id): Path<i32>,
) -> Result<Json<MangaDetail>> {
    let detail = state
        .repo()
        .manga_detail(manga_id)
        .await?
        .ok_or_else(|| AppError::not_found("Manga", manga_id))?;

    Ok(Json(detail))
}

/// Create a manga (multipart: title, description, author, cover)
pub async fn create_manga(
    State(state): State<AppState>,
    admin: AdminSession,
    form: MultipartForm,
) -> Result<(StatusCode, Json<Manga>)> {
    let fields = MangaForm::from_form(&form)?;
    let cover_image = store_cover(&state, &form).await?;

    let manga = state
        .repo()
        .create_manga(NewManga {
            title: fields.title,
            description: fields.description,
            author: fields.author,
            cover_image,
        })
        .await?;

    metrics::record_created("manga", 1);
    tracing::info!(
        manga_id = manga.id,
        admin_id = admin.admin_id,
        title = %manga.title,
        "Manga created"
    );

    Ok((StatusCode::CREATED, Json(manga)))
}

/// Overwrite a manga's fields; the cover only changes when a new one is sent
pub async fn update_manga(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(manga_id): Path<i32>,
    form: MultipartForm,
) -> Result<Json<SuccessResponse>> {
    let fields = MangaForm::from_form(&form)?;
    let repo = state.repo();

    if repo.find_manga(manga_id).await?.is_none() {
        return Err(AppError::not_found("Manga", manga_id));
    }

    let cover_image = store_cover(&state, &form).await?;

    let updated = repo
        .update_manga(
            manga_id,
            MangaChanges {
                title: fields.title,
                description: fields.description,
                author: fields.author,
                cover_image,
            },
        )
        .await?;

    if !updated {
        return Err(AppError::not_found("Manga", manga_id));
    }

    tracing::info!(manga_id, admin_id = admin.admin_id, "Manga updated");

    Ok(SuccessResponse::ok())
}

/// Delete a manga and, by cascade, its chapters, pages and comments
pub async fn delete_manga(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(manga_id): Path<i32>,
) -> Result<Json<SuccessResponse>> {
    if !state.repo().delete_manga(manga_id).await? {
        return Err(AppError::not_found("Manga", manga_id));
    }

    tracing::info!(manga_id, admin_id = admin.admin_id, "Manga deleted");

    Ok(SuccessResponse::ok())
}
