//! Repository pattern for database operations
//!
//! Every method is a single statement (or an independent sequence of them);
//! nothing here opens a transaction, so a failure part-way through a
//! multi-step write leaves the earlier steps in place.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use serde::Serialize;

/// Fields for a new manga
#[derive(Debug, Clone)]
pub struct NewManga {
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
}

/// Overwrite set for an existing manga.
///
/// `description` and `author` are written as given, `None` included.
/// `cover_image` is only written when `Some`.
#[derive(Debug, Clone)]
pub struct MangaChanges {
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<String>,
}

/// Fields for a new chapter
#[derive(Debug, Clone)]
pub struct NewChapter {
    pub manga_id: i32,
    pub chapter_number: f64,
    pub title: String,
}

/// A manga with its chapters in reading order
#[derive(Debug, Clone, Serialize)]
pub struct MangaDetail {
    #[serde(flatten)]
    pub manga: Manga,
    pub chapters: Vec<Chapter>,
}

/// A chapter with its parent title, pages and comments
#[derive(Debug, Clone, Serialize)]
pub struct ChapterDetail {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub manga_title: String,
    pub pages: Vec<ChapterPage>,
    pub comments: Vec<Comment>,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    // ========================================================================
    // Admin Operations
    // ========================================================================

    /// Number of admin accounts
    pub async fn count_admins(&self) -> Result<u64> {
        AdminUserEntity::find()
            .count(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find admin by username
    pub async fn find_admin_by_username(&self, username: &str) -> Result<Option<AdminUser>> {
        AdminUserEntity::find()
            .filter(AdminUserColumn::Username.eq(username))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Create an admin from an already hashed password
    pub async fn create_admin(&self, username: &str, password_hash: String) -> Result<AdminUser> {
        let admin = AdminUserActiveModel {
            id: NotSet,
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
        };

        admin.insert(self.conn()).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Duplicate {
                message: format!("Admin '{}' already exists", username),
            },
            _ => AppError::Database(e),
        })
    }

    // ========================================================================
    // Manga Operations
    // ========================================================================

    /// All manga, most recently updated first
    pub async fn list_manga(&self) -> Result<Vec<Manga>> {
        MangaEntity::find()
            .order_by_desc(MangaColumn::UpdatedAt)
            .order_by_desc(MangaColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find manga by ID
    pub async fn find_manga(&self, id: i32) -> Result<Option<Manga>> {
        MangaEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Manga plus its chapters ordered by chapter number
    pub async fn manga_detail(&self, id: i32) -> Result<Option<MangaDetail>> {
        let Some(manga) = self.find_manga(id).await? else {
            return Ok(None);
        };

        let chapters = self.list_chapters(id).await?;

        Ok(Some(MangaDetail { manga, chapters }))
    }

    /// Create a new manga
    pub async fn create_manga(&self, new: NewManga) -> Result<Manga> {
        let now = Utc::now();

        let manga = MangaActiveModel {
            id: NotSet,
            title: Set(new.title),
            description: Set(new.description),
            cover_image: Set(new.cover_image),
            author: Set(new.author),
            created_at: Set(now),
            updated_at: Set(now),
        };

        manga.insert(self.conn()).await.map_err(Into::into)
    }

    /// Overwrite a manga's fields and refresh `updated_at`.
    ///
    /// Returns `false` when no row has the given ID.
    pub async fn update_manga(&self, id: i32, changes: MangaChanges) -> Result<bool> {
        let mut update = MangaEntity::update_many()
            .col_expr(MangaColumn::Title, Expr::value(changes.title))
            .col_expr(MangaColumn::Description, Expr::value(changes.description))
            .col_expr(MangaColumn::Author, Expr::value(changes.author))
            .col_expr(MangaColumn::UpdatedAt, Expr::value(Utc::now()));

        if let Some(cover) = changes.cover_image {
            update = update.col_expr(MangaColumn::CoverImage, Expr::value(cover));
        }

        let result = update
            .filter(MangaColumn::Id.eq(id))
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Delete manga by ID; chapters, pages and comments cascade
    pub async fn delete_manga(&self, id: i32) -> Result<bool> {
        let result = MangaEntity::delete_by_id(id).exec(self.conn()).await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Chapter Operations
    // ========================================================================

    /// Chapters of a manga by ascending chapter number
    pub async fn list_chapters(&self, manga_id: i32) -> Result<Vec<Chapter>> {
        ChapterEntity::find()
            .filter(ChapterColumn::MangaId.eq(manga_id))
            .order_by_asc(ChapterColumn::ChapterNumber)
            .order_by_asc(ChapterColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find chapter by ID
    pub async fn find_chapter(&self, id: i32) -> Result<Option<Chapter>> {
        ChapterEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Create a chapter row (pages are added separately)
    pub async fn create_chapter(&self, new: NewChapter) -> Result<Chapter> {
        let chapter = ChapterActiveModel {
            id: NotSet,
            manga_id: Set(new.manga_id),
            chapter_number: Set(new.chapter_number),
            title: Set(new.title),
            created_at: Set(Utc::now()),
        };

        chapter
            .insert(self.conn())
            .await
            .map_err(|e| missing_parent(e, "Manga", new.manga_id))
    }

    /// Update a chapter's number and title; pages are untouched
    pub async fn update_chapter(&self, id: i32, chapter_number: f64, title: String) -> Result<bool> {
        let result = ChapterEntity::update_many()
            .col_expr(ChapterColumn::ChapterNumber, Expr::value(chapter_number))
            .col_expr(ChapterColumn::Title, Expr::value(title))
            .filter(ChapterColumn::Id.eq(id))
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Delete chapter by ID; pages and comments cascade
    pub async fn delete_chapter(&self, id: i32) -> Result<bool> {
        let result = ChapterEntity::delete_by_id(id).exec(self.conn()).await?;

        Ok(result.rows_affected > 0)
    }

    /// Chapter joined with its manga title, pages and comments
    pub async fn chapter_detail(&self, id: i32) -> Result<Option<ChapterDetail>> {
        let found = ChapterEntity::find_by_id(id)
            .find_also_related(MangaEntity)
            .one(self.conn())
            .await?;

        let Some((chapter, Some(manga))) = found else {
            return Ok(None);
        };

        let pages = self.list_pages(id).await?;
        let comments = self.list_comments(id).await?;

        Ok(Some(ChapterDetail {
            chapter,
            manga_title: manga.title,
            pages,
            comments,
        }))
    }

    // ========================================================================
    // Page Operations
    // ========================================================================

    /// Attach one page image to a chapter
    pub async fn add_page(
        &self,
        chapter_id: i32,
        page_number: i32,
        image_path: String,
    ) -> Result<ChapterPage> {
        let page = ChapterPageActiveModel {
            id: NotSet,
            chapter_id: Set(chapter_id),
            page_number: Set(page_number),
            image_path: Set(image_path),
        };

        page.insert(self.conn())
            .await
            .map_err(|e| missing_parent(e, "Chapter", chapter_id))
    }

    /// Pages of a chapter in reading order
    pub async fn list_pages(&self, chapter_id: i32) -> Result<Vec<ChapterPage>> {
        ChapterPageEntity::find()
            .filter(ChapterPageColumn::ChapterId.eq(chapter_id))
            .order_by_asc(ChapterPageColumn::PageNumber)
            .order_by_asc(ChapterPageColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Comment Operations
    // ========================================================================

    /// Append a comment to a chapter
    pub async fn create_comment(
        &self,
        chapter_id: i32,
        username: String,
        comment: String,
    ) -> Result<Comment> {
        let comment = CommentActiveModel {
            id: NotSet,
            chapter_id: Set(chapter_id),
            username: Set(username),
            comment: Set(comment),
            created_at: Set(Utc::now()),
        };

        comment
            .insert(self.conn())
            .await
            .map_err(|e| missing_parent(e, "Chapter", chapter_id))
    }

    /// Comments of a chapter, newest first
    pub async fn list_comments(&self, chapter_id: i32) -> Result<Vec<Comment>> {
        CommentEntity::find()
            .filter(CommentColumn::ChapterId.eq(chapter_id))
            .order_by_desc(CommentColumn::CreatedAt)
            .order_by_desc(CommentColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }
}

/// A rejected foreign key means the parent row is gone
fn missing_parent(err: DbErr, parent: &str, parent_id: i32) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::not_found(parent, parent_id),
        _ => AppError::Database(err),
    }
}
