//! Storage schema
//!
//! Five tables. Children reference their parent with `ON DELETE CASCADE`, so
//! removing a manga removes its chapters, and removing a chapter removes its
//! pages and comments. Duplicate `(manga_id, chapter_number)` and
//! `(chapter_id, page_number)` pairs are accepted.

use crate::errors::Result;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::info;

const CREATE_MANGA: &str = r#"
CREATE TABLE IF NOT EXISTS manga (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    cover_image TEXT,
    author TEXT,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_CHAPTERS: &str = r#"
CREATE TABLE IF NOT EXISTS chapters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    manga_id INTEGER NOT NULL,
    chapter_number REAL NOT NULL,
    title TEXT NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (manga_id) REFERENCES manga(id) ON DELETE CASCADE
)
"#;

const CREATE_CHAPTER_PAGES: &str = r#"
CREATE TABLE IF NOT EXISTS chapter_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chapter_id INTEGER NOT NULL,
    page_number INTEGER NOT NULL,
    image_path TEXT NOT NULL,
    FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE
)
"#;

const CREATE_COMMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chapter_id INTEGER NOT NULL,
    username TEXT NOT NULL,
    comment TEXT NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (chapter_id) REFERENCES chapters(id) ON DELETE CASCADE
)
"#;

const CREATE_ADMIN_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS admin_users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_chapters_manga_id ON chapters (manga_id)",
    "CREATE INDEX IF NOT EXISTS idx_chapter_pages_chapter_id ON chapter_pages (chapter_id)",
    "CREATE INDEX IF NOT EXISTS idx_comments_chapter_id ON comments (chapter_id)",
];

/// Create every table and index that does not exist yet
pub async fn create_tables(conn: &DatabaseConnection) -> Result<()> {
    for ddl in [
        CREATE_MANGA,
        CREATE_CHAPTERS,
        CREATE_CHAPTER_PAGES,
        CREATE_COMMENTS,
        CREATE_ADMIN_USERS,
    ] {
        conn.execute_unprepared(ddl).await?;
    }

    for ddl in CREATE_INDEXES {
        conn.execute_unprepared(ddl).await?;
    }

    info!("Database schema ready");
    Ok(())
}
