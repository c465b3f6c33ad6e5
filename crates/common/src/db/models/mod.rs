//! SeaORM entity models
//!
//! Database entities for YomiTomo

mod admin_user;
mod chapter;
mod chapter_page;
mod comment;
mod manga;

pub use manga::{
    Entity as MangaEntity,
    Model as Manga,
    ActiveModel as MangaActiveModel,
    Column as MangaColumn,
};

pub use chapter::{
    Entity as ChapterEntity,
    Model as Chapter,
    ActiveModel as ChapterActiveModel,
    Column as ChapterColumn,
};

pub use chapter_page::{
    Entity as ChapterPageEntity,
    Model as ChapterPage,
    ActiveModel as ChapterPageActiveModel,
    Column as ChapterPageColumn,
};

pub use comment::{
    Entity as CommentEntity,
    Model as Comment,
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
};

pub use admin_user::{
    Entity as AdminUserEntity,
    Model as AdminUser,
    ActiveModel as AdminUserActiveModel,
    Column as AdminUserColumn,
};
