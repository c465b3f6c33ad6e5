//! Chapter entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chapters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub manga_id: i32,

    /// Fractional numbering is allowed (e.g. 10.5 for an extra)
    #[sea_orm(column_type = "Double")]
    pub chapter_number: f64,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::manga::Entity",
        from = "Column::MangaId",
        to = "super::manga::Column::Id",
        on_delete = "Cascade"
    )]
    Manga,

    #[sea_orm(has_many = "super::chapter_page::Entity")]
    Pages,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::manga::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Manga.def()
    }
}

impl Related<super::chapter_page::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pages.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
