use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub description: String,
    pub color: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::template_tags::Entity")]
    TemplateTags,
}

impl Related<super::template_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateTags.def()
    }
}

impl Related<super::templates::Entity> for Entity {
    fn to() -> RelationDef {
        super::template_tags::Relation::Templates.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::template_tags::Relation::Tags.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
