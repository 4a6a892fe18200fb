use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Serialization format of a configuration template's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    #[sea_orm(string_value = "json")]
    Json,
    #[sea_orm(string_value = "yaml")]
    Yaml,
    #[sea_orm(string_value = "toml")]
    Toml,
    #[sea_orm(string_value = "env")]
    Env,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub format: ConfigFormat,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub schema: Json,
    pub default_values: Json,
    pub version: String,
    pub environment_id: i64,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub created_by: String,
    pub updated_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::environments::Entity",
        from = "Column::EnvironmentId",
        to = "super::environments::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Environments,
    #[sea_orm(has_many = "super::template_tags::Entity")]
    TemplateTags,
}

impl Related<super::environments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Environments.def()
    }
}

impl Related<super::template_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateTags.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::template_tags::Relation::Tags.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::template_tags::Relation::Templates.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
