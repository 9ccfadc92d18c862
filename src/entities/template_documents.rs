//! `SeaORM` Entity for template_documents table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "template_documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub file_type: String,
    pub uploaded_at: DateTimeWithTimeZone,
    pub size: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::operation_templates::Entity",
        from = "Column::TemplateId",
        to = "super::operation_templates::Column::Id",
        on_delete = "Cascade"
    )]
    OperationTemplates,
}

impl Related<super::operation_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperationTemplates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
