//! SeaORM Entity for operation_templates table
//!
//! Part-scoped template library. Unique on (part_id, name).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operation_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub part_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub machining_methods: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub setup_instructions: Option<String>,
    pub sequence: i32,
    /// Minutes, derived from the last synced operation's actual start/end
    pub estimated_duration: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parts::Entity",
        from = "Column::PartId",
        to = "super::parts::Column::Id",
        on_delete = "Cascade"
    )]
    Parts,
    #[sea_orm(has_many = "super::template_documents::Entity")]
    TemplateDocuments,
}

impl Related<super::parts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parts.def()
    }
}

impl Related<super::template_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
