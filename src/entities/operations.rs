//! SeaORM Entity for operations table
//!
//! One row per step of work on a work order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "operations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub work_order_id: Uuid,
    /// Template this operation was last synced into (or created from)
    pub template_id: Option<Uuid>,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Stored as the display label, see `models::operation::OperationStatus`
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub machining_methods: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub setup_instructions: Option<String>,
    pub sequence: i32,
    pub is_custom: bool,
    pub estimated_start_time: Option<DateTimeWithTimeZone>,
    pub estimated_end_time: Option<DateTimeWithTimeZone>,
    pub actual_start_time: Option<DateTimeWithTimeZone>,
    pub actual_end_time: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub comments: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_orders::Entity",
        from = "Column::WorkOrderId",
        to = "super::work_orders::Column::Id",
        on_delete = "Cascade"
    )]
    WorkOrders,
    #[sea_orm(has_many = "super::operation_documents::Entity")]
    OperationDocuments,
}

impl Related<super::work_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrders.def()
    }
}

impl Related<super::operation_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperationDocuments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
