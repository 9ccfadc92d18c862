//! `SeaORM` Entity prelude

pub use super::operation_documents::Entity as OperationDocuments;
pub use super::operation_templates::Entity as OperationTemplates;
pub use super::operations::Entity as Operations;
pub use super::parts::Entity as Parts;
pub use super::template_documents::Entity as TemplateDocuments;
pub use super::work_orders::Entity as WorkOrders;
