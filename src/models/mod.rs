pub mod document;
pub mod mapper;
pub mod operation;
pub mod template;
