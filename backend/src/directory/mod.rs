//! Entity CRUD for the back office

pub mod model;
pub mod service;

pub use model::*;
pub use service::DirectoryService;
