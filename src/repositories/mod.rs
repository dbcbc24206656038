pub mod entry_repository;
pub mod principal_repository;
pub mod project_repository;

pub use entry_repository::*;
pub use principal_repository::*;
pub use project_repository::*;
