//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod audit_repo;
pub mod file_upload_repo;
pub mod response_repo;
pub mod session_repo;
pub mod template_repo;

pub use audit_repo::AuditRepo;
pub use file_upload_repo::FileUploadRepo;
pub use response_repo::ResponseRepo;
pub use session_repo::SessionRepo;
pub use template_repo::TemplateRepo;
